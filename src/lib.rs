// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod metrics;
pub mod resolve;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState, ResultsEnvelope};
pub use crate::resolve::cache::{MenuCache, DEFAULT_TTL};
pub use crate::resolve::fetch::{FetchError, Fetcher, REQUEST_TIMEOUT};
pub use crate::resolve::types::{Menu, MenuPayload, MenuRecord};
pub use crate::resolve::Aggregator;
pub use crate::sources::{
    MenuParser, Method, ParseError, RequestSpec, SourceDescriptor, SourceRegistry,
};
