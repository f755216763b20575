// src/resolve/mod.rs
pub mod cache;
pub mod fetch;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::sources::{SourceDescriptor, SourceRegistry};
use cache::MenuCache;
use fetch::Fetcher;
use types::{MenuPayload, MenuRecord};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("resolve_queries_total", "Aggregate queries served.");
        describe_counter!("resolve_cache_hits_total", "Per-source cache hits.");
        describe_counter!("resolve_fetches_total", "Upstream requests issued.");
        describe_counter!(
            "resolve_source_errors_total",
            "Fetch/parse failures folded into per-source error payloads."
        );
        describe_histogram!("resolve_batch_ms", "Time to resolve a full batch in milliseconds.");
        describe_gauge!("resolve_last_query_ts", "Unix ts when the last query resolved.");
    });
}

/// The fan-out/fan-in engine: per query, one task per registered source,
/// joined into one batch in registration order.
///
/// Each task consults the cache first; on a miss it fetches, parses and
/// stores. Failures never escape a source's own record; a batch always has
/// one record per registered source.
pub struct Aggregator {
    registry: SourceRegistry,
    cache: Arc<MenuCache>,
    fetcher: Fetcher,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, cache: Arc<MenuCache>, fetcher: Fetcher) -> Self {
        Self {
            registry,
            cache,
            fetcher,
        }
    }

    /// Resolve every registered source concurrently and return one record
    /// per source, in registration order regardless of completion order.
    pub async fn resolve_all(&self) -> Vec<MenuRecord> {
        ensure_metrics_described();
        counter!("resolve_queries_total").increment(1);
        let t0 = Instant::now();

        let mut handles = Vec::with_capacity(self.registry.len());
        for source in self.registry.iter() {
            let source = Arc::clone(source);
            let cache = Arc::clone(&self.cache);
            let fetcher = self.fetcher.clone();
            handles.push(tokio::spawn(async move {
                resolve_one(&source, &cache, &fetcher).await
            }));
        }

        let mut batch = Vec::with_capacity(handles.len());
        for (handle, source) in handles.into_iter().zip(self.registry.iter()) {
            let record = match handle.await {
                Ok(record) => record,
                Err(e) => {
                    // A crashed task must not take the batch down; its slot
                    // gets an error record. No cache write happened for it.
                    tracing::warn!(error = ?e, source = %source.name, "resolver task failed");
                    counter!("resolve_source_errors_total").increment(1);
                    MenuRecord::fresh(source, MenuPayload::error(format!("resolver task failed: {e}")))
                }
            };
            batch.push(record);
        }

        histogram!("resolve_batch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("resolve_last_query_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        batch
    }
}

/// The per-source pipeline: cache consult, then fetch + parse on a miss.
/// Every failure ends up as that source's own error payload; fresh outcomes
/// (success or failure) are written back to the cache.
async fn resolve_one(source: &SourceDescriptor, cache: &MenuCache, fetcher: &Fetcher) -> MenuRecord {
    if let Some(record) = cache.lookup(&source.name) {
        counter!("resolve_cache_hits_total").increment(1);
        return record.into_cached();
    }

    counter!("resolve_fetches_total").increment(1);
    let payload = match fetcher.fetch(&source.request).await {
        Ok(body) => match source.parser.parse(source, &body) {
            Ok(menu) => MenuPayload::Menu(menu),
            Err(e) => {
                tracing::warn!(error = %e, source = %source.name, "parse error");
                counter!("resolve_source_errors_total").increment(1);
                MenuPayload::error(e.to_string())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, source = %source.name, "fetch error");
            counter!("resolve_source_errors_total").increment(1);
            MenuPayload::error(e.to_string())
        }
    };

    let record = MenuRecord::fresh(source, payload);
    cache.store(&record);
    record
}
