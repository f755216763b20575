//! Error isolation across sources within one batch.
//!
//! Covered:
//! - a timed-out source keeps its sibling's menu intact (one record each)
//! - batch order follows registration order, not completion order
//! - a panicking parser costs only its own slot and leaves no cache entry

use std::sync::Arc;
use std::time::Duration;

use mittagstisch::resolve::cache::MenuCache;
use mittagstisch::resolve::fetch::Fetcher;
use mittagstisch::resolve::types::{Menu, MenuPayload};
use mittagstisch::resolve::Aggregator;
use mittagstisch::sources::{
    MenuParser, ParseError, RequestSpec, SourceDescriptor, SourceRegistry,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Parser stub that succeeds with one fixed entry, whatever the body.
struct FixedMenu(&'static str);

impl MenuParser for FixedMenu {
    fn parse(&self, _source: &SourceDescriptor, _body: &str) -> Result<Menu, ParseError> {
        Ok(Menu {
            date: None,
            entries: vec![self.0.to_string()],
        })
    }
}

struct PanickingParser;

impl MenuParser for PanickingParser {
    fn parse(&self, _source: &SourceDescriptor, _body: &str) -> Result<Menu, ParseError> {
        panic!("boom");
    }
}

fn descriptor(
    name: &str,
    server: &MockServer,
    route: &str,
    parser: Arc<dyn MenuParser>,
) -> SourceDescriptor {
    SourceDescriptor::new(
        name,
        format!("http://{name}.example/"),
        RequestSpec::get(server.address().to_string(), route),
        parser,
    )
}

#[tokio::test]
async fn a_timed_out_source_does_not_disturb_its_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rundum"))
        .respond_with(ResponseTemplate::new(200).set_body_string("menu"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/wau"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let rundum = descriptor("cafe-rundum", &server, "/rundum", Arc::new(FixedMenu("Soup")));
    let wau = SourceDescriptor::new(
        "wau-berlin",
        "http://wau-berlin.example/",
        RequestSpec::post(server.address().to_string(), "/wau", "pid=5603160")
            .header("Content-Type", "application/x-www-form-urlencoded"),
        Arc::new(FixedMenu("unreached")),
    );

    let aggregator = Aggregator::new(
        SourceRegistry::new(vec![rundum, wau]),
        Arc::new(MenuCache::default()),
        Fetcher::with_timeout(Duration::from_millis(200)),
    );

    let batch = aggregator.resolve_all().await;
    assert_eq!(batch.len(), 2, "one record per registered source");

    match &batch[0].data {
        MenuPayload::Menu(menu) => assert_eq!(menu.entries, ["Soup"]),
        MenuPayload::Error { error } => panic!("healthy source must not fail: {error}"),
    }
    match &batch[1].data {
        MenuPayload::Error { error } => assert!(error.contains("timed out"), "got: {error}"),
        MenuPayload::Menu(_) => panic!("the slow source must time out"),
    }
}

#[tokio::test]
async fn batch_order_follows_registration_not_completion() {
    let server = MockServer::start().await;
    for (route, delay_ms) in [("/a", 150u64), ("/b", 50), ("/c", 0)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("menu")
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&server)
            .await;
    }

    // The first-registered source answers slowest.
    let descriptors = vec![
        descriptor("cafe-rundum", &server, "/a", Arc::new(FixedMenu("slowest"))),
        descriptor("restaurant-so", &server, "/b", Arc::new(FixedMenu("middle"))),
        descriptor("wau-berlin", &server, "/c", Arc::new(FixedMenu("fastest"))),
    ];

    let aggregator = Aggregator::new(
        SourceRegistry::new(descriptors),
        Arc::new(MenuCache::default()),
        Fetcher::new(),
    );

    let batch = aggregator.resolve_all().await;
    let names: Vec<&str> = batch.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(
        names,
        ["cafe-rundum", "restaurant-so", "wau-berlin"],
        "completion order was inverted, report order must not be"
    );
}

#[tokio::test]
async fn a_panicking_parser_costs_only_its_own_slot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/healthy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("menu"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/crashy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("menu"))
        .expect(2)
        .mount(&server)
        .await;

    let descriptors = vec![
        descriptor("cafe-rundum", &server, "/healthy", Arc::new(FixedMenu("Soup"))),
        descriptor("eatfirst", &server, "/crashy", Arc::new(PanickingParser)),
    ];

    let cache = Arc::new(MenuCache::default());
    let aggregator = Aggregator::new(
        SourceRegistry::new(descriptors),
        Arc::clone(&cache),
        Fetcher::new(),
    );

    let batch = aggregator.resolve_all().await;
    assert!(!batch[0].data.is_error(), "sibling unaffected by the panic");
    match &batch[1].data {
        MenuPayload::Error { error } => {
            assert!(error.contains("resolver task failed"), "got: {error}")
        }
        MenuPayload::Menu(_) => panic!("the crashed slot must carry an error"),
    }
    assert!(!batch[1].cached);

    // Nothing was stored for the crashed source, so the next query fetches again.
    assert!(cache.lookup("eatfirst").is_none());
    let again = aggregator.resolve_all().await;
    assert!(!again[1].cached);
    assert!(again[1].data.is_error());
}
