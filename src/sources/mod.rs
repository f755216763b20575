// src/sources/mod.rs
pub mod cafe_lentz;
pub mod cafe_rundum;
pub mod eatfirst;
pub mod lpg_biomarkt;
pub mod restaurant_so;
pub mod wau_berlin;

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::resolve::types::Menu;

/// HTTP method of a source request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One source's request parameters: scheme-less host + path, method,
/// extra headers, optional urlencoded body.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub host: String,
    pub path: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn get(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            method: Method::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(
        host: impl Into<String>,
        path: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            method: Method::Post,
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Full request URL. Plain http, as the sites were originally reachable;
    /// upgrades happen via redirect following.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.host, self.path)
    }
}

/// Parse failures a source can report.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The page no longer has the shape this parser expects.
    #[error("{0}")]
    Structure(String),

    /// The body was not the JSON envelope the source serves.
    #[error("invalid upstream json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }
}

/// Per-source content extraction. Implementations are pure functions over
/// the body text: no I/O, no blocking, no state beyond the descriptor they
/// are handed.
pub trait MenuParser: Send + Sync {
    fn parse(&self, source: &SourceDescriptor, body: &str) -> Result<Menu, ParseError>;
}

/// One registered source: identity, informational link, how to request its
/// page and how to read it. Immutable after construction.
#[derive(Clone)]
pub struct SourceDescriptor {
    pub name: String,
    pub link: String,
    pub request: RequestSpec,
    pub parser: Arc<dyn MenuParser>,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        link: impl Into<String>,
        request: RequestSpec,
        parser: Arc<dyn MenuParser>,
    ) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            request,
            parser,
        }
    }
}

/// Fixed, ordered list of sources. Built once at startup; batches report
/// menus in exactly this order.
#[derive(Clone)]
pub struct SourceRegistry {
    sources: Vec<Arc<SourceDescriptor>>,
}

impl SourceRegistry {
    pub fn new(descriptors: Vec<SourceDescriptor>) -> Self {
        Self {
            sources: descriptors.into_iter().map(Arc::new).collect(),
        }
    }

    /// The six production sources, in the order menus are reported.
    pub fn builtin() -> Self {
        Self::new(builtin_descriptors())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SourceDescriptor>> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn builtin_descriptors() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "cafe-rundum",
            "http://www.cafe-rundum.de/deutsch/speisekarte.html",
            RequestSpec::get("www.cafe-rundum.de", "/deutsch/speisekarte.html"),
            Arc::new(cafe_rundum::CafeRundum),
        ),
        SourceDescriptor::new(
            "restaurant-so",
            "http://www.restaurant-so.de/deutsch/tageskarte.htm",
            RequestSpec::get("www.restaurant-so.de", "/deutsch/tageskarte.htm"),
            Arc::new(restaurant_so::RestaurantSo),
        ),
        SourceDescriptor::new(
            "wau-berlin",
            "http://www.wau-berlin.de/Speisen",
            RequestSpec::post(
                "www.wau-berlin.de",
                "/designs/escher/entry-detail.php",
                "pid=5603160&url=wauberlin&nurl=&is_following=false&design=montessori&template=escher",
            )
            .header("Content-Type", "application/x-www-form-urlencoded"),
            Arc::new(wau_berlin::WauBerlin),
        ),
        SourceDescriptor::new(
            "cafe-lentz",
            "http://www.cafe-lentz.de/karte/15-karte/wochenkarte/42-wochenkarte",
            RequestSpec::get(
                "www.cafe-lentz.de",
                "/karte/15-karte/wochenkarte/42-wochenkarte",
            ),
            Arc::new(cafe_lentz::CafeLentz),
        ),
        SourceDescriptor::new(
            "lpg-biomarkt",
            "http://www.lpg-biomarkt.de/unsere-markte-herzlich-willkommen/mehringdamm/#unser-angebot",
            RequestSpec::get(
                "www.lpg-biomarkt.de",
                lpg_biomarkt::menu_path(Utc::now().date_naive()),
            ),
            Arc::new(lpg_biomarkt::LpgBiomarkt),
        ),
        SourceDescriptor::new(
            "eatfirst",
            "https://www.eatfirst.de/",
            RequestSpec::get("www.eatfirst.de", "/"),
            Arc::new(eatfirst::EatFirst),
        ),
    ]
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn fulltrim(s: &str) -> String {
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Visible text of an HTML fragment: entities decoded, tags stripped.
pub fn strip_html(html: &str) -> String {
    let decoded = html_escape::decode_html_entities(html).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    re_tags.replace_all(&decoded, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulltrim_collapses_all_whitespace() {
        assert_eq!(fulltrim("  Soup \n\t of the\u{a0}day  "), "Soup of the day");
        assert_eq!(fulltrim("\n \t "), "");
    }

    #[test]
    fn strip_html_decodes_then_drops_tags() {
        let html = "<p>Tageskarte f&uuml;r den <b>12.08.</b></p>";
        assert_eq!(strip_html(html), "Tageskarte für den 12.08.");
    }

    #[test]
    fn request_url_is_plain_http() {
        let spec = RequestSpec::get("www.cafe-rundum.de", "/deutsch/speisekarte.html");
        assert_eq!(
            spec.url(),
            "http://www.cafe-rundum.de/deutsch/speisekarte.html"
        );
    }

    #[test]
    fn builtin_registry_order_is_stable() {
        let registry = SourceRegistry::builtin();
        let names: Vec<&str> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "cafe-rundum",
                "restaurant-so",
                "wau-berlin",
                "cafe-lentz",
                "lpg-biomarkt",
                "eatfirst",
            ]
        );
    }

    #[test]
    fn wau_request_is_a_form_post() {
        let registry = SourceRegistry::builtin();
        let wau = registry
            .iter()
            .find(|s| s.name == "wau-berlin")
            .expect("wau registered");
        assert_eq!(wau.request.method, Method::Post);
        assert!(wau
            .request
            .headers
            .iter()
            .any(|(name, value)| name == "Content-Type"
                && value == "application/x-www-form-urlencoded"));
        assert!(wau
            .request
            .body
            .as_deref()
            .is_some_and(|b| b.starts_with("pid=5603160")));
    }
}
