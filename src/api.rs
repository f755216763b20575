use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::resolve::types::{MenuPayload, MenuRecord};
use crate::resolve::Aggregator;

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self { aggregator }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/results", get(results))
        .route("/json/results", get(json_results))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Wire envelope of a batch: `error` is reserved for query-level failures
/// (per-source failures live inside their own records).
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsEnvelope {
    pub error: Option<String>,
    pub results: Vec<MenuRecord>,
}

#[derive(Deserialize)]
struct ResultsQuery {
    format: Option<String>,
}

/// `GET /results` is the query entry point. JSON by default, an HTML page on
/// `?format=html`. Unknown formats are rejected before any resolution work.
async fn results(State(state): State<AppState>, Query(query): Query<ResultsQuery>) -> Response {
    match query.format.as_deref() {
        None | Some("json") => resolve_json(&state).await.into_response(),
        Some("html") => {
            let batch = state.aggregator.resolve_all().await;
            Html(render_results(&batch)).into_response()
        }
        Some(other) => {
            let body = ResultsEnvelope {
                error: Some(format!("unsupported format: {other}")),
                results: Vec::new(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

/// `GET /json/results` answers JSON regardless of any format parameter.
async fn json_results(State(state): State<AppState>) -> Json<ResultsEnvelope> {
    resolve_json(&state).await
}

async fn resolve_json(state: &AppState) -> Json<ResultsEnvelope> {
    let results = state.aggregator.resolve_all().await;
    Json(ResultsEnvelope {
        error: None,
        results,
    })
}

/// HTML rendering of a batch: a heading per source, its error if any, the
/// date line, then the entries as a list. Entry strings are emitted verbatim
/// (several sources deliberately carry markup); everything else is escaped.
fn render_results(batch: &[MenuRecord]) -> String {
    let mut page = String::new();
    page.push_str("<h1>Results</h1>\n");
    page.push_str("<p>Up-to-date menus</p>\n");

    for record in batch {
        page.push_str(&format!(
            "<h2>{}</h2>\n",
            html_escape::encode_text(&record.name)
        ));

        let menu = match &record.data {
            MenuPayload::Menu(menu) => Some(menu),
            MenuPayload::Error { error } => {
                page.push_str(&format!(
                    "<p>Error: {}</p>\n",
                    html_escape::encode_text(error)
                ));
                None
            }
        };

        let date = menu.and_then(|m| m.date.as_deref()).unwrap_or("Unknown");
        page.push_str(&format!(
            "Last update: {}\n",
            html_escape::encode_text(date)
        ));

        match menu {
            Some(menu) => {
                page.push_str("<ul>\n");
                for entry in &menu.entries {
                    page.push_str(&format!("<li>{entry}</li>\n"));
                }
                page.push_str("</ul>\n");
            }
            None => page.push_str("<p>No entries.</p>\n"),
        }
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::types::Menu;
    use chrono::Utc;

    fn record(name: &str, data: MenuPayload) -> MenuRecord {
        MenuRecord {
            name: name.to_string(),
            link: format!("http://{name}.example/"),
            data,
            timestamp: Utc::now(),
            cached: false,
        }
    }

    #[test]
    fn rendering_keeps_entry_markup_but_escapes_errors() {
        let batch = vec![
            record(
                "cafe-lentz",
                MenuPayload::Menu(Menu {
                    date: Some("18.08. - 22.08.".into()),
                    entries: vec!["<strong>Pasta</strong>".into()],
                }),
            ),
            record("eatfirst", MenuPayload::error("oops <script>")),
        ];

        let page = render_results(&batch);
        assert!(page.contains("<h2>cafe-lentz</h2>"));
        assert!(page.contains("Last update: 18.08. - 22.08."));
        assert!(page.contains("<li><strong>Pasta</strong></li>"));
        assert!(page.contains("<h2>eatfirst</h2>"));
        assert!(page.contains("Error: oops &lt;script&gt;"));
        assert!(page.contains("<p>No entries.</p>"));
        assert!(!page.contains("oops <script>"));
    }

    #[test]
    fn rendering_marks_missing_dates_as_unknown() {
        let batch = vec![record(
            "wau-berlin",
            MenuPayload::Menu(Menu {
                date: None,
                entries: vec![],
            }),
        )];

        let page = render_results(&batch);
        assert!(page.contains("Last update: Unknown"));
        // An empty menu still renders its (empty) list, unlike an error.
        assert!(page.contains("<ul>\n</ul>"));
        assert!(!page.contains("No entries."));
    }
}
