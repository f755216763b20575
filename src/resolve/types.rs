// src/resolve/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sources::SourceDescriptor;

/// Parsed menu for one source: the date line the site advertises (if any)
/// plus one string per dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub entries: Vec<String>,
}

/// What a resolution produced: menu data or the source's own error text.
/// Exactly one of the two, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuPayload {
    Menu(Menu),
    Error { error: String },
}

impl MenuPayload {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// One source's outcome within a batch. On the wire this is exactly
/// `{name, link, data, cached}`; the timestamp stays internal and drives
/// cache freshness only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuRecord {
    pub name: String,
    pub link: String,
    pub data: MenuPayload,
    #[serde(skip, default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
}

impl MenuRecord {
    /// Record for a resolution that just ran (cache hit copies are derived
    /// via [`MenuRecord::into_cached`]).
    pub fn fresh(source: &SourceDescriptor, data: MenuPayload) -> Self {
        Self {
            name: source.name.clone(),
            link: source.link.clone(),
            data,
            timestamp: Utc::now(),
            cached: false,
        }
    }

    /// The copy handed out when the cache already held a fresh record.
    pub fn into_cached(mut self) -> Self {
        self.cached = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn menu_payload_serializes_flat() {
        let payload = MenuPayload::Menu(Menu {
            date: Some("12.08.2024".into()),
            entries: vec!["Soup".into(), "Salad".into()],
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"date": "12.08.2024", "entries": ["Soup", "Salad"]})
        );
    }

    #[test]
    fn menu_without_date_omits_the_field() {
        let payload = MenuPayload::Menu(Menu {
            date: None,
            entries: vec!["Soup".into()],
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"entries": ["Soup"]}));
    }

    #[test]
    fn error_payload_round_trips() {
        let payload = MenuPayload::error("Failed to parse webpage");
        let text = serde_json::to_string(&payload).unwrap();
        assert_eq!(text, r#"{"error":"Failed to parse webpage"}"#);

        let back: MenuPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back, payload);
        assert!(back.is_error());
    }

    #[test]
    fn untagged_union_picks_the_menu_variant_for_menu_json() {
        let back: MenuPayload =
            serde_json::from_value(json!({"entries": ["Soup"]})).unwrap();
        assert_eq!(
            back,
            MenuPayload::Menu(Menu {
                date: None,
                entries: vec!["Soup".into()],
            })
        );
    }

    #[test]
    fn record_wire_shape_has_no_timestamp() {
        let record = MenuRecord {
            name: "cafe-rundum".into(),
            link: "http://www.cafe-rundum.de/deutsch/speisekarte.html".into(),
            data: MenuPayload::error("boom"),
            timestamp: Utc::now(),
            cached: true,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "cafe-rundum",
                "link": "http://www.cafe-rundum.de/deutsch/speisekarte.html",
                "data": {"error": "boom"},
                "cached": true
            })
        );
    }
}
