// src/sources/wau_berlin.rs
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

use super::{fulltrim, MenuParser, ParseError, SourceDescriptor};
use crate::resolve::types::Menu;

/// The CMS behind wau-berlin.de answers the form POST with a JSON envelope
/// whose `content` field holds the page markup.
#[derive(Deserialize)]
struct EntryDetail {
    content: String,
}

/// WAU's lunch card is one `div.project_content` block with dishes separated
/// by double `<br>` runs. TAGESKARTE/MITTAGSTISCH headings are dropped;
/// everything from ABENDKARTE on is the evening menu, not lunch.
pub struct WauBerlin;

impl MenuParser for WauBerlin {
    fn parse(&self, _source: &SourceDescriptor, body: &str) -> Result<Menu, ParseError> {
        static RE_BREAKS: OnceCell<Regex> = OnceCell::new();
        let re_breaks =
            RE_BREAKS.get_or_init(|| Regex::new(r"(?i)<br[^>]*>\s*<br[^>]*>").unwrap());

        let envelope: EntryDetail = serde_json::from_str(body)?;

        let document = Html::parse_fragment(&envelope.content);
        let content_sel = Selector::parse("div.project_content").unwrap();
        let container = document
            .select(&content_sel)
            .next()
            .ok_or_else(|| ParseError::structure("no project_content section"))?;

        let html = container.inner_html();
        let mut entries = Vec::new();
        for block in re_breaks.split(&html) {
            let entry = fulltrim(block);
            if entry.contains("TAGESKARTE") || entry.contains("MITTAGSTISCH") {
                continue;
            }
            if entry.is_empty() {
                continue;
            }
            if entry.contains("ABENDKARTE") {
                break;
            }
            entries.push(entry);
        }

        Ok(Menu {
            date: None,
            entries,
        })
    }
}
