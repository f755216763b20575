// src/sources/cafe_rundum.rs
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Selector};

use super::{fulltrim, MenuParser, ParseError, SourceDescriptor};
use crate::resolve::types::Menu;

/// Cafe Rundum publishes the week as table rows inside `#content`. A bold
/// row carrying a `DD.MM.YYYY` date opens the menu section, a bold
/// "unsere salate" row closes it; the rows in between are the dishes.
pub struct CafeRundum;

impl MenuParser for CafeRundum {
    fn parse(&self, _source: &SourceDescriptor, body: &str) -> Result<Menu, ParseError> {
        static RE_DATE: OnceCell<Regex> = OnceCell::new();
        let re_date =
            RE_DATE.get_or_init(|| Regex::new(r"([0-9]{2}\.[0-9]{2}\.[0-9]{4})").unwrap());

        let document = Html::parse_document(body);
        let row_sel = Selector::parse("#content tr").unwrap();
        let strong_sel = Selector::parse("strong").unwrap();

        let mut date = None;
        let mut entries = Vec::new();
        let mut in_menu_section = false;

        for row in document.select(&row_sel) {
            let text = fulltrim(&row.text().collect::<String>());
            if row.select(&strong_sel).next().is_some() {
                if let Some(captures) = re_date.captures(&text) {
                    in_menu_section = true;
                    date = Some(captures[1].to_string());
                } else if text.contains("unsere salate") {
                    break;
                }
            } else if in_menu_section && !text.is_empty() {
                entries.push(text);
            }
        }

        Ok(Menu { date, entries })
    }
}
