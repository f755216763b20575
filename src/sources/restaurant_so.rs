// src/sources/restaurant_so.rs
use once_cell::sync::OnceCell;
use regex::Regex;

use super::{fulltrim, strip_html, MenuParser, ParseError, SourceDescriptor};
use crate::resolve::types::Menu;

/// Restaurant So's markup has no usable DOM structure, so the parser works
/// on the stripped page text: locate the "Tageskarte für den <date>" line,
/// then split the starred menu block on the euro sign.
pub struct RestaurantSo;

impl MenuParser for RestaurantSo {
    fn parse(&self, _source: &SourceDescriptor, body: &str) -> Result<Menu, ParseError> {
        static RE_PAGE: OnceCell<Regex> = OnceCell::new();
        let re_page =
            RE_PAGE.get_or_init(|| Regex::new(r"Tageskarte für den ([0-9.]+)\s+(\*.+)$").unwrap());

        let text = fulltrim(&strip_html(body));
        let captures = re_page
            .captures(&text)
            .ok_or_else(|| ParseError::structure("Failed to parse webpage"))?;

        let entries = captures[2]
            .split('€')
            .map(|raw| fulltrim(&raw.replacen('*', "", 1)))
            .filter(|entry| !entry.is_empty())
            .map(|entry| format!("{entry} €"))
            .collect();

        Ok(Menu {
            date: Some(captures[1].to_string()),
            entries,
        })
    }
}
