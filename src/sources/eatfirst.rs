// src/sources/eatfirst.rs
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Selector};

use super::{fulltrim, MenuParser, ParseError, SourceDescriptor};
use crate::resolve::types::Menu;

/// EatFirst renders each dish as an `.item` card: description and price as
/// text, the photo as an inline background-image style. No cards means the
/// day's menu is not published yet.
pub struct EatFirst;

impl MenuParser for EatFirst {
    fn parse(&self, _source: &SourceDescriptor, body: &str) -> Result<Menu, ParseError> {
        static RE_BG_URL: OnceCell<Regex> = OnceCell::new();
        let re_bg_url = RE_BG_URL.get_or_init(|| Regex::new(r"url\('([^']*)'\)").unwrap());

        let document = Html::parse_document(body);
        let item_sel = Selector::parse(".item").unwrap();
        let description_sel = Selector::parse(".description").unwrap();
        let price_sel = Selector::parse(".price").unwrap();
        let image_sel = Selector::parse(".image").unwrap();

        let items: Vec<_> = document.select(&item_sel).collect();
        if items.is_empty() {
            return Err(ParseError::structure("(Noch) keine Gerichte vorhanden."));
        }

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let description = item
                .select(&description_sel)
                .next()
                .map(|el| fulltrim(&el.text().collect::<String>()))
                .unwrap_or_default();
            let price = item
                .select(&price_sel)
                .next()
                .map(|el| fulltrim(&el.text().collect::<String>()))
                .unwrap_or_default();
            let image_url = item
                .select(&image_sel)
                .next()
                .and_then(|el| el.value().attr("style"))
                .and_then(|style| re_bg_url.captures(style))
                .map(|captures| captures[1].to_string())
                .ok_or_else(|| ParseError::structure("menu item without image"))?;

            entries.push(format!(
                "{description} - {price}<br/><img src=\"{image_url}\" style=\"width: 200px\"/>"
            ));
        }

        Ok(Menu {
            date: None,
            entries,
        })
    }
}
