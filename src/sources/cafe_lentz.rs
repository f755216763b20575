// src/sources/cafe_lentz.rs
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{Html, Selector};

use super::{fulltrim, MenuParser, ParseError, SourceDescriptor};
use crate::resolve::types::Menu;

/// Cafe Lentz lists the Mittagstisch in one of several tables on the page.
/// Dish cells keep their original markup (the site styles names inline);
/// placeholder cells ("X", Vorbestellung, the Wochenkarte header) are
/// skipped. The date sits in a span inside the same table.
pub struct CafeLentz;

impl MenuParser for CafeLentz {
    fn parse(&self, _source: &SourceDescriptor, body: &str) -> Result<Menu, ParseError> {
        static RE_DATE: OnceCell<Regex> = OnceCell::new();
        let re_date =
            RE_DATE.get_or_init(|| Regex::new(r"<span.*Wochenkarte vom (.*?)</span>").unwrap());

        let document = Html::parse_document(body);
        let tbody_sel = Selector::parse("tbody").unwrap();
        let cell_sel = Selector::parse("td").unwrap();

        let table = document
            .select(&tbody_sel)
            .find(|tbody| tbody.inner_html().contains("Mittagstisch"))
            .ok_or_else(|| ParseError::structure("no Mittagstisch table"))?;

        let mut entries = Vec::new();
        for cell in table.select(&cell_sel) {
            let text = fulltrim(&cell.text().collect::<String>());
            if text.is_empty()
                || text == "X"
                || text.contains("Vorbestellung")
                || text.contains("Wochenkarte")
            {
                continue;
            }
            entries.push(cell.inner_html());
        }

        let date = re_date
            .captures(&table.inner_html())
            .map(|captures| captures[1].to_string());

        Ok(Menu { date, entries })
    }
}
