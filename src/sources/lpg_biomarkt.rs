// src/sources/lpg_biomarkt.rs
use chrono::NaiveDate;

use super::{MenuParser, ParseError, SourceDescriptor};
use crate::resolve::types::Menu;

/// Path of the menu photo for a given day; the market uploads one JPEG per
/// day under a date-stamped wp-content path.
pub fn menu_path(date: NaiveDate) -> String {
    date.format("/wp-content/uploads/%Y/%m/me%d.jpg").to_string()
}

/// LPG posts its Mittagstisch as a daily photo. A successful response means
/// the photo exists; the single entry is a link wrapping the image itself.
/// The body bytes are not inspected.
pub struct LpgBiomarkt;

impl MenuParser for LpgBiomarkt {
    fn parse(&self, source: &SourceDescriptor, _body: &str) -> Result<Menu, ParseError> {
        let image_url = source.request.url();
        Ok(Menu {
            date: None,
            entries: vec![format!(
                "<a href=\"{image_url}\"><img style=\"width: auto; height: 600px\" src=\"{image_url}\"/></a>"
            )],
        })
    }
}
