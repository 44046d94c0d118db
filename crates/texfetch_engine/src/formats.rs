use std::collections::BTreeMap;

use scraper::{Html, Selector};
use texfetch_core::AlternativeFormat;

/// Map format name -> download path from the "other formats" page.
///
/// Each download is a form whose action looks like `/{format}/{identifier}`.
pub fn parse_format_links(html: &str) -> BTreeMap<String, String> {
    let doc = Html::parse_document(html);
    let mut formats = BTreeMap::new();
    let Ok(form_sel) = Selector::parse("form[action]") else {
        return formats;
    };

    for form in doc.select(&form_sel) {
        let Some(action) = form.value().attr("action") else {
            continue;
        };
        let Some(format) = action.split('/').nth(1).filter(|f| !f.is_empty()) else {
            continue;
        };
        formats.insert(format.to_string(), action.to_string());
    }
    formats
}

pub fn choose_format(links: &BTreeMap<String, String>) -> Option<(AlternativeFormat, &str)> {
    AlternativeFormat::PREFERENCE.into_iter().find_map(|format| {
        links
            .get(format.name())
            .map(|path| (format, path.as_str()))
    })
}
