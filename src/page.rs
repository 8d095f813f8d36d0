use std::sync::OnceLock;

use log::{debug, warn};
use reqwest::Url;
use scraper::{Html, Selector};

use crate::selection::{Checkbox, ItemKey, ItemKind};

static ITEM_CHECKBOX_SELECTOR: OnceLock<Selector> = OnceLock::new();

/// A rendered listing page.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub items: Vec<Checkbox>,
}

impl Page {
    pub fn parse(url: Url, body: &str) -> Page {
        let document = Html::parse_document(body);
        let items = parse_item_checkboxes(&document);
        debug!("Parsed {} selectable items from {}", items.len(), url);
        Page { url, items }
    }
}

/// Reads every `.item-checkbox` carrying a known `data-type` and a `data-path`.
pub fn parse_item_checkboxes(document: &Html) -> Vec<Checkbox> {
    let selector = ITEM_CHECKBOX_SELECTOR.get_or_init(|| {
        Selector::parse("input.item-checkbox").expect("Could not parse selector")
    });

    document
        .select(selector)
        .filter_map(|element| {
            let element = element.value();
            let (Some(kind), Some(path)) = (element.attr("data-type"), element.attr("data-path"))
            else {
                warn!("Skipping item checkbox without data-type or data-path");
                return None;
            };
            let kind: ItemKind = match kind.parse() {
                Ok(kind) => kind,
                Err(err) => {
                    warn!("Skipping item checkbox for {}: {}", path, err);
                    return None;
                }
            };

            Some(Checkbox {
                key: ItemKey::new(kind, path),
                checked: element.attr("checked").is_some(),
            })
        })
        .collect()
}
