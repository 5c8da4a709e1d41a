//! Record extraction from rendered listing pages
//!
//! The results grid is normally reachable by a fixed shallow path: the first
//! child element of `<body>`, carrying `id="page"`. That assumption is
//! validated with a cheap attribute check; when it fails the extractor falls
//! back to an unconstrained search for the container by id. The fast path
//! dominates on well-formed pages; the fallback keeps layout drift from
//! silently producing zero records.

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Selector for the results grid container
const GRID_CONTAINER: &str = "#page";

/// Selector for one product tile within the grid
const GRID_ITEM: &str = ".gridItem";

/// Selector for a tile's heading element
const ITEM_HEADING: &str = "h3";

/// Selector for a tile's unit price sub-element
const PRICE_PER_UNIT: &str = ".pricePerUnit";

/// Selector for a tile's measure price sub-element
const PRICE_PER_MEASURE: &str = ".pricePerMeasure";

/// Extraction errors
///
/// `FieldMissing` is recovered locally: the item is skipped and reported,
/// extraction of the remaining items continues. `GridMissing` is a
/// page-level error and escalates to the orchestrator.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("grid item {index} is missing its {field} element")]
    FieldMissing { index: usize, field: &'static str },

    #[error("results grid container not found on the page")]
    GridMissing,
}

/// One scraped product entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Product title, trimmed
    pub title: String,

    /// Thumbnail reference; always empty for now, image download is a
    /// deferred extension point
    pub thumbnail: String,

    /// Raw currency-annotated unit price string, e.g. `"£1.50"`
    pub price_per_unit: String,

    /// Raw measure price string, e.g. `"£3.00/kg"`
    pub price_per_measure: String,

    /// RFC 3339 timestamp shared by all records of one extraction call
    pub scraped_at: String,

    /// Leaf category the record was scraped under, when known to the caller
    pub category: Option<String>,
}

/// The records extracted from one rendered listing page, plus the items
/// that failed field extraction. The atomic unit handed to the store.
#[derive(Debug, Default)]
pub struct PageBatch {
    pub records: Vec<ItemRecord>,
    pub failures: Vec<ExtractError>,
}

/// Extracts item records from a rendered listing page
///
/// Returns a best-effort batch: items missing a required field are reported
/// in `failures` without aborting the rest of the page. Fails only when the
/// grid container cannot be located at all.
pub fn extract(html: &str, category: Option<&str>) -> Result<PageBatch, ExtractError> {
    let document = Html::parse_document(html);

    let page = fast_path_container(&document)
        .or_else(|| fallback_container(&document))
        .ok_or(ExtractError::GridMissing)?;

    let item_selector = Selector::parse(GRID_ITEM).map_err(|_| ExtractError::GridMissing)?;
    let scraped_at = Utc::now().to_rfc3339();

    let mut batch = PageBatch::default();
    for (index, item) in page.select(&item_selector).enumerate() {
        match extract_item(&item, index) {
            Ok((title, price_per_unit, price_per_measure)) => batch.records.push(ItemRecord {
                title,
                thumbnail: String::new(),
                price_per_unit,
                price_per_measure,
                scraped_at: scraped_at.clone(),
                category: category.map(str::to_string),
            }),
            Err(e) => batch.failures.push(e),
        }
    }

    Ok(batch)
}

/// Fast path: first child element of `<body>`, validated by its id attribute
fn fast_path_container(document: &Html) -> Option<ElementRef<'_>> {
    let body_selector = Selector::parse("body").ok()?;
    let body = document.select(&body_selector).next()?;
    let first = body.children().find_map(ElementRef::wrap)?;
    (first.value().attr("id") == Some("page")).then_some(first)
}

/// Fallback: unconstrained search for the container by its id
fn fallback_container(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(GRID_CONTAINER).ok()?;
    document.select(&selector).next()
}

/// Extracts the required fields from one grid item
fn extract_item(
    item: &ElementRef<'_>,
    index: usize,
) -> Result<(String, String, String), ExtractError> {
    let title = heading_text(item).ok_or(ExtractError::FieldMissing {
        index,
        field: "title",
    })?;
    let price_per_unit =
        labeled_text(item, PRICE_PER_UNIT).ok_or(ExtractError::FieldMissing {
            index,
            field: "unit price",
        })?;
    let price_per_measure =
        labeled_text(item, PRICE_PER_MEASURE).ok_or(ExtractError::FieldMissing {
            index,
            field: "measure price",
        })?;
    Ok((title, price_per_unit, price_per_measure))
}

/// First meaningful text node inside the item's heading, trimmed
///
/// Skips structural noise such as line-break-only text nodes between the
/// heading tag and the actual title.
fn heading_text(item: &ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse(ITEM_HEADING).ok()?;
    let heading = item.select(&selector).next()?;
    heading
        .text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// All text fragments under the labeled sub-element, concatenated and trimmed
fn labeled_text(item: &ElementRef<'_>, label: &str) -> Option<String> {
    let selector = Selector::parse(label).ok()?;
    let element = item.select(&selector).next()?;
    Some(element.text().collect::<String>().trim().to_string())
}
