//! Pagination control for category listing pages
//!
//! Determines the page-size setting and the number of page advances needed
//! to cover a category, and drives the next-page control. Committing the
//! page size carries a one-shot recovery policy: if the first attempt is
//! blocked by an overlapping banner, the banner is dismissed and the same
//! selection re-attempted exactly once.

use crate::browser::{AutomationError, Browser};
use crate::{PricewalkError, Result};
use scraper::{Html, Selector};

/// Selector for the page-size select control
pub const PAGE_SIZE_CONTROL: &str = "#pageSize";

/// Selector for the element stating the category's total item count
pub const TOTAL_COUNT_CONTROL: &str = "#resultsTotal";

/// Selector for the next-page control
pub const NEXT_PAGE_CONTROL: &str = "#productLister .next";

/// Reads the numeric options of the page-size control and returns the largest
///
/// Fails when the control is absent or offers no numeric options; pagination
/// sizing cannot be silently skipped for a category.
pub fn max_page_size(html: &str, category: &str) -> Result<u32> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("{} option", PAGE_SIZE_CONTROL)).map_err(|e| {
        PricewalkError::PageControl {
            category: category.to_string(),
            message: format!("invalid page-size selector: {}", e),
        }
    })?;

    document
        .select(&selector)
        .filter_map(|option| option.value().attr("value"))
        .filter_map(|value| value.trim().parse::<u32>().ok())
        .max()
        .ok_or_else(|| PricewalkError::PageControl {
            category: category.to_string(),
            message: format!("page-size control '{}' has no numeric options", PAGE_SIZE_CONTROL),
        })
}

/// Commits the largest available page size on the current page
///
/// Returns the committed page size. If the initial commit is blocked by an
/// overlapping element, the cookie banner is dismissed and the selection
/// retried once; a second failure is fatal for the category.
pub async fn select_max_page_size<B: Browser>(
    browser: &mut B,
    html: &str,
    category: &str,
) -> Result<u32> {
    let size = max_page_size(html, category)?;
    let value = size.to_string();

    match browser.select(PAGE_SIZE_CONTROL, &value).await {
        Ok(()) => Ok(size),
        Err(AutomationError::ClickIntercepted { .. }) => {
            tracing::debug!(
                "Page-size commit intercepted in '{}'; dismissing banner and retrying",
                category
            );
            browser.dismiss_cookie_banner().await?;
            browser
                .select(PAGE_SIZE_CONTROL, &value)
                .await
                .map_err(|e| PricewalkError::PageControl {
                    category: category.to_string(),
                    message: format!("page-size commit failed after banner dismissal: {}", e),
                })?;
            Ok(size)
        }
        Err(e) => Err(PricewalkError::PageControl {
            category: category.to_string(),
            message: format!("page-size commit failed: {}", e),
        }),
    }
}

/// Derives how many pages cover the category's stated total item count
///
/// Ceiling division of the total by the committed page size. A stated total
/// of zero is a valid empty category and yields zero iterations.
pub fn pages_to_visit(html: &str, page_size: u32, category: &str) -> Result<u32> {
    let total = total_item_count(html, category)?;
    if page_size == 0 {
        return Err(PricewalkError::PageControl {
            category: category.to_string(),
            message: "committed page size is zero".to_string(),
        });
    }
    Ok(((total + u64::from(page_size) - 1) / u64::from(page_size)) as u32)
}

/// Advances the session to the next page of results
///
/// Side effect only; the caller re-reads the rendered source before the next
/// extraction.
pub async fn advance<B: Browser>(browser: &mut B) -> std::result::Result<(), AutomationError> {
    browser.click(NEXT_PAGE_CONTROL).await
}

/// Reads the stated total item count from the rendered page
fn total_item_count(html: &str, category: &str) -> Result<u64> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(TOTAL_COUNT_CONTROL).map_err(|e| PricewalkError::PageControl {
            category: category.to_string(),
            message: format!("invalid total-count selector: {}", e),
        })?;

    let element =
        document
            .select(&selector)
            .next()
            .ok_or_else(|| PricewalkError::PageControl {
                category: category.to_string(),
                message: format!("total-count element '{}' not found", TOTAL_COUNT_CONTROL),
            })?;

    let text = element.text().collect::<String>();
    parse_leading_count(&text).ok_or_else(|| PricewalkError::PageControl {
        category: category.to_string(),
        message: format!("no item count in '{}'", text.trim()),
    })
}

/// Extracts the first contiguous digit run from text like "543 products"
fn parse_leading_count(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
