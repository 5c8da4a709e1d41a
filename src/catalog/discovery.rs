//! Live category discovery from the catalog's navigation menu
//!
//! When no snapshot exists, the tree is built from the home page's mega-nav.
//! Each nav entry contributes a leaf named after its first meaningful text,
//! pointing at its resolved listing URL. Entries whose href does not resolve
//! under the catalog host are ignored (favourites, discover pages, external
//! promotions and the like).

use crate::browser::Browser;
use crate::catalog::CategoryNode;
use crate::config::SiteConfig;
use crate::{PricewalkError, Result};
use scraper::{Html, Selector};
use url::Url;

/// Selector for the navigation menu entries on the catalog home page
pub const NAV_MENU_ITEM: &str = ".megaNavListItem";

/// Discovers the category tree from the live site
///
/// Opens the home page through the automation session, dismisses the cookie
/// banner, and parses the navigation menu into a [`CategoryNode`] tree.
pub async fn discover_tree<B: Browser>(browser: &mut B, site: &SiteConfig) -> Result<CategoryNode> {
    tracing::info!("Discovering category tree from {}", site.home_url);
    browser.open(&site.home_url).await?;
    browser.dismiss_cookie_banner().await?;
    let html = browser.page_source().await?;
    build_tree_from_nav(&html, &site.home_url)
}

/// Builds a category tree from rendered home page HTML
///
/// Fails with a discovery error when the expected navigation container is
/// absent, since a tree of zero categories means the page structure has
/// drifted from the assumed template.
pub fn build_tree_from_nav(html: &str, home_url: &str) -> Result<CategoryNode> {
    let home = Url::parse(home_url)?;
    let document = Html::parse_document(html);

    let item_selector = Selector::parse(NAV_MENU_ITEM)
        .map_err(|e| PricewalkError::Discovery {
            message: format!("invalid nav selector: {}", e),
        })?;
    let anchor_selector = Selector::parse("a[href]").map_err(|e| PricewalkError::Discovery {
        message: format!("invalid anchor selector: {}", e),
    })?;

    let mut children = Vec::new();
    for item in document.select(&item_selector) {
        let Some(anchor) = item.select(&anchor_selector).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(name) = first_meaningful_text(&anchor) else {
            continue;
        };
        let Ok(resolved) = home.join(href.trim()) else {
            continue;
        };
        // Only entries under the catalog host are categories
        if resolved.host_str() != home.host_str() {
            continue;
        }
        children.push(CategoryNode::leaf(name, resolved.to_string()));
    }

    if children.is_empty() {
        return Err(PricewalkError::Discovery {
            message: format!(
                "no '{}' entries found in the navigation menu of {}",
                NAV_MENU_ITEM, home_url
            ),
        });
    }

    let root_name = home
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("catalog")
        .to_string();

    tracing::info!("Discovered {} categories", children.len());
    Ok(CategoryNode::branch(root_name, children))
}

/// Returns the first non-empty trimmed text fragment inside an element
fn first_meaningful_text(element: &scraper::ElementRef<'_>) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME_URL: &str = "https://groceries.example.com/shop/groceries";

    #[test]
    fn test_build_tree_from_nav() {
        let html = r#"
            <html><body>
            <div class="megaNavListItem"><a href="/shop/fruit">Fruit</a></div>
            <div class="megaNavListItem"><a href="/shop/meat">
                Meat
            </a></div>
            </body></html>
        "#;

        let tree = build_tree_from_nav(html, HOME_URL).unwrap();
        assert_eq!(tree.name(), "groceries");
        assert_eq!(tree.leaf_count(), 2);

        let mut leaves = Vec::new();
        tree.for_each_leaf(&mut |name, url| leaves.push((name.to_string(), url.to_string())));
        assert_eq!(leaves[0].0, "Fruit");
        assert_eq!(leaves[0].1, "https://groceries.example.com/shop/fruit");
        assert_eq!(leaves[1].0, "Meat");
    }

    #[test]
    fn test_offsite_entries_are_skipped() {
        let html = r#"
            <html><body>
            <div class="megaNavListItem"><a href="/shop/fruit">Fruit</a></div>
            <div class="megaNavListItem"><a href="https://ads.example.net/promo">Promo</a></div>
            </body></html>
        "#;

        let tree = build_tree_from_nav(html, HOME_URL).unwrap();
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_entries_without_href_are_skipped() {
        let html = r#"
            <html><body>
            <div class="megaNavListItem"><span>Not a link</span></div>
            <div class="megaNavListItem"><a href="/shop/fruit">Fruit</a></div>
            </body></html>
        "#;

        let tree = build_tree_from_nav(html, HOME_URL).unwrap();
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_missing_nav_container_is_discovery_error() {
        let html = r#"<html><body><div id="page">no nav here</div></body></html>"#;
        let err = build_tree_from_nav(html, HOME_URL).unwrap_err();
        assert!(matches!(err, PricewalkError::Discovery { .. }));
    }
}
