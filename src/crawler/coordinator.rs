//! Crawl coordinator - main orchestration logic
//!
//! Drives the per-category state machine: for each pending leaf in tree
//! order, navigate to its listing page, commit the maximum page size,
//! determine the page count, then extract and append each page's records.
//! A category is marked visited only after its pagination loop completes,
//! so an interrupted category is re-attempted on the next run.
//!
//! Page-control and automation errors demote the current category to
//! `Failed` and the crawl proceeds; discovery and persistence errors abort
//! the run.

use crate::browser::{AutomationError, Browser};
use crate::catalog;
use crate::config::Config;
use crate::crawler::{extract, pagination};
use crate::state::VisitTracker;
use crate::storage::{PriceStore, RunStatus, SqliteStore};
use crate::{PricewalkError, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// User-visible outcome of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub run_id: i64,
    /// Categories visited during this run (excludes resumed ones)
    pub visited: Vec<String>,
    /// Categories that failed and will be re-attempted next run
    pub failed: Vec<String>,
    pub records_written: u64,
    pub interrupted: bool,
}

/// Main crawl coordinator
pub struct Coordinator<B: Browser> {
    config: Config,
    browser: B,
    store: SqliteStore,
    tracker: VisitTracker,
    run_id: i64,
    cancel: Arc<AtomicBool>,
}

impl<B: Browser> Coordinator<B> {
    /// Creates a new coordinator
    ///
    /// Opens the dataset, loads or discovers the category tree, seeds the
    /// visit tracker from the persisted visited-set unless `fresh` is set
    /// (which clears it instead), and only then starts a run, so a failed
    /// setup never leaves a run record stuck open. On failure the browser
    /// session is handed back so the caller can shut it down.
    pub async fn new(
        config: Config,
        config_hash: &str,
        mut browser: B,
        fresh: bool,
    ) -> std::result::Result<Self, (B, PricewalkError)> {
        let mut store = match SqliteStore::new(Path::new(&config.output.database_path)) {
            Ok(store) => store,
            Err(e) => return Err((browser, e.into())),
        };

        let tree = match catalog::load_or_build_tree(&mut browser, &config).await {
            Ok(tree) => tree,
            Err(e) => return Err((browser, e)),
        };
        let mut tracker = VisitTracker::from_tree(&tree);
        tracing::info!("Tracking {} leaf categories", tracker.len());

        if fresh {
            tracing::info!("Fresh crawl requested; clearing persisted visited-set");
            if let Err(e) = store.clear_visited() {
                return Err((browser, e.into()));
            }
        } else {
            let visited = match store.load_visited() {
                Ok(visited) => visited,
                Err(e) => return Err((browser, e.into())),
            };
            if !visited.is_empty() {
                tracing::info!("Resuming: {} categories already visited", visited.len());
            }
            for name in visited {
                tracker.mark_previously_visited(&name);
            }
        }

        let run_id = match store.create_run(config_hash) {
            Ok(run_id) => run_id,
            Err(e) => return Err((browser, e.into())),
        };

        Ok(Self {
            config,
            browser,
            store,
            tracker,
            run_id,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the shared cancellation flag
    ///
    /// Setting it requests a clean stop after the current category.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Runs the crawl over all pending categories
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        tracing::info!("Starting crawl run {}", self.run_id);

        // One session-level banner dismissal before any category work
        if let Err(e) = self.prepare_session().await {
            self.close_failed(0, 0, 0);
            return Err(e.into());
        }

        let mut visited = Vec::new();
        let mut failed = Vec::new();
        let mut records_written = 0u64;
        let mut interrupted = false;

        for (name, url) in self.tracker.pending() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::info!("Stop requested; leaving remaining categories pending");
                interrupted = true;
                break;
            }

            self.tracker.mark_in_progress(&name);
            match self.crawl_category(&name, &url).await {
                Ok(count) => {
                    self.tracker.mark_visited(&name);
                    self.store.mark_visited(&name)?;
                    records_written += count;
                    visited.push(name.clone());
                    tracing::info!("Category '{}' visited: {} records", name, count);
                }
                Err(e) if is_category_error(&e) => {
                    tracing::warn!("Category '{}' failed: {}", name, e);
                    self.tracker.mark_failed(&name);
                    failed.push(name.clone());
                }
                Err(e) => {
                    // Run-fatal; record the aborted run before propagating
                    self.close_failed(
                        visited.len() as u64,
                        failed.len() as u64,
                        records_written,
                    );
                    return Err(e);
                }
            }
        }

        let status = if interrupted {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };
        self.store.finish_run(
            self.run_id,
            status,
            visited.len() as u64,
            failed.len() as u64,
            records_written,
        )?;

        tracing::info!(
            "Crawl run {} finished: {} visited, {} failed, {} records",
            self.run_id,
            visited.len(),
            failed.len(),
            records_written
        );

        Ok(CrawlSummary {
            run_id: self.run_id,
            visited,
            failed,
            records_written,
            interrupted,
        })
    }

    /// Crawls one leaf category, returning the number of records appended
    async fn crawl_category(&mut self, name: &str, url: &str) -> Result<u64> {
        self.browser.open(url).await?;
        self.settle().await;

        let html = self.browser.page_source().await?;
        let page_size = pagination::select_max_page_size(&mut self.browser, &html, name).await?;

        // The page-size commit re-renders the listing
        let mut html = self.browser.page_source().await?;
        let pages = pagination::pages_to_visit(&html, page_size, name)?;
        tracing::debug!(
            "Category '{}': {} pages at {} items per page",
            name,
            pages,
            page_size
        );

        let mut written = 0u64;
        for page_index in 0..pages {
            if page_index > 0 {
                pagination::advance(&mut self.browser).await?;
                self.settle().await;
                html = self.browser.page_source().await?;
            }

            let batch = extract::extract(&html, Some(name)).map_err(|e| {
                PricewalkError::PageControl {
                    category: name.to_string(),
                    message: e.to_string(),
                }
            })?;

            for failure in &batch.failures {
                tracing::warn!(
                    "Extraction failure in '{}' page {}: {}",
                    name,
                    page_index + 1,
                    failure
                );
            }

            written += self.store.append_batch(&batch)?;
        }

        Ok(written)
    }

    /// Consumes the coordinator and returns the browser session for shutdown
    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Opens the home page and dismisses the cookie banner once per session
    async fn prepare_session(&mut self) -> std::result::Result<(), AutomationError> {
        self.browser.open(&self.config.site.home_url).await?;
        self.settle().await;
        self.browser.dismiss_cookie_banner().await
    }

    /// Closes the run record as failed before a run-fatal error propagates
    fn close_failed(&mut self, visited: u64, failed: u64, records_written: u64) {
        if let Err(e) = self.store.finish_run(
            self.run_id,
            RunStatus::Failed,
            visited,
            failed,
            records_written,
        ) {
            tracing::warn!("Failed to record aborted run {}: {}", self.run_id, e);
        }
    }

    async fn settle(&self) {
        let ms = self.config.browser.page_settle_ms;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

/// True for errors that demote the current category rather than abort the run
fn is_category_error(error: &PricewalkError) -> bool {
    matches!(
        error,
        PricewalkError::PageControl { .. } | PricewalkError::Automation(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_error_classification() {
        let page_control = PricewalkError::PageControl {
            category: "Apples".to_string(),
            message: "no page-size control".to_string(),
        };
        assert!(is_category_error(&page_control));

        let automation = PricewalkError::Automation(AutomationError::ElementNotFound {
            selector: "#productLister .next".to_string(),
        });
        assert!(is_category_error(&automation));

        let persistence = PricewalkError::Persistence(StorageError::SchemaMismatch {
            expected: "a".to_string(),
            found: "b".to_string(),
        });
        assert!(!is_category_error(&persistence));

        let discovery = PricewalkError::Discovery {
            message: "nav menu absent".to_string(),
        };
        assert!(!is_category_error(&discovery));
    }
}
