//! Crawler module - orchestration, pagination, and record extraction
//!
//! The coordinator walks the category tree leaf by leaf; `pagination`
//! drives the listing controls and `extract` turns rendered pages into
//! price records.

mod coordinator;
pub mod extract;
pub mod pagination;

pub use coordinator::{Coordinator, CrawlSummary};
pub use extract::{ExtractError, ItemRecord, PageBatch};

use crate::browser::WebDriverSession;
use crate::config::Config;
use crate::Result;
use std::sync::atomic::Ordering;

/// Runs a full crawl against the configured site
///
/// Connects a browser-automation session, builds the coordinator, wires
/// Ctrl-C to a clean stop after the current category, and returns the run
/// summary. The session is shut down on both success and failure.
pub async fn crawl(config: Config, config_hash: &str, fresh: bool) -> Result<CrawlSummary> {
    let session = WebDriverSession::connect(&config.browser.webdriver_url).await?;

    let mut coordinator = match Coordinator::new(config, config_hash, session, fresh).await {
        Ok(coordinator) => coordinator,
        Err((session, e)) => {
            if let Err(quit_err) = session.quit().await {
                tracing::warn!("Failed to close automation session cleanly: {}", quit_err);
            }
            return Err(e);
        }
    };

    let cancel = coordinator.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Stop requested; finishing current category before exit");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let outcome = coordinator.run().await;

    let session = coordinator.into_browser();
    if let Err(e) = session.quit().await {
        tracing::warn!("Failed to close automation session cleanly: {}", e);
    }

    outcome
}
