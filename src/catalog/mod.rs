//! Catalog module: the category tree and its persistence
//!
//! The tree is loaded from a snapshot when one exists, otherwise discovered
//! live from the site's navigation menu and persisted for future runs.

pub mod discovery;
mod snapshot;
mod tree;

pub use discovery::{build_tree_from_nav, discover_tree};
pub use snapshot::{read_snapshot, write_snapshot};
pub use tree::CategoryNode;

use crate::browser::Browser;
use crate::config::Config;
use crate::Result;
use std::path::Path;

/// Loads the category tree snapshot if present, else discovers and persists it
///
/// A previously saved snapshot is deserialized and returned verbatim. When no
/// snapshot exists, the discovery collaborator builds the tree from the live
/// site and the result is written out so the next run can skip discovery.
pub async fn load_or_build_tree<B: Browser>(
    browser: &mut B,
    config: &Config,
) -> Result<CategoryNode> {
    let snapshot_path = Path::new(&config.output.snapshot_path);

    if snapshot_path.exists() {
        tracing::info!("Loading category tree snapshot from {}", snapshot_path.display());
        return snapshot::read_snapshot_strict(snapshot_path);
    }

    let tree = discover_tree(browser, &config.site).await?;
    snapshot::write_snapshot(snapshot_path, &tree)?;
    tracing::info!(
        "Persisted category tree snapshot to {}",
        snapshot_path.display()
    );
    Ok(tree)
}
