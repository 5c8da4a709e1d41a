//! Category tree snapshot persistence
//!
//! The snapshot is a JSON serialization of the [`CategoryNode`] tree. It is
//! read at startup if present and written once after live discovery, so a
//! subsequent run skips discovery entirely. A loaded snapshot is returned
//! verbatim; freshness is not re-validated.

use crate::catalog::CategoryNode;
use crate::{PricewalkError, Result};
use std::path::Path;

/// Reads a tree snapshot from disk
pub fn read_snapshot(path: &Path) -> Result<CategoryNode> {
    let content = std::fs::read_to_string(path)?;
    let tree = serde_json::from_str(&content)?;
    Ok(tree)
}

/// Writes the discovered tree to disk as the snapshot for future runs
pub fn write_snapshot(path: &Path, tree: &CategoryNode) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(tree)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Reads a snapshot, mapping a malformed file to a discovery error
pub fn read_snapshot_strict(path: &Path) -> Result<CategoryNode> {
    read_snapshot(path).map_err(|e| PricewalkError::Discovery {
        message: format!("snapshot at {} could not be loaded: {}", path.display(), e),
    })
}
