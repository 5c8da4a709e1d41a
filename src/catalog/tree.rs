//! Category tree model
//!
//! The catalog hierarchy is a tagged variant: a node is either a leaf (a
//! terminal category with a browsable listing page) or a branch with an
//! ordered sequence of child nodes. The tree is built once per crawl and
//! treated as read-only for the remainder of the run.

use serde::{Deserialize, Serialize};

/// A node in the catalog hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CategoryNode {
    /// A terminal category with its listing page URL
    Leaf { name: String, url: String },

    /// A named grouping of further nodes, in declared order
    Branch {
        name: String,
        children: Vec<CategoryNode>,
    },
}

impl CategoryNode {
    /// Creates a leaf node
    pub fn leaf(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Leaf {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Creates a branch node
    pub fn branch(name: impl Into<String>, children: Vec<CategoryNode>) -> Self {
        Self::Branch {
            name: name.into(),
            children,
        }
    }

    /// Returns the node's display name
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf { name, .. } => name,
            Self::Branch { name, .. } => name,
        }
    }

    /// Visits every leaf in declared order, depth first
    ///
    /// The visit order is stable and deterministic: re-running over the same
    /// tree always yields leaves in the same relative order.
    pub fn for_each_leaf<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a str, &'a str),
    {
        match self {
            Self::Leaf { name, url } => f(name, url),
            Self::Branch { children, .. } => {
                for child in children {
                    child.for_each_leaf(f);
                }
            }
        }
    }

    /// Counts the leaves in the tree (including any duplicate names)
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.for_each_leaf(&mut |_, _| count += 1);
        count
    }
}
