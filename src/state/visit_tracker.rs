//! Visited/pending tracker derived from the category tree
//!
//! Flattening ignores branch nodes: every leaf gets an entry keyed by its
//! name, initialized to `Pending`. Iteration order is the tree's declared
//! order, so an interrupted run resumes over the remaining leaves in the
//! same relative order as a fresh run.

use crate::catalog::CategoryNode;
use crate::state::CategoryState;
use std::collections::HashMap;

/// A leaf category entry in the tracker
#[derive(Debug, Clone)]
struct LeafEntry {
    url: String,
    state: CategoryState,
}

/// Flat visited/pending map over the tree's leaf categories
#[derive(Debug, Clone)]
pub struct VisitTracker {
    /// Leaf names in first-seen tree order
    order: Vec<String>,
    entries: HashMap<String, LeafEntry>,
}

impl VisitTracker {
    /// Flattens a category tree into a tracker
    ///
    /// Leaf names are expected to be unique across the tree. A duplicate is
    /// a data-quality issue, not a fatal one: the later occurrence wins
    /// (replacing the URL and resetting the entry to `Pending`) while the
    /// name keeps its first-seen position in the visit order.
    pub fn from_tree(tree: &CategoryNode) -> Self {
        let mut order = Vec::new();
        let mut entries: HashMap<String, LeafEntry> = HashMap::new();

        tree.for_each_leaf(&mut |name, url| {
            if entries.contains_key(name) {
                tracing::warn!(
                    "Duplicate leaf category '{}' in tree; keeping the later occurrence",
                    name
                );
            } else {
                order.push(name.to_string());
            }
            entries.insert(
                name.to_string(),
                LeafEntry {
                    url: url.to_string(),
                    state: CategoryState::Pending,
                },
            );
        });

        Self { order, entries }
    }

    /// Returns `(name, url)` pairs for all pending leaves, in tree order
    pub fn pending(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|name| {
                let entry = self.entries.get(name)?;
                entry
                    .state
                    .is_pending()
                    .then(|| (name.clone(), entry.url.clone()))
            })
            .collect()
    }

    /// Returns the current state of a leaf, if it exists
    pub fn state_of(&self, name: &str) -> Option<CategoryState> {
        self.entries.get(name).map(|e| e.state)
    }

    /// Number of tracked leaf categories
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the tree flattened to zero leaves
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All leaf names in tree order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Leaf names currently in the given state, in tree order
    pub fn names_in_state(&self, state: CategoryState) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| self.state_of(name) == Some(state))
            .cloned()
            .collect()
    }

    pub fn mark_in_progress(&mut self, name: &str) {
        self.transition(name, CategoryState::InProgress);
    }

    pub fn mark_visited(&mut self, name: &str) {
        self.transition(name, CategoryState::Visited);
    }

    pub fn mark_failed(&mut self, name: &str) {
        self.transition(name, CategoryState::Failed);
    }

    /// Seeds a leaf as already visited from a persisted visited-set
    ///
    /// Names unknown to the current tree are ignored with a warning; they
    /// indicate drift between the snapshot and the persisted progress.
    pub fn mark_previously_visited(&mut self, name: &str) {
        match self.entries.get_mut(name) {
            Some(entry) => entry.state = CategoryState::Visited,
            None => tracing::warn!(
                "Persisted visited category '{}' is not in the current tree",
                name
            ),
        }
    }

    fn transition(&mut self, name: &str, to: CategoryState) {
        let Some(entry) = self.entries.get_mut(name) else {
            tracing::warn!("Attempted to mark unknown category '{}' as {}", name, to);
            return;
        };
        if !entry.state.can_transition_to(to) {
            // The coordinator is the only mutator; this indicates a bug
            tracing::warn!(
                "Unexpected transition for '{}': {} -> {}",
                name,
                entry.state,
                to
            );
        }
        entry.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> CategoryNode {
        CategoryNode::branch(
            "groceries",
            vec![
                CategoryNode::branch(
                    "Fruit",
                    vec![
                        CategoryNode::leaf("Apples", "https://example.com/apples"),
                        CategoryNode::leaf("Pears", "https://example.com/pears"),
                    ],
                ),
                CategoryNode::branch(
                    "Meat",
                    vec![CategoryNode::leaf("Beef", "https://example.com/beef")],
                ),
            ],
        )
    }

    #[test]
    fn test_flatten_one_entry_per_leaf_all_pending() {
        let tracker = VisitTracker::from_tree(&sample_tree());

        assert_eq!(tracker.len(), 3);
        for name in ["Apples", "Pears", "Beef"] {
            assert_eq!(tracker.state_of(name), Some(CategoryState::Pending));
        }
    }

    #[test]
    fn test_pending_order_matches_tree_order() {
        let tracker = VisitTracker::from_tree(&sample_tree());
        let names: Vec<String> = tracker.pending().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Apples", "Pears", "Beef"]);
    }

    #[test]
    fn test_deeply_nested_mixed_tree() {
        let tree = CategoryNode::branch(
            "root",
            vec![
                CategoryNode::leaf("A", "https://example.com/a"),
                CategoryNode::branch(
                    "mid",
                    vec![CategoryNode::branch(
                        "deep",
                        vec![CategoryNode::leaf("B", "https://example.com/b")],
                    )],
                ),
            ],
        );

        let tracker = VisitTracker::from_tree(&tree);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.state_of("B"), Some(CategoryState::Pending));
    }

    #[test]
    fn test_duplicate_leaf_last_write_wins() {
        let tree = CategoryNode::branch(
            "root",
            vec![
                CategoryNode::leaf("Apples", "https://example.com/first"),
                CategoryNode::leaf("Other", "https://example.com/other"),
                CategoryNode::leaf("Apples", "https://example.com/second"),
            ],
        );

        let tracker = VisitTracker::from_tree(&tree);

        // One entry, first-seen position, later URL
        assert_eq!(tracker.len(), 2);
        let pending = tracker.pending();
        assert_eq!(pending[0].0, "Apples");
        assert_eq!(pending[0].1, "https://example.com/second");
        assert_eq!(pending[1].0, "Other");
    }

    #[test]
    fn test_mark_visited_removes_from_pending() {
        let mut tracker = VisitTracker::from_tree(&sample_tree());

        tracker.mark_in_progress("Apples");
        tracker.mark_visited("Apples");

        assert_eq!(tracker.state_of("Apples"), Some(CategoryState::Visited));
        assert_eq!(tracker.state_of("Pears"), Some(CategoryState::Pending));
        assert_eq!(tracker.state_of("Beef"), Some(CategoryState::Pending));

        let names: Vec<String> = tracker.pending().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Pears", "Beef"]);
    }

    #[test]
    fn test_mark_failed_is_terminal_for_the_run() {
        let mut tracker = VisitTracker::from_tree(&sample_tree());

        tracker.mark_in_progress("Pears");
        tracker.mark_failed("Pears");

        assert_eq!(tracker.state_of("Pears"), Some(CategoryState::Failed));
        assert_eq!(
            tracker.names_in_state(CategoryState::Failed),
            vec!["Pears".to_string()]
        );
        assert!(!tracker.pending().iter().any(|(n, _)| n == "Pears"));
    }

    #[test]
    fn test_resume_seeding_preserves_relative_order() {
        let mut tracker = VisitTracker::from_tree(&sample_tree());

        tracker.mark_previously_visited("Apples");

        let names: Vec<String> = tracker.pending().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Pears", "Beef"]);
    }

    #[test]
    fn test_unknown_persisted_name_is_ignored() {
        let mut tracker = VisitTracker::from_tree(&sample_tree());
        tracker.mark_previously_visited("Dragonfruit");
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.pending().len(), 3);
    }
}
