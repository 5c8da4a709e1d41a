//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CategoryState`: the per-category lifecycle (pending, in progress, visited, failed)
//! - `VisitTracker`: the flat visited/pending map flattened from the category tree

mod category_state;
mod visit_tracker;

// Re-export main types
pub use category_state::CategoryState;
pub use visit_tracker::VisitTracker;
