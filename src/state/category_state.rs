/// Category state definitions for tracking crawl progress
///
/// Each leaf category moves through these states during a run. `Visited` is
/// only set after a category's pagination loop completes, so a crash mid
/// category leaves it retryable on the next run. `Failed` categories are
/// never retried within the same run.
use std::fmt;

/// Represents the current state of a leaf category in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryState {
    /// Not yet attempted in this run
    Pending,

    /// Currently being paginated and extracted
    InProgress,

    /// All pages extracted and appended
    Visited,

    /// Unrecoverable page-control or navigation error; skipped this run
    Failed,
}

impl CategoryState {
    /// Returns true if this is a terminal state for the current run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// Returns true if the category should still be attempted
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the transition to `next` follows the category
    /// lifecycle (`Pending -> InProgress -> Visited | Failed`)
    pub fn can_transition_to(&self, next: CategoryState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Visited)
                | (Self::InProgress, Self::Failed)
        )
    }
}

impl fmt::Display for CategoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Visited => "visited",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!CategoryState::Pending.is_terminal());
        assert!(!CategoryState::InProgress.is_terminal());
        assert!(CategoryState::Visited.is_terminal());
        assert!(CategoryState::Failed.is_terminal());
    }

    #[test]
    fn test_is_success() {
        assert!(CategoryState::Visited.is_success());
        assert!(!CategoryState::Failed.is_success());
        assert!(!CategoryState::Pending.is_success());
    }

    #[test]
    fn test_lifecycle_transitions() {
        assert!(CategoryState::Pending.can_transition_to(CategoryState::InProgress));
        assert!(CategoryState::InProgress.can_transition_to(CategoryState::Visited));
        assert!(CategoryState::InProgress.can_transition_to(CategoryState::Failed));

        // No retries within a run, no skipping InProgress
        assert!(!CategoryState::Pending.can_transition_to(CategoryState::Visited));
        assert!(!CategoryState::Failed.can_transition_to(CategoryState::InProgress));
        assert!(!CategoryState::Visited.can_transition_to(CategoryState::InProgress));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CategoryState::Pending), "pending");
        assert_eq!(format!("{}", CategoryState::InProgress), "in_progress");
        assert_eq!(format!("{}", CategoryState::Visited), "visited");
        assert_eq!(format!("{}", CategoryState::Failed), "failed");
    }
}
