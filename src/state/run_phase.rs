/// Run phase definitions for tracking a crawl run
///
/// This module defines the phases a single crawl run moves through and which
/// transitions between them are legal.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Fetcher acquired, nothing started yet
    Idle,

    /// Walking listing pages and collecting article links
    Discovering,

    /// Fetching and parsing individual articles
    Extracting,

    /// Merging extracted records into the persisted dataset
    Merging,

    /// Releasing the fetcher; reachable from every other phase
    Finalizing,

    /// Run finished and fetcher released
    Done,
}

impl RunPhase {
    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// The happy path is `Idle -> Discovering -> Extracting -> Merging ->
    /// Finalizing -> Done`. Discovery may jump straight to merging when no
    /// links were found, and any unfinished phase may enter `Finalizing`.
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Idle, Discovering)
                | (Discovering, Extracting)
                | (Discovering, Merging)
                | (Extracting, Merging)
                | (Idle | Discovering | Extracting | Merging, Finalizing)
                | (Finalizing, Done)
        )
    }

    /// Returns true once the run can make no further progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Extracting => "extracting",
            Self::Merging => "merging",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let path = [
            RunPhase::Idle,
            RunPhase::Discovering,
            RunPhase::Extracting,
            RunPhase::Merging,
            RunPhase::Finalizing,
            RunPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_zero_links_skips_extraction() {
        assert!(RunPhase::Discovering.can_transition_to(RunPhase::Merging));
    }

    #[test]
    fn test_finalizing_reachable_from_any_active_phase() {
        for phase in [
            RunPhase::Idle,
            RunPhase::Discovering,
            RunPhase::Extracting,
            RunPhase::Merging,
        ] {
            assert!(phase.can_transition_to(RunPhase::Finalizing));
        }
    }

    #[test]
    fn test_no_backwards_or_resume() {
        assert!(!RunPhase::Extracting.can_transition_to(RunPhase::Discovering));
        assert!(!RunPhase::Merging.can_transition_to(RunPhase::Extracting));
        assert!(!RunPhase::Done.can_transition_to(RunPhase::Idle));
        assert!(!RunPhase::Done.can_transition_to(RunPhase::Finalizing));
        assert!(!RunPhase::Idle.can_transition_to(RunPhase::Done));
    }

    #[test]
    fn test_is_terminal() {
        assert!(RunPhase::Done.is_terminal());
        assert!(!RunPhase::Finalizing.is_terminal());
        assert!(!RunPhase::Idle.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RunPhase::Discovering), "discovering");
        assert_eq!(format!("{}", RunPhase::Done), "done");
    }
}
