//! Batch statistics and exit status

use crate::process::Outcome;

/// Every photo matched (or there was nothing to do)
pub const EXIT_SUCCESS: i32 = 0;
/// A write failed, or the run could not start
pub const EXIT_FAILURE: i32 = 1;
/// Some photos were left untagged for benign reasons
pub const EXIT_WARNING: i32 = 2;

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub exact: usize,
    pub interpolated: usize,
    pub rounded: usize,
    pub unmatched: usize,
    pub too_far: usize,
    pub no_date: usize,
    pub already_tagged: usize,
    pub write_failed: usize,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Exact => &mut self.exact,
            Outcome::Interpolated => &mut self.interpolated,
            Outcome::Rounded => &mut self.rounded,
            Outcome::Unmatched => &mut self.unmatched,
            Outcome::TooFar => &mut self.too_far,
            Outcome::NoInputTimestamp => &mut self.no_date,
            Outcome::AlreadyTagged => &mut self.already_tagged,
            Outcome::WriteFailed => &mut self.write_failed,
        };
        *counter += 1;
    }

    pub fn matched(&self) -> usize {
        self.exact + self.interpolated + self.rounded
    }

    pub fn failed(&self) -> usize {
        self.unmatched + self.too_far + self.no_date + self.already_tagged + self.write_failed
    }

    pub fn total(&self) -> usize {
        self.matched() + self.failed()
    }

    /// Process exit code for this batch
    pub fn exit_code(&self) -> i32 {
        if self.write_failed > 0 {
            EXIT_FAILURE
        } else if self.failed() > 0 {
            EXIT_WARNING
        } else {
            EXIT_SUCCESS
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Matched: {} ({} Exact, {} Interpolated, {} Rounded). \
             Failed: {} ({} Not matched, {} Write failure, {} Too far, {} No date, {} GPS already present)",
            self.matched(),
            self.exact,
            self.interpolated,
            self.rounded,
            self.failed(),
            self.unmatched,
            self.write_failed,
            self.too_far,
            self.no_date,
            self.already_tagged
        )
    }
}

impl Extend<Outcome> for BatchSummary {
    fn extend<I: IntoIterator<Item = Outcome>>(&mut self, outcomes: I) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_summary() {
        let mut summary = BatchSummary::new();
        summary.extend([
            Outcome::Exact,
            Outcome::Interpolated,
            Outcome::Interpolated,
            Outcome::Rounded,
            Outcome::TooFar,
            Outcome::AlreadyTagged,
        ]);

        assert_eq!(summary.matched(), 4);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.total(), 6);

        let text = summary.summary();
        assert!(text.contains("Matched: 4 (1 Exact, 2 Interpolated, 1 Rounded)"));
        assert!(text.contains("1 Too far"));
    }

    #[test]
    fn test_exit_codes() {
        let mut summary = BatchSummary::new();
        assert_eq!(summary.exit_code(), EXIT_SUCCESS);

        summary.record(Outcome::Exact);
        assert_eq!(summary.exit_code(), EXIT_SUCCESS);

        summary.record(Outcome::NoInputTimestamp);
        assert_eq!(summary.exit_code(), EXIT_WARNING);

        summary.record(Outcome::WriteFailed);
        assert_eq!(summary.exit_code(), EXIT_FAILURE);
    }
}
