pub mod clone;
pub mod download;

/// Terminal state of one repository fetch. No automatic retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Done,
    Skipped,
    Failed,
}

#[derive(Debug, Default)]
pub struct FetchSummary {
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FetchSummary {
    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Done => self.done += 1,
            FetchOutcome::Skipped => self.skipped += 1,
            FetchOutcome::Failed => self.failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = FetchSummary::default();
        summary.record(FetchOutcome::Done);
        summary.record(FetchOutcome::Done);
        summary.record(FetchOutcome::Skipped);
        summary.record(FetchOutcome::Failed);
        assert_eq!((summary.done, summary.skipped, summary.failed), (2, 1, 1));
    }
}
