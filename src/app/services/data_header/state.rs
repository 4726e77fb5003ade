//! States of the data file header scanner

/// Value expected on the next header line, set by the keyword line before it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingCapture {
    #[default]
    None,
    /// Line after `Flying Scan` or `Start, Stop, Increment`
    MotorName,
    /// Line after `From File`
    PauseMotorName,
    /// Line after the pause motor; blank and placeholder lines keep it pending
    ScanFilePath,
    /// Line after a nonzero description length
    Memo,
}

/// Position within the numeric preamble of a time scan
///
/// Time scans have no scan type keyword. Their header opens with four
/// digit-leading lines whose meaning is given only by their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeScanStep {
    /// Memo length minus one
    MemoLength,
    /// Memo text, reached only when the length did not trigger a capture
    Memo,
    /// Sample count
    Samples,
    /// Acquisition row: period in the second field, count time in the fifth
    Acquire,
    Done,
}

impl TimeScanStep {
    pub fn next(self) -> Self {
        match self {
            TimeScanStep::MemoLength => TimeScanStep::Memo,
            TimeScanStep::Memo => TimeScanStep::Samples,
            TimeScanStep::Samples => TimeScanStep::Acquire,
            TimeScanStep::Acquire | TimeScanStep::Done => TimeScanStep::Done,
        }
    }

    /// Whether this step still claims digit-leading lines
    pub fn is_active(self) -> bool {
        self != TimeScanStep::Done
    }
}

/// What the scanner does after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    /// The line begins the data table
    Boundary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_scan_steps_in_order() {
        let mut step = TimeScanStep::MemoLength;
        let mut visited = vec![step];
        while step.is_active() {
            step = step.next();
            visited.push(step);
        }
        assert_eq!(
            visited,
            vec![
                TimeScanStep::MemoLength,
                TimeScanStep::Memo,
                TimeScanStep::Samples,
                TimeScanStep::Acquire,
                TimeScanStep::Done,
            ]
        );
        assert_eq!(TimeScanStep::Done.next(), TimeScanStep::Done);
    }
}
