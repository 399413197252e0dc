//! Structural parse errors
//!
//! A report that deviates from the expected grammar aborts the whole
//! parse: the first [`ParseError`] raised anywhere is captured at the top
//! level as `(status = Unknown, parse_error = message)` and no further
//! lines are processed. There is no warning-level parse error; a malformed
//! report means the upstream tool's output format may have changed, and a
//! partial interpretation would be misleading.

use crate::crab::model::JobState;
use std::fmt;

/// Any violation of the expected report grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A non-blank line matched none of the known prefixes.
    UnrecognizedLine { index: usize, line: String },
    /// The scheduler/worker value was not `"<scheduler> - <worker>"`.
    SchedulerWorker(String),
    /// Unknown member name for the server-side status.
    ServerStatus(String),
    /// Unknown member name for the scheduler-side status.
    SchedulerStatus(String),
    /// A job-status row did not match `<state> <pct>% (<count>/<total>)`.
    JobStatusRow(String),
    /// A job-status row named a state outside the known set.
    JobState(String),
    /// The same state appeared twice within one parse.
    DuplicateJobState(JobState),
    /// A job count or total failed to parse as a non-negative integer.
    JobCount(String),
    /// A job-status block declared a total different from an earlier one.
    InconsistentTotals { expected: u32, found: u32 },
    /// An error-summary row matched neither known row form.
    ErrorSummaryRow(String),
    /// Input ended before the error-summary footer line.
    UnterminatedErrorSummary,
    /// Fewer than four lines followed the run-summary trigger.
    TruncatedRunSummary,
    /// A run-summary line did not match its fixed pattern.
    RunStat { metric: &'static str, line: String },
    /// The bootstrap sentinel was not followed by its confirmation line.
    Bootstrap,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnrecognizedLine { index, line } => {
                write!(f, "Unknown log line {} = \"{}\".", index, line)
            }
            ParseError::SchedulerWorker(value) => {
                write!(f, "Invalid Grid scheduler - Task Worker = \"{}\"", value)
            }
            ParseError::ServerStatus(value) => {
                write!(f, "Unknown status on the CRAB server = \"{}\"", value)
            }
            ParseError::SchedulerStatus(value) => {
                write!(f, "Unknown status on the scheduler = \"{}\"", value)
            }
            ParseError::JobStatusRow(row) => {
                write!(f, "can not extract job status from \"{}\"", row)
            }
            ParseError::JobState(name) => write!(f, "Unknown job status = {}", name),
            ParseError::DuplicateJobState(state) => {
                write!(f, "Duplicated job status information for {}", state)
            }
            ParseError::JobCount(row) => {
                write!(f, "Number of jobs is not an integer. \"{}\"", row)
            }
            ParseError::InconsistentTotals { expected, found } => write!(
                f,
                "Inconsistent total number of jobs: {} declared earlier, {} found",
                expected, found
            ),
            ParseError::ErrorSummaryRow(row) => {
                write!(f, "Unknown job summary string = \"{}\"", row)
            }
            ParseError::UnterminatedErrorSummary => {
                write!(f, "Unable to find the end of the error summary")
            }
            ParseError::TruncatedRunSummary => write!(f, "Incomplete summary of run jobs"),
            ParseError::RunStat { metric, line } => {
                write!(f, "Invalid {} stat = \"{}\"", metric, line)
            }
            ParseError::Bootstrap => write!(f, "Unexpected bootstrap message"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for String {
    fn from(err: ParseError) -> Self {
        err.to_string()
    }
}
