//! CRAB status-report parsing.
//!
//! Layout mirrors the single pass over the report:
//! - `parsing` — the line dispatcher and per-block extractors
//! - `model` — the status record the extractors populate
//! - `warning` — classification of accumulated warning text
//! - `error` — the structural-error type that aborts a parse

pub mod error;
pub mod model;
pub mod parsing;
mod values;
pub mod warning;

pub use error::ParseError;
pub use model::{
    ExitCode, JobState, ResourceSpread, RunSummary, Status, StatusOnScheduler, StatusOnServer,
    TaskStatus, WasteStat,
};
pub use parsing::{parse_lines, parse_report};
pub use warning::{Warning, WarningCategory};
