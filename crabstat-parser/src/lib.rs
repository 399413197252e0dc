//! # crabstat-parser
//!
//! Parser library for the textual status reports printed by the CRAB
//! batch-job submission tool.
//!
//! The report is a sequence of lines mixing single-line key/value fields,
//! multi-line blocks (job-status tables, error summaries, run statistics,
//! wrapped warning text) and sentinel lines marking state transitions.
//! [`crab::parsing::parse_report`] walks those lines once, top to bottom,
//! and produces a [`crab::model::TaskStatus`] record; any deviation from
//! the expected grammar aborts the parse and is captured on the record as
//! a single diagnosable error instead of a panic.
//!
//! The library performs no I/O. Callers supply the raw lines and decide
//! how to display the result.

pub mod crab;
