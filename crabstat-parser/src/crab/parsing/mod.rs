//! Line dispatcher for CRAB status reports
//!
//! The report grammar is data, not code: an ordered table maps literal
//! line prefixes to handlers, scanned top to bottom so the first matching
//! entry governs. A handler either stores the rest of the line into a
//! field of the record, recognizes the line without keeping anything, or
//! hands over to a block extractor that consumes a variable number of
//! lines and returns the next unconsumed index.
//!
//! Structural failures short-circuit as `Result` values; the public entry
//! points convert the first failure into the terminal
//! `(status = Unknown, parse_error = message)` state on the record.

use crate::crab::error::ParseError;
use crate::crab::model::{Status, StatusOnServer, TaskStatus};

mod extractors;

/// How a matched line is consumed.
enum LineHandler {
    /// Store the trimmed remainder of the line into a field, verbatim.
    Assign(fn(&mut TaskStatus) -> &mut Option<String>),
    /// Recognized, but carries no information.
    Ignore,
    /// Multi-line block; returns the next unconsumed line index.
    Extract(Extractor),
}

type Extractor = fn(&mut TaskStatus, &[&str], usize, &str) -> Result<usize, ParseError>;

/// Ordered prefix table. The order is part of the report contract and
/// must not be reshuffled.
const PARSER_TABLE: &[(&str, LineHandler)] = &[
    (
        "CRAB project directory:",
        LineHandler::Assign(|record| &mut record.project_dir),
    ),
    ("Task name:", LineHandler::Assign(|record| &mut record.task_name)),
    (
        "Grid scheduler - Task Worker:",
        LineHandler::Extract(extractors::scheduler_worker),
    ),
    (
        "Status on the CRAB server:",
        LineHandler::Extract(extractors::status_on_server),
    ),
    (
        "Task URL to use for HELP:",
        LineHandler::Assign(|record| &mut record.help_url),
    ),
    (
        "Dashboard monitoring URL:",
        LineHandler::Assign(|record| &mut record.dashboard_url),
    ),
    (
        "Status on the scheduler:",
        LineHandler::Extract(extractors::status_on_scheduler),
    ),
    ("Warning:", LineHandler::Extract(extractors::warning)),
    ("Jobs status:", LineHandler::Extract(extractors::job_status_table)),
    ("No publication information", LineHandler::Ignore),
    ("Error Summary:", LineHandler::Extract(extractors::error_summary)),
    ("Log file is", LineHandler::Assign(|record| &mut record.log_file)),
    (
        "Summary of run jobs:",
        LineHandler::Extract(extractors::run_summary),
    ),
    (
        "Task bootstrapped",
        LineHandler::Extract(extractors::task_bootstrapped),
    ),
];

/// Parse a whole report, splitting it into lines first. Trailing newlines
/// are not significant.
pub fn parse_report(source: &str) -> TaskStatus {
    let lines: Vec<&str> = source.lines().collect();
    parse_lines(&lines)
}

/// Parse an ordered sequence of raw report lines into a status record.
///
/// Never fails: a structural violation is captured on the returned record
/// as `status = Unknown` plus `parse_error`, and the remaining lines are
/// left unprocessed.
pub fn parse_lines(lines: &[&str]) -> TaskStatus {
    let mut record = TaskStatus::default();
    match consume_lines(&mut record, lines) {
        Ok(()) => {
            // Runs once, after the loop: a "submitted on the server" line
            // outranks an earlier bootstrap sentinel regardless of where
            // the two appeared.
            if record.status_on_server == Some(StatusOnServer::Submitted) {
                record.status = Status::InProgress;
            }
        }
        Err(error) => {
            record.status = Status::Unknown;
            record.parse_error = Some(error.to_string());
        }
    }
    record
}

fn consume_lines(record: &mut TaskStatus, lines: &[&str]) -> Result<(), ParseError> {
    let mut n = 0;
    while n < lines.len() {
        let trimmed = lines[n].trim();
        if trimmed.is_empty() {
            n += 1;
            continue;
        }
        let entry = PARSER_TABLE
            .iter()
            .find(|(prefix, _)| trimmed.starts_with(prefix));
        let (prefix, handler) = match entry {
            Some((prefix, handler)) => (*prefix, handler),
            None => {
                return Err(ParseError::UnrecognizedLine {
                    index: n,
                    line: lines[n].to_string(),
                })
            }
        };
        let value = trimmed[prefix.len()..].trim();
        n = match handler {
            LineHandler::Assign(field) => {
                *field(record) = Some(value.to_string());
                n + 1
            }
            LineHandler::Ignore => n + 1,
            LineHandler::Extract(extract) => extract(record, lines, n, value)?,
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_simple_fields_verbatim() {
        let record = parse_lines(&[
            "CRAB project directory:  /work/crab_projects/crab_demo",
            "Task name:  260203_141523:user_crab_demo",
        ]);
        assert_eq!(record.project_dir.as_deref(), Some("/work/crab_projects/crab_demo"));
        assert_eq!(record.task_name.as_deref(), Some("260203_141523:user_crab_demo"));
        assert!(record.parse_error.is_none());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let record = parse_lines(&["", "   ", "\t", "Task name: t"]);
        assert_eq!(record.task_name.as_deref(), Some("t"));
    }

    #[test]
    fn blank_only_input_is_unknown_without_error() {
        let record = parse_lines(&["", "   ", ""]);
        assert_eq!(record.status, Status::Unknown);
        assert!(record.parse_error.is_none());
    }

    #[test]
    fn unrecognized_line_aborts_with_index_and_content() {
        let record = parse_lines(&["Task name: t", "totally unexpected"]);
        assert_eq!(record.status, Status::Unknown);
        let message = record.parse_error.expect("a parse error");
        assert!(message.contains('1'), "index missing from: {}", message);
        assert!(message.contains("totally unexpected"), "content missing from: {}", message);
        // The field parsed before the failure is still there.
        assert_eq!(record.task_name.as_deref(), Some("t"));
    }

    #[test]
    fn lines_are_trimmed_before_prefix_matching() {
        let record = parse_lines(&["   Task name: spaced   "]);
        assert_eq!(record.task_name.as_deref(), Some("spaced"));
    }

    #[test]
    fn publication_notice_is_recognized_and_dropped() {
        let record = parse_lines(&["No publication information available yet"]);
        assert!(record.parse_error.is_none());
    }
}
