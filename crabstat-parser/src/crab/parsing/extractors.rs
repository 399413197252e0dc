//! Block extractors
//!
//! Each extractor owns the micro-grammar of one multi-line report block:
//! multi-line continuation for warnings, run-until-blank for the
//! job-status table, scan-to-footer for the error summary, a fixed four
//! lines for the run summary, and a two-line sentinel for the bootstrap
//! message. Row patterns are the upstream tool's regexes, anchored at the
//! start of the (trimmed) row.
//!
//! Every extractor receives the full line sequence plus the index of its
//! trigger line, and returns the index of the first line it did not
//! consume.

use crate::crab::error::ParseError;
use crate::crab::model::{
    ExitCode, JobState, ResourceSpread, Status, StatusOnScheduler, StatusOnServer, TaskStatus,
    WasteStat,
};
use crate::crab::values::{clock_field_to_seconds, parse_count};
use crate::crab::warning::Warning;
use once_cell::sync::Lazy;
use regex::Regex;

/// Confirmation line that must follow the bootstrap sentinel.
pub(crate) const BOOTSTRAP_FOLLOWUP: &str =
    "Status information will be available within a few minutes";

/// Fixed footer closing the error-summary block.
pub(crate) const ERROR_SUMMARY_END: &str = "Have a look at \
    https://twiki.cern.ch/twiki/bin/viewauth/CMSPublic/JobExitCodes \
    for a description of the exit codes.";

static SCHEDULER_WORKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*) - (.*)$").unwrap());

static JOB_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^ ]+) *([0-9.]+)% *\( *([0-9]+)/([0-9]+)\)").unwrap());

static FAILED_JOBS_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+) jobs failed with exit code ([0-9]+)").unwrap());

static MISSING_EXIT_CODES_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Could not find exit code details for ([0-9]+) jobs\.").unwrap());

static MEMORY_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\* Memory: ([0-9]+)MB min, ([0-9]+)MB max, ([0-9]+)MB ave$").unwrap());

static RUNTIME_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\* Runtime: ([0-9]+:[0-9]+:[0-9]+) min, ([0-9]+:[0-9]+:[0-9]+) max, ([0-9]+:[0-9]+:[0-9]+) ave$")
        .unwrap()
});

static CPU_EFF_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\* CPU eff: ([0-9]+)% min, ([0-9]+)% max, ([0-9]+)% ave$").unwrap());

static WASTE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\* Waste: ([0-9]+:[0-9]+:[0-9]+) \(([0-9]+)% of total\)$").unwrap());

/// `"<scheduler> - <worker>"` on the trigger line itself.
pub(crate) fn scheduler_worker(
    record: &mut TaskStatus,
    _lines: &[&str],
    n: usize,
    value: &str,
) -> Result<usize, ParseError> {
    let captures = SCHEDULER_WORKER
        .captures(value)
        .ok_or_else(|| ParseError::SchedulerWorker(value.to_string()))?;
    record.grid_scheduler = Some(captures[1].to_string());
    record.task_worker = Some(captures[2].to_string());
    Ok(n + 1)
}

pub(crate) fn status_on_server(
    record: &mut TaskStatus,
    _lines: &[&str],
    n: usize,
    value: &str,
) -> Result<usize, ParseError> {
    let status = StatusOnServer::from_report_name(value)
        .ok_or_else(|| ParseError::ServerStatus(value.to_string()))?;
    record.status_on_server = Some(status);
    Ok(n + 1)
}

pub(crate) fn status_on_scheduler(
    record: &mut TaskStatus,
    _lines: &[&str],
    n: usize,
    value: &str,
) -> Result<usize, ParseError> {
    let status = StatusOnScheduler::from_report_name(value)
        .ok_or_else(|| ParseError::SchedulerStatus(value.to_string()))?;
    record.status_on_scheduler = Some(status);
    Ok(n + 1)
}

/// Accumulate a warning: the trigger value plus every following line that
/// is non-blank and indented. The terminating blank or non-indented line
/// is left for the dispatcher.
pub(crate) fn warning(
    record: &mut TaskStatus,
    lines: &[&str],
    n: usize,
    value: &str,
) -> Result<usize, ParseError> {
    let mut text = value.to_string();
    let mut cursor = n + 1;
    while cursor < lines.len() {
        let raw = lines[cursor];
        if raw.trim().is_empty() || !raw.starts_with(char::is_whitespace) {
            break;
        }
        text.push('\n');
        text.push_str(raw.trim());
        cursor += 1;
    }
    record.warnings.push(Warning::new(text));
    Ok(cursor)
}

/// Job-status table: the trigger value is the first row, then every
/// non-blank line is another row until a blank line or end of input.
pub(crate) fn job_status_table(
    record: &mut TaskStatus,
    lines: &[&str],
    n: usize,
    value: &str,
) -> Result<usize, ParseError> {
    let mut rows = vec![value.to_string()];
    let mut cursor = n + 1;
    while cursor < lines.len() {
        let line = lines[cursor].trim();
        if line.is_empty() {
            break;
        }
        rows.push(line.to_string());
        cursor += 1;
    }
    for row in &rows {
        let captures = JOB_ROW
            .captures(row)
            .ok_or_else(|| ParseError::JobStatusRow(row.clone()))?;
        let state = JobState::from_report_name(&captures[1])
            .ok_or_else(|| ParseError::JobState(captures[1].to_string()))?;
        if record.job_count(state).is_some() {
            return Err(ParseError::DuplicateJobState(state));
        }
        // Capture 2 is the row's own percentage; informational only.
        let count = parse_count(&captures[3]).ok_or_else(|| ParseError::JobCount(row.clone()))?;
        let total = parse_count(&captures[4]).ok_or_else(|| ParseError::JobCount(row.clone()))?;
        record.job_stat.push((state, count));
        match record.total_jobs {
            None => record.total_jobs = Some(total),
            Some(expected) if expected != total => {
                return Err(ParseError::InconsistentTotals { expected, found: total });
            }
            Some(_) => {}
        }
    }
    Ok(cursor)
}

/// Error summary: rows up to the fixed exit-codes footer. Running off the
/// end of the input without seeing the footer is a structural error.
pub(crate) fn error_summary(
    record: &mut TaskStatus,
    lines: &[&str],
    n: usize,
    _value: &str,
) -> Result<usize, ParseError> {
    let mut rows: Vec<&str> = Vec::new();
    let mut cursor = n + 1;
    let mut end_found = false;
    while cursor < lines.len() {
        let line = lines[cursor].trim();
        cursor += 1;
        if line.is_empty() {
            continue;
        }
        if line == ERROR_SUMMARY_END {
            end_found = true;
            break;
        }
        rows.push(line);
    }
    if !end_found {
        return Err(ParseError::UnterminatedErrorSummary);
    }
    for row in rows {
        if let Some(captures) = FAILED_JOBS_ROW.captures(row) {
            let count =
                parse_count(&captures[1]).ok_or_else(|| ParseError::ErrorSummaryRow(row.to_string()))?;
            let code =
                parse_count(&captures[2]).ok_or_else(|| ParseError::ErrorSummaryRow(row.to_string()))?;
            record.set_error_count(ExitCode::Code(code), count);
        } else if let Some(captures) = MISSING_EXIT_CODES_ROW.captures(row) {
            let count =
                parse_count(&captures[1]).ok_or_else(|| ParseError::ErrorSummaryRow(row.to_string()))?;
            record.set_error_count(ExitCode::Unknown, count);
        } else {
            return Err(ParseError::ErrorSummaryRow(row.to_string()));
        }
    }
    Ok(cursor)
}

/// Run summary: exactly four fixed-pattern lines after the trigger.
/// A truncated block fails before anything is stored.
pub(crate) fn run_summary(
    record: &mut TaskStatus,
    lines: &[&str],
    n: usize,
    _value: &str,
) -> Result<usize, ParseError> {
    if n + 4 >= lines.len() {
        return Err(ParseError::TruncatedRunSummary);
    }

    let memory_line = lines[n + 1].trim();
    let captures = MEMORY_ROW.captures(memory_line).ok_or_else(|| ParseError::RunStat {
        metric: "memory",
        line: memory_line.to_string(),
    })?;
    let memory = int_spread(&captures, "memory", memory_line)?;

    let runtime_line = lines[n + 2].trim();
    let captures = RUNTIME_ROW.captures(runtime_line).ok_or_else(|| ParseError::RunStat {
        metric: "runtime",
        line: runtime_line.to_string(),
    })?;
    let runtime = clock_spread(&captures, "runtime", runtime_line)?;

    let cpu_line = lines[n + 3].trim();
    let captures = CPU_EFF_ROW.captures(cpu_line).ok_or_else(|| ParseError::RunStat {
        metric: "CPU eff",
        line: cpu_line.to_string(),
    })?;
    let cpu = int_spread(&captures, "CPU eff", cpu_line)?;

    let waste_line = lines[n + 4].trim();
    let captures = WASTE_ROW.captures(waste_line).ok_or_else(|| ParseError::RunStat {
        metric: "waste",
        line: waste_line.to_string(),
    })?;
    let waste = WasteStat {
        time: clock_field_to_seconds(&captures[1]).ok_or_else(|| ParseError::RunStat {
            metric: "waste",
            line: waste_line.to_string(),
        })?,
        fraction_of_total: parse_count(&captures[2]).ok_or_else(|| ParseError::RunStat {
            metric: "waste",
            line: waste_line.to_string(),
        })?,
    };

    // All four lines parsed; only now touch the record.
    record.run_stat.memory = Some(memory);
    record.run_stat.runtime = Some(runtime);
    record.run_stat.cpu = Some(cpu);
    record.run_stat.waste = Some(waste);
    Ok(n + 5)
}

/// Bootstrap sentinel: valid only when immediately followed by the fixed
/// confirmation line.
pub(crate) fn task_bootstrapped(
    record: &mut TaskStatus,
    lines: &[&str],
    n: usize,
    _value: &str,
) -> Result<usize, ParseError> {
    if n + 1 >= lines.len() || lines[n + 1].trim() != BOOTSTRAP_FOLLOWUP {
        return Err(ParseError::Bootstrap);
    }
    record.status = Status::Bootstrapped;
    Ok(n + 2)
}

fn int_spread(
    captures: &regex::Captures<'_>,
    metric: &'static str,
    line: &str,
) -> Result<ResourceSpread, ParseError> {
    let field = |index: usize| {
        parse_count(&captures[index]).ok_or_else(|| ParseError::RunStat {
            metric,
            line: line.to_string(),
        })
    };
    Ok(ResourceSpread { min: field(1)?, max: field(2)?, ave: field(3)? })
}

fn clock_spread(
    captures: &regex::Captures<'_>,
    metric: &'static str,
    line: &str,
) -> Result<ResourceSpread, ParseError> {
    let field = |index: usize| {
        clock_field_to_seconds(&captures[index]).ok_or_else(|| ParseError::RunStat {
            metric,
            line: line.to_string(),
        })
    };
    Ok(ResourceSpread { min: field(1)?, max: field(2)?, ave: field(3)? })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crab::parsing::parse_lines;
    use crate::crab::warning::WarningCategory;

    #[test]
    fn warning_absorbs_indented_continuations_only() {
        let record = parse_lines(&[
            "Warning: the first fragment",
            "   continues here",
            "\tand here",
            "Task name: after",
        ]);
        assert!(record.parse_error.is_none());
        assert_eq!(record.warnings.len(), 1);
        assert_eq!(
            record.warnings[0].text,
            "the first fragment\ncontinues here\nand here"
        );
        assert_eq!(record.task_name.as_deref(), Some("after"));
    }

    #[test]
    fn warning_stops_at_a_blank_line() {
        let record = parse_lines(&["Warning: fragment", "", "   Task name: x"]);
        assert_eq!(record.warnings[0].text, "fragment");
        assert_eq!(record.task_name.as_deref(), Some("x"));
    }

    #[test]
    fn warning_at_end_of_input_is_kept() {
        let record = parse_lines(&["Warning: tail", "   wrapped"]);
        assert!(record.parse_error.is_none());
        assert_eq!(record.warnings[0].text, "tail\nwrapped");
    }

    #[test]
    fn warning_is_classified_on_insertion() {
        let record = parse_lines(&[
            "Warning: the average jobs CPU efficiency is less than 50%",
        ]);
        assert_eq!(record.warnings[0].category, WarningCategory::LowCpuEfficiency);
    }

    #[test]
    fn bootstrap_needs_its_confirmation_line() {
        let record = parse_lines(&[
            "Task bootstrapped",
            "Status information will be available within a few minutes",
        ]);
        assert_eq!(record.status, Status::Bootstrapped);

        let record = parse_lines(&["Task bootstrapped", "Task name: nope"]);
        assert_eq!(record.status, Status::Unknown);
        assert_eq!(record.parse_error.as_deref(), Some("Unexpected bootstrap message"));

        let record = parse_lines(&["Task bootstrapped"]);
        assert_eq!(record.status, Status::Unknown);
    }

    #[test]
    fn job_rows_tolerate_padded_columns() {
        let record = parse_lines(&[
            "Jobs status: finished     80.0% ( 80/100)",
            "running      15.0% ( 15/100)",
            "failed        5.0% (  5/100)",
        ]);
        assert!(record.parse_error.is_none());
        assert_eq!(record.total_jobs, Some(100));
        assert_eq!(record.job_count(JobState::Finished), Some(80));
        assert_eq!(record.job_count(JobState::Running), Some(15));
        assert_eq!(record.job_count(JobState::Failed), Some(5));
    }

    #[test]
    fn error_summary_rows_populate_exit_codes() {
        let record = parse_lines(&[
            "Error Summary:",
            "",
            "3 jobs failed with exit code 8028",
            "2 jobs failed with exit code 50664",
            "Could not find exit code details for 1 jobs.",
            ERROR_SUMMARY_END,
        ]);
        assert!(record.parse_error.is_none());
        assert_eq!(
            record.error_stat,
            vec![
                (ExitCode::Code(8028), 3),
                (ExitCode::Code(50664), 2),
                (ExitCode::Unknown, 1),
            ]
        );
    }

    #[test]
    fn error_summary_without_footer_is_structural() {
        let record = parse_lines(&["Error Summary:", "3 jobs failed with exit code 1"]);
        assert_eq!(record.status, Status::Unknown);
        assert_eq!(
            record.parse_error.as_deref(),
            Some("Unable to find the end of the error summary")
        );
    }

    #[test]
    fn unknown_error_summary_row_is_structural() {
        let record = parse_lines(&["Error Summary:", "weird row", ERROR_SUMMARY_END]);
        assert_eq!(record.status, Status::Unknown);
        assert!(record
            .parse_error
            .as_deref()
            .unwrap()
            .contains("Unknown job summary string"));
    }
}
