//! Status data model
//!
//! The [`TaskStatus`] record is the accumulator a single parse populates.
//! It is created empty, mutated only by the extractors during the one
//! top-to-bottom pass, and never mutated again after it is returned.
//!
//! Mapping-shaped data keeps the report's own row order: `job_stat` and
//! `error_stat` are insertion-ordered association lists, and an absent key
//! means "not observed", not zero.

use crate::crab::warning::Warning;
use serde::Serialize;
use std::fmt;

/// Overall task state inferred from the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Status {
    #[default]
    Unknown,
    Bootstrapped,
    InProgress,
    Finished,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Unknown => "Unknown",
            Status::Bootstrapped => "Bootstrapped",
            Status::InProgress => "InProgress",
            Status::Finished => "Finished",
        };
        write!(f, "{}", name)
    }
}

/// Task state as reported by the CRAB server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusOnServer {
    Submitted,
}

impl StatusOnServer {
    /// Look up the exact member name used in the report.
    pub fn from_report_name(name: &str) -> Option<Self> {
        match name {
            "SUBMITTED" => Some(StatusOnServer::Submitted),
            _ => None,
        }
    }
}

/// Task state as reported by the grid scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusOnScheduler {
    Submitted,
    Failed,
}

impl StatusOnScheduler {
    pub fn from_report_name(name: &str) -> Option<Self> {
        match name {
            "SUBMITTED" => Some(StatusOnScheduler::Submitted),
            "FAILED" => Some(StatusOnScheduler::Failed),
            _ => None,
        }
    }
}

/// Per-job state, one row per state in the report's job-status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum JobState {
    Unsubmitted,
    Idle,
    Running,
    ToRetry,
    Finished,
    Failed,
    Transferring,
}

impl JobState {
    /// The mixed-case token the report uses for this state.
    pub fn as_report_name(&self) -> &'static str {
        match self {
            JobState::Unsubmitted => "unsubmitted",
            JobState::Idle => "idle",
            JobState::Running => "running",
            JobState::ToRetry => "toRetry",
            JobState::Finished => "finished",
            JobState::Failed => "failed",
            JobState::Transferring => "transferring",
        }
    }

    pub fn from_report_name(name: &str) -> Option<Self> {
        match name {
            "unsubmitted" => Some(JobState::Unsubmitted),
            "idle" => Some(JobState::Idle),
            "running" => Some(JobState::Running),
            "toRetry" => Some(JobState::ToRetry),
            "finished" => Some(JobState::Finished),
            "failed" => Some(JobState::Failed),
            "transferring" => Some(JobState::Transferring),
            _ => None,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_report_name())
    }
}

/// Key of the error summary: a job exit code, or the bucket for jobs whose
/// exit code the server could not recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ExitCode {
    Code(u32),
    Unknown,
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Code(code) => write!(f, "{}", code),
            ExitCode::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Min/max/average triple for a run metric. Memory is in megabytes,
/// runtime and CPU efficiency use the report's own units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceSpread {
    pub min: u32,
    pub max: u32,
    pub ave: u32,
}

/// Wasted wall-clock across all jobs, as a clock-field total plus the
/// fraction of the overall task time it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WasteStat {
    pub time: u32,
    pub fraction_of_total: u32,
}

/// Aggregate statistics from the "Summary of run jobs" block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub memory: Option<ResourceSpread>,
    pub runtime: Option<ResourceSpread>,
    pub cpu: Option<ResourceSpread>,
    pub waste: Option<WasteStat>,
}

/// The parsed status record for one CRAB task report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStatus {
    pub status: Status,
    pub status_on_server: Option<StatusOnServer>,
    pub status_on_scheduler: Option<StatusOnScheduler>,
    pub project_dir: Option<String>,
    pub task_name: Option<String>,
    pub grid_scheduler: Option<String>,
    pub task_worker: Option<String>,
    pub help_url: Option<String>,
    pub dashboard_url: Option<String>,
    pub log_file: Option<String>,
    /// Job counts per state, in report order. States are unique per parse.
    pub job_stat: Vec<(JobState, u32)>,
    /// Declared job total; every job-status block must agree on it.
    pub total_jobs: Option<u32>,
    /// Failed-job counts per exit code, in report order.
    pub error_stat: Vec<(ExitCode, u32)>,
    pub run_stat: RunSummary,
    /// Classified warnings, in the order they appeared.
    pub warnings: Vec<Warning>,
    /// Set exactly when a structural violation collapsed `status` to
    /// `Unknown`; the remainder of the report was not processed.
    pub parse_error: Option<String>,
}

impl TaskStatus {
    /// Number of jobs observed in `state`, if the report mentioned it.
    pub fn job_count(&self, state: JobState) -> Option<u32> {
        self.job_stat
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, n)| *n)
    }

    /// Record a failed-job count, replacing any earlier entry for the
    /// same exit code.
    pub(crate) fn set_error_count(&mut self, code: ExitCode, count: u32) {
        if let Some(entry) = self.error_stat.iter_mut().find(|(c, _)| *c == code) {
            entry.1 = count;
        } else {
            self.error_stat.push((code, count));
        }
    }

    /// Render the job-status table as `"<state> <pct>% (<count>/<total>)"`
    /// lines, one per observed state, with `decimals` places on the
    /// percentage. Empty when no job-status block was seen.
    pub fn job_summary_lines(&self, decimals: usize) -> Vec<String> {
        let total = match self.total_jobs {
            Some(total) if total > 0 => total,
            _ => return Vec::new(),
        };
        self.job_stat
            .iter()
            .map(|(state, count)| {
                let percent = f64::from(*count) / f64::from(total) * 100.0;
                format!("{} {:.*}% ({}/{})", state, decimals, percent, count, total)
            })
            .collect()
    }

    /// Warnings the classifier could not attribute to a known message;
    /// these need manual follow-up.
    pub fn unknown_warnings(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .filter(|w| w.category == crate::crab::warning::WarningCategory::Unknown)
    }
}
