//! Round-trip property: rendering the job table of a parsed synthetic
//! report reproduces the report's own percentage lines.

use crabstat_parser::crab::{parse_report, JobState, Status};
use proptest::prelude::*;

const STATES: [JobState; 7] = [
    JobState::Unsubmitted,
    JobState::Idle,
    JobState::Running,
    JobState::ToRetry,
    JobState::Finished,
    JobState::Failed,
    JobState::Transferring,
];

/// Build a report whose job rows are formatted exactly like the summary
/// renderer formats them, one decimal place.
fn synthetic_report(total: u32, counts: &[u32]) -> (String, Vec<String>) {
    let mut rows = Vec::new();
    for (state, count) in STATES.iter().zip(counts) {
        let percent = f64::from(*count) / f64::from(total) * 100.0;
        rows.push(format!("{} {:.1}% ({}/{})", state, percent, count, total));
    }
    let mut report = String::from("Task name: 260203_141523:user_roundtrip\n");
    report.push_str("Status on the CRAB server: SUBMITTED\n");
    report.push_str(&format!("Jobs status: {}\n", rows[0]));
    for row in &rows[1..] {
        report.push_str(&format!("             {}\n", row));
    }
    (report, rows)
}

proptest! {
    #[test]
    fn job_percentages_round_trip(
        (total, counts) in (1u32..10_000).prop_flat_map(|total| {
            (Just(total), prop::collection::vec(0..=total, 1..=STATES.len()))
        })
    ) {
        let (report, rows) = synthetic_report(total, &counts);
        let record = parse_report(&report);

        prop_assert_eq!(record.parse_error.clone(), None);
        prop_assert_eq!(record.status, Status::InProgress);
        prop_assert_eq!(record.total_jobs, Some(total));
        prop_assert_eq!(record.job_summary_lines(1), rows);
    }
}
