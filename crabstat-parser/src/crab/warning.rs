//! Warning classification
//!
//! Warning text accumulated from the report (possibly spanning several
//! physical lines) is matched against a fixed, ordered table of known
//! message patterns. Patterns are anchored at the start of the text and
//! need not consume all of it; the first match decides the category, and
//! no match leaves the warning `Unknown` for manual follow-up.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Closed set of recognized warning messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningCategory {
    Unknown,
    BlocksSkipped,
    ShortRuntime,
    LowCpuEfficiency,
}

/// Ordered table of known warning patterns. Pattern text is the upstream
/// tool's, anchored with `^` to get match-from-start semantics.
static KNOWN_WARNINGS: Lazy<Vec<(Regex, WarningCategory)>> = Lazy::new(|| {
    [
        (
            r"^Some blocks from dataset '.+' were skipped  because they are only present at blacklisted and/or not-whitelisted sites.",
            WarningCategory::BlocksSkipped,
        ),
        (
            r"^the max jobs runtime is less than 30% of the task requested value",
            WarningCategory::ShortRuntime,
        ),
        (
            r"^the average jobs CPU efficiency is less than 50%",
            WarningCategory::LowCpuEfficiency,
        ),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(pattern).unwrap(), category))
    .collect()
});

/// One warning from the report: the full accumulated text and the
/// category the classifier assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub category: WarningCategory,
    pub text: String,
}

impl Warning {
    /// Classify `text` against the known-warning table.
    pub fn new(text: String) -> Self {
        let category = classify(&text);
        Warning { category, text }
    }
}

/// First matching pattern wins; no match is `Unknown`.
pub fn classify(text: &str) -> WarningCategory {
    for (pattern, category) in KNOWN_WARNINGS.iter() {
        if pattern.is_match(text) {
            return *category;
        }
    }
    WarningCategory::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_messages_are_classified() {
        assert_eq!(
            classify("the average jobs CPU efficiency is less than 50%"),
            WarningCategory::LowCpuEfficiency
        );
        assert_eq!(
            classify("the max jobs runtime is less than 30% of the task requested value"),
            WarningCategory::ShortRuntime
        );
        assert_eq!(
            classify(
                "Some blocks from dataset '/Data/Run2023/AOD' were skipped  because they are \
                 only present at blacklisted and/or not-whitelisted sites."
            ),
            WarningCategory::BlocksSkipped
        );
    }

    #[test]
    fn match_is_anchored_at_the_start() {
        // The known text buried mid-string must not match.
        assert_eq!(
            classify("note: the average jobs CPU efficiency is less than 50%"),
            WarningCategory::Unknown
        );
    }

    #[test]
    fn trailing_text_does_not_prevent_a_match() {
        assert_eq!(
            classify("the average jobs CPU efficiency is less than 50%\nPlease check the jobs."),
            WarningCategory::LowCpuEfficiency
        );
    }

    #[test]
    fn unrecognized_text_is_unknown() {
        assert_eq!(classify("something entirely new"), WarningCategory::Unknown);
        assert_eq!(classify(""), WarningCategory::Unknown);
    }
}
