//! Value parsing helpers shared by the block extractors.

/// Convert a `HH:MM:SS` clock field from the report using the submission
/// tool's own formula: `(hours * 60 + minutes) + seconds`.
///
/// This is not wall-clock seconds; the upstream tool never scales minutes
/// or hours into real seconds, and parsed values must stay comparable
/// with what it reports elsewhere.
pub(crate) fn clock_field_to_seconds(field: &str) -> Option<u32> {
    let mut parts = field.split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    let seconds: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_add(seconds)
}

/// Parse a non-negative integer count.
pub(crate) fn parse_count(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_fields_use_the_tools_formula() {
        // Intentional fidelity: 1:02:03 is 1*60 + 2 + 3, not 3723 real
        // seconds.
        assert_eq!(clock_field_to_seconds("1:02:03"), Some(65));
        assert_eq!(clock_field_to_seconds("0:00:00"), Some(0));
        assert_eq!(clock_field_to_seconds("12:34:56"), Some(12 * 60 + 34 + 56));
    }

    #[test]
    fn malformed_clock_fields_are_rejected() {
        assert_eq!(clock_field_to_seconds(""), None);
        assert_eq!(clock_field_to_seconds("12:34"), None);
        assert_eq!(clock_field_to_seconds("1:2:3:4"), None);
        assert_eq!(clock_field_to_seconds("a:b:c"), None);
    }

    #[test]
    fn counts_must_be_non_negative_integers() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 7 "), Some(7));
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("3.5"), None);
        assert_eq!(parse_count("many"), None);
    }
}
