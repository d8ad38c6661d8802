//! Length checks shared by the text value objects.

/// Why a piece of text failed a bounded-length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextIssue {
    Empty,
    TooLong,
}

/// Check that `value` is not blank and holds at most `max` characters.
///
/// Length is measured in Unicode scalar values, not bytes.
pub(crate) fn check_bounded(value: &str, max: usize) -> Result<(), TextIssue> {
    if value.trim().is_empty() {
        return Err(TextIssue::Empty);
    }
    if value.chars().count() > max {
        return Err(TextIssue::TooLong);
    }
    Ok(())
}
