//! Pluralization for report and log lines.

/// Return "s" suffix for plural counts
///
/// # Examples
///
/// - `plural_s(0)` -> `"s"` (0 units)
/// - `plural_s(1)` -> `""` (1 unit)
/// - `plural_s(5)` -> `"s"` (5 units)
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, handling pluralization
///
/// # Examples
///
/// - `plural_count(0, "error")` -> `"0 errors"`
/// - `plural_count(1, "error")` -> `"1 error"`
/// - `plural_count(5, "error")` -> `"5 errors"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}
