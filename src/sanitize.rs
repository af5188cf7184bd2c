//! Filesystem-safe names for artwork files.

/// Characters that are rejected (or mean something else) on at least one
/// common filesystem.
pub const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace every forbidden character with `_`, one for one.
///
/// Everything else (whitespace, Unicode, case) passes through untouched and
/// nothing is truncated, so `sanitize(sanitize(s)) == sanitize(s)`.
pub fn sanitize(title: &str) -> String {
    title
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}
