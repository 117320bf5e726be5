//! Whitespace normalization for extracted page text.

/// Collapses every run of whitespace (spaces, tabs, newlines, Unicode spaces)
/// into a single ASCII space and trims both ends.
///
/// Total and idempotent: `normalize_text(&normalize_text(s)) == normalize_text(s)`.
///
/// ```
/// use report_pipeline::normalize_text;
/// assert_eq!(normalize_text("Hello\n\n  World"), "Hello World");
/// ```
pub fn normalize_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
