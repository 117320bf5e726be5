//! Cleanup of raw model output before it is stored as a report.

const HTML_FENCE_OPEN: &str = "```html";
const FENCE: &str = "```";

/// Strips a ```` ```html ... ``` ```` wrapper if the trimmed text starts with one.
///
/// Text without an opening fence is returned untouched. Nested wrappers are
/// peeled until none remains, so applying this twice equals applying it once.
///
/// ```
/// use report_pipeline::sanitize_html_response;
/// assert_eq!(sanitize_html_response("```html\n<div>Report</div>\n```"), "<div>Report</div>");
/// ```
pub fn sanitize_html_response(raw: &str) -> String {
    let mut current = raw;
    while let Some(inner) = strip_open_fence(current.trim()) {
        let inner = inner.trim_end();
        let inner = inner.strip_suffix(FENCE).unwrap_or(inner);
        current = inner.trim();
    }
    current.to_string()
}

fn strip_open_fence(s: &str) -> Option<&str> {
    let head = s.get(..HTML_FENCE_OPEN.len())?;
    head.eq_ignore_ascii_case(HTML_FENCE_OPEN)
        .then(|| &s[HTML_FENCE_OPEN.len()..])
}
