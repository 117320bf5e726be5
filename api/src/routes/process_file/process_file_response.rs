use serde::Serialize;

/// Response payload for /process-file/.
#[derive(Debug, Serialize)]
pub struct ProcessFileResponse {
    /// Sanitized HTML dashboard.
    pub html: String,
    /// Id to fetch the same report later via /report/{report_id}.
    pub report_id: String,
}
