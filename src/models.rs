use serde::Deserialize;

/// Current state of an encoding job. Check `status` or use the `is_*`
/// helpers.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: u64,
    /// "processing", "completed", or "error".
    pub status: String,
    /// Server-reported progress, e.g. "75%".
    pub progress: Option<String>,
    /// ISO 8601.
    pub created_at: String,
    /// ISO 8601, set once the job is terminal.
    pub completed_at: Option<String>,
    /// Service error code when `status` is "error", e.g. "source_not_found".
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    /// Full API response JSON.
    pub raw: serde_json::Value,
}

impl Job {
    /// Terminal = won't change anymore (completed or error).
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "error")
    }

    /// Status is "completed".
    pub fn is_complete(&self) -> bool {
        self.status == "completed"
    }

    /// Status is "error".
    pub fn is_failed(&self) -> bool {
        self.status == "error"
    }

    /// Status is "processing".
    pub fn is_processing(&self) -> bool {
        self.status == "processing"
    }

    /// Destination URL the service wrote a finished output to, from the
    /// response's `output_urls` map. `None` until that output is uploaded.
    pub fn output_url(&self, format: &str) -> Option<&str> {
        self.raw
            .get("output_urls")
            .and_then(|m| m.get(format))
            .and_then(|v| v.as_str())
    }
}

/// Media metadata probed by the service for a job's source file and
/// finished outputs.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Full API response JSON.
    pub raw: serde_json::Value,
}

impl Metadata {
    /// Probed metadata for the source file.
    pub fn source(&self) -> Option<&serde_json::Value> {
        self.target("source")
    }

    /// Probed metadata for one target ("source" or an output format name).
    pub fn target(&self, name: &str) -> Option<&serde_json::Value> {
        self.raw.get("metadata").and_then(|m| m.get(name))
    }

    /// All target names present, sorted.
    pub fn targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .raw
            .get("metadata")
            .and_then(|m| m.as_object())
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

/// Polling config for [`Client::encode`](crate::Client::encode) and
/// [`Client::wait`](crate::Client::wait).
pub struct WaitOptions {
    /// Default: 5s.
    pub poll_interval: std::time::Duration,
    /// Default: 24h.
    pub timeout: std::time::Duration,
    /// Called on each poll iteration with the current `Job`.
    #[allow(clippy::type_complexity)]
    pub on_progress: Option<Box<dyn Fn(&Job) + Send>>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: std::time::Duration::from_secs(5),
            timeout: std::time::Duration::from_secs(24 * 60 * 60),
            on_progress: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal deserialization helpers (not part of the public API surface)
// ---------------------------------------------------------------------------

/// Error envelope the service attaches to failed calls:
/// `{"status": "error", "error_code": ..., "message": ...}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Pull a string out of a JSON value, or `""` if missing.
pub(crate) fn json_str(val: &serde_json::Value, key: &str) -> String {
    val.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Pull a string out of a JSON value, or `None`.
pub(crate) fn json_str_opt(val: &serde_json::Value, key: &str) -> Option<String> {
    val.get(key)
        .and_then(|v| v.as_str())
        .map(ToString::to_string)
}

/// Pull a `u64` out of a JSON value, or 0.
pub(crate) fn json_u64(val: &serde_json::Value, key: &str) -> u64 {
    val.get(key).and_then(|v| v.as_u64()).unwrap_or(0)
}

/// Parse a raw job JSON value into a [`Job`].
pub(crate) fn job_from_value(val: serde_json::Value) -> Job {
    Job {
        id: json_u64(&val, "id"),
        status: json_str(&val, "status"),
        progress: json_str_opt(&val, "progress"),
        created_at: json_str(&val, "created_at"),
        completed_at: json_str_opt(&val, "completed_at"),
        error_code: json_str_opt(&val, "error_code"),
        error_message: json_str_opt(&val, "message"),
        raw: val,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn job_from_value_extracts_typed_fields() {
        let job = job_from_value(json!({
            "id": 1234,
            "status": "completed",
            "progress": "100%",
            "created_at": "2026-08-01T10:00:00Z",
            "completed_at": "2026-08-01T10:03:12Z",
            "output_urls": { "mp4": "s3://bucket/vid.mp4" },
        }));

        assert_eq!(job.id, 1234);
        assert!(job.is_complete());
        assert!(job.is_terminal());
        assert!(!job.is_failed());
        assert_eq!(job.progress.as_deref(), Some("100%"));
        assert_eq!(job.output_url("mp4"), Some("s3://bucket/vid.mp4"));
        assert_eq!(job.output_url("webm"), None);
    }

    #[test]
    fn failed_job_carries_error_code() {
        let job = job_from_value(json!({
            "id": 9,
            "status": "error",
            "error_code": "source_not_found",
            "message": "could not download source",
        }));

        assert!(job.is_failed());
        assert!(job.is_terminal());
        assert_eq!(job.error_code.as_deref(), Some("source_not_found"));
    }

    #[test]
    fn metadata_targets_are_sorted() {
        let metadata = Metadata {
            raw: json!({
                "metadata": {
                    "source": { "format": "mp4" },
                    "webm": { "format": "webm" },
                    "mp4": { "format": "mp4" },
                }
            }),
        };

        assert_eq!(metadata.targets(), vec!["mp4", "source", "webm"]);
        assert!(metadata.source().is_some());
        assert!(metadata.target("ogv").is_none());
    }
}
