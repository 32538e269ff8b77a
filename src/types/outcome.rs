use std::fmt::Display;

use serde::Serialize;

/// Result of a single download attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadOutcome {
    Success,
    Failed,
    /// No download was attempted because the video metadata is missing
    Skipped,
}

impl Display for DownloadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            DownloadOutcome::Success => "SUCCESS",
            DownloadOutcome::Failed => "FAILED",
            DownloadOutcome::Skipped => "SKIPPED",
        })
    }
}
