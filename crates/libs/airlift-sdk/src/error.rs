//! Structured failure body.

use serde::{Deserialize, Serialize};

/// Failure body returned by the orchestration endpoints.
///
/// `error` is a short human-readable summary; `details` and `stderr` carry
/// the raw tool diagnostics when available, to aid operator debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}
