//! Build trigger and status types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel build identifier used when none could be parsed from the tool
/// output.
pub const UNKNOWN_BUILD_ID: &str = "unknown";

/// Lifecycle state of a tracked build.
///
/// Only `Pending` is ever written by the gateway: completion happens on the
/// remote build service and is not observable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// Accepted by the external tool, completion untracked.
    Pending,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::Pending => write!(f, "pending"),
        }
    }
}

/// Request body for triggering a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerBuildRequest {
    /// Unique device token of the installation target.
    #[serde(default)]
    pub udid: Option<String>,
}

impl TriggerBuildRequest {
    pub fn new(udid: impl Into<String>) -> Self {
        Self {
            udid: Some(udid.into()),
        }
    }
}

/// Response body for a build trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerBuildResponse {
    pub success: bool,
    /// Identifier parsed from the tool output, or [`UNKNOWN_BUILD_ID`].
    pub build_id: String,
    pub status: BuildStatus,
    /// Set when an earlier trigger's record was returned instead of
    /// starting a new build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response body for a build status query.
///
/// A query for a device with no tracked build is an expected steady state,
/// reported as `success: false` on a 200 response rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildStatusResponse {
    /// A build is tracked for the device.
    #[serde(rename_all = "camelCase")]
    Tracked {
        success: bool,
        build_id: String,
        status: BuildStatus,
        started_at: DateTime<Utc>,
    },
    /// No build has been triggered for the device.
    Unknown { success: bool, message: String },
}
