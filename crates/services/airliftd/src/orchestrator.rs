//! Build trigger orchestration and status lookup.
//!
//! The orchestrator tracks at most one build record per device for the
//! process lifetime: a trigger for a device with an existing record returns
//! that record instead of starting a second build. Records are never
//! evicted; build completion happens on the remote build service and is not
//! observable here.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use airlift_io::invoker;
use airlift_sdk::build::{BuildStatus, UNKNOWN_BUILD_ID};
use chrono::{DateTime, Utc};
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::prelude::*;

/// Case-insensitive pattern the tool prints its build identifier with.
static BUILD_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)build id:\s*([0-9A-Za-z-]+)").expect("valid pattern"));

/// The most recently requested build for one device.
#[derive(Debug, Clone)]
pub struct BuildRecord {
    /// Identifier parsed from the tool output, or [`UNKNOWN_BUILD_ID`].
    pub build_id: String,
    pub status: BuildStatus,
    /// When the trigger request was accepted.
    pub started_at: DateTime<Utc>,
}

/// Outcome of a trigger call.
#[derive(Debug, Clone)]
pub struct TriggerOutcome {
    pub record: BuildRecord,
    /// True when an earlier trigger's record was returned instead of
    /// starting a new build.
    pub already_pending: bool,
}

/// Tracks build records and drives the external build trigger command.
#[derive(Clone)]
pub struct BuildOrchestrator {
    config: Arc<GatewayConfig>,
    records: Arc<Mutex<HashMap<String, BuildRecord>>>,
}

impl BuildOrchestrator {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self {
            config,
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Request a build for one device, at most one tracked build per
    /// identifier.
    ///
    /// The record is inserted before the tool runs, so a concurrent trigger
    /// for the same device observes it and short-circuits. On tool failure
    /// the record is removed again and a retry is possible.
    pub async fn trigger(&self, udid: &str) -> Result<TriggerOutcome> {
        if udid.is_empty() {
            return Err(Error::IdentifierRequired);
        }

        {
            let mut records = self.records.lock().await;
            if let Some(existing) = records.get(udid) {
                info!("Build already tracked for {udid}, returning existing record");
                return Ok(TriggerOutcome {
                    record: existing.clone(),
                    already_pending: true,
                });
            }
            records.insert(
                udid.to_string(),
                BuildRecord {
                    build_id: UNKNOWN_BUILD_ID.to_string(),
                    status: BuildStatus::Pending,
                    started_at: Utc::now(),
                },
            );
        }

        let invocation = self.config.trigger_invocation(udid);
        info!("Triggering ad-hoc build for {udid}");
        let result = invoker::run(&invocation, self.config.trigger_limits()).await;

        let mut records = self.records.lock().await;
        match result {
            Ok(output) => {
                let build_id = parse_build_id(&output.stdout).unwrap_or_else(|| {
                    warn!("No build identifier in tool output for {udid}");
                    UNKNOWN_BUILD_ID.to_string()
                });
                let record = records.entry(udid.to_string()).or_insert_with(|| BuildRecord {
                    build_id: UNKNOWN_BUILD_ID.to_string(),
                    status: BuildStatus::Pending,
                    started_at: Utc::now(),
                });
                record.build_id = build_id;
                info!("Build {} pending for {udid}", record.build_id);
                Ok(TriggerOutcome {
                    record: record.clone(),
                    already_pending: false,
                })
            }
            Err(err) => {
                records.remove(udid);
                Err(err.into())
            }
        }
    }

    /// Read-only lookup of the tracked build for one device.
    pub async fn status(&self, udid: &str) -> Option<BuildRecord> {
        self.records.lock().await.get(udid).cloned()
    }
}

/// Extract the build identifier token from tool output.
fn parse_build_id(stdout: &str) -> Option<String> {
    BUILD_ID_PATTERN
        .captures(stdout)
        .map(|captures| captures[1].to_string())
}
