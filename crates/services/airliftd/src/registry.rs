//! Device enrollment registry.
//!
//! Tracks which device identifiers have been enrolled into the distribution
//! profile and performs enrollment at most once per identifier. Membership
//! is monotonic for the process lifetime.

use std::collections::HashSet;
use std::sync::Arc;

use airlift_io::invoker::{self, CommandOutput};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::prelude::*;

/// Phrases in tool output that mean the device was already enrolled
/// upstream. The tool's own error taxonomy is only observable as text.
const ALREADY_ENROLLED_PHRASES: [&str; 2] = ["already registered", "already exists"];

/// Outcome of a registration call.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The identifier that was enrolled.
    pub udid: String,
    /// True when the device was already known before this call.
    pub already_registered: bool,
    /// Raw enrollment tool output, kept for operator diagnostics.
    pub output: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Devices confirmed enrolled. Never removed.
    registered: HashSet<String>,
    /// Devices with an enrollment currently in flight.
    enrolling: HashSet<String>,
}

/// Tracks enrolled devices and drives the external enrollment command.
#[derive(Clone)]
pub struct DeviceRegistry {
    config: Arc<GatewayConfig>,
    state: Arc<Mutex<RegistryState>>,
}

impl DeviceRegistry {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    /// Enroll one device, at most once per identifier.
    ///
    /// Repeated calls for a known identifier succeed without touching the
    /// external tool. A tool failure that reports the device as already
    /// known upstream is absorbed and treated as success.
    pub async fn register(
        &self,
        udid: &str,
        device_name: Option<&str>,
    ) -> Result<Registration> {
        if udid.is_empty() {
            return Err(Error::IdentifierRequired);
        }

        {
            let mut state = self.state.lock().await;
            if state.registered.contains(udid) || state.enrolling.contains(udid) {
                return Ok(Registration {
                    udid: udid.to_string(),
                    already_registered: true,
                    output: None,
                });
            }
            // Claim the identifier before the first await so a concurrent
            // call for the same device short-circuits above instead of
            // invoking the tool a second time.
            state.enrolling.insert(udid.to_string());
        }

        let name = match device_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_device_name(udid),
        };
        let invocation = self.config.register_invocation(udid, &name);
        info!("Enrolling device {udid} as '{name}'");
        let result = invoker::run(&invocation, self.config.register_limits()).await;

        let mut state = self.state.lock().await;
        state.enrolling.remove(udid);
        match result {
            Ok(CommandOutput { stdout, .. }) => {
                state.registered.insert(udid.to_string());
                info!("Device {udid} enrolled");
                Ok(Registration {
                    udid: udid.to_string(),
                    already_registered: false,
                    output: Some(stdout),
                })
            }
            Err(err) if reports_already_enrolled(&err) => {
                state.registered.insert(udid.to_string());
                warn!("Enrollment tool reports {udid} as already enrolled");
                Ok(Registration {
                    udid: udid.to_string(),
                    already_registered: true,
                    output: None,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Deterministic display name for devices enrolled without one, derived
/// from the last 8 characters of the identifier.
fn default_device_name(udid: &str) -> String {
    let skip = udid.chars().count().saturating_sub(8);
    let tail: String = udid.chars().skip(skip).collect();
    format!("Device-{tail}")
}

fn reports_already_enrolled(err: &airlift_io::error::Error) -> bool {
    let airlift_io::error::Error::CommandFailed { stdout, stderr, .. } = err else {
        return false;
    };
    let text = format!("{err} {stdout} {stderr}").to_lowercase();
    ALREADY_ENROLLED_PHRASES
        .iter()
        .any(|phrase| text.contains(phrase))
}
