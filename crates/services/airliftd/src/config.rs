//! Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use airlift_io::invoker::{Invocation, Limits};

use crate::prelude::*;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3748;
/// Wall-clock bound for device enrollment invocations.
pub const REGISTER_TIMEOUT: Duration = Duration::from_secs(30);
/// Wall-clock bound for build trigger invocations.
pub const TRIGGER_TIMEOUT: Duration = Duration::from_secs(60);
/// Combined stdout and stderr ceiling for tool invocations.
pub const MAX_TOOL_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Gateway runtime configuration.
///
/// The environment contributes only the listening port; everything else is
/// a field with a default so tests can inject a fully controlled
/// configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listening port.
    pub port: u16,
    /// Build automation tool executable.
    pub tool: String,
    /// Tool lane that produces the ad-hoc build.
    pub build_lane: String,
    /// Target platform passed to the tool.
    pub platform: String,
    /// Directory every tool invocation runs from. The tool expects the
    /// project root, one level above the gateway's own directory.
    pub project_root: PathBuf,
    /// Directory served by the static passthrough.
    pub public_dir: PathBuf,
    /// Wall-clock bound for enrollment invocations.
    pub register_timeout: Duration,
    /// Wall-clock bound for build trigger invocations.
    pub trigger_timeout: Duration,
    /// Combined output ceiling for tool invocations.
    pub max_tool_output_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tool: "fastlane".to_string(),
            build_lane: "adhoc".to_string(),
            platform: "ios".to_string(),
            project_root: PathBuf::from(".."),
            public_dir: PathBuf::from("public"),
            register_timeout: REGISTER_TIMEOUT,
            trigger_timeout: TRIGGER_TIMEOUT,
            max_tool_output_bytes: MAX_TOOL_OUTPUT_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Create configuration from the environment.
    ///
    /// Reads the `PORT` environment variable, defaulting to 3748.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(port) = std::env::var("PORT") {
            config.port = port.parse().map_err(|_| Error::InvalidPort(port.clone()))?;
        }
        Ok(config)
    }

    /// Enrollment command for one device.
    pub fn register_invocation(&self, udid: &str, device_name: &str) -> Invocation {
        Invocation::new(
            self.tool.clone(),
            vec![
                "run".to_string(),
                "register_device".to_string(),
                format!("udid:{udid}"),
                format!("name:{device_name}"),
            ],
            self.project_root.clone(),
        )
    }

    /// Fire-and-forget build trigger command for one device.
    pub fn trigger_invocation(&self, udid: &str) -> Invocation {
        Invocation::new(
            self.tool.clone(),
            vec![
                self.platform.clone(),
                self.build_lane.clone(),
                format!("udid:{udid}"),
                "async:true".to_string(),
            ],
            self.project_root.clone(),
        )
    }

    /// Resource bounds for enrollment invocations.
    pub fn register_limits(&self) -> Limits {
        Limits {
            timeout: self.register_timeout,
            max_output_bytes: self.max_tool_output_bytes,
        }
    }

    /// Resource bounds for build trigger invocations.
    pub fn trigger_limits(&self) -> Limits {
        Limits {
            timeout: self.trigger_timeout,
            max_output_bytes: self.max_tool_output_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_invocation_carries_identifier_and_name() {
        let config = GatewayConfig::default();
        let invocation = config.register_invocation("ABCD1234", "Test Phone");
        assert_eq!(invocation.program, "fastlane");
        assert!(invocation.args.contains(&"udid:ABCD1234".to_string()));
        assert!(invocation.args.contains(&"name:Test Phone".to_string()));
        assert_eq!(invocation.working_dir, PathBuf::from(".."));
    }

    #[test]
    fn trigger_invocation_is_fire_and_forget() {
        let config = GatewayConfig::default();
        let invocation = config.trigger_invocation("ABCD1234");
        assert!(invocation.args.contains(&"async:true".to_string()));
        assert!(invocation.args.contains(&"ios".to_string()));
        assert!(invocation.args.contains(&"adhoc".to_string()));
    }

    #[test]
    fn defaults_match_the_operation_bounds() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, 3748);
        assert_eq!(config.register_limits().timeout, Duration::from_secs(30));
        assert_eq!(config.trigger_limits().timeout, Duration::from_secs(60));
        assert_eq!(config.register_limits().max_output_bytes, 10 * 1024 * 1024);
    }
}
