//! Device enrollment types.

use serde::{Deserialize, Serialize};

/// Request body for device enrollment.
///
/// The identifier is treated as an opaque key; the gateway only checks that
/// it is present and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    /// Unique device token of the installation target.
    #[serde(default)]
    pub udid: Option<String>,
    /// Optional human-readable device name.
    #[serde(default)]
    pub device_name: Option<String>,
}

impl RegisterDeviceRequest {
    pub fn new(udid: impl Into<String>) -> Self {
        Self {
            udid: Some(udid.into()),
            device_name: None,
        }
    }
}

/// Response body for device enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceResponse {
    pub success: bool,
    /// The identifier that was enrolled.
    pub udid: String,
    /// True when the device was already known before this call.
    #[serde(default)]
    pub already_registered: bool,
    /// Raw enrollment tool output, kept for operator diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_uses_camel_case_on_the_wire() {
        let response = RegisterDeviceResponse {
            success: true,
            udid: "ABCD1234".to_string(),
            already_registered: true,
            output: None,
        };
        let json = serde_json::to_string(&response).expect("Couldn't serialize");
        assert!(json.contains("\"alreadyRegistered\":true"));
        assert!(!json.contains("output"));
    }

    #[test]
    fn request_fields_are_optional() {
        let request: RegisterDeviceRequest =
            serde_json::from_str("{}").expect("Couldn't deserialize");
        assert!(request.udid.is_none());
        assert!(request.device_name.is_none());

        let request: RegisterDeviceRequest =
            serde_json::from_str(r#"{"udid":"X","deviceName":"Test Phone"}"#)
                .expect("Couldn't deserialize");
        assert_eq!(request.udid.as_deref(), Some("X"));
        assert_eq!(request.device_name.as_deref(), Some("Test Phone"));
    }
}
