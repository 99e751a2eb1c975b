//! Notification permission state as reported by the platform.

use serde::{Deserialize, Serialize};

/// Notification permission. `Unsupported` when the host has no Notification API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Default,
    Unsupported,
}

impl PermissionState {
    /// Map the raw `Notification.permission` string. Anything unrecognised is
    /// treated as `Default`, which is what browsers report before asking.
    pub fn from_platform(value: &str) -> Self {
        match value {
            "granted" => PermissionState::Granted,
            "denied" => PermissionState::Denied,
            _ => PermissionState::Default,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}
