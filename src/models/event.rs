//! Inbound protocol: events the bridge forwards into the application.

use serde::{Deserialize, Serialize};

use super::permission::PermissionState;

/// Event sent bridge → application. Serialized as `{"tag": "...", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "camelCase")]
pub enum PwaEvent {
    /// Local network interface hint; `true` does not prove the server is reachable.
    ConnectionChanged { online: bool },
    UpdateAvailable,
    InstallAvailable,
    Installed,
    InstalledInBrowser,
    NotificationPermissionChanged { permission: PermissionState },
    /// Serialized `PushSubscription` (endpoint + keys), opaque to this crate.
    PushSubscription { subscription: serde_json::Value },
    PushSubscriptionError { error: String },
    PushUnsubscribed,
    NotificationClicked { url: String },
}

impl PwaEvent {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a tagged event. Unknown tags are rejected.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Message posted by the service worker to a page it controls (or found on click).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "camelCase")]
pub enum WorkerMessage {
    NotificationClicked { url: String },
}

impl WorkerMessage {
    /// Worker messages arrive as structured-clone values; anything that is not
    /// one of ours yields `None`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}
