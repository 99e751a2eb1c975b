//! Outbound protocol: commands the application sends to the bridge.

use serde::{Deserialize, Serialize};

/// Message the page posts to a waiting worker to promote it.
pub const SKIP_WAITING: &str = "SKIP_WAITING";

/// Command sent application → bridge. Serialized as `{"tag": "...", ...fields}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "camelCase")]
pub enum PwaCommand {
    AcceptUpdate,
    RequestInstall,
    RequestNotificationPermission,
    SubscribePush {
        /// Application server key, base64url, padding optional.
        #[serde(rename = "vapidPublicKey")]
        vapid_public_key: String,
    },
    UnsubscribePush,
}

impl PwaCommand {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a tagged command. Unknown tags are rejected.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
