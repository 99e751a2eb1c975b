//! Browser capabilities the bridge drives, and the signals it listens to.

use async_trait::async_trait;
use std::fmt;

use crate::error::PlatformError;
use crate::models::permission::PermissionState;

/// Options for `PushManager.subscribe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    /// Raw VAPID public key bytes.
    pub application_server_key: Vec<u8>,
}

/// User's answer to the install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

/// Deferred `beforeinstallprompt` event. The adapter must already have called
/// `preventDefault()` on it. Consumed by the single call to [`InstallPrompt::prompt`].
#[async_trait]
pub trait InstallPrompt: Send {
    async fn prompt(self: Box<Self>) -> InstallOutcome;
}

/// Browser events the host adapter forwards to the bridge.
pub enum PlatformSignal {
    Online,
    Offline,
    /// Window `load` finished.
    Loaded,
    /// `visibilitychange` to visible.
    Visible,
    BeforeInstallPrompt(Box<dyn InstallPrompt>),
    /// `appinstalled`.
    AppInstalled,
    /// An installing worker reached the `installed` state.
    WorkerInstalled,
    ControllerChange,
    /// `message` from a service worker, as structured-clone JSON.
    WorkerMessage(serde_json::Value),
}

impl fmt::Debug for PlatformSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformSignal::Online => write!(f, "Online"),
            PlatformSignal::Offline => write!(f, "Offline"),
            PlatformSignal::Loaded => write!(f, "Loaded"),
            PlatformSignal::Visible => write!(f, "Visible"),
            PlatformSignal::BeforeInstallPrompt(_) => write!(f, "BeforeInstallPrompt"),
            PlatformSignal::AppInstalled => write!(f, "AppInstalled"),
            PlatformSignal::WorkerInstalled => write!(f, "WorkerInstalled"),
            PlatformSignal::ControllerChange => write!(f, "ControllerChange"),
            PlatformSignal::WorkerMessage(v) => write!(f, "WorkerMessage({})", v),
        }
    }
}

/// Browser APIs behind the bridge. Capability checks are synchronous; anything
/// that resolves a promise is async.
#[async_trait]
pub trait Platform: Send + Sync {
    /// `document.readyState === "complete"` at install time.
    fn page_loaded(&self) -> bool;

    /// Current `Notification.permission`, `Unsupported` without the API.
    fn notification_permission(&self) -> PermissionState;

    /// Only called when [`Platform::notification_permission`] is not `Unsupported`.
    async fn request_notification_permission(&self) -> PermissionState;

    /// `getInstalledRelatedApps()` reports this app while in a browser tab.
    async fn is_installed_in_browser(&self) -> bool;

    fn supports_service_worker(&self) -> bool;

    async fn register_service_worker(&self, url: &str) -> Result<(), PlatformError>;

    /// `navigator.serviceWorker.controller` is set.
    fn has_controller(&self) -> bool;

    async fn has_waiting_worker(&self) -> bool;

    /// Post to `registration.waiting`. `false` when nothing is waiting.
    async fn post_to_waiting_worker(&self, message: serde_json::Value) -> bool;

    /// `registration.update()`.
    async fn check_for_update(&self) -> Result<(), PlatformError>;

    fn reload(&self);

    /// `PushManager` exists on the registration.
    fn supports_push(&self) -> bool;

    /// Serialized current subscription, if any.
    async fn push_subscription(&self) -> Result<Option<serde_json::Value>, PlatformError>;

    async fn subscribe_push(
        &self,
        options: SubscribeOptions,
    ) -> Result<serde_json::Value, PlatformError>;

    /// Unsubscribe the current subscription. `false` if there was none.
    async fn unsubscribe_push(&self) -> Result<bool, PlatformError>;
}
