//! Event bridge: browser PWA signals in, application commands out.
//!
//! [`install`] spawns one task that owns the bridge state (retained install
//! prompt, reload guard) and reacts to three sources: platform signals,
//! application commands and the hourly update timer. Calls that wait on the
//! browser run in their own tasks and report back through the inbound
//! channel when they resolve.

pub mod platform;

pub use platform::{InstallOutcome, InstallPrompt, Platform, PlatformSignal, SubscribeOptions};

use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::models::command::{PwaCommand, SKIP_WAITING};
use crate::models::event::{PwaEvent, WorkerMessage};
use crate::models::permission::PermissionState;
use crate::services::vapid::decode_application_server_key;

/// Period of the background `registration.update()` poll.
pub const UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Wiring for [`install`].
pub struct BridgeOptions {
    /// Events to the application.
    pub inbound: mpsc::UnboundedSender<PwaEvent>,
    /// Commands from the application.
    pub outbound: mpsc::UnboundedReceiver<PwaCommand>,
    /// Browser events from the host adapter.
    pub signals: mpsc::UnboundedReceiver<PlatformSignal>,
    pub service_worker_url: String,
}

/// Start the bridge. Installing twice against the same platform registers
/// twice; callers must avoid that.
pub fn install<P: Platform + 'static>(platform: Arc<P>, options: BridgeOptions) -> JoinHandle<()> {
    let BridgeOptions {
        inbound,
        outbound,
        signals,
        service_worker_url,
    } = options;

    let bridge = Bridge {
        platform,
        inbound: Inbound(inbound),
        service_worker_url,
        registration_started: false,
        registered: Arc::new(AtomicBool::new(false)),
        deferred_prompt: None,
        reloading: false,
    };
    tokio::spawn(bridge.run(outbound, signals))
}

#[derive(Clone)]
struct Inbound(mpsc::UnboundedSender<PwaEvent>);

impl Inbound {
    fn emit(&self, event: PwaEvent) {
        debug!(?event, "emit");
        if self.0.send(event).is_err() {
            warn!("inbound channel closed, event dropped");
        }
    }
}

struct Bridge<P> {
    platform: Arc<P>,
    inbound: Inbound,
    service_worker_url: String,
    registration_started: bool,
    /// Set by the registration task once `register()` resolved.
    registered: Arc<AtomicBool>,
    /// Single-use; taken on `RequestInstall`.
    deferred_prompt: Option<Box<dyn InstallPrompt>>,
    reloading: bool,
}

impl<P: Platform + 'static> Bridge<P> {
    async fn run(
        mut self,
        mut outbound: mpsc::UnboundedReceiver<PwaCommand>,
        mut signals: mpsc::UnboundedReceiver<PlatformSignal>,
    ) {
        self.start();

        let mut update_timer =
            time::interval_at(Instant::now() + UPDATE_CHECK_INTERVAL, UPDATE_CHECK_INTERVAL);
        update_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut commands_open = true;
        let mut signals_open = true;
        while commands_open || signals_open {
            tokio::select! {
                command = outbound.recv(), if commands_open => match command {
                    Some(command) => self.handle_command(command),
                    None => commands_open = false,
                },
                signal = signals.recv(), if signals_open => match signal {
                    Some(signal) => self.handle_signal(signal),
                    None => signals_open = false,
                },
                _ = update_timer.tick() => self.check_for_update("interval"),
            }
        }
        info!("bridge stopped");
    }

    fn start(&mut self) {
        self.inbound.emit(PwaEvent::NotificationPermissionChanged {
            permission: self.platform.notification_permission(),
        });

        let platform = self.platform.clone();
        let inbound = self.inbound.clone();
        tokio::spawn(async move {
            if platform.is_installed_in_browser().await {
                inbound.emit(PwaEvent::InstalledInBrowser);
            }
        });

        if self.platform.page_loaded() {
            self.register();
        }
    }

    fn register(&mut self) {
        if self.registration_started {
            return;
        }
        self.registration_started = true;
        if !self.platform.supports_service_worker() {
            debug!("service workers unsupported, skipping registration");
            return;
        }

        let platform = self.platform.clone();
        let inbound = self.inbound.clone();
        let registered = self.registered.clone();
        let url = self.service_worker_url.clone();
        tokio::spawn(async move {
            if let Err(e) = platform.register_service_worker(&url).await {
                warn!(url = %url, error = %e, "service worker registration failed");
                return;
            }
            registered.store(true, Ordering::SeqCst);
            info!(url = %url, "service worker registered");

            // Tab reopened after an update was already installed.
            if platform.has_waiting_worker().await {
                inbound.emit(PwaEvent::UpdateAvailable);
            }

            if platform.supports_push() {
                match platform.push_subscription().await {
                    Ok(Some(subscription)) => {
                        inbound.emit(PwaEvent::PushSubscription { subscription })
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "reading push subscription failed"),
                }
            }
        });
    }

    fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    fn check_for_update(&self, trigger: &'static str) {
        if !self.is_registered() {
            return;
        }
        debug!(trigger, "checking for service worker update");
        let platform = self.platform.clone();
        tokio::spawn(async move {
            if let Err(e) = platform.check_for_update().await {
                warn!(trigger, error = %e, "update check failed");
            }
        });
    }

    fn handle_signal(&mut self, signal: PlatformSignal) {
        debug!(?signal, "signal");
        match signal {
            PlatformSignal::Online => {
                self.inbound.emit(PwaEvent::ConnectionChanged { online: true })
            }
            PlatformSignal::Offline => {
                self.inbound.emit(PwaEvent::ConnectionChanged { online: false })
            }
            PlatformSignal::Loaded => self.register(),
            PlatformSignal::Visible => self.check_for_update("visible"),
            PlatformSignal::BeforeInstallPrompt(prompt) => {
                self.deferred_prompt = Some(prompt);
                self.inbound.emit(PwaEvent::InstallAvailable);
            }
            PlatformSignal::AppInstalled => {
                self.deferred_prompt = None;
                self.inbound.emit(PwaEvent::Installed);
            }
            PlatformSignal::WorkerInstalled => {
                // Without a controller this is the first install, not an update.
                if self.platform.has_controller() {
                    self.inbound.emit(PwaEvent::UpdateAvailable);
                }
            }
            PlatformSignal::ControllerChange => {
                if !self.reloading {
                    self.reloading = true;
                    info!("controller changed, reloading");
                    self.platform.reload();
                }
            }
            PlatformSignal::WorkerMessage(value) => match WorkerMessage::from_value(&value) {
                Some(WorkerMessage::NotificationClicked { url }) => {
                    self.inbound.emit(PwaEvent::NotificationClicked { url })
                }
                None => debug!(message = %value, "ignoring worker message"),
            },
        }
    }

    fn handle_command(&mut self, command: PwaCommand) {
        debug!(?command, "command");
        match command {
            PwaCommand::AcceptUpdate => {
                let platform = self.platform.clone();
                tokio::spawn(async move {
                    if !platform.post_to_waiting_worker(json!(SKIP_WAITING)).await {
                        debug!("no waiting worker to promote");
                    }
                });
            }
            PwaCommand::RequestInstall => match self.deferred_prompt.take() {
                Some(prompt) => {
                    tokio::spawn(async move {
                        let outcome = prompt.prompt().await;
                        info!(?outcome, "install prompt resolved");
                    });
                }
                None => debug!("no deferred install prompt"),
            },
            PwaCommand::RequestNotificationPermission => {
                if self.platform.notification_permission() == PermissionState::Unsupported {
                    self.inbound.emit(PwaEvent::NotificationPermissionChanged {
                        permission: PermissionState::Unsupported,
                    });
                    return;
                }
                let platform = self.platform.clone();
                let inbound = self.inbound.clone();
                tokio::spawn(async move {
                    let permission = platform.request_notification_permission().await;
                    inbound.emit(PwaEvent::NotificationPermissionChanged { permission });
                });
            }
            PwaCommand::SubscribePush { vapid_public_key } => {
                if !self.is_registered() || !self.platform.supports_push() {
                    debug!("push unavailable, ignoring subscribe");
                    return;
                }
                let key = match decode_application_server_key(&vapid_public_key) {
                    Ok(key) => key,
                    Err(e) => {
                        self.inbound.emit(PwaEvent::PushSubscriptionError {
                            error: format!("invalid VAPID public key: {}", e),
                        });
                        return;
                    }
                };
                let platform = self.platform.clone();
                let inbound = self.inbound.clone();
                tokio::spawn(async move {
                    let options = SubscribeOptions {
                        user_visible_only: true,
                        application_server_key: key,
                    };
                    match platform.subscribe_push(options).await {
                        Ok(subscription) => {
                            inbound.emit(PwaEvent::PushSubscription { subscription })
                        }
                        Err(e) => {
                            warn!(error = %e, "push subscription failed");
                            inbound.emit(PwaEvent::PushSubscriptionError { error: e.to_string() });
                        }
                    }
                });
            }
            PwaCommand::UnsubscribePush => {
                if !self.is_registered() || !self.platform.supports_push() {
                    return;
                }
                let platform = self.platform.clone();
                let inbound = self.inbound.clone();
                tokio::spawn(async move {
                    match platform.push_subscription().await {
                        Ok(Some(_)) => match platform.unsubscribe_push().await {
                            Ok(true) => inbound.emit(PwaEvent::PushUnsubscribed),
                            Ok(false) => debug!("subscription vanished before unsubscribe"),
                            Err(e) => warn!(error = %e, "push unsubscribe failed"),
                        },
                        Ok(None) => debug!("no push subscription to remove"),
                        Err(e) => warn!(error = %e, "reading push subscription failed"),
                    }
                });
            }
        }
    }
}
