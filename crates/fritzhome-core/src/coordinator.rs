// ── Data update coordinator ──
//
// Polls one hub on a fixed cadence, turns the client's device and template
// lists into an immutable `Snapshot`, and publishes it together with the
// poll outcome through a `watch` channel. Handles the reboot case where
// the hub drops the session: one re-login, one retry.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use strum::Display;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::SmartHomeClient;
use crate::config::HubConfig;
use crate::error::{ClientError, CoreError};
use crate::model::Snapshot;
use crate::stream::StatusStream;

// ── Poll status ──────────────────────────────────────────────────

/// Outcome of the most recent refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollStatus {
    /// No refresh has completed yet.
    Pending,
    Ok,
    /// Last refresh failed; the next poll will try again.
    Failed,
    /// Re-login failed. Polling is stopped until the coordinator is
    /// started again with working credentials.
    ReauthRequired,
}

/// What the coordinator publishes after every refresh attempt.
///
/// On failure `snapshot` still holds the last good data so observers can
/// keep displaying it while reporting themselves unavailable.
#[derive(Debug, Clone)]
pub struct CoordinatorStatus {
    pub snapshot: Arc<Snapshot>,
    pub status: PollStatus,
    /// Completion time of the last successful refresh.
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl CoordinatorStatus {
    fn initial() -> Self {
        Self {
            snapshot: Arc::new(Snapshot::empty()),
            status: PollStatus::Pending,
            last_refreshed: None,
        }
    }

    pub fn last_update_success(&self) -> bool {
        self.status == PollStatus::Ok
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// Polling coordinator for one hub.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. [`start()`](Self::start)
/// performs the first refresh and spawns the periodic refresh task;
/// [`shutdown()`](Self::shutdown) stops it again.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: HubConfig,
    client: Arc<dyn SmartHomeClient>,
    state: watch::Sender<CoordinatorStatus>,
    /// Held by the blocking fetch job, so cycles never overlap even when
    /// the caller of `refresh()` stops waiting.
    refresh_lock: Arc<Mutex<()>>,
    task: Mutex<Option<RefreshTask>>,
}

struct RefreshTask {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Create a coordinator. Does no I/O -- call [`start()`](Self::start)
    /// or [`refresh()`](Self::refresh).
    pub fn new(client: Arc<dyn SmartHomeClient>, config: HubConfig) -> Self {
        let (state, _) = watch::channel(CoordinatorStatus::initial());

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                state,
                refresh_lock: Arc::new(Mutex::new(())),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    /// The shared client handle.
    pub fn client(&self) -> &Arc<dyn SmartHomeClient> {
        &self.inner.client
    }

    /// URL of the hub's web interface, for linking from the host UI.
    pub fn configuration_url(&self) -> Option<url::Url> {
        self.inner.config.configuration_url().ok()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first refresh and spawn the periodic refresh task.
    ///
    /// Errors from the first refresh are returned as-is so the host can
    /// tell "not ready yet" ([`CoreError::is_retryable`]) from "needs new
    /// credentials" ([`CoreError::requires_reauth`]); no task is spawned in
    /// that case. A zero `update_interval` disables periodic polling.
    /// Calling `start()` while the task is running is a no-op.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut task = self.inner.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return Ok(());
        }

        self.refresh().await?;

        let period = self.inner.config.update_interval;
        if period.is_zero() {
            info!(hub = %self.inner.config.name, "periodic polling disabled");
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(refresh_task(self.clone(), cancel.clone()));
        *task = Some(RefreshTask { handle, cancel });

        info!(
            hub = %self.inner.config.name,
            interval_secs = period.as_secs(),
            "coordinator started"
        );
        Ok(())
    }

    /// Stop the periodic refresh task and wait for it to finish.
    ///
    /// An in-flight refresh is allowed to complete. The last published
    /// status stays available to observers.
    pub async fn shutdown(&self) {
        let task = self.inner.task.lock().await.take();
        if let Some(task) = task {
            task.cancel.cancel();
            let _ = task.handle.await;
        }
        debug!(hub = %self.inner.config.name, "coordinator stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.inner
            .task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch a fresh snapshot from the hub and publish it.
    ///
    /// The client calls run on tokio's blocking pool. Concurrent callers
    /// are serialized: a second refresh waits for the first to finish.
    /// Every attempt publishes a new [`CoordinatorStatus`], including
    /// failed ones. Dropping the returned future does not abort a fetch
    /// already handed to the blocking pool; it still completes, publishes
    /// its outcome and holds off the next refresh until then.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let guard = Arc::clone(&self.inner.refresh_lock).lock_owned().await;
        let started = Instant::now();

        let coordinator = self.clone();
        let job = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let result = fetch_snapshot(coordinator.inner.client.as_ref());
            coordinator.publish(result, started)
        });

        match job.await {
            Ok(result) => result,
            Err(e) => {
                let err = CoreError::from(e);
                self.publish_failure(&err);
                Err(err)
            }
        }
    }

    fn publish(
        &self,
        result: Result<Snapshot, CoreError>,
        started: Instant,
    ) -> Result<Arc<Snapshot>, CoreError> {
        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.publish_success(Arc::clone(&snapshot), started);
                Ok(snapshot)
            }
            Err(err) => {
                self.publish_failure(&err);
                Err(err)
            }
        }
    }

    fn publish_success(&self, snapshot: Arc<Snapshot>, started: Instant) {
        let name = &self.inner.config.name;
        let previous = self.inner.state.borrow().status;
        if matches!(previous, PollStatus::Failed | PollStatus::ReauthRequired) {
            info!(hub = %name, "fetching hub data recovered");
        }
        debug!(
            hub = %name,
            devices = snapshot.device_count(),
            templates = snapshot.template_count(),
            elapsed = ?started.elapsed(),
            "finished fetching hub data"
        );

        self.inner.state.send_replace(CoordinatorStatus {
            snapshot,
            status: PollStatus::Ok,
            last_refreshed: Some(Utc::now()),
        });
    }

    fn publish_failure(&self, err: &CoreError) {
        let name = &self.inner.config.name;
        let previous = self.inner.state.borrow().status;
        let status = if err.requires_reauth() {
            error!(hub = %name, error = %err, "hub rejected credentials");
            PollStatus::ReauthRequired
        } else {
            if matches!(previous, PollStatus::Pending | PollStatus::Ok) {
                error!(hub = %name, error = %err, "error fetching hub data");
            } else {
                debug!(hub = %name, error = %err, "error fetching hub data");
            }
            PollStatus::Failed
        };

        self.inner.state.send_modify(|s| s.status = status);
    }

    // ── State observation ────────────────────────────────────────

    /// The latest published snapshot (last good data after a failure).
    pub fn data(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.state.borrow().snapshot)
    }

    pub fn status(&self) -> PollStatus {
        self.inner.state.borrow().status
    }

    pub fn last_update_success(&self) -> bool {
        self.status() == PollStatus::Ok
    }

    /// Subscribe to status publications.
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorStatus> {
        self.inner.state.subscribe()
    }

    /// Subscribe as a [`StatusStream`].
    pub fn updates(&self) -> StatusStream {
        StatusStream::new(self.subscribe())
    }
}

// ── Fetch policy ─────────────────────────────────────────────────

/// One blocking fetch cycle against the client.
///
/// Connection failures are retryable and never trigger a login. HTTP
/// failures get one re-login and one retry. A rejected login is terminal;
/// a login that fails for any other reason, or a failed retry, is retryable.
fn fetch_snapshot(client: &dyn SmartHomeClient) -> Result<Snapshot, CoreError> {
    match update_all(client) {
        Ok(()) => {}
        Err(source) if source.is_connection() => {
            return Err(CoreError::UpdateFailed { source });
        }
        Err(err) if err.is_http() => {
            debug!(error = %err, "hub rejected request, logging in again");
            client.login().map_err(|source| {
                if matches!(source, ClientError::Login(_)) {
                    CoreError::AuthFailed { source }
                } else {
                    CoreError::UpdateFailed { source }
                }
            })?;
            update_all(client).map_err(|source| CoreError::UpdateFailed { source })?;
        }
        Err(err) => return Err(CoreError::Client(err)),
    }

    Ok(Snapshot::from_poll(client.devices(), client.templates()))
}

fn update_all(client: &dyn SmartHomeClient) -> Result<(), ClientError> {
    client.update_devices()?;
    client.update_templates()
}

// ── Background task ──────────────────────────────────────────────

/// Periodically refresh until cancelled or credentials are rejected.
async fn refresh_task(coordinator: Coordinator, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(coordinator.inner.config.update_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match coordinator.refresh().await {
                    Ok(_) => {}
                    Err(e) if e.requires_reauth() => {
                        warn!(
                            hub = %coordinator.inner.config.name,
                            "polling stopped until credentials are updated"
                        );
                        break;
                    }
                    Err(e) => debug!(error = %e, "periodic refresh failed"),
                }
            }
        }
    }
}
