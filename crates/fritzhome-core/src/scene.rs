// ── Template scenes ──
//
// Exposes each hub template as an activatable scene. A scene follows the
// coordinator's publications to pick up renames and to notice templates
// deleted on the hub, and forwards activation to the shared client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::coordinator::{Coordinator, CoordinatorStatus};
use crate::error::CoreError;
use crate::model::{Ain, Template};

/// Observable state of a scene, rewritten after every coordinator update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneState {
    pub name: String,
    pub available: bool,
}

/// One hub template exposed as a scene.
///
/// Cheaply cloneable. Call [`attach()`](Self::attach) to start following
/// coordinator updates and [`detach()`](Self::detach) when the host
/// removes the entity.
#[derive(Clone)]
pub struct TemplateScene {
    inner: Arc<SceneInner>,
}

struct SceneInner {
    ain: Ain,
    coordinator: Coordinator,
    /// Whether the template was part of the last published snapshot.
    available_on_last_update: AtomicBool,
    state: watch::Sender<SceneState>,
    listener: Mutex<Option<Listener>>,
}

struct Listener {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl TemplateScene {
    pub fn new(template: &Template, coordinator: Coordinator) -> Self {
        let (state, _) = watch::channel(SceneState {
            name: template.name.clone(),
            available: coordinator.last_update_success(),
        });

        Self {
            inner: Arc::new(SceneInner {
                ain: template.ain.clone(),
                coordinator,
                available_on_last_update: AtomicBool::new(true),
                state,
                listener: Mutex::new(None),
            }),
        }
    }

    pub fn ain(&self) -> &Ain {
        &self.inner.ain
    }

    /// Stable id for the host's entity registry: the template's AIN.
    pub fn unique_id(&self) -> &str {
        self.inner.ain.as_str()
    }

    /// Last known display name. Kept when the template disappears.
    pub fn name(&self) -> String {
        self.inner.state.borrow().name.clone()
    }

    /// Template present in the last snapshot and the last poll succeeded.
    pub fn is_available(&self) -> bool {
        self.inner.available_on_last_update.load(Ordering::Acquire)
            && self.inner.coordinator.last_update_success()
    }

    /// Subscribe to state writes.
    pub fn state(&self) -> watch::Receiver<SceneState> {
        self.inner.state.subscribe()
    }

    /// Apply the template on the hub.
    ///
    /// Runs the blocking client call on tokio's blocking pool. Not retried;
    /// client failures are returned as [`CoreError::Client`].
    pub async fn activate(&self) -> Result<(), CoreError> {
        let client = Arc::clone(self.inner.coordinator.client());
        let ain = self.inner.ain.clone();
        debug!(ain = %ain, "activating template scene");

        tokio::task::spawn_blocking(move || client.apply_template(&ain)).await??;
        Ok(())
    }

    /// React to a coordinator publication: track renames and deletions,
    /// then write the scene state.
    pub fn handle_coordinator_update(&self, status: &CoordinatorStatus) {
        self.inner.apply(status);
    }

    // ── Registration ─────────────────────────────────────────────

    /// Start following coordinator updates.
    ///
    /// The current coordinator status is applied right away. The listener
    /// ends on [`detach()`](Self::detach), when every handle to this scene is
    /// dropped, or when the coordinator goes away.
    pub async fn attach(&self) {
        let mut listener = self.inner.listener.lock().await;
        if listener.as_ref().is_some_and(|l| !l.handle.is_finished()) {
            return;
        }

        let mut rx = self.inner.coordinator.subscribe();
        let current = rx.borrow_and_update().clone();
        self.inner.apply(&current);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(follow_updates(
            Arc::downgrade(&self.inner),
            rx,
            cancel.clone(),
        ));
        *listener = Some(Listener { handle, cancel });
    }

    /// Stop following coordinator updates.
    pub async fn detach(&self) {
        let listener = self.inner.listener.lock().await.take();
        if let Some(listener) = listener {
            listener.cancel.cancel();
            let _ = listener.handle.await;
        }
    }
}

impl SceneInner {
    fn apply(&self, status: &CoordinatorStatus) {
        let template = status.snapshot.template(&self.ain);
        if template.is_none() {
            debug!(ain = %self.ain, "template no longer reported by hub");
        }
        let present = template.is_some();
        self.available_on_last_update.store(present, Ordering::Release);

        let name = template.map(|t| t.name.clone());
        let available = present && status.last_update_success();
        self.state.send_modify(|state| {
            if let Some(name) = name {
                state.name = name;
            }
            state.available = available;
        });
    }
}

async fn follow_updates(
    scene: Weak<SceneInner>,
    mut rx: watch::Receiver<CoordinatorStatus>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(scene) = scene.upgrade() else { break };
                let status = rx.borrow_and_update().clone();
                scene.apply(&status);
            }
        }
    }
}

/// One scene per template in the coordinator's current snapshot.
///
/// Call after the coordinator's first successful refresh.
pub fn scenes_from_coordinator(coordinator: &Coordinator) -> Vec<TemplateScene> {
    coordinator
        .data()
        .templates()
        .map(|template| TemplateScene::new(template, coordinator.clone()))
        .collect()
}
