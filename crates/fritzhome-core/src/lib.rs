//! Polling coordinator for FRITZ!Box SmartHome hubs.
//!
//! This crate sits between a blocking SmartHome client and a host
//! automation platform:
//!
//! - **[`SmartHomeClient`]**: the contract a hub client implements (login,
//!   device/template refresh, template activation). The wire protocol and
//!   session handling live behind it.
//!
//! - **[`Coordinator`]**: polls the client every 30 seconds on tokio's
//!   blocking pool, rebuilds a [`Snapshot`] of all devices and templates,
//!   and publishes it through a `watch` channel. After a hub reboot it
//!   logs in again once; a rejected login surfaces as
//!   [`CoreError::AuthFailed`], connectivity problems as
//!   [`CoreError::UpdateFailed`].
//!
//! - **[`TemplateScene`]**: exposes one hub template as an activatable
//!   scene that tracks renames and deletions from coordinator updates.
//!
//! - **Domain model** ([`model`]): value types ([`Device`], [`Template`],
//!   [`Ain`]) copied out of the client on every poll.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod scene;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::SmartHomeClient;
pub use config::{DEFAULT_HOST, DEFAULT_UPDATE_INTERVAL, HubConfig};
pub use coordinator::{Coordinator, CoordinatorStatus, PollStatus};
pub use error::{ClientError, CoreError};
pub use model::{Ain, Device, PowerMeter, Snapshot, Template};
pub use scene::{SceneState, TemplateScene, scenes_from_coordinator};
pub use stream::{StatusStream, StatusWatchStream};
