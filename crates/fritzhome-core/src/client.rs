// ── SmartHome client contract ──
//
// The coordinator never speaks the hub's HTTP protocol itself. It drives a
// client through this trait, which keeps session handling, challenge/response
// login, and XML parsing out of this crate and lets tests inject fakes.

use crate::error::ClientError;
use crate::model::{Ain, Device, Template};

/// Blocking client for a FRITZ!Box SmartHome hub.
///
/// All methods may block on network I/O. The coordinator and scene
/// adapters only call them from tokio's blocking pool, never from an async
/// task. Implementations must be safe to call from several worker threads
/// at once (`&self` everywhere; use interior mutability for session state).
pub trait SmartHomeClient: Send + Sync + 'static {
    /// (Re-)establish a session with the stored credentials.
    fn login(&self) -> Result<(), ClientError>;

    /// Refresh the client's cached device list from the hub.
    fn update_devices(&self) -> Result<(), ClientError>;

    /// Refresh the client's cached template list from the hub.
    fn update_templates(&self) -> Result<(), ClientError>;

    /// Devices from the last successful `update_devices`.
    fn devices(&self) -> Vec<Device>;

    /// Templates from the last successful `update_templates`.
    fn templates(&self) -> Vec<Template>;

    /// Apply the template with the given AIN.
    fn apply_template(&self, ain: &Ain) -> Result<(), ClientError>;
}
