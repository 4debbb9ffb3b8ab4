// ── Domain model ──
//
// Value types copied out of the SmartHome client on every poll. Consumers
// only ever see these, never client-owned objects.

pub mod ain;
pub mod device;
pub mod snapshot;
pub mod template;

pub use ain::Ain;
pub use device::{Device, PowerMeter};
pub use snapshot::Snapshot;
pub use template::Template;
