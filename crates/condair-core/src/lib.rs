// condair-core: Hub façade between condair-api and consumers (CLI).

pub mod config;
pub mod error;
pub mod hub;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::HubConfig;
pub use error::CoreError;
pub use hub::{DeviceReading, Hub};

// Re-export API types consumers render directly.
pub use condair_api::{Action, DatapointSnapshot, Device, ParentGroup};
