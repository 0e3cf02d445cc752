// condair-api: Async Rust client for the Condair cloud humidifier API

pub mod actions;
pub mod auth;
pub mod client;
pub mod datapoints;
pub mod devices;
pub mod error;
pub mod models;
mod session;
pub mod transport;

pub use client::{CondairClient, DEFAULT_BASE_URL};
pub use datapoints::DatapointSnapshot;
pub use error::Error;
pub use models::{Action, Device, ParentGroup};
pub use transport::TransportConfig;
