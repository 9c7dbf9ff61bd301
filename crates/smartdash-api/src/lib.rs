// smartdash-api: Async Rust client for the Smart Solutions IoT monitoring API
//
// One HTTP gateway (`ApiClient`) with per-domain call groups implemented as
// inherent methods in separate modules: auth, devices, sensors, alerts.

pub mod alerts;
pub mod auth;
pub mod client;
pub mod credentials;
pub mod devices;
pub mod error;
pub mod models;
pub mod sensors;
pub mod transport;

pub use client::ApiClient;
pub use credentials::{Anonymous, CredentialSource, StaticCredentials};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
