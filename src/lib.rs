// Client configuration
pub mod config;

// Wire protocol messages
pub mod protocol;

// Handler table for lifecycle and server-pushed events
pub mod handler;

// Inbound frame decoding and dispatch
pub mod router;

// Exponential backoff policy
pub mod reconnect;

// Connection manager and public client handle
pub mod client;

pub use client::{ActivityStreamClient, ConnectionState};
pub use config::{load_config, ClientConfig};
pub use handler::{DisconnectReason, EventHandlers};
pub use reconnect::ReconnectConfig;
