//! # Gateway Client Library
//!
//! This crate provides a supervised RPC client for the local agent gateway.
//!
//! ## Overview
//!
//! The client keeps one long-lived WebSocket connection to the gateway and
//! provides:
//!
//! - **Authentication**: challenge/response handshake signed with a device key
//! - **Request Correlation**: concurrent requests multiplexed by id
//! - **Event Delivery**: server-pushed events forwarded in arrival order
//! - **Reconnection**: exponential backoff after any transport failure
//! - **Health Supervision**: periodic probes with an injectable restart action
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      GatewayClient                         │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────┐   │
//! │  │ Connect Loop │  │   Pending    │  │     Event      │   │
//! │  │ + Handshake  │  │   Requests   │  │   Dispatcher   │   │
//! │  └──────────────┘  └──────────────┘  └────────────────┘   │
//! │  ┌────────────────────────┐  ┌─────────────────────────┐  │
//! │  │  Writer Task (per ws)  │  │     Health Monitor      │  │
//! │  └────────────────────────┘  └─────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use gateway_client::{ClientConfig, GatewayClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GatewayClient::new(ClientConfig::new("127.0.0.1", 18789));
//!     client.set_event_handler(|event| println!("{}: {}", event.event, event.payload));
//!     client.start();
//!
//!     client.wait_until_connected(Duration::from_secs(10)).await?;
//!     let sessions = client
//!         .request("sessions.list", serde_json::json!({}))
//!         .await?;
//!     println!("{}", sessions);
//!
//!     client.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`]: Connection manager and request API
//! - [`handshake`]: Building the signed `connect` request
//! - [`pending`]: Table of in-flight requests
//! - [`events`]: Event handler registration and dispatch
//! - [`health`]: Probe loop and restart trigger
//! - [`backoff`]: Reconnect delay state
//! - [`identity`]: Device key persistence
//! - [`config`]: Configuration loading and defaults

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod handshake;
pub mod health;
pub mod identity;
pub mod pending;

// Re-export protocol for convenience
pub use gateway_protocol as protocol;

pub use client::{ConnectionState, GatewayClient, GatewayClientBuilder};
pub use config::{ClientConfig, ClientSettings, Config, ConfigError};
pub use error::{ClientError, Result};
pub use events::{EventHandler, GatewayEvent};
pub use health::{
    HealthMonitor, HealthStatus, Probe, ProbeOutcome, RestartHandler, RestartNotifier,
    RestartReport,
};
pub use identity::{FileIdentityStore, IdentityProvider};
