//! Networked backend of a wallet's chain synchronization: a persistent
//! notification client for a full-node RPC server.
//!
//! The client negotiates network and API version with the node, translates
//! the node's push notifications into [`ChainEvent`]s and republishes them,
//! in order, on two independent [`NotificationStream`]s. Idle connections
//! are probed and a dead node ends the session.

mod chain;
mod client;
mod config;
mod errors;
mod metrics;
mod notify;
mod rpc;
mod utils;

pub use chain::*;
pub use client::*;
pub use config::*;
pub use errors::*;
pub use metrics::*;
pub use notify::*;
pub use rpc::*;

//-----------------------------------------------------------
// Test utils
