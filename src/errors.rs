//! Chain Notification Client Error Hierarchy
//!
//! Defines the error types surfaced by the notification client, categorized
//! by the layer that produced them:
//! - transport failures (connect, disconnect, RPC round-trips)
//! - protocol negotiation failures (network or API version mismatch)
//! - payload decoding failures
//! - configuration failures

use std::time::Duration;

use config::ConfigError;

use crate::CurrencyNet;
use crate::Semver;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (network, serialization)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Client configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Node protocol negotiation failures detected during start
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    // Network layer
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    // Serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Transport could not establish a connection
    #[error("Connect to {host} failed: {reason}")]
    ConnectFailed { host: String, reason: String },

    /// Caller cancelled the connect attempt
    #[error("Connect to {0} cancelled")]
    Cancelled(String),

    /// Connection dropped or client already shut down
    #[error("Client disconnected")]
    Disconnected,

    /// A remote call returned an error
    #[error("RPC {method} failed: {reason}")]
    RpcFailed { method: &'static str, reason: String },

    /// A single attempt exceeded its deadline
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Liveness probe did not complete in time
    #[error("Timeout waiting for session RPC after {0:?}")]
    ProbeTimeout(Duration),
}

// Serialization is classified separately (decode failures never tear down the session)
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("Bincode serialization failed: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Invalid hash string {0:?}")]
    InvalidHash(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Server is running on a different network than the wallet
    #[error("Mismatched networks (expected: {expected}, server: {actual})")]
    NetworkMismatch {
        expected: CurrencyNet,
        actual: CurrencyNet,
    },

    /// Advertised API version does not satisfy the client requirement
    #[error("Advertised API version {advertised} incompatible with required version {required}")]
    IncompatibleApiVersion { advertised: Semver, required: Semver },
}

impl Error {
    /// Negotiation failures: the transport has been torn down and retrying
    /// against the same server will not help.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Connection-level failures, recoverable by calling start again.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::System(SystemError::Network(_)))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::System(SystemError::Serialization(_)))
    }
}

// ============== Conversion Implementations ============== //
impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Error::System(SystemError::Network(e))
    }
}

impl From<SerializationError> for Error {
    fn from(e: SerializationError) -> Self {
        Error::System(SystemError::Serialization(e))
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        SerializationError::Bincode(err).into()
    }
}
