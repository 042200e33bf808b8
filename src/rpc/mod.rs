//! Transport collaborator seam.
//!
//! The notification client does not speak the node wire protocol itself.
//! A transport implementing [`ChainRpc`] performs the network calls and
//! invokes the [`NotificationHandlers`](crate::NotificationHandlers) it was
//! constructed with whenever the node pushes a notification.

use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use tonic::async_trait;

use crate::CurrencyNet;
use crate::Result;
use crate::Semver;

/// One entry of the node's `version` RPC result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResult {
    pub version_string: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub prerelease: String,
    pub build_metadata: String,
}

impl VersionResult {
    pub fn semver(&self) -> Semver {
        Semver::new(self.major, self.minor, self.patch)
    }
}

impl From<Semver> for VersionResult {
    fn from(v: Semver) -> Self {
        Self {
            version_string: v.to_string(),
            major: v.major,
            minor: v.minor,
            patch: v.patch,
            ..Default::default()
        }
    }
}

/// Result of the side-effect free `session` RPC used for liveness probing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub session_id: u64,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChainRpc: Send + Sync + 'static {
    /// Establish the underlying connection. A single attempt; retrying is
    /// driven by the caller.
    async fn connect(&self) -> Result<()>;

    /// Network the node is serving.
    async fn get_current_net(&self) -> Result<CurrencyNet>;

    /// API versions advertised by the node, keyed by component.
    async fn version(&self) -> Result<HashMap<String, VersionResult>>;

    /// No-op request confirming the node is reachable.
    async fn session(&self) -> Result<SessionResult>;

    /// Drop the connection without shutting the transport down.
    fn disconnect(&self);

    /// Begin tearing the transport down. Must not block and must tolerate
    /// repeated calls.
    fn shutdown(&self);

    /// Resolves once the transport has fully disconnected and will invoke no
    /// further notification handlers.
    async fn wait_for_shutdown(&self);
}
