//! Persistent notification client for a wallet's full-node RPC server.
//!
//! Provides the externally visible entry point of the crate:
//! - [`RpcClient`] - Session lifecycle: start, stop, wait for shutdown
//! - [`RpcClientBuilder`] - Configurable client construction
//!
//! # Basic Usage
//! ```ignore
//! use chain_notify::{ChainParams, ConnConfig, RpcClientBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = RpcClientBuilder::new(ChainParams::testnet(), ConnConfig::default())
//!     .build(|conn, handlers| MyTransport::new(conn, handlers))?;
//!
//! let mut general = client.notifications().unwrap();
//! let mut voting = client.voting_notifications().unwrap();
//!
//! client.start(&CancellationToken::new(), true).await?;
//!
//! while let Some(event) = general.recv().await {
//!     println!("{:?}", event);
//! }
//! client.wait_for_shutdown().await;
//! ```

mod builder;
mod lifecycle;

pub use builder::*;
pub(crate) use lifecycle::*;


use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::utils::async_task::task_with_timeout_and_exponential_backoff;
use crate::semver_compatible;
use crate::BackoffPolicy;
use crate::ChainParams;
use crate::ChainRpc;
use crate::ConnConfig;
use crate::CurrencyNet;
use crate::Error;
use crate::LivenessConfig;
use crate::NetworkError;
use crate::NotificationStream;
use crate::ProtocolError;
use crate::Result;
use crate::Semver;
use crate::CHAIN_SERVER_API_KEY;
use crate::REQUIRED_CHAIN_SERVER_API;

/// What was negotiated with the node during start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub net: CurrencyNet,
    pub api_version: Semver,
}

/// Persistent client connection to a node RPC server, republishing its
/// notifications in order on a general and a voting stream.
///
/// Created through [`RpcClientBuilder`]. Nothing is connected until
/// [`start`](RpcClient::start).
pub struct RpcClient<R: ChainRpc> {
    lifecycle: Arc<Lifecycle<R>>,
    chain_params: ChainParams,
    conn_config: ConnConfig,
    liveness: LivenessConfig,
    retry: BackoffPolicy,
    session: ArcSwapOption<SessionInfo>,
    notifications: Mutex<Option<NotificationStream>>,
    voting_notifications: Mutex<Option<NotificationStream>>,
}

impl<R: ChainRpc> RpcClient<R> {
    /// Establish the connection and negotiate the session.
    ///
    /// With `retry` set, an unreachable node is retried until it answers,
    /// `ctx` is cancelled or the client is stopped. The node must serve the
    /// wallet's network and advertise a compatible API version; otherwise the
    /// transport is disconnected and a protocol error returned. Only then are
    /// the dispatch loops launched.
    pub async fn start(
        &self,
        ctx: &CancellationToken,
        retry: bool,
    ) -> Result<()> {
        let host = self.conn_config.host.clone();
        if self.lifecycle.is_started() {
            return Err(Error::Fatal("chain client already started".to_string()));
        }

        tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(NetworkError::Cancelled(host).into()),
            _ = self.lifecycle.quit().cancelled() => return Err(NetworkError::Disconnected.into()),
            connected = self.connect(retry) => connected?,
        }
        info!("Established connection to RPC server {}", host);

        let negotiated: Result<SessionInfo> = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(NetworkError::Cancelled(host.clone()).into()),
            _ = self.lifecycle.quit().cancelled() => Err(NetworkError::Disconnected.into()),
            negotiated = self.negotiate() => negotiated,
        };
        let info = match negotiated {
            Ok(info) => info,
            Err(e) => {
                error!("Session negotiation with RPC server {} failed: {}", host, e);
                self.lifecycle.rpc().disconnect();
                return Err(e);
            }
        };

        if let Err(e) = self.lifecycle.activate(self.liveness.idle_window()) {
            self.lifecycle.rpc().disconnect();
            return Err(e);
        }
        self.session.store(Some(Arc::new(info)));
        info!(
            "chain client started on {} (node API {})",
            info.net, info.api_version
        );
        Ok(())
    }

    /// Disconnect the client and signal every task started by `start` to
    /// exit. Safe to call repeatedly and concurrently.
    pub fn stop(&self) {
        self.lifecycle.stop();
    }

    /// Blocks until the transport has disconnected and both dispatch loops
    /// have exited. No notification handler fires after this returns.
    pub async fn wait_for_shutdown(&self) {
        self.lifecycle.wait_for_shutdown().await;
    }

    /// General notifications: blocks, transactions, reorganizations, missed
    /// tickets and stake difficulty. Handed out once.
    ///
    /// The stream must be read continually; unread notifications are queued
    /// without bound.
    pub fn notifications(&self) -> Option<NotificationStream> {
        self.notifications.lock().take()
    }

    /// Winning ticket notifications. Handed out once.
    ///
    /// The stream must be read continually; unread notifications are queued
    /// without bound.
    pub fn voting_notifications(&self) -> Option<NotificationStream> {
        self.voting_notifications.lock().take()
    }

    pub fn is_started(&self) -> bool {
        self.lifecycle.is_started()
    }

    pub fn is_stopped(&self) -> bool {
        self.lifecycle.is_stopped()
    }

    /// Negotiated network and API version, once started.
    pub fn session_info(&self) -> Option<SessionInfo> {
        self.session.load().as_deref().copied()
    }

    pub fn chain_params(&self) -> &ChainParams {
        &self.chain_params
    }

    pub fn conn_config(&self) -> &ConnConfig {
        &self.conn_config
    }

    /// Underlying transport, for plain RPC calls.
    pub fn rpc(&self) -> &R {
        self.lifecycle.rpc()
    }

    /// Build an HTTP POST mode client against the same node.
    pub fn post_client<P, F>(
        &self,
        build: F,
    ) -> Result<P>
    where
        F: FnOnce(&ConnConfig) -> Result<P>,
    {
        build(&self.conn_config.post_mode()).map_err(|e| {
            error!("chain.post_client: {}", e);
            e
        })
    }

    async fn connect(
        &self,
        retry: bool,
    ) -> Result<()> {
        let policy = if retry {
            self.retry
        } else {
            BackoffPolicy {
                max_retries: 1,
                ..self.retry
            }
        };
        let rpc = self.lifecycle.rpc();

        task_with_timeout_and_exponential_backoff(|| rpc.connect(), policy)
            .await
            .map_err(|e| {
                NetworkError::ConnectFailed {
                    host: self.conn_config.host.clone(),
                    reason: e.to_string(),
                }
                .into()
            })
    }

    async fn negotiate(&self) -> Result<SessionInfo> {
        let rpc = self.lifecycle.rpc();

        // Verify that the server is running on the expected network.
        let net = rpc.get_current_net().await?;
        if net != self.chain_params.net {
            return Err(ProtocolError::NetworkMismatch {
                expected: self.chain_params.net,
                actual: net,
            }
            .into());
        }

        // Ensure the RPC server has a compatible API version.
        let advertised = match rpc.version().await {
            Ok(versions) => versions
                .get(CHAIN_SERVER_API_KEY)
                .map(|v| v.semver())
                .unwrap_or_default(),
            Err(e) => {
                warn!("version RPC failed: {}", e);
                Semver::default()
            }
        };
        if !semver_compatible(REQUIRED_CHAIN_SERVER_API, advertised) {
            return Err(ProtocolError::IncompatibleApiVersion {
                advertised,
                required: REQUIRED_CHAIN_SERVER_API,
            }
            .into());
        }

        Ok(SessionInfo {
            net,
            api_version: advertised,
        })
    }
}
