use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::Lifecycle;
use super::PendingQueues;
use super::RpcClient;
use crate::delivery_queue;
use crate::BackoffPolicy;
use crate::ChainClientConfig;
use crate::ChainParams;
use crate::ChainRpc;
use crate::ConnConfig;
use crate::LivenessConfig;
use crate::NotificationHandlers;
use crate::QueueKind;
use crate::Result;

pub struct RpcClientBuilder {
    chain_params: ChainParams,
    conn_config: ConnConfig,
    liveness: LivenessConfig,
    retry: BackoffPolicy,
}

impl RpcClientBuilder {
    /// Create a new builder with default liveness and retry settings
    pub fn new(
        chain_params: ChainParams,
        conn_config: ConnConfig,
    ) -> Self {
        let defaults = ChainClientConfig::default();
        Self {
            chain_params,
            conn_config,
            liveness: defaults.liveness,
            retry: defaults.retry,
        }
    }

    /// Builder preloaded from a (validated) configuration.
    pub fn from_config(config: ChainClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chain_params: config.chain_params()?,
            conn_config: config.connection,
            liveness: config.liveness,
            retry: config.retry,
        })
    }

    /// Set the idle window after which the node is probed (default: 60s).
    /// Windows beyond `u64::MAX` milliseconds saturate.
    pub fn idle_window(
        mut self,
        window: Duration,
    ) -> Self {
        self.liveness.idle_window_in_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the backoff policy used by `start(_, true)` (default: unlimited)
    pub fn retry_policy(
        mut self,
        policy: BackoffPolicy,
    ) -> Self {
        self.retry = policy;
        self
    }

    /// Build the client, constructing its transport through `connect`.
    ///
    /// `connect` receives the connection configuration and the notification
    /// handlers bound to the new client; the transport must invoke those
    /// handlers, and only those, for every notification it receives.
    pub fn build<R, F>(
        self,
        connect: F,
    ) -> Result<RpcClient<R>>
    where
        R: ChainRpc,
        F: FnOnce(&ConnConfig, NotificationHandlers) -> Result<R>,
    {
        self.liveness.validate()?;
        self.retry.validate()?;

        let quit = CancellationToken::new();
        let (general_tx, general, general_stream) = delivery_queue(QueueKind::General);
        let (voting_tx, voting, voting_stream) = delivery_queue(QueueKind::Voting);
        let handlers = NotificationHandlers::new(general_tx, voting_tx, quit.clone());

        let rpc = connect(&self.conn_config, handlers)?;

        Ok(RpcClient {
            lifecycle: Arc::new(Lifecycle::new(rpc, quit, PendingQueues { general, voting })),
            chain_params: self.chain_params,
            conn_config: self.conn_config,
            liveness: self.liveness,
            retry: self.retry,
            session: ArcSwapOption::empty(),
            notifications: Mutex::new(Some(general_stream)),
            voting_notifications: Mutex::new(Some(voting_stream)),
        })
    }
}
