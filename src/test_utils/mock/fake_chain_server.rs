use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tonic::async_trait;

use super::super::api_versions;
use super::super::test_chain_params;
use crate::ChainRpc;
use crate::CurrencyNet;
use crate::Error;
use crate::NetworkError;
use crate::NotificationHandlers;
use crate::Result;
use crate::RpcClient;
use crate::RpcClientBuilder;
use crate::SessionResult;
use crate::VersionResult;

/// In-memory node with scripted answers and call counters.
pub struct FakeChainServer {
    net: AtomicU32,
    versions: Mutex<Option<HashMap<String, VersionResult>>>,
    /// Connect attempts that fail before one succeeds
    connect_failures: AtomicUsize,
    /// Delay before answering `session`
    session_delay: Mutex<Option<Duration>>,
    session_fails: AtomicBool,
    /// `get_current_net` never answers
    net_stalls: AtomicBool,
    shutdown_signal: CancellationToken,

    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub sessions: AtomicUsize,
}

impl Default for FakeChainServer {
    fn default() -> Self {
        Self {
            net: AtomicU32::new(test_chain_params().net.0),
            versions: Mutex::new(Some(api_versions(5, 2, 3))),
            connect_failures: AtomicUsize::new(0),
            session_delay: Mutex::new(None),
            session_fails: AtomicBool::new(false),
            net_stalls: AtomicBool::new(false),
            shutdown_signal: CancellationToken::new(),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            sessions: AtomicUsize::new(0),
        }
    }
}

impl FakeChainServer {
    pub fn with_net(
        self,
        net: CurrencyNet,
    ) -> Self {
        self.set_net(net);
        self
    }

    pub fn with_api_version(
        self,
        major: u32,
        minor: u32,
        patch: u32,
    ) -> Self {
        *self.versions.lock() = Some(api_versions(major, minor, patch));
        self
    }

    /// `version` RPC fails
    pub fn without_version(self) -> Self {
        *self.versions.lock() = None;
        self
    }

    pub fn with_connect_failures(
        self,
        failures: usize,
    ) -> Self {
        self.connect_failures.store(failures, Ordering::SeqCst);
        self
    }

    pub fn with_session_delay(
        self,
        delay: Duration,
    ) -> Self {
        *self.session_delay.lock() = Some(delay);
        self
    }

    pub fn with_failing_session(self) -> Self {
        self.session_fails.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_stalled_net(self) -> Self {
        self.net_stalls.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_net(
        &self,
        net: CurrencyNet,
    ) {
        self.net.store(net.0, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainRpc for FakeChainServer {
    async fn connect(&self) -> Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let remaining = self.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.connect_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(NetworkError::RpcFailed {
                method: "connect",
                reason: "connection refused".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn get_current_net(&self) -> Result<CurrencyNet> {
        if self.net_stalls.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(CurrencyNet(self.net.load(Ordering::SeqCst)))
    }

    async fn version(&self) -> Result<HashMap<String, VersionResult>> {
        self.versions.lock().clone().ok_or_else(|| {
            Error::from(NetworkError::RpcFailed {
                method: "version",
                reason: "method not found".to_string(),
            })
        })
    }

    async fn session(&self) -> Result<SessionResult> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        let delay = *self.session_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.session_fails.load(Ordering::SeqCst) {
            return Err(NetworkError::Disconnected.into());
        }
        Ok(SessionResult { session_id: 7 })
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.shutdown_signal.cancel();
    }

    async fn wait_for_shutdown(&self) {
        self.shutdown_signal.cancelled().await;
    }
}

/// Client over `server` plus a clone of the handlers given to the transport.
pub fn fake_client(
    server: FakeChainServer,
    idle_window: Duration,
) -> (RpcClient<FakeChainServer>, NotificationHandlers) {
    let mut captured = None;
    let client = RpcClientBuilder::new(test_chain_params(), Default::default())
        .idle_window(idle_window)
        .build(|_, handlers| {
            captured = Some(handlers);
            Ok(server)
        })
        .expect("build client");
    (client, captured.expect("handlers captured"))
}
