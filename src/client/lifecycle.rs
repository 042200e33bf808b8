use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tonic::async_trait;
use tracing::debug;
use tracing::info;

use crate::ChainRpc;
use crate::DispatchQueue;
use crate::Error;
use crate::LivenessProber;
use crate::NetworkError;
use crate::Result;
use crate::SessionControl;

/// Dispatch loops created with the client, waiting for a successful start.
pub(crate) struct PendingQueues {
    pub(crate) general: DispatchQueue,
    pub(crate) voting: DispatchQueue,
}

struct LifecycleState {
    started: bool,
    pending: Option<PendingQueues>,
}

/// Session lifecycle shared by the client, its dispatch loops and the
/// liveness prober.
///
/// `quit` is the terminal signal every task races against. It and the
/// `started` flag are the only state shared between tasks, both guarded by
/// `state`.
pub(crate) struct Lifecycle<R: ChainRpc> {
    rpc: R,
    quit: CancellationToken,
    state: Mutex<LifecycleState>,
    tracker: TaskTracker,
}

impl<R: ChainRpc> Lifecycle<R> {
    pub(crate) fn new(
        rpc: R,
        quit: CancellationToken,
        pending: PendingQueues,
    ) -> Self {
        Self {
            rpc,
            quit,
            state: Mutex::new(LifecycleState {
                started: false,
                pending: Some(pending),
            }),
            tracker: TaskTracker::new(),
        }
    }

    pub(crate) fn rpc(&self) -> &R {
        &self.rpc
    }

    pub(crate) fn quit(&self) -> &CancellationToken {
        &self.quit
    }

    pub(crate) fn is_started(&self) -> bool {
        self.state.lock().started
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.quit.is_cancelled()
    }

    /// Mark the session started and launch both dispatch loops. The general
    /// loop hosts the liveness prober.
    pub(crate) fn activate(
        self: &Arc<Self>,
        idle_window: Duration,
    ) -> Result<()> {
        let mut state = self.state.lock();

        if self.quit.is_cancelled() {
            return Err(NetworkError::Disconnected.into());
        }
        if state.started {
            return Err(Error::Fatal("chain client already started".to_string()));
        }
        let PendingQueues { general, voting } = state
            .pending
            .take()
            .ok_or_else(|| Error::Fatal("dispatch queues already consumed".to_string()))?;
        state.started = true;

        let control: Arc<dyn SessionControl> = self.clone();
        let prober = LivenessProber::new(idle_window, control, self.quit.clone());

        debug!("launching {} and {} dispatch loops", general.kind(), voting.kind());
        self.tracker
            .spawn(general.with_prober(prober).run(self.quit.clone()));
        self.tracker.spawn(voting.run(self.quit.clone()));
        Ok(())
    }

    /// Signal the terminal state and tear the transport down. Idempotent.
    pub(crate) fn stop(&self) {
        let mut state = self.state.lock();
        if self.quit.is_cancelled() {
            return;
        }

        info!("stopping chain client");
        self.quit.cancel();
        self.rpc.shutdown();

        if !state.started {
            // No dispatch loop exists to close the streams; dropping the
            // loops' output ends does it.
            state.pending = None;
        }
    }

    /// Resolves once the transport has disconnected and every dispatch loop
    /// has exited.
    pub(crate) async fn wait_for_shutdown(&self) {
        self.rpc.wait_for_shutdown().await;
        self.tracker.close();
        self.tracker.wait().await;
        debug!("chain client shut down");
    }
}

#[async_trait]
impl<R: ChainRpc> SessionControl for Lifecycle<R> {
    async fn probe(&self) -> Result<()> {
        self.rpc.session().await.map(|_| ())
    }

    fn stop(&self) {
        Lifecycle::stop(self)
    }
}
