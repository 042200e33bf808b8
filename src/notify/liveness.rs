use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio::time::timeout;
use tokio::time::Instant;
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;
use tonic::async_trait;
use tracing::debug;
use tracing::error;

use crate::NetworkError;
use crate::Result;
use crate::LIVENESS_PROBE_METRIC;

/// What the prober needs from the session it watches.
#[cfg_attr(test, automock)]
#[async_trait]
pub(crate) trait SessionControl: Send + Sync + 'static {
    /// Side-effect free round-trip to the node.
    async fn probe(&self) -> Result<()>;

    /// Terminate the session.
    fn stop(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeSignal {
    /// Nothing arrived for a whole idle window
    Idle,
    /// An outstanding probe was answered in time
    Answered,
}

/// Idle timer of the general dispatch loop.
///
/// The timer is owned by the loop. Probe tasks report a successful answer
/// back through `reset_tx` instead of touching it.
pub(crate) struct LivenessProber {
    idle_window: Duration,
    control: Arc<dyn SessionControl>,
    quit: CancellationToken,
    idle: Pin<Box<Sleep>>,
    armed: bool,
    reset_tx: mpsc::UnboundedSender<()>,
    reset_rx: mpsc::UnboundedReceiver<()>,
}

impl LivenessProber {
    pub(crate) fn new(
        idle_window: Duration,
        control: Arc<dyn SessionControl>,
        quit: CancellationToken,
    ) -> Self {
        let (reset_tx, reset_rx) = mpsc::unbounded_channel();
        Self {
            idle_window,
            control,
            quit,
            idle: Box::pin(sleep(idle_window)),
            armed: true,
            reset_tx,
            reset_rx,
        }
    }

    /// Restart the idle window from now.
    pub(crate) fn reset(&mut self) {
        self.idle.as_mut().reset(Instant::now() + self.idle_window);
        self.armed = true;
    }

    pub(crate) async fn next_signal(&mut self) -> ProbeSignal {
        tokio::select! {
            _ = &mut self.idle, if self.armed => ProbeSignal::Idle,
            Some(()) = self.reset_rx.recv() => ProbeSignal::Answered,
        }
    }

    /// Probe the node on a separate task. The timer stays disarmed until the
    /// probe answers or another event arrives.
    pub(crate) fn fire(&mut self) {
        self.armed = false;
        debug!("no notifications for {:?}, probing node", self.idle_window);

        let window = self.idle_window;
        let control = self.control.clone();
        let quit = self.quit.clone();
        let reset_tx = self.reset_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = quit.cancelled() => {}
                answer = timeout(window, control.probe()) => match answer {
                    Ok(Ok(())) => {
                        LIVENESS_PROBE_METRIC.with_label_values(&["ok"]).inc();
                        let _ = reset_tx.send(());
                    }
                    Ok(Err(e)) => {
                        error!("Failed to receive session result: {}", e);
                        LIVENESS_PROBE_METRIC.with_label_values(&["error"]).inc();
                        control.stop();
                    }
                    Err(_) => {
                        error!("{}", NetworkError::ProbeTimeout(window));
                        LIVENESS_PROBE_METRIC.with_label_values(&["timeout"]).inc();
                        control.stop();
                    }
                }
            }
        });
    }

    pub(crate) fn stop_session(&self) {
        self.control.stop();
    }
}
