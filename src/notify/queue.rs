use std::collections::VecDeque;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::ChainEvent;
use super::LivenessProber;
use super::NotificationStream;
use super::ProbeSignal;
use super::QueueKind;
use crate::DROPPED_NOTIFICATIONS_METRIC;
use crate::EVENTS_ACCEPTED_METRIC;
use crate::EVENTS_DELIVERED_METRIC;
use crate::QUEUE_DEPTH_METRIC;

/// Lifecycle of a delivery queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueueState {
    /// Accepting new events and delivering buffered ones
    Open,
    /// Intake is closed; buffered events are still being delivered
    Draining,
    /// Nothing left to deliver; the stream has ended
    Closed,
}

/// Create the intake handle, the (not yet running) dispatch loop and the
/// consumer stream of one delivery queue.
pub(crate) fn delivery_queue(kind: QueueKind) -> (mpsc::Sender<ChainEvent>, DispatchQueue, NotificationStream) {
    // A single slot on either side: the handoff into the loop completes once
    // the loop has taken the event, and the consumer sees exactly one event
    // at a time.
    let (intake_tx, intake_rx) = mpsc::channel(1);
    let (output_tx, output_rx) = mpsc::channel(1);
    let (remainder_tx, remainder_rx) = oneshot::channel();

    let queue = DispatchQueue {
        kind,
        intake: intake_rx,
        output: output_tx,
        remainder: remainder_tx,
        prober: None,
    };
    (intake_tx, queue, NotificationStream::new(kind, output_rx, remainder_rx))
}

/// Single-owner dispatch loop of one delivery queue.
///
/// The buffer, the "next" slot and the optional idle timer are only ever
/// touched by the task running [`DispatchQueue::run`].
pub(crate) struct DispatchQueue {
    kind: QueueKind,
    intake: mpsc::Receiver<ChainEvent>,
    output: mpsc::Sender<ChainEvent>,
    remainder: oneshot::Sender<VecDeque<ChainEvent>>,
    prober: Option<LivenessProber>,
}

impl DispatchQueue {
    pub(crate) fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Probe the node whenever this queue has been idle for the prober's
    /// window. Exiting the loop then also stops the session.
    pub(crate) fn with_prober(
        mut self,
        prober: LivenessProber,
    ) -> Self {
        self.prober = Some(prober);
        self
    }

    pub(crate) async fn run(
        self,
        quit: CancellationToken,
    ) {
        let DispatchQueue {
            kind,
            mut intake,
            output,
            remainder,
            mut prober,
        } = self;
        let label = kind.label();

        let mut buffer: VecDeque<ChainEvent> = VecDeque::new();
        let mut state = QueueState::Open;
        // Set once the consumer dropped its stream; events are discarded.
        let mut consumer_gone = false;

        debug!("[{}] dispatch loop started", kind);

        while state != QueueState::Closed {
            tokio::select! {
                biased;

                _ = quit.cancelled() => {
                    // Stop taking intake, keep what was already handed over.
                    intake.close();
                    while let Ok(event) = intake.try_recv() {
                        buffer.push_back(event);
                    }
                    debug!("[{}] shutdown received with {} buffered notifications", kind, buffer.len());
                    QUEUE_DEPTH_METRIC.with_label_values(&[label]).set(0);
                    if !consumer_gone && !buffer.is_empty() {
                        let _ = remainder.send(buffer);
                    }
                    break;
                }

                permit = output.reserve(), if !buffer.is_empty() && !consumer_gone => {
                    match permit {
                        Ok(permit) => {
                            if let Some(next) = buffer.pop_front() {
                                trace!("[{}] delivered {}", kind, next.kind());
                                permit.send(next);
                                EVENTS_DELIVERED_METRIC.with_label_values(&[label]).inc();
                            }
                        }
                        Err(_) => {
                            warn!("[{}] consumer dropped its stream, discarding {} notifications", kind, buffer.len());
                            DROPPED_NOTIFICATIONS_METRIC
                                .with_label_values(&["consumer_gone"])
                                .inc_by(buffer.len() as u64);
                            buffer.clear();
                            consumer_gone = true;
                        }
                    }
                    QUEUE_DEPTH_METRIC.with_label_values(&[label]).set(buffer.len() as i64);
                    if buffer.is_empty() && state == QueueState::Draining {
                        state = QueueState::Closed;
                    }
                }

                received = intake.recv(), if state == QueueState::Open => {
                    match received {
                        Some(event) => {
                            trace!("[{}] accepted {}", kind, event.kind());
                            EVENTS_ACCEPTED_METRIC.with_label_values(&[label, event.kind()]).inc();
                            if let Some(p) = prober.as_mut() {
                                p.reset();
                            }
                            if consumer_gone {
                                DROPPED_NOTIFICATIONS_METRIC.with_label_values(&["consumer_gone"]).inc();
                            } else {
                                buffer.push_back(event);
                                QUEUE_DEPTH_METRIC.with_label_values(&[label]).set(buffer.len() as i64);
                            }
                        }
                        None => {
                            debug!("[{}] intake closed, draining {} notifications", kind, buffer.len());
                            state = if buffer.is_empty() || consumer_gone {
                                QueueState::Closed
                            } else {
                                QueueState::Draining
                            };
                        }
                    }
                }

                signal = next_probe_signal(&mut prober) => {
                    if let Some(p) = prober.as_mut() {
                        match signal {
                            ProbeSignal::Idle => p.fire(),
                            ProbeSignal::Answered => p.reset(),
                        }
                    }
                }
            }
        }

        debug!("[{}] dispatch loop exited", kind);

        // The general stream ending means the session is over.
        if let Some(p) = prober {
            p.stop_session();
        }
        // `output` and `remainder` drop here, ending the consumer stream.
    }
}

async fn next_probe_signal(prober: &mut Option<LivenessProber>) -> ProbeSignal {
    match prober {
        Some(p) => p.next_signal().await,
        None => std::future::pending().await,
    }
}
