use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::trace;

use super::ChainEvent;
use super::QueueKind;
use crate::ChainHash;
use crate::Transaction;
use crate::DROPPED_NOTIFICATIONS_METRIC;

/// Callback surface handed to the transport at construction.
///
/// Every handler only translates its arguments into a [`ChainEvent`] and
/// offers it to the owning client's dispatch loop. A handler suspends until
/// the loop takes the event or the client reaches its terminal state,
/// whichever comes first, so a transport task is never parked past shutdown.
///
/// Handlers are cheap to clone; all clones feed the same client.
#[derive(Clone, Debug)]
pub struct NotificationHandlers {
    general: mpsc::Sender<ChainEvent>,
    voting: mpsc::Sender<ChainEvent>,
    quit: CancellationToken,
}

impl NotificationHandlers {
    pub(crate) fn new(
        general: mpsc::Sender<ChainEvent>,
        voting: mpsc::Sender<ChainEvent>,
        quit: CancellationToken,
    ) -> Self {
        Self { general, voting, quit }
    }

    pub async fn on_block_connected(
        &self,
        header: Vec<u8>,
        transactions: Vec<Vec<u8>>,
    ) {
        self.enqueue(ChainEvent::BlockConnected { header, transactions })
            .await;
    }

    pub async fn on_block_disconnected(
        &self,
        header: Vec<u8>,
    ) {
        self.enqueue(ChainEvent::BlockDisconnected { header }).await;
    }

    /// Malformed transactions are logged and dropped; the session stays up.
    pub async fn on_relevant_tx_accepted(
        &self,
        transaction: &[u8],
    ) {
        let transaction = match Transaction::deserialize(transaction) {
            Ok(tx) => tx,
            Err(e) => {
                error!("Failed to deserialize announced transaction: {}", e);
                DROPPED_NOTIFICATIONS_METRIC
                    .with_label_values(&["decode_error"])
                    .inc();
                return;
            }
        };
        self.enqueue(ChainEvent::RelevantTxAccepted { transaction })
            .await;
    }

    pub async fn on_reorganization(
        &self,
        old_hash: ChainHash,
        old_height: i32,
        new_hash: ChainHash,
        new_height: i32,
    ) {
        self.enqueue(ChainEvent::Reorganization {
            old_hash,
            old_height: old_height as i64,
            new_hash,
            new_height: new_height as i64,
        })
        .await;
    }

    pub async fn on_winning_tickets(
        &self,
        block_hash: ChainHash,
        block_height: i64,
        tickets: Vec<ChainHash>,
    ) {
        self.enqueue(ChainEvent::WinningTickets {
            block_hash,
            block_height,
            tickets,
        })
        .await;
    }

    /// Only unspent tickets were missed. Nothing is emitted when every ticket
    /// voted or was revoked.
    pub async fn on_spent_and_missed_tickets(
        &self,
        block_hash: ChainHash,
        block_height: i64,
        _stake_difficulty: i64,
        tickets: HashMap<ChainHash, bool>,
    ) {
        let mut missed: Vec<ChainHash> = tickets
            .into_iter()
            .filter_map(|(ticket, spent)| (!spent).then_some(ticket))
            .collect();

        if missed.is_empty() {
            trace!("no missed tickets in block {}", block_hash);
            return;
        }
        missed.sort_unstable();

        self.enqueue(ChainEvent::MissedTickets {
            block_hash,
            block_height,
            tickets: missed,
        })
        .await;
    }

    pub async fn on_stake_difficulty(
        &self,
        block_hash: ChainHash,
        block_height: i64,
        stake_difficulty: i64,
    ) {
        self.enqueue(ChainEvent::StakeDifficulty {
            block_hash,
            block_height,
            stake_difficulty,
        })
        .await;
    }

    async fn enqueue(
        &self,
        event: ChainEvent,
    ) {
        let queue = event.queue();
        let intake = match queue {
            QueueKind::General => &self.general,
            QueueKind::Voting => &self.voting,
        };
        let kind = event.kind();

        tokio::select! {
            biased;
            _ = self.quit.cancelled() => {
                trace!("client stopped, dropping {} notification", kind);
                DROPPED_NOTIFICATIONS_METRIC.with_label_values(&["shutdown"]).inc();
            }
            sent = intake.send(event) => {
                if sent.is_err() {
                    debug!("{} queue closed, dropping {} notification", queue, kind);
                    DROPPED_NOTIFICATIONS_METRIC.with_label_values(&["queue_closed"]).inc();
                }
            }
        }
    }
}
