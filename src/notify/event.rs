use std::fmt;

use crate::ChainHash;
use crate::Transaction;

/// Which dispatch loop an event travels through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    General,
    Voting,
}

impl QueueKind {
    pub fn label(&self) -> &'static str {
        match self {
            QueueKind::General => "general",
            QueueKind::Voting => "voting",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Notifications pushed by the node, after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// A block was attached to the best chain. Header and transactions are
    /// left serialized; the sync logic filters them itself.
    BlockConnected {
        header: Vec<u8>,
        transactions: Vec<Vec<u8>>,
    },

    /// The block was reorganized out of the best chain.
    BlockDisconnected { header: Vec<u8> },

    /// A mempool transaction matched the wallet's transaction filter.
    RelevantTxAccepted { transaction: Transaction },

    Reorganization {
        old_hash: ChainHash,
        old_height: i64,
        new_hash: ChainHash,
        new_height: i64,
    },

    /// Tickets selected to vote on `block_hash`.
    WinningTickets {
        block_hash: ChainHash,
        block_height: i64,
        tickets: Vec<ChainHash>,
    },

    /// Tickets that were called to vote and did not.
    MissedTickets {
        block_hash: ChainHash,
        block_height: i64,
        tickets: Vec<ChainHash>,
    },

    StakeDifficulty {
        block_hash: ChainHash,
        block_height: i64,
        stake_difficulty: i64,
    },
}

impl ChainEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChainEvent::BlockConnected { .. } => "block_connected",
            ChainEvent::BlockDisconnected { .. } => "block_disconnected",
            ChainEvent::RelevantTxAccepted { .. } => "relevant_tx_accepted",
            ChainEvent::Reorganization { .. } => "reorganization",
            ChainEvent::WinningTickets { .. } => "winning_tickets",
            ChainEvent::MissedTickets { .. } => "missed_tickets",
            ChainEvent::StakeDifficulty { .. } => "stake_difficulty",
        }
    }

    /// Queue this event is routed to.
    pub fn queue(&self) -> QueueKind {
        match self {
            ChainEvent::WinningTickets { .. } => QueueKind::Voting,
            _ => QueueKind::General,
        }
    }
}
