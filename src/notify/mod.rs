//! Notification pipeline between the transport and the wallet.
//!
//! Node callbacks are translated into [`ChainEvent`]s by
//! [`NotificationHandlers`] and handed to one of two dispatch loops:
//! - the general queue carries block, transaction, reorganization, missed
//!   ticket and stake difficulty events, and hosts the liveness prober;
//! - the voting queue carries winning tickets only, so vote submission never
//!   waits behind a backlog of ordinary notifications.
//!
//! Each loop owns an unbounded FIFO buffer and exposes exactly one event at
//! a time to its [`NotificationStream`].

mod event;
mod handlers;
mod liveness;
mod queue;
mod stream;

pub use event::*;
pub use handlers::*;
pub(crate) use liveness::*;
pub(crate) use queue::*;
pub use stream::*;
