use std::collections::VecDeque;
use std::future::poll_fn;
use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

use super::ChainEvent;
use super::QueueKind;

/// Receive-only end of one delivery queue.
///
/// Yields events in exactly the order the dispatch loop accepted them and
/// ends once the loop has closed. The stream must be read continually: the
/// loop buffers without bound on its behalf.
///
/// When the client stops while events are still buffered, the loop hands
/// the leftovers over instead of waiting for this reader; they are yielded
/// after whatever was already in flight, then the stream ends.
#[derive(Debug)]
pub struct NotificationStream {
    kind: QueueKind,
    rx: mpsc::Receiver<ChainEvent>,
    remainder: Option<oneshot::Receiver<VecDeque<ChainEvent>>>,
    drained: VecDeque<ChainEvent>,
}

impl NotificationStream {
    pub(crate) fn new(
        kind: QueueKind,
        rx: mpsc::Receiver<ChainEvent>,
        remainder: oneshot::Receiver<VecDeque<ChainEvent>>,
    ) -> Self {
        Self {
            kind,
            rx,
            remainder: Some(remainder),
            drained: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Next event, or `None` once the queue has closed and been emptied.
    pub async fn recv(&mut self) -> Option<ChainEvent> {
        poll_fn(|cx| self.poll_next_event(cx)).await
    }

    fn poll_next_event(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<ChainEvent>> {
        if let Some(event) = self.drained.pop_front() {
            return Poll::Ready(Some(event));
        }

        let Some(remainder) = self.remainder.as_mut() else {
            return Poll::Ready(None);
        };

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => return Poll::Ready(Some(event)),
            Poll::Ready(None) => {}
            Poll::Pending => return Poll::Pending,
        }

        // The loop has exited; collect what it left behind.
        match Pin::new(remainder).poll(cx) {
            Poll::Ready(Ok(leftover)) => self.drained = leftover,
            Poll::Ready(Err(_)) => {}
            Poll::Pending => return Poll::Pending,
        }
        self.remainder = None;

        Poll::Ready(self.drained.pop_front())
    }
}

impl Stream for NotificationStream {
    type Item = ChainEvent;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_next_event(cx)
    }
}
