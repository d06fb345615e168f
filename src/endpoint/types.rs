use std::io;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use crate::address::SocketAddress;

/// A single received datagram: the payload bytes and the peer that sent it.
#[derive(Debug, Clone)]
pub struct InboundDatagram {
    pub payload: Bytes,
    pub source: SocketAddress,
}

impl InboundDatagram {
    /// Best-effort UTF-8 view of the payload. `None` when the bytes are not
    /// valid UTF-8; the raw payload stays available either way.
    pub fn payload_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Handle to an active datagram subscription.
///
/// Steady-state receive failures arrive on this handle's error channel,
/// separate from datagram delivery; the subscription keeps listening after
/// each one.
#[derive(Debug)]
pub struct SubscriptionHandle {
    abort: AbortHandle,
    errors: UnboundedReceiverStream<SocketError>,
}

impl SubscriptionHandle {
    pub(crate) fn new(abort: AbortHandle, errors: mpsc::UnboundedReceiver<SocketError>) -> Self {
        Self {
            abort,
            errors: UnboundedReceiverStream::new(errors),
        }
    }

    /// Stop the receive task. The endpoint's socket stays open.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.abort.is_finished()
    }

    /// The next receive failure. Pends while the subscription is healthy and
    /// returns `None` once the receive task is gone.
    pub async fn next_error(&mut self) -> Option<SocketError> {
        self.errors.next().await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("could not create socket: {0}")]
    SocketCreateFailed(io::Error),

    #[error("could not bind socket: {0}")]
    BindFailed(io::Error),

    #[error("sendto failed: {0}")]
    SendFailed(io::Error),

    #[error("partial send: {sent} of {expected} bytes")]
    PartialSend { expected: usize, sent: usize },

    #[error("recvfrom failed: {0}")]
    ReceiveFailed(io::Error),

    #[error("endpoint is closed")]
    EndpointClosed,
}
