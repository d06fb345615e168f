use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use socket2::{SockAddr, Socket};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::address::SocketAddress;
use crate::endpoint::socket_factory::{DefaultSocketFactory, SocketFactory};
use crate::endpoint::types::{InboundDatagram, SocketError, SubscriptionHandle};

/// The receive half of a socket, behind a seam so the receive loop can be
/// driven by a scripted source in tests.
trait DatagramSource: Send + Sync {
    fn recv_from<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> Pin<Box<dyn Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a>>;
}

impl DatagramSource for UdpSocket {
    fn recv_from<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> Pin<Box<dyn Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a>> {
        Box::pin(UdpSocket::recv_from(self, buf))
    }
}

enum SocketState {
    /// Allocated but not yet registered with the reactor.
    Open(Socket),
    /// Registered with the tokio reactor, either via `bind` or lazily on
    /// first send (the OS then assigns the ephemeral source port).
    Registered(Arc<UdpSocket>),
    Closed,
}

/// One exclusively-owned UDP socket plus, while receiving, one task driven
/// by the reactor's readiness notifications.
///
/// The receive path drains one datagram per readiness signal and relies on
/// the reactor to re-signal while more are queued, so one busy socket cannot
/// starve other endpoints sharing the runtime.
pub struct DatagramEndpoint {
    state: SocketState,
    subscription: Option<AbortHandle>,
    recv_buffer_size: usize,
}

impl DatagramEndpoint {
    /// Allocate the endpoint's UDP socket.
    pub fn open() -> Result<Self, SocketError> {
        Self::open_with_factory(DefaultSocketFactory::arc())
    }

    pub fn open_with_factory(factory: Arc<dyn SocketFactory>) -> Result<Self, SocketError> {
        let socket = factory
            .create_udp_socket()
            .map_err(SocketError::SocketCreateFailed)?;
        Ok(Self {
            state: SocketState::Open(socket),
            subscription: None,
            recv_buffer_size: 4096,
        })
    }

    /// Set the per-datagram receive buffer size. Datagrams longer than this
    /// are truncated by the OS on receipt.
    pub fn with_recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Bind the socket to a local address. At most once per endpoint; a
    /// second call (or a call after the socket was already used to send) is
    /// rejected.
    ///
    /// Must be called from within a tokio runtime: binding also registers
    /// the socket with the reactor.
    pub fn bind(&mut self, address: SocketAddress) -> Result<(), SocketError> {
        match &self.state {
            SocketState::Closed => Err(SocketError::EndpointClosed),
            SocketState::Registered(_) => Err(SocketError::BindFailed(io::Error::new(
                io::ErrorKind::AddrInUse,
                "endpoint is already bound",
            ))),
            SocketState::Open(socket) => {
                // The receiving socket is never connect()ed. A connected UDP
                // receiver stops seeing datagrams from peers it has not
                // itself sent to first.
                socket
                    .bind(&SockAddr::from(SocketAddr::from(address)))
                    .map_err(SocketError::BindFailed)?;
                self.register()?;
                Ok(())
            }
        }
    }

    /// Best-effort single-datagram send. No retry, no delivery guarantee;
    /// a reported count short of the payload length surfaces as
    /// [`SocketError::PartialSend`].
    pub async fn send_to(
        &mut self,
        payload: &[u8],
        destination: SocketAddress,
    ) -> Result<usize, SocketError> {
        let socket = self.register()?;
        let sent = socket
            .send_to(payload, SocketAddr::from(destination))
            .await
            .map_err(SocketError::SendFailed)?;

        if sent != payload.len() {
            return Err(SocketError::PartialSend {
                expected: payload.len(),
                sent,
            });
        }

        Ok(sent)
    }

    /// Register `handler` to be invoked once per arriving datagram, serially,
    /// from this endpoint's receive task. One subscription per endpoint.
    ///
    /// A failed receive is logged, pushed on the returned handle's error
    /// channel, and the task keeps listening. Zero-length datagrams are
    /// delivered like any other; UDP has no EOF.
    pub fn on_datagram<F>(&mut self, handler: F) -> Result<SubscriptionHandle, SocketError>
    where
        F: FnMut(InboundDatagram) + Send + 'static,
    {
        if self.subscription.is_some() {
            return Err(SocketError::ReceiveFailed(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a datagram handler is already registered",
            )));
        }

        let socket = match &self.state {
            SocketState::Registered(socket) => socket.clone(),
            SocketState::Open(_) => {
                return Err(SocketError::ReceiveFailed(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "endpoint is not bound",
                )))
            }
            SocketState::Closed => return Err(SocketError::EndpointClosed),
        };

        let (abort, handle) = Self::spawn_receive_loop(socket, handler, self.recv_buffer_size);
        self.subscription = Some(abort);
        Ok(handle)
    }

    fn spawn_receive_loop<F>(
        source: Arc<dyn DatagramSource>,
        mut handler: F,
        recv_buffer_size: usize,
    ) -> (AbortHandle, SubscriptionHandle)
    where
        F: FnMut(InboundDatagram) + Send + 'static,
    {
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            let mut buffer = vec![0u8; recv_buffer_size];
            loop {
                match source.recv_from(&mut buffer).await {
                    Ok((len, peer)) => {
                        let peer = match peer {
                            SocketAddr::V4(v4) => SocketAddress::from(v4),
                            // AF_INET socket; a V6 peer cannot happen.
                            SocketAddr::V6(_) => continue,
                        };
                        debug!("read {} bytes from {}", len, peer);
                        handler(InboundDatagram {
                            payload: Bytes::copy_from_slice(&buffer[..len]),
                            source: peer,
                        });
                    }
                    Err(e) => {
                        // One failed receive does not end the subscription.
                        warn!("recvfrom failed: {}", e);
                        let _ = error_tx.send(SocketError::ReceiveFailed(e));
                    }
                }
            }
        });

        let abort = task.abort_handle();
        (task.abort_handle(), SubscriptionHandle::new(abort, error_rx))
    }

    /// The local address the socket is bound to, once registered. With a
    /// port 0 bind this reports the port the OS picked.
    pub fn local_address(&self) -> Option<SocketAddress> {
        match &self.state {
            SocketState::Registered(socket) => match socket.local_addr() {
                Ok(SocketAddr::V4(v4)) => Some(SocketAddress::from(v4)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SocketState::Closed)
    }

    /// Cancel the receive task, then release the socket handle. The task
    /// keeps its own reference to the socket, so the descriptor is freed
    /// only after the cancelled task has stopped and the reactor never
    /// touches a recycled descriptor. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
        if !matches!(self.state, SocketState::Closed) {
            debug!("closing datagram endpoint");
            self.state = SocketState::Closed;
        }
    }

    fn register(&mut self) -> Result<Arc<UdpSocket>, SocketError> {
        if let SocketState::Registered(socket) = &self.state {
            return Ok(socket.clone());
        }

        let SocketState::Open(raw) = std::mem::replace(&mut self.state, SocketState::Closed)
        else {
            return Err(SocketError::EndpointClosed);
        };

        let socket =
            UdpSocket::from_std(raw.into()).map_err(SocketError::SocketCreateFailed)?;
        let socket = Arc::new(socket);
        self.state = SocketState::Registered(socket.clone());
        Ok(socket)
    }
}

impl Drop for DatagramEndpoint {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::net::{Ipv4Addr, SocketAddrV4};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Replays a fixed sequence of receive outcomes, then pends forever.
    struct ScriptedSource {
        steps: Mutex<VecDeque<io::Result<(Vec<u8>, SocketAddr)>>>,
    }

    impl DatagramSource for ScriptedSource {
        fn recv_from<'a>(
            &'a self,
            buf: &'a mut [u8],
        ) -> Pin<Box<dyn Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a>> {
            let step = self.steps.lock().unwrap().pop_front();
            Box::pin(async move {
                match step {
                    Some(Ok((payload, peer))) => {
                        buf[..payload.len()].copy_from_slice(&payload);
                        Ok((payload.len(), peer))
                    }
                    Some(Err(e)) => Err(e),
                    None => std::future::pending().await,
                }
            })
        }
    }

    #[tokio::test]
    async fn receive_failure_is_surfaced_and_subscription_continues() {
        let peer = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 5555));
        let source = Arc::new(ScriptedSource {
            steps: Mutex::new(VecDeque::from([
                Err(io::Error::other("injected receive failure")),
                Ok((b"pong".to_vec(), peer)),
            ])),
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_abort, mut subscription) = DatagramEndpoint::spawn_receive_loop(
            source,
            move |datagram| {
                tx.send(datagram).unwrap();
            },
            4096,
        );

        let err = timeout(Duration::from_secs(5), subscription.next_error())
            .await
            .expect("timed out waiting for receive error")
            .expect("error channel closed");
        assert!(matches!(err, SocketError::ReceiveFailed(_)));

        // The failed receive did not end the subscription: the next
        // datagram still arrives.
        let datagram = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for datagram")
            .expect("subscription dropped");
        assert_eq!(&datagram.payload[..], b"pong");
        assert_eq!(datagram.source.port(), 5555);
        assert!(subscription.is_active());
    }
}
