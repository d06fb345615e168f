use std::fmt;
use std::io;
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};

/// Creates the raw UDP socket an endpoint owns. The seam lets tests stand
/// in an allocator that fails.
pub trait SocketFactory: Send + Sync + fmt::Debug {
    /// Allocate a new, unbound, nonblocking IPv4 UDP socket.
    fn create_udp_socket(&self) -> io::Result<Socket>;
}

#[derive(Debug, Clone)]
pub struct DefaultSocketFactory;

impl DefaultSocketFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn arc() -> Arc<dyn SocketFactory> {
        Arc::new(Self::new())
    }
}

impl SocketFactory for DefaultSocketFactory {
    fn create_udp_socket(&self) -> io::Result<Socket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_nonblocking(true)?;
        Ok(socket)
    }
}

impl Default for DefaultSocketFactory {
    fn default() -> Self {
        Self::new()
    }
}
