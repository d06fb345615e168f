use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use derive_builder::Builder;

use crate::codec::byte_order::{host_to_network_u16, network_to_host_u16};

/// Local endpoint configuration: a dotted-decimal IPv4 host and a port.
/// Port 0 requests an ephemeral port from the OS.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
pub struct EndpointConfig {
    #[builder(default = "String::from(\"127.0.0.1\")")]
    pub host: String,
    #[builder(default = "4242")]
    pub port: u16,
    /// Receive buffer size per datagram, in bytes.
    #[builder(default = "4096")]
    pub recv_buffer_size: usize,
}

impl EndpointConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            recv_buffer_size: 4096,
        }
    }

    pub fn builder() -> EndpointConfigBuilder {
        EndpointConfigBuilder::default()
    }

    /// Encode the configured host and port into a [`SocketAddress`].
    pub fn socket_address(&self) -> Result<SocketAddress, AddressError> {
        SocketAddress::encode(&self.host, self.port)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 4242)
    }
}

/// A fixed-size IPv4 socket address with its multi-byte fields held in
/// network byte order, matching the layout bind/send/receive calls consume.
/// Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketAddress {
    /// Port in network byte order.
    port: u16,
    /// Address octets as they appear on the wire.
    octets: [u8; 4],
}

impl SocketAddress {
    /// Parse `host` as a dotted-decimal IPv4 address and encode `port` in
    /// network byte order, regardless of host endianness.
    pub fn encode(host: &str, port: u16) -> Result<Self, AddressError> {
        let ip: Ipv4Addr = host
            .parse()
            .map_err(|_| AddressError::InvalidAddress(host.to_string()))?;
        Ok(Self {
            port: host_to_network_u16(port),
            octets: ip.octets(),
        })
    }

    /// Inverse of [`encode`](Self::encode): the textual host and the port in
    /// host byte order. Round-trips for any valid dotted-decimal host.
    pub fn decode(&self) -> (String, u16) {
        (self.host().to_string(), self.port())
    }

    pub fn host(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.octets)
    }

    /// Port in host byte order.
    pub fn port(&self) -> u16 {
        network_to_host_u16(self.port)
    }

    /// Port exactly as stored, network byte order.
    pub fn port_network_order(&self) -> u16 {
        self.port
    }

    pub fn octets(&self) -> [u8; 4] {
        self.octets
    }

    pub(crate) fn from_wire(port_network_order: u16, octets: [u8; 4]) -> Self {
        Self {
            port: port_network_order,
            octets,
        }
    }
}

impl From<SocketAddrV4> for SocketAddress {
    fn from(addr: SocketAddrV4) -> Self {
        Self {
            port: host_to_network_u16(addr.port()),
            octets: addr.ip().octets(),
        }
    }
}

impl From<SocketAddress> for SocketAddr {
    fn from(addr: SocketAddress) -> Self {
        SocketAddr::V4(SocketAddrV4::new(addr.host(), addr.port()))
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host(), self.port())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),
}
