mod socket_factory;
mod types;
mod udp;

pub use socket_factory::{DefaultSocketFactory, SocketFactory};
pub use types::{InboundDatagram, SocketError, SubscriptionHandle};
pub use udp::DatagramEndpoint;
