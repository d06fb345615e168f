pub mod address;
pub mod codec;
pub mod endpoint;

// Re-export commonly used items for convenience
pub use address::{AddressError, EndpointConfig, EndpointConfigBuilder, SocketAddress};
pub use codec::{CodecError, SockaddrCodec};
pub use endpoint::{
    DatagramEndpoint, DefaultSocketFactory, InboundDatagram, SocketError, SocketFactory,
    SubscriptionHandle,
};
