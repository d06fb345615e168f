pub mod byte_order;
mod decoder;
mod encoder;
mod types;

pub use byte_order::{
    host_to_network_u16, host_to_network_u32, network_to_host_u16, network_to_host_u32,
};
pub use types::{CodecError, SockaddrCodec, AF_INET, SOCKADDR_LEN};
