use crate::address::SocketAddress;
use crate::codec::types::{CodecError, SockaddrCodec, AF_INET, SOCKADDR_LEN};
use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

impl Encoder<SocketAddress> for SockaddrCodec {
    type Error = CodecError;

    fn encode(&mut self, addr: SocketAddress, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(SOCKADDR_LEN);
        dst.put_u16(AF_INET);

        // Port and address octets are already held in network byte order,
        // so they go out verbatim.
        dst.put_slice(&addr.port_network_order().to_ne_bytes());
        dst.put_slice(&addr.octets());
        dst.put_bytes(0, 8);

        Ok(())
    }
}
