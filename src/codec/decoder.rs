use crate::address::SocketAddress;
use crate::codec::types::{CodecError, SockaddrCodec, AF_INET, SOCKADDR_LEN};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

impl Decoder for SockaddrCodec {
    type Item = SocketAddress;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < SOCKADDR_LEN {
            return Ok(None);
        }

        let mut data = src.split_to(SOCKADDR_LEN);

        let family = data.get_u16();
        if family != AF_INET {
            return Err(CodecError::InvalidAddressFamily(family));
        }

        let mut port_bytes = [0u8; 2];
        data.copy_to_slice(&mut port_bytes);

        let mut octets = [0u8; 4];
        data.copy_to_slice(&mut octets);

        // The remaining 8 bytes are zero padding.

        Ok(Some(SocketAddress::from_wire(
            u16::from_ne_bytes(port_bytes),
            octets,
        )))
    }
}
