use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use sockit::codec::{
    host_to_network_u16, host_to_network_u32, network_to_host_u16, network_to_host_u32,
    SOCKADDR_LEN,
};
use sockit::{AddressError, CodecError, EndpointConfig, SockaddrCodec, SocketAddress};

#[test]
fn round_trips_valid_addresses() {
    for (host, port) in [
        ("127.0.0.1", 4242u16),
        ("0.0.0.0", 0),
        ("255.255.255.255", 65535),
        ("192.168.1.17", 1),
    ] {
        let addr = SocketAddress::encode(host, port).unwrap();
        assert_eq!(addr.decode(), (host.to_string(), port));
    }
}

#[test]
fn rejects_invalid_host() {
    assert_eq!(
        SocketAddress::encode("not-an-ip", 80),
        Err(AddressError::InvalidAddress("not-an-ip".to_string()))
    );
    assert!(SocketAddress::encode("256.1.1.1", 80).is_err());
    assert!(SocketAddress::encode("::1", 80).is_err());
    assert!(SocketAddress::encode("", 80).is_err());
}

#[test]
fn port_is_encoded_big_endian() {
    let addr = SocketAddress::encode("0.0.0.0", 1).unwrap();

    let mut codec = SockaddrCodec;
    let mut buf = BytesMut::new();
    codec.encode(addr, &mut buf).unwrap();

    assert_eq!(buf.len(), SOCKADDR_LEN);
    // family AF_INET
    assert_eq!(&buf[0..2], &[0x00, 0x02]);
    // port 1 as big-endian bytes, regardless of host endianness
    assert_eq!(&buf[2..4], &[0x00, 0x01]);
    // address octets
    assert_eq!(&buf[4..8], &[0, 0, 0, 0]);
    // zero padding
    assert_eq!(&buf[8..16], &[0u8; 8]);
}

#[test]
fn wire_round_trip() {
    let addr = SocketAddress::encode("10.0.0.7", 9999).unwrap();

    let mut codec = SockaddrCodec;
    let mut buf = BytesMut::new();
    codec.encode(addr, &mut buf).unwrap();

    let decoded = codec.decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded, addr);
    assert!(buf.is_empty());
}

#[test]
fn decoder_waits_for_full_structure() {
    let mut codec = SockaddrCodec;
    let mut buf = BytesMut::from(&[0x00, 0x02, 0x10][..]);
    assert!(codec.decode(&mut buf).unwrap().is_none());
}

#[test]
fn decoder_rejects_unknown_family() {
    let mut codec = SockaddrCodec;
    let mut buf =
        BytesMut::from(&[0x00u8, 0x0a, 0, 80, 127, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0][..]);
    match codec.decode(&mut buf) {
        Err(CodecError::InvalidAddressFamily(10)) => {}
        other => panic!("expected InvalidAddressFamily, got {:?}", other),
    }
}

#[test]
fn byte_order_helpers_swap_on_little_endian_only() {
    if cfg!(target_endian = "little") {
        assert_eq!(host_to_network_u16(0x1234), 0x3412);
        assert_eq!(host_to_network_u32(0x1234_5678), 0x7856_3412);
    } else {
        assert_eq!(host_to_network_u16(0x1234), 0x1234);
        assert_eq!(host_to_network_u32(0x1234_5678), 0x1234_5678);
    }

    // Applying the conversion twice restores host order.
    assert_eq!(network_to_host_u16(host_to_network_u16(4242)), 4242);
    assert_eq!(
        network_to_host_u32(host_to_network_u32(0xdead_beef)),
        0xdead_beef
    );
}

#[test]
fn config_builder_defaults() {
    let config = EndpointConfig::builder().build().unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 4242);
    assert_eq!(config.recv_buffer_size, 4096);

    let config = EndpointConfig::builder()
        .host("10.1.2.3")
        .port(9u16)
        .build()
        .unwrap();
    assert_eq!(
        config.socket_address().unwrap().decode(),
        ("10.1.2.3".to_string(), 9)
    );
}
