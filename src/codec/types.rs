/// Address family tag for IPv4 in the encoded structure.
pub const AF_INET: u16 = 2;

/// Encoded size of a socket address:
/// family (2) + port (2) + address (4) + zero padding (8).
pub const SOCKADDR_LEN: usize = 16;

#[derive(Debug, Default)]
pub struct SockaddrCodec;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("invalid address family: {0}")]
    InvalidAddressFamily(u16),
}
