//! Host/network byte order conversion.
//!
//! Network byte order is big-endian, so these are byte swaps on
//! little-endian hosts and no-ops on big-endian hosts. The check is a
//! compile-time constant and the branch folds away.

pub fn host_to_network_u16(value: u16) -> u16 {
    if cfg!(target_endian = "little") {
        value.swap_bytes()
    } else {
        value
    }
}

pub fn network_to_host_u16(value: u16) -> u16 {
    host_to_network_u16(value)
}

pub fn host_to_network_u32(value: u32) -> u32 {
    if cfg!(target_endian = "little") {
        value.swap_bytes()
    } else {
        value
    }
}

pub fn network_to_host_u32(value: u32) -> u32 {
    host_to_network_u32(value)
}
