//! Primitive types shared by every Simple World crate: the big-endian 32-bit
//! [`Word`], the 16-bit byte [`Address`], and their byte-lane utilities.

mod error;
mod word;

pub use error::Error;
pub use word::{get_byte, set_byte, swap_bytes, swap_halves, Address, Word};

/// Result alias used across the Simple World workspace's lowest layer.
pub type Result<T, E = Error> = core::result::Result<T, E>;
