use thiserror::Error;

/// Errors raised by the word/byte utilities and the typed memory accessors
/// built on top of them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A byte-lane index outside `0..4` was requested of a [`crate::Word`].
    #[error("byte lane {0} is out of range for a 32-bit word")]
    RangeError(u8),
    /// A memory access would read or write past the end of the backing
    /// buffer.
    #[error("address {address} with width {width} is out of range for a buffer of size {size}")]
    AddressOutOfRange {
        /// The address the access started at.
        address: u16,
        /// The width, in bytes, of the access.
        width: u8,
        /// The size of the buffer that was accessed.
        size: usize,
    },
}
