use thiserror::Error;

/// Errors raised by [`crate::Memory`] accessors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// A read or write of `width` bytes starting at `address` would run
    /// past the end of the buffer.
    #[error("address {address:#06x} with width {width} is out of range for a memory of size {size}")]
    AddressOutOfRange {
        /// Starting address of the access.
        address: u16,
        /// Width, in bytes, of the access.
        width: u8,
        /// Size of the buffer.
        size: usize,
    },
}

impl From<sw_types::Error> for MemoryError {
    fn from(e: sw_types::Error) -> Self {
        match e {
            sw_types::Error::AddressOutOfRange { address, width, size } => {
                MemoryError::AddressOutOfRange { address, width, size }
            }
            sw_types::Error::RangeError(_) => {
                // byte-lane errors never escape this crate's callers; treat
                // as a zero-width access fault rather than panicking.
                MemoryError::AddressOutOfRange { address: 0, width: 0, size: 0 }
            }
        }
    }
}
