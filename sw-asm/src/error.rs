use thiserror::Error;

/// Errors raised by [`crate::Isa`] lookups and registrations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No entry matches the given code or name.
    #[error("{0} not found in the ISA registry")]
    NotFound(String),
    /// An entry for this code or name is already registered.
    #[error("{0} already registered in the ISA registry")]
    Duplicate(String),
}

/// Result alias for ISA registry operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
