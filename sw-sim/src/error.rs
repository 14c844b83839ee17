use thiserror::Error;

/// Errors raised by grid operations.
///
/// Outside a world action these are surfaced to the caller; inside one the
/// scheduler converts them into a world-action interrupt on the issuing bug.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorldError {
    #[error("position is already occupied")]
    PositionUsed,
    #[error("position is out of range")]
    OutOfRange,
    #[error("occupant is not movable")]
    NotMovable,
    #[error("no free cell in the requested region")]
    WorldFull,
}

pub type WorldResult<T> = Result<T, WorldError>;
