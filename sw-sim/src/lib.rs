mod action;
mod error;
mod grid;
mod mutation;
mod scheduler;

pub use action::{ActionResult, Subcommand};
pub use error::{WorldError, WorldResult};
pub use grid::{Grid, Occupant, Position, Region};
pub use mutation::{mutate, MutationRecord};
pub use scheduler::World;
