//! Per-entity persistence tables, referential integrity and the weak row
//! cache backing the Simple World scheduler.

mod cache;
mod database;
mod error;
mod mappable;
mod orientation;
mod rows;
mod snapshot;
mod table;

pub use cache::RowCache;
pub use database::Database;
pub use error::{StorageError, StorageResult};
pub use mappable::{Mappable, StorageInspect, StorageMutate};
pub use orientation::Orientation;
pub use rows::{
    ActionCosts, ActionKind, AliveBug, Bug, Code, DeadBug, Egg, Environment, Food, Mutation, MutationKind, Region, Registers,
    Resource, Spawn, Stats, WorldPosition,
};
pub use snapshot::Snapshot;
pub use table::Table;
