//! A serializable point-in-time copy of a [`Database`], used by collaborators
//! that need to persist the store across process restarts.
//!
//! [`Database`] itself is not `Serialize`/`Deserialize`: its row cache and
//! id allocator are process-local bookkeeping, not data. [`Snapshot`] is the
//! DTO that actually crosses the persistence boundary.

use std::collections::HashMap;

use crate::database::Database;
use crate::rows::{AliveBug, Bug, Code, DeadBug, Egg, Environment, Food, Mutation, Registers, Resource, Spawn, Stats, WorldPosition};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub next_ids: HashMap<String, u64>,
    pub environments: Vec<Environment>,
    pub world: Vec<WorldPosition>,
    pub code: Vec<Code>,
    pub registers: Vec<Registers>,
    pub bugs: Vec<Bug>,
    pub eggs: Vec<Egg>,
    pub alive_bugs: Vec<AliveBug>,
    pub dead_bugs: Vec<DeadBug>,
    pub food: Vec<Food>,
    pub mutations: Vec<Mutation>,
    pub spawns: Vec<Spawn>,
    pub resources: Vec<Resource>,
    pub stats: Vec<Stats>,
}

impl Database {
    /// Flatten every table into a [`Snapshot`] suitable for serialization.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            next_ids: self.next_ids.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            environments: self.environments.iter().map(|(_, r)| r.clone()).collect(),
            world: self.world.iter().map(|(_, r)| r.clone()).collect(),
            code: self.code.iter().map(|(_, r)| r.clone()).collect(),
            registers: self.registers.iter().map(|(_, r)| r.clone()).collect(),
            bugs: self.bugs.iter().map(|(_, r)| r.clone()).collect(),
            eggs: self.eggs.iter().map(|(_, r)| r.clone()).collect(),
            alive_bugs: self.alive_bugs.iter().map(|(_, r)| r.clone()).collect(),
            dead_bugs: self.dead_bugs.iter().map(|(_, r)| r.clone()).collect(),
            food: self.food.iter().map(|(_, r)| r.clone()).collect(),
            mutations: self.mutations.iter().map(|(_, r)| r.clone()).collect(),
            spawns: self.spawns.iter().map(|(_, r)| r.clone()).collect(),
            resources: self.resources.iter().map(|(_, r)| r.clone()).collect(),
            stats: self.stats.iter().map(|(_, r)| r.clone()).collect(),
        }
    }

    /// Rebuild a [`Database`] from a [`Snapshot`], re-inserting every row
    /// through the same constructors `tick` uses so integrity checks still
    /// hold on load.
    pub fn from_snapshot(snapshot: Snapshot) -> crate::error::StorageResult<Database> {
        let mut db = Database::new();
        db.next_ids = snapshot.next_ids.into_iter().map(|(k, v)| (leak_table_name(&k), v)).collect();

        for row in snapshot.environments {
            db.insert_environment(row)?;
        }
        for row in snapshot.code {
            crate::mappable::StorageMutate::insert(&mut db.code, &row.id, &row)?;
        }
        for row in snapshot.registers {
            crate::mappable::StorageMutate::insert(&mut db.registers, &row.id, &row)?;
        }
        for row in snapshot.bugs {
            db.insert_bug(row)?;
        }
        for row in snapshot.world {
            crate::mappable::StorageMutate::insert(&mut db.world, &row.id, &row)?;
        }
        for row in snapshot.eggs {
            db.insert_egg(row)?;
        }
        for row in snapshot.alive_bugs {
            db.insert_alive_bug(row)?;
        }
        for row in snapshot.dead_bugs {
            crate::mappable::StorageMutate::insert(&mut db.dead_bugs, &row.bug_id, &row)?;
        }
        for row in snapshot.food {
            db.insert_food(row)?;
        }
        for row in snapshot.mutations {
            db.append_mutation(row)?;
        }
        for row in snapshot.spawns {
            db.insert_spawn(row)?;
        }
        for row in snapshot.resources {
            db.insert_resource(row)?;
        }
        for row in snapshot.stats {
            db.append_stats(row)?;
        }
        Ok(db)
    }
}

/// [`Database::next_ids`] is keyed by the `'static` table-name literals used
/// throughout this crate; restoring from an owned [`String`] needs one of
/// those same literals back, since the allocator only ever looks itself up
/// by the constants `next_id` is called with elsewhere in the crate.
fn leak_table_name(name: &str) -> &'static str {
    const NAMES: [&str; 13] = [
        "environment",
        "world",
        "code",
        "registers",
        "bug",
        "egg",
        "alive_bug",
        "dead_bug",
        "food",
        "mutation",
        "spawn",
        "resource",
        "stats",
    ];
    NAMES.iter().copied().find(|n| *n == name).unwrap_or("unknown")
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut db = Database::new();
        db.insert_environment(Environment {
            id: 1,
            time: 0,
            size_x: 4,
            size_y: 4,
            time_rot: 1,
            size_rot: 1,
            mutations_probability: 0.0,
            time_birth: 1,
            time_mutate: 1,
            time_laziness: 1,
            energy_laziness: 1,
            attack_multiplier: 1.0,
            action_costs: Default::default(),
        })
        .unwrap();

        let snapshot = db.to_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);

        let restored_db = Database::from_snapshot(restored).unwrap();
        assert_eq!(restored_db.latest_environment().unwrap().time, 0);
    }
}
