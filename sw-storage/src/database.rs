use std::collections::HashMap;

use crate::cache::RowCache;
use crate::error::{StorageError, StorageResult};
use crate::mappable::{StorageInspect, StorageMutate};
use crate::rows::{AliveBug, Bug, Code, DeadBug, Egg, Environment, Food, Mutation, Registers, Resource, Spawn, Stats, WorldPosition};
use crate::table::Table;

/// The full persistent store: one [`Table`] per entity, plus
/// the monotonic id allocator and the weak row cache for [`Bug`] handles.
#[derive(Debug, Default)]
pub struct Database {
    pub environments: Table<Environment>,
    pub world: Table<WorldPosition>,
    pub code: Table<Code>,
    pub registers: Table<Registers>,
    pub bugs: Table<Bug>,
    pub eggs: Table<Egg>,
    pub alive_bugs: Table<AliveBug>,
    pub dead_bugs: Table<DeadBug>,
    pub food: Table<Food>,
    pub mutations: Table<Mutation>,
    pub spawns: Table<Spawn>,
    pub resources: Table<Resource>,
    pub stats: Table<Stats>,

    pub(crate) next_ids: HashMap<&'static str, u64>,
    last_environment_time: Option<u64>,
    bug_cache: RowCache<Bug>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id for `table`, starting at 1.
    pub fn next_id(&mut self, table: &'static str) -> u64 {
        let counter = self.next_ids.entry(table).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn insert_environment(&mut self, row: Environment) -> StorageResult<()> {
        if let Some(last) = self.last_environment_time {
            if row.time < last {
                return Err(StorageError::Integrity(format!(
                    "environment time must be monotonic: {} precedes {last}",
                    row.time
                )));
            }
        }
        self.last_environment_time = Some(row.time);
        let id = row.id;
        StorageMutate::insert(&mut self.environments, &id, &row)?;
        Ok(())
    }

    pub fn latest_environment(&self) -> Option<Environment> {
        self.environments
            .iter()
            .max_by_key(|(_, row)| row.time)
            .map(|(_, row)| row.clone())
    }

    /// Enforces: no two alive entities share a position.
    fn position_occupied(&self, world_id_excluding: u64, x: u32, y: u32) -> bool {
        self.world.iter().any(|(id, pos)| {
            *id != world_id_excluding
                && pos.position_x == x
                && pos.position_y == y
                && (self.alive_bugs_at(*id).is_some() || self.eggs_at(*id).is_some())
        })
    }

    fn alive_bugs_at(&self, world_id: u64) -> Option<AliveBug> {
        self.alive_bugs.iter().map(|(_, r)| r).find(|r| r.world_id == world_id).cloned()
    }

    fn eggs_at(&self, world_id: u64) -> Option<Egg> {
        self.eggs.iter().map(|(_, r)| r).find(|r| r.world_id == world_id).cloned()
    }

    pub fn insert_world_position(&mut self, row: WorldPosition) -> StorageResult<()> {
        if self.position_occupied(row.id, row.position_x, row.position_y) {
            return Err(StorageError::Integrity(format!(
                "position ({}, {}) is already occupied",
                row.position_x, row.position_y
            )));
        }
        let id = row.id;
        StorageMutate::insert(&mut self.world, &id, &row)?;
        Ok(())
    }

    pub fn insert_bug(&mut self, row: Bug) -> StorageResult<()> {
        let id = row.id;
        StorageMutate::insert(&mut self.bugs, &id, &row)?;
        Ok(())
    }

    pub fn fetch_bug(&mut self, id: u64) -> StorageResult<std::rc::Rc<Bug>> {
        let row = self.bugs.get(&id)?.ok_or(StorageError::NotFound(id))?.into_owned();
        Ok(self.bug_cache.fetch(id, || row))
    }

    pub fn insert_alive_bug(&mut self, row: AliveBug) -> StorageResult<()> {
        if self.dead_bugs.contains_key(&row.bug_id)? {
            return Err(StorageError::Integrity(format!("bug {} is marked dead", row.bug_id)));
        }
        let id = row.bug_id;
        StorageMutate::insert(&mut self.alive_bugs, &id, &row)?;
        Ok(())
    }

    pub fn insert_egg(&mut self, row: Egg) -> StorageResult<()> {
        let id = row.bug_id;
        StorageMutate::insert(&mut self.eggs, &id, &row)?;
        Ok(())
    }

    /// Kill a bug: remove its `AliveBug`/`World` rows, insert a `DeadBug`
    /// row, and evict it from the row cache.
    pub fn kill_bug(&mut self, bug_id: u64, death_time: u64, killer_id: Option<u64>) -> StorageResult<()> {
        if let Some(killer) = killer_id {
            if !self.bugs.contains_key(&killer)? {
                return Err(StorageError::Integrity(format!("killer {killer} is not a known bug")));
            }
        }
        let alive = self.alive_bugs.remove(&bug_id)?;
        if let Some(ref row) = alive {
            self.world.remove(&row.world_id).ok();
        }
        self.bug_cache.evict(bug_id);
        let dead = DeadBug {
            bug_id,
            death: death_time,
            birth: alive.map(|a| a.birth),
            killer_id,
        };
        StorageMutate::insert(&mut self.dead_bugs, &bug_id, &dead)?;
        Ok(())
    }

    pub fn insert_food(&mut self, row: Food) -> StorageResult<()> {
        let id = row.id;
        StorageMutate::insert(&mut self.food, &id, &row)?;
        Ok(())
    }

    pub fn append_mutation(&mut self, row: Mutation) -> StorageResult<()> {
        let id = row.id;
        StorageMutate::insert(&mut self.mutations, &id, &row)?;
        Ok(())
    }

    pub fn mutations_by_bug(&self, bug_id: u64) -> Vec<Mutation> {
        let mut rows: Vec<Mutation> = self.mutations.iter().map(|(_, m)| m).filter(|m| m.bug_id == bug_id).cloned().collect();
        rows.sort_by_key(|m| m.id);
        rows
    }

    pub fn insert_spawn(&mut self, row: Spawn) -> StorageResult<()> {
        let id = row.id;
        StorageMutate::insert(&mut self.spawns, &id, &row)?;
        Ok(())
    }

    pub fn insert_resource(&mut self, row: Resource) -> StorageResult<()> {
        let id = row.id;
        StorageMutate::insert(&mut self.resources, &id, &row)?;
        Ok(())
    }

    pub fn append_stats(&mut self, row: Stats) -> StorageResult<()> {
        let id = row.id;
        StorageMutate::insert(&mut self.stats, &id, &row)?;
        Ok(())
    }

    /// Alive bugs, stable-sorted by creation order.
    pub fn alive_bugs_by_creation_order(&self) -> Vec<AliveBug> {
        let mut rows: Vec<AliveBug> = self.alive_bugs.iter().map(|(_, r)| r.clone()).collect();
        rows.sort_by_key(|r| {
            self.bugs
                .iter()
                .find(|(id, _)| **id == r.bug_id)
                .map(|(_, b)| b.creation_time)
                .unwrap_or(u64::MAX)
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::ActionCosts;

    fn env(time: u64) -> Environment {
        Environment {
            id: 1,
            time,
            size_x: 8,
            size_y: 8,
            time_rot: 10,
            size_rot: 1,
            mutations_probability: 0.01,
            time_birth: 100,
            time_mutate: 50,
            time_laziness: 20,
            energy_laziness: 1,
            attack_multiplier: 1.5,
            action_costs: ActionCosts::default(),
        }
    }

    #[test]
    fn environment_time_must_be_monotonic() {
        let mut db = Database::new();
        db.insert_environment(env(0)).unwrap();
        db.insert_environment(env(1)).unwrap();
        assert!(db.insert_environment(env(0)).is_err());
    }

    #[test]
    fn alive_bug_cannot_be_inserted_once_marked_dead() {
        let mut db = Database::new();
        db.insert_bug(Bug { id: 1, code_id: 1, creation_time: 0, father_id: None }).unwrap();
        db.kill_bug(1, 5, None).unwrap();
        let result = db.insert_alive_bug(AliveBug {
            bug_id: 1,
            world_id: 1,
            birth: 0,
            energy: 10,
            time_last_action: None,
            action_deadline: None,
            registers_id: 1,
            memory_id: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn killer_id_must_reference_an_existing_bug() {
        let mut db = Database::new();
        db.insert_bug(Bug { id: 1, code_id: 1, creation_time: 0, father_id: None }).unwrap();
        assert!(db.kill_bug(1, 5, Some(999)).is_err());
        assert!(db.kill_bug(1, 5, None).is_ok());
    }

    #[test]
    fn two_alive_bugs_cannot_share_a_position() {
        let mut db = Database::new();
        db.insert_world_position(WorldPosition { id: 1, position_x: 0, position_y: 0, orientation: None }).unwrap();
        db.insert_bug(Bug { id: 1, code_id: 1, creation_time: 0, father_id: None }).unwrap();
        db.insert_alive_bug(AliveBug {
            bug_id: 1,
            world_id: 1,
            birth: 0,
            energy: 10,
            time_last_action: None,
            action_deadline: None,
            registers_id: 1,
            memory_id: 1,
        })
        .unwrap();

        let result = db.insert_world_position(WorldPosition { id: 2, position_x: 0, position_y: 0, orientation: None });
        assert!(result.is_err());
    }

    #[test]
    fn bug_row_cache_returns_the_same_handle_within_a_tick() {
        let mut db = Database::new();
        db.insert_bug(Bug { id: 1, code_id: 1, creation_time: 0, father_id: None }).unwrap();
        let first = db.fetch_bug(1).unwrap();
        let second = db.fetch_bug(1).unwrap();
        assert!(std::rc::Rc::ptr_eq(&first, &second));
    }
}
