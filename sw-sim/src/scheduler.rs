use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sw_asm::{InterruptKind, InterruptRecord};
use sw_storage::{
    ActionKind, AliveBug, Bug, Code, Database, Egg, Environment, Food, Mutation, Orientation, Registers as StoredRegisters,
    StorageInspect, StorageMutate, StorageResult, WorldPosition,
};
use sw_vm::{Cpu, CpuStep, Isa, Memory, Registers};
use tracing::{info, instrument, trace};

use crate::action::{ActionResult, Subcommand};
use crate::grid::{Grid, Occupant, Region};
use crate::mutation::mutate;

fn build_cpu(isa: Arc<Isa>, code: &Code, registers: &StoredRegisters) -> Cpu {
    let memory = Memory::from_bytes(code.blob.clone());
    let mut cpu = Cpu::new(isa, memory);
    *cpu.registers_mut() = Registers::from_bytes(registers.blob.to_vec()).unwrap_or_else(|_| sw_vm::Registers::new());
    cpu
}

fn full_stack_registers(memory_size: usize) -> Registers {
    let mut regs = Registers::new();
    regs.set_stp((memory_size as u32).wrapping_sub(4));
    regs
}

/// The per-tick driver over a [`Database`] and a [`Grid`].
///
/// Owns the pseudo-random stream used by the mutation engine and by grid
/// placement; the same seed plus the same persisted state always produces
/// the same sequence of writes.
pub struct World {
    db: Database,
    grid: Grid,
    isa: Arc<Isa>,
    rng: StdRng,
}

impl World {
    /// Build a scheduler over `db`, repopulating the grid from whatever
    /// `AliveBug`/`Egg`/`Food` rows it already contains. The grid itself is
    /// not persisted; `World` rows are the source of truth for placement.
    pub fn new(db: Database, size_x: u32, size_y: u32, seed: u64) -> Self {
        let mut grid = Grid::new(size_x, size_y);
        for alive in db.alive_bugs_by_creation_order() {
            if let Ok(Some(position)) = StorageInspect::get(&db.world, &alive.world_id) {
                grid.add(Occupant::Bug(alive.bug_id), (position.position_x, position.position_y)).ok();
            }
        }
        for (_, egg) in db.eggs.iter() {
            if let Ok(Some(position)) = StorageInspect::get(&db.world, &egg.world_id) {
                grid.add(Occupant::Egg(egg.bug_id), (position.position_x, position.position_y)).ok();
            }
        }
        for (_, food) in db.food.iter() {
            if let Ok(Some(position)) = StorageInspect::get(&db.world, &food.world_id) {
                grid.add(Occupant::Food(food.id), (position.position_x, position.position_y)).ok();
            }
        }
        Self {
            db,
            grid,
            isa: Cpu::isa(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Run one full tick's nine-step algorithm.
    #[instrument(skip(self))]
    pub fn tick(&mut self) -> StorageResult<u64> {
        let now = self.advance_environment()?;
        self.apply_mutations(now)?;
        let raise_timer = now != 0 && now % 64 == 0;
        self.step_bugs(now, raise_timer)?;
        self.apply_laziness(now)?;
        self.hatch_eggs(now)?;
        self.run_spawners(now)?;
        self.rot_food(now)?;
        self.append_stats(now)?;
        Ok(now)
    }

    fn advance_environment(&mut self) -> StorageResult<u64> {
        let mut env = self.db.latest_environment().expect("environment row must exist before ticking");
        env.time += 1;
        let now = env.time;
        self.db.insert_environment(env)?;
        Ok(now)
    }

    fn environment(&self) -> Environment {
        self.db.latest_environment().expect("environment row must exist before ticking")
    }

    fn apply_mutations(&mut self, now: u64) -> StorageResult<()> {
        let env = self.environment();
        if env.time_mutate == 0 {
            return Ok(());
        }
        for alive in self.db.alive_bugs_by_creation_order() {
            let age = now.saturating_sub(alive.birth);
            if age == 0 || age % env.time_mutate as u64 != 0 {
                continue;
            }
            let Some(code) = self.db.code.get(&alive.memory_id)?.map(|c| c.into_owned()) else {
                continue;
            };
            let (mutated_blob, records) = mutate(&code.blob, env.mutations_probability, &mut self.rng);
            self.db.code.insert(&alive.memory_id, &Code { id: alive.memory_id, blob: mutated_blob })?;
            for record in records {
                let id = self.db.next_id("mutation");
                self.db.append_mutation(Mutation {
                    id,
                    bug_id: alive.bug_id,
                    time: now,
                    kind: record.kind,
                    position: record.position,
                    original: record.original,
                    mutated: record.mutated,
                })?;
            }
        }
        Ok(())
    }

    fn step_bugs(&mut self, now: u64, raise_timer: bool) -> StorageResult<()> {
        for alive in self.db.alive_bugs_by_creation_order() {
            if !self.db.alive_bugs.contains_key(&alive.bug_id)? {
                // Killed earlier this tick (e.g. by another bug's attack).
                continue;
            }
            self.step_one_bug(alive, now, raise_timer)?;
        }
        Ok(())
    }

    fn step_one_bug(&mut self, alive: AliveBug, now: u64, raise_timer: bool) -> StorageResult<()> {
        let code = self.db.code.get(&alive.memory_id)?.map(|c| c.into_owned()).expect("alive bug always has a code row");
        let registers = self.db.registers.get(&alive.registers_id)?.map(|r| r.into_owned()).expect("alive bug always has a registers row");
        let mut cpu = build_cpu(self.isa.clone(), &code, &registers);

        if raise_timer {
            let kind = InterruptKind::Timer;
            let code_value = kind.code();
            cpu.queue_interrupt(InterruptRecord {
                code: code_value,
                r0: code_value as u32,
                r1: cpu.registers().pc(),
                r2: 0,
            });
        }

        let outcome = cpu.step();
        trace!(bug_id = alive.bug_id, ?outcome, "stepped bug");

        match outcome {
            CpuStep::Continued => {
                self.persist_after_step(&alive, &cpu)?;
            }
            CpuStep::Halted => {
                self.kill_bug(alive.bug_id, now, None)?;
            }
            CpuStep::Faulted(_) => {
                self.kill_bug(alive.bug_id, now, None)?;
            }
            CpuStep::WorldActionRequested(imm) => {
                self.handle_world_action(alive, now, imm, &mut cpu)?;
            }
        }
        Ok(())
    }

    fn persist_after_step(&mut self, alive: &AliveBug, cpu: &Cpu) -> StorageResult<()> {
        self.db.registers.insert(
            &alive.registers_id,
            &StoredRegisters { id: alive.registers_id, blob: cpu.registers().as_memory().as_bytes().try_into().expect("register file is always 64 bytes") },
        )?;
        self.db.code.insert(&alive.memory_id, &Code { id: alive.memory_id, blob: cpu.memory().as_bytes().to_vec() })?;
        Ok(())
    }

    fn handle_world_action(&mut self, alive: AliveBug, now: u64, imm: u16, cpu: &mut Cpu) -> StorageResult<()> {
        let mut alive = alive;
        let Some(subcommand) = Subcommand::from_imm(imm) else {
            let step = cpu.fail_world_action();
            if let CpuStep::Faulted(_) = step {
                self.kill_bug(alive.bug_id, now, None)?;
            } else {
                alive.action_deadline = None;
                self.db.insert_alive_bug(alive.clone())?;
                self.persist_after_step(&alive, cpu)?;
            }
            return Ok(());
        };

        match alive.action_deadline {
            None => {
                alive.action_deadline = Some(now + 16);
                self.db.insert_alive_bug(alive.clone())?;
                self.persist_after_step(&alive, cpu)?;
            }
            Some(deadline) if now < deadline => {
                // Still blocked; nothing changes. Registers/memory are
                // unchanged since `world`'s executor never advances `pc`.
            }
            Some(_) => {
                self.resolve_world_action(alive, now, subcommand, cpu)?;
            }
        }
        Ok(())
    }

    fn resolve_world_action(&mut self, mut alive: AliveBug, now: u64, subcommand: Subcommand, cpu: &mut Cpu) -> StorageResult<()> {
        let env = self.environment();
        let cost = env.action_costs.energy(subcommand.cost_kind());
        let position = self.db.world.get(&alive.world_id)?.map(|p| p.into_owned()).expect("alive bug always has a world row");
        let orientation = position.orientation.unwrap_or(Orientation::North);

        let mut result = ActionResult::Completed;
        let mut r1 = 0u32;
        let mut r2 = 0u32;

        match subcommand {
            Subcommand::Nothing => {}
            Subcommand::Myself => {
                r1 = alive.energy;
                r2 = alive.bug_id as u32;
            }
            Subcommand::Detect | Subcommand::Info => {
                let front = self.grid.cell_in_front((position.position_x, position.position_y), orientation);
                r1 = self.grid.get(front).map(|o| o.id() as u32).unwrap_or(0);
            }
            Subcommand::MoveForward | Subcommand::MoveBackward => {
                let target = if matches!(subcommand, Subcommand::MoveForward) {
                    self.grid.cell_in_front((position.position_x, position.position_y), orientation)
                } else {
                    self.grid.cell_behind((position.position_x, position.position_y), orientation)
                };
                match self.grid.move_occupant((position.position_x, position.position_y), target) {
                    Ok(()) => {
                        self.db.world.insert(
                            &alive.world_id,
                            &WorldPosition { id: alive.world_id, position_x: target.0, position_y: target.1, orientation: Some(orientation) },
                        )?;
                    }
                    Err(_) => result = ActionResult::Failed,
                }
            }
            Subcommand::TurnLeft | Subcommand::TurnRight => {
                let new_orientation = if matches!(subcommand, Subcommand::TurnLeft) { orientation.turn_left() } else { orientation.turn_right() };
                self.db.world.insert(
                    &alive.world_id,
                    &WorldPosition { id: alive.world_id, position_x: position.position_x, position_y: position.position_y, orientation: Some(new_orientation) },
                )?;
            }
            Subcommand::Attack => {
                let front = self.grid.cell_in_front((position.position_x, position.position_y), orientation);
                if let Some(victim) = self.grid.get(front) {
                    let damage = (env.action_costs.energy(ActionKind::Attack) as f64 * env.attack_multiplier) as u32;
                    self.apply_damage(victim, front, damage, alive.bug_id, now)?;
                } else {
                    result = ActionResult::Failed;
                }
            }
            Subcommand::Eat => {
                let front = self.grid.cell_in_front((position.position_x, position.position_y), orientation);
                match self.grid.get(front) {
                    Some(Occupant::Food(food_id)) => {
                        if let Some(food) = self.db.food.get(&food_id)?.map(|f| f.into_owned()) {
                            alive.energy = alive.energy.saturating_add(food.size);
                            self.db.food.remove(&food_id)?;
                            self.grid.remove(front);
                        }
                    }
                    _ => result = ActionResult::Failed,
                }
            }
            Subcommand::Egg => {
                let front = self.grid.cell_in_front((position.position_x, position.position_y), orientation);
                if self.grid.get(front).is_some() {
                    result = ActionResult::Failed;
                } else {
                    let requested = cpu.registers().get(0);
                    self.lay_egg(&mut alive, front, orientation.opposite(), requested, now)?;
                }
            }
        }

        if matches!(result, ActionResult::Failed) {
            let step = cpu.fail_world_action();
            alive.action_deadline = None;
            if let CpuStep::Faulted(_) = step {
                self.kill_bug(alive.bug_id, now, None)?;
                return Ok(());
            }
        } else {
            alive.energy = alive.energy.saturating_sub(cost);
            alive.action_deadline = None;
            alive.time_last_action = Some(now);
            cpu.registers_mut().set(0, result as u32);
            cpu.registers_mut().set(1, r1);
            cpu.registers_mut().set(2, r2);
            cpu.complete_world_action();
        }

        if alive.energy == 0 {
            self.kill_bug(alive.bug_id, now, None)?;
            return Ok(());
        }

        self.db.insert_alive_bug(alive.clone())?;
        self.persist_after_step(&alive, cpu)
    }

    fn apply_damage(&mut self, victim: Occupant, position: (u32, u32), damage: u32, attacker: u64, now: u64) -> StorageResult<()> {
        match victim {
            Occupant::Bug(bug_id) => {
                if let Some(mut victim_alive) = self.db.alive_bugs.get(&bug_id)?.map(|r| r.into_owned()) {
                    victim_alive.energy = victim_alive.energy.saturating_sub(damage);
                    if victim_alive.energy == 0 {
                        self.kill_bug(bug_id, now, Some(attacker))?;
                    } else {
                        self.db.insert_alive_bug(victim_alive)?;
                    }
                }
            }
            Occupant::Egg(bug_id) => {
                if let Some(egg) = self.db.eggs.get(&bug_id)?.map(|r| r.into_owned()) {
                    let remaining = egg.energy.saturating_sub(damage);
                    if remaining == 0 {
                        self.db.eggs.remove(&bug_id)?;
                        self.db.world.remove(&egg.world_id).ok();
                        self.grid.remove(position);
                        self.spawn_food_at(position, egg.memory_id, now)?;
                    } else {
                        self.db.eggs.insert(&bug_id, &Egg { energy: remaining, ..egg })?;
                    }
                }
            }
            Occupant::Food(_) => {}
        }
        Ok(())
    }

    fn spawn_food_at(&mut self, position: (u32, u32), code_id: u64, now: u64) -> StorageResult<()> {
        let size = self.db.code.get(&code_id)?.map(|c| c.blob.len() as u32).unwrap_or(0);
        let world_id = self.db.next_id("world");
        self.db.insert_world_position(WorldPosition { id: world_id, position_x: position.0, position_y: position.1, orientation: None })?;
        let id = self.db.next_id("food");
        self.db.insert_food(Food { id, time: now, world_id, size })?;
        self.grid.add(Occupant::Food(id), position).ok();
        Ok(())
    }

    fn lay_egg(&mut self, father: &mut AliveBug, position: (u32, u32), orientation: Orientation, requested: u32, now: u64) -> StorageResult<()> {
        let env = self.environment();
        let code = self.db.code.get(&father.memory_id)?.map(|c| c.into_owned()).expect("alive bug always has code");
        let (mutated_blob, _records) = mutate(&code.blob, env.mutations_probability, &mut self.rng);
        let child_code_id = self.db.next_id("code");
        self.db.code.insert(&child_code_id, &Code { id: child_code_id, blob: mutated_blob })?;

        let child_bug_id = self.db.next_id("bug");
        self.db.insert_bug(Bug { id: child_bug_id, code_id: child_code_id, creation_time: now, father_id: Some(father.bug_id) })?;

        let world_id = self.db.next_id("world");
        self.db.insert_world_position(WorldPosition { id: world_id, position_x: position.0, position_y: position.1, orientation: Some(orientation) })?;
        self.grid.add(Occupant::Egg(child_bug_id), position).ok();

        let energy_given = father.energy.min(requested);
        father.energy -= energy_given;
        self.db.insert_egg(Egg { bug_id: child_bug_id, world_id, energy: energy_given, memory_id: child_code_id, hatch_time: now + env.time_birth as u64 })
    }

    fn apply_laziness(&mut self, now: u64) -> StorageResult<()> {
        let env = self.environment();
        if env.time_laziness == 0 {
            return Ok(());
        }
        for mut alive in self.db.alive_bugs_by_creation_order() {
            let last = alive.time_last_action.unwrap_or(alive.birth);
            if now.saturating_sub(last) <= env.time_laziness as u64 {
                continue;
            }
            match alive.energy.checked_sub(env.energy_laziness) {
                Some(remaining) if remaining > 0 => {
                    alive.energy = remaining;
                    self.db.insert_alive_bug(alive)?;
                }
                _ => {
                    self.kill_bug(alive.bug_id, now, None)?;
                }
            }
        }
        Ok(())
    }

    fn hatch_eggs(&mut self, now: u64) -> StorageResult<()> {
        let ready: Vec<Egg> = self.db.eggs.iter().map(|(_, e)| e.clone()).filter(|e| e.hatch_time <= now).collect();
        for egg in ready {
            self.db.eggs.remove(&egg.bug_id)?;
            let code = self.db.code.get(&egg.memory_id)?.map(|c| c.into_owned()).expect("egg always has code");
            let registers = full_stack_registers(code.blob.len());
            let registers_id = self.db.next_id("registers");
            self.db.registers.insert(
                &registers_id,
                &StoredRegisters { id: registers_id, blob: registers.as_memory().as_bytes().try_into().expect("register file is always 64 bytes") },
            )?;
            self.db.insert_alive_bug(AliveBug {
                bug_id: egg.bug_id,
                world_id: egg.world_id,
                birth: now,
                energy: egg.energy,
                time_last_action: None,
                action_deadline: None,
                registers_id,
                memory_id: egg.memory_id,
            })?;
        }
        Ok(())
    }

    fn run_spawners(&mut self, now: u64) -> StorageResult<()> {
        let spawns: Vec<_> = self.db.spawns.iter().map(|(_, s)| s.clone()).collect();
        for spawn in spawns {
            if spawn.frequency == 0 || now % spawn.frequency as u64 != 0 {
                continue;
            }
            let region = Region { start_x: spawn.region.start_x, start_y: spawn.region.start_y, end_x: spawn.region.end_x, end_y: spawn.region.end_y };
            let population = self.grid.count_in_region(region, |o| matches!(o, Occupant::Bug(_) | Occupant::Egg(_)));
            if population as u32 >= spawn.max {
                continue;
            }
            let Ok(position) = self.grid.unused_position(Some(region), &mut self.rng) else {
                continue;
            };
            let bug_id = self.db.next_id("bug");
            self.db.insert_bug(Bug { id: bug_id, code_id: spawn.code_id, creation_time: now, father_id: None })?;
            let world_id = self.db.next_id("world");
            let orientation = Grid::random_orientation(&mut self.rng);
            self.db.insert_world_position(WorldPosition { id: world_id, position_x: position.0, position_y: position.1, orientation: Some(orientation) })?;
            self.grid.add(Occupant::Egg(bug_id), position).ok();
            self.db.insert_egg(Egg { bug_id, world_id, energy: spawn.energy, memory_id: spawn.code_id, hatch_time: now + self.environment().time_birth as u64 })?;
        }

        let resources: Vec<_> = self.db.resources.iter().map(|(_, r)| r.clone()).collect();
        for resource in resources {
            if resource.frequency == 0 || now % resource.frequency as u64 != 0 {
                continue;
            }
            let region = Region { start_x: resource.region.start_x, start_y: resource.region.start_y, end_x: resource.region.end_x, end_y: resource.region.end_y };
            let population = self.grid.count_in_region(region, |o| matches!(o, Occupant::Food(_)));
            if population as u32 >= resource.max {
                continue;
            }
            let Ok(position) = self.grid.unused_position(Some(region), &mut self.rng) else {
                continue;
            };
            let world_id = self.db.next_id("world");
            self.db.insert_world_position(WorldPosition { id: world_id, position_x: position.0, position_y: position.1, orientation: None })?;
            let id = self.db.next_id("food");
            self.db.insert_food(Food { id, time: now, world_id, size: resource.size })?;
            self.grid.add(Occupant::Food(id), position).ok();
        }
        Ok(())
    }

    fn rot_food(&mut self, now: u64) -> StorageResult<()> {
        let env = self.environment();
        if env.time_rot == 0 {
            return Ok(());
        }
        let rows: Vec<Food> = self.db.food.iter().map(|(_, f)| f.clone()).filter(|f| now % env.time_rot as u64 == 0).collect();
        for mut food in rows {
            if food.size <= env.size_rot {
                self.db.food.remove(&food.id)?;
            } else {
                food.size -= env.size_rot;
                self.db.insert_food(food)?;
            }
        }
        Ok(())
    }

    fn append_stats(&mut self, now: u64) -> StorageResult<()> {
        let alive = self.db.alive_bugs.len() as u32;
        let eggs = self.db.eggs.len() as u32;
        let food = self.db.food.len() as u32;
        let energy: u64 = self.db.alive_bugs.iter().map(|(_, r)| r.energy as u64).sum();
        let id = self.db.next_id("stats");
        self.db.append_stats(sw_storage::Stats { id, time: now, alive, eggs, food, energy, ..Default::default() })?;
        info!(now, alive, eggs, food, "tick complete");
        Ok(())
    }

    fn kill_bug(&mut self, bug_id: u64, now: u64, killer_id: Option<u64>) -> StorageResult<()> {
        let freed = self.db.alive_bugs.get(&bug_id)?.map(|r| r.into_owned()).and_then(|alive| {
            self.db
                .world
                .get(&alive.world_id)
                .ok()
                .flatten()
                .map(|p| ((p.position_x, p.position_y), alive.memory_id))
        });
        self.db.kill_bug(bug_id, now, killer_id)?;
        if let Some((position, memory_id)) = freed {
            self.grid.remove(position);
            self.spawn_food_at(position, memory_id, now).ok();
        }
        Ok(())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World").field("grid", &self.grid.size()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_asm::{encode, Instruction};
    use sw_storage::ActionCosts;

    fn base_environment() -> Environment {
        Environment {
            id: 1,
            time: 0,
            size_x: 4,
            size_y: 4,
            time_rot: 10,
            size_rot: 1,
            mutations_probability: 0.0,
            time_birth: 5,
            time_mutate: 0,
            time_laziness: 1000,
            energy_laziness: 1,
            attack_multiplier: 1.0,
            action_costs: ActionCosts::default(),
        }
    }

    fn world_with_stopped_bug() -> (World, u64) {
        let mut db = Database::new();
        db.insert_environment(base_environment()).unwrap();

        let code_blob: Vec<u8> = encode(Instruction::new(0x00, 0, 0, 0)).to_be_bytes().to_vec();
        let code_id = db.next_id("code");
        db.code.insert(&code_id, &Code { id: code_id, blob: code_blob }).unwrap();

        let bug_id = db.next_id("bug");
        db.insert_bug(Bug { id: bug_id, code_id, creation_time: 0, father_id: None }).unwrap();

        let world_id = db.next_id("world");
        db.insert_world_position(WorldPosition { id: world_id, position_x: 0, position_y: 0, orientation: Some(Orientation::North) }).unwrap();

        let registers_id = db.next_id("registers");
        let regs = sw_vm::Registers::new();
        db.registers
            .insert(&registers_id, &StoredRegisters { id: registers_id, blob: regs.as_memory().as_bytes().try_into().unwrap() })
            .unwrap();

        db.insert_alive_bug(AliveBug {
            bug_id,
            world_id,
            birth: 0,
            energy: 10,
            time_last_action: None,
            action_deadline: None,
            registers_id,
            memory_id: code_id,
        })
        .unwrap();

        let world = World::new(db, 4, 4, 1);
        (world, bug_id)
    }

    #[test]
    fn a_halted_bug_dies_and_becomes_food() {
        let (mut world, bug_id) = world_with_stopped_bug();
        world.tick().unwrap();
        assert!(!world.database().alive_bugs.contains_key(&bug_id).unwrap());
        assert!(world.database().dead_bugs.contains_key(&bug_id).unwrap());
        assert_eq!(world.database().food.len(), 1);
    }

    #[test]
    fn environment_time_advances_by_one_each_tick() {
        let (mut world, _bug_id) = world_with_stopped_bug();
        let first = world.tick().unwrap();
        assert_eq!(first, 1);
    }
}
