//! Thin command-line front end over a Simple World persistent store.
//! The binary owns no simulation logic of its own: it loads a
//! [`sw_storage::Snapshot`], calls into `sw-storage`/`sw-sim`, and writes the
//! snapshot back. This is the external contract the core crates must
//! uphold, not a reimplementation of them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sw_storage::{
    ActionCosts, Bug, Database, Egg, Environment, Food, Region, Resource, Snapshot, Spawn, StorageMutate, WorldPosition,
};

#[derive(Parser)]
#[command(name = "sw", about = "Create, inspect and run a Simple World store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new store with a default environment row.
    Create {
        /// Path to the store file to create.
        store: PathBuf,
        #[arg(long, default_value_t = 32)]
        size_x: u32,
        #[arg(long, default_value_t = 32)]
        size_y: u32,
    },
    /// Step the scheduler for a number of ticks and write the result back.
    Run {
        store: PathBuf,
        #[arg(long, default_value_t = 1)]
        ticks: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Print a summary of the store's latest environment and stats rows.
    Info {
        store: PathBuf,
        /// Disassemble a single bug's code blob instead of the summary.
        #[arg(long)]
        bug: Option<u64>,
    },
    /// Read or update the environment row.
    Env {
        store: PathBuf,
        #[arg(long)]
        time_rot: Option<u32>,
        #[arg(long)]
        time_mutate: Option<u32>,
        #[arg(long)]
        mutations_probability: Option<f64>,
        #[arg(long)]
        time_laziness: Option<u32>,
        #[arg(long)]
        energy_laziness: Option<u32>,
        #[arg(long)]
        attack_multiplier: Option<f64>,
    },
    /// Hatch a new egg from an object file at a given position.
    Egg {
        store: PathBuf,
        /// Path to a raw object file.
        code: PathBuf,
        #[arg(long)]
        x: u32,
        #[arg(long)]
        y: u32,
        #[arg(long, default_value_t = 100)]
        energy: u32,
    },
    /// Drop a food item at a given position.
    Food {
        store: PathBuf,
        #[arg(long)]
        x: u32,
        #[arg(long)]
        y: u32,
        #[arg(long)]
        size: u32,
    },
    /// Register a periodic bug spawner over a region.
    Spawn {
        store: PathBuf,
        code: PathBuf,
        #[arg(long)]
        frequency: u32,
        #[arg(long)]
        max: u32,
        #[arg(long, default_value_t = 100)]
        energy: u32,
        #[arg(long, num_args = 4, value_names = ["START_X", "START_Y", "END_X", "END_Y"])]
        region: Vec<u32>,
    },
    /// Register a periodic food spawner over a region.
    Resource {
        store: PathBuf,
        #[arg(long)]
        frequency: u32,
        #[arg(long)]
        max: u32,
        #[arg(long)]
        size: u32,
        #[arg(long, num_args = 4, value_names = ["START_X", "START_Y", "END_X", "END_Y"])]
        region: Vec<u32>,
    },
}

fn load(store: &Path) -> Result<Database> {
    let bytes = std::fs::read(store).with_context(|| format!("reading store {}", store.display()))?;
    let snapshot: Snapshot = serde_json::from_slice(&bytes).with_context(|| format!("parsing store {}", store.display()))?;
    Database::from_snapshot(snapshot).map_err(|e| anyhow::anyhow!(e))
}

fn save(db: &Database, store: &Path) -> Result<()> {
    let snapshot = db.to_snapshot();
    let bytes = serde_json::to_vec_pretty(&snapshot)?;
    std::fs::write(store, bytes).with_context(|| format!("writing store {}", store.display()))
}

fn region_from_args(args: &[u32]) -> Region {
    Region { start_x: args[0], start_y: args[1], end_x: args[2], end_y: args[3] }
}

fn default_environment(size_x: u32, size_y: u32) -> Environment {
    Environment {
        id: 1,
        time: 0,
        size_x,
        size_y,
        time_rot: 50,
        size_rot: 1,
        mutations_probability: 0.001,
        time_birth: 20,
        time_mutate: 100,
        time_laziness: 20,
        energy_laziness: 1,
        attack_multiplier: 1.0,
        action_costs: ActionCosts { times: [1; 9], energies: [1; 9] },
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Create { store, size_x, size_y } => {
            if store.exists() {
                bail!("{} already exists", store.display());
            }
            let mut db = Database::new();
            db.insert_environment(default_environment(size_x, size_y))?;
            save(&db, &store)?;
            println!("created {} ({size_x}x{size_y})", store.display());
        }
        Command::Run { store, ticks, seed } => {
            let db = load(&store)?;
            let env = db.latest_environment().context("store has no environment row")?;
            let mut world = sw_sim::World::new(db, env.size_x, env.size_y, seed);
            tracing::info!(ticks, seed, store = %store.display(), "running");
            for _ in 0..ticks {
                world.tick()?;
            }
            save(world.database(), &store)?;
            println!("ran {ticks} tick(s)");
        }
        Command::Info { store, bug } => {
            let db = load(&store)?;
            match bug {
                None => {
                    let env = db.latest_environment().context("store has no environment row")?;
                    println!("time: {}", env.time);
                    println!("size: {}x{}", env.size_x, env.size_y);
                    println!("alive bugs: {}", db.alive_bugs.len());
                    println!("eggs: {}", db.eggs.len());
                    println!("food: {}", db.food.len());
                }
                Some(bug_id) => {
                    let code = db
                        .bugs
                        .iter()
                        .find(|(id, _)| **id == bug_id)
                        .and_then(|(_, b)| db.code.iter().find(|(id, _)| **id == b.code_id).map(|(_, c)| c.clone()))
                        .with_context(|| format!("bug {bug_id} has no code row"))?;
                    let isa = sw_vm::register_all();
                    for word in code.blob.chunks_exact(4) {
                        let value = sw_types::Word::from_be_bytes([word[0], word[1], word[2], word[3]]);
                        println!("{}", sw_compiler::disassemble(value, isa.metadata()));
                    }
                }
            }
        }
        Command::Env { store, time_rot, time_mutate, mutations_probability, time_laziness, energy_laziness, attack_multiplier } => {
            let mut db = load(&store)?;
            let mut env = db.latest_environment().context("store has no environment row")?;
            if let Some(v) = time_rot {
                env.time_rot = v;
            }
            if let Some(v) = time_mutate {
                env.time_mutate = v;
            }
            if let Some(v) = mutations_probability {
                env.mutations_probability = v;
            }
            if let Some(v) = time_laziness {
                env.time_laziness = v;
            }
            if let Some(v) = energy_laziness {
                env.energy_laziness = v;
            }
            if let Some(v) = attack_multiplier {
                env.attack_multiplier = v;
            }
            println!("{env:?}");
            StorageMutate::insert(&mut db.environments, &env.id, &env)?;
            save(&db, &store)?;
        }
        Command::Egg { store, code, x, y, energy } => {
            let mut db = load(&store)?;
            let env = db.latest_environment().context("store has no environment row")?;
            let blob = std::fs::read(&code).with_context(|| format!("reading {}", code.display()))?;
            let code_id = db.next_id("code");
            db.code.insert(&code_id, &sw_storage::Code::new(code_id, blob).map_err(|e| anyhow::anyhow!(e))?)?;
            let bug_id = db.next_id("bug");
            db.insert_bug(Bug { id: bug_id, code_id, creation_time: env.time, father_id: None })?;
            let world_id = db.next_id("world");
            db.insert_world_position(WorldPosition { id: world_id, position_x: x, position_y: y, orientation: None })?;
            db.insert_egg(Egg { bug_id, world_id, energy, memory_id: code_id, hatch_time: env.time + env.time_birth as u64 })?;
            save(&db, &store)?;
            println!("egg {bug_id} placed at ({x}, {y})");
        }
        Command::Food { store, x, y, size } => {
            let mut db = load(&store)?;
            let env = db.latest_environment().context("store has no environment row")?;
            let world_id = db.next_id("world");
            db.insert_world_position(WorldPosition { id: world_id, position_x: x, position_y: y, orientation: None })?;
            let id = db.next_id("food");
            db.insert_food(Food { id, time: env.time, world_id, size })?;
            save(&db, &store)?;
            println!("food {id} placed at ({x}, {y})");
        }
        Command::Spawn { store, code, frequency, max, energy, region } => {
            let mut db = load(&store)?;
            let blob = std::fs::read(&code).with_context(|| format!("reading {}", code.display()))?;
            let code_id = db.next_id("code");
            db.code.insert(&code_id, &sw_storage::Code::new(code_id, blob).map_err(|e| anyhow::anyhow!(e))?)?;
            let id = db.next_id("spawn");
            db.insert_spawn(Spawn { id, code_id, frequency, max, region: region_from_args(&region), energy })?;
            save(&db, &store)?;
            println!("spawn {id} registered");
        }
        Command::Resource { store, frequency, max, size, region } => {
            let mut db = load(&store)?;
            let id = db.next_id("resource");
            db.insert_resource(Resource { id, frequency, max, region: region_from_args(&region), size })?;
            save(&db, &store)?;
            println!("resource {id} registered");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_from_args_maps_positionally() {
        let region = region_from_args(&[1, 2, 3, 4]);
        assert_eq!(region, Region { start_x: 1, start_y: 2, end_x: 3, end_y: 4 });
    }

    #[test]
    fn default_environment_seeds_a_flat_action_cost_table() {
        let env = default_environment(16, 16);
        assert_eq!(env.size_x, 16);
        assert_eq!(env.size_y, 16);
        assert_eq!(env.action_costs.times, [1; 9]);
    }

    #[test]
    fn round_trips_a_store_through_save_and_load() {
        let store = std::env::temp_dir().join("sw-cli-round-trip-test-store.json");

        let mut db = Database::new();
        db.insert_environment(default_environment(4, 4)).unwrap();
        save(&db, &store).unwrap();

        let mut reloaded = load(&store).unwrap();
        let env = reloaded.latest_environment().unwrap();
        let world_id = reloaded.next_id("world");
        reloaded
            .insert_world_position(WorldPosition { id: world_id, position_x: 0, position_y: 0, orientation: None })
            .unwrap();
        let id = reloaded.next_id("food");
        reloaded.insert_food(Food { id, time: env.time, world_id, size: 10 }).unwrap();
        save(&reloaded, &store).unwrap();

        let final_db = load(&store).unwrap();
        assert_eq!(final_db.food.len(), 1);
        std::fs::remove_file(&store).ok();
    }
}
