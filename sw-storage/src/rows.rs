//! Row shapes for every table in the persistent schema.

use crate::mappable::Mappable;
use crate::orientation::Orientation;

/// The nine world-action subcommands that carry their own time/energy cost.
/// `Move` covers both forward and backward, `Turn` both left and
/// right, matching the closed subcommand table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Nothing,
    Myself,
    Detect,
    Info,
    Move,
    Turn,
    Attack,
    Eat,
    Egg,
}

impl ActionKind {
    pub const ALL: [ActionKind; 9] = [
        ActionKind::Nothing,
        ActionKind::Myself,
        ActionKind::Detect,
        ActionKind::Info,
        ActionKind::Move,
        ActionKind::Turn,
        ActionKind::Attack,
        ActionKind::Eat,
        ActionKind::Egg,
    ];

    const fn index(self) -> usize {
        match self {
            ActionKind::Nothing => 0,
            ActionKind::Myself => 1,
            ActionKind::Detect => 2,
            ActionKind::Info => 3,
            ActionKind::Move => 4,
            ActionKind::Turn => 5,
            ActionKind::Attack => 6,
            ActionKind::Eat => 7,
            ActionKind::Egg => 8,
        }
    }
}

/// Per-action tick cost and energy cost, indexed by [`ActionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionCosts {
    pub times: [u32; 9],
    pub energies: [u32; 9],
}

impl ActionCosts {
    pub fn time(&self, kind: ActionKind) -> u32 {
        self.times[kind.index()]
    }

    pub fn energy(&self, kind: ActionKind) -> u32 {
        self.energies[kind.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    pub id: u64,
    pub time: u64,
    pub size_x: u32,
    pub size_y: u32,
    pub time_rot: u32,
    pub size_rot: u32,
    pub mutations_probability: f64,
    pub time_birth: u32,
    pub time_mutate: u32,
    pub time_laziness: u32,
    pub energy_laziness: u32,
    pub attack_multiplier: f64,
    pub action_costs: ActionCosts,
}

impl Mappable for Environment {
    type Key = u64;
    type SetValue = Environment;
    type GetValue = Environment;
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPosition {
    pub id: u64,
    pub position_x: u32,
    pub position_y: u32,
    pub orientation: Option<Orientation>,
}

impl Mappable for WorldPosition {
    type Key = u64;
    type SetValue = WorldPosition;
    type GetValue = WorldPosition;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Code {
    pub id: u64,
    pub blob: Vec<u8>,
}

impl Code {
    pub fn new(id: u64, blob: Vec<u8>) -> Result<Self, crate::error::StorageError> {
        if blob.len() % 4 != 0 {
            return Err(crate::error::StorageError::Integrity(format!(
                "code blob length {} is not a multiple of 4",
                blob.len()
            )));
        }
        Ok(Self { id, blob })
    }
}

impl Mappable for Code {
    type Key = u64;
    type SetValue = Code;
    type GetValue = Code;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    pub id: u64,
    #[cfg_attr(feature = "serde", serde(with = "register_blob"))]
    pub blob: [u8; 64],
}

/// `serde` has no blanket impl for arrays past length 32; this module
/// de/serializes the 64-byte register blob as a byte sequence instead.
#[cfg(feature = "serde")]
mod register_blob {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error> {
        bytes.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 64], D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| serde::de::Error::custom(format!("register blob must be 64 bytes, got {}", v.len())))
    }
}

impl Mappable for Registers {
    type Key = u64;
    type SetValue = Registers;
    type GetValue = Registers;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bug {
    pub id: u64,
    pub code_id: u64,
    pub creation_time: u64,
    pub father_id: Option<u64>,
}

impl Mappable for Bug {
    type Key = u64;
    type SetValue = Bug;
    type GetValue = Bug;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Egg {
    pub bug_id: u64,
    pub world_id: u64,
    pub energy: u32,
    pub memory_id: u64,
    pub hatch_time: u64,
}

impl Mappable for Egg {
    type Key = u64;
    type SetValue = Egg;
    type GetValue = Egg;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AliveBug {
    pub bug_id: u64,
    pub world_id: u64,
    pub birth: u64,
    pub energy: u32,
    pub time_last_action: Option<u64>,
    /// Set while a `world` action is in flight; cleared on completion or
    /// cancellation.
    pub action_deadline: Option<u64>,
    pub registers_id: u64,
    pub memory_id: u64,
}

impl Mappable for AliveBug {
    type Key = u64;
    type SetValue = AliveBug;
    type GetValue = AliveBug;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeadBug {
    pub bug_id: u64,
    pub death: u64,
    pub birth: Option<u64>,
    pub killer_id: Option<u64>,
}

impl Mappable for DeadBug {
    type Key = u64;
    type SetValue = DeadBug;
    type GetValue = DeadBug;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Food {
    pub id: u64,
    pub time: u64,
    pub world_id: u64,
    pub size: u32,
}

impl Mappable for Food {
    type Key = u64;
    type SetValue = Food;
    type GetValue = Food;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationKind {
    Replace = 0,
    Partial = 1,
    Permute = 2,
    Insert = 3,
    Duplicate = 4,
    Delete = 5,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mutation {
    pub id: u64,
    pub bug_id: u64,
    pub time: u64,
    pub kind: MutationKind,
    pub position: u32,
    pub original: Option<u32>,
    pub mutated: Option<u32>,
}

impl Mappable for Mutation {
    type Key = u64;
    type SetValue = Mutation;
    type GetValue = Mutation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub start_x: u32,
    pub start_y: u32,
    pub end_x: u32,
    pub end_y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spawn {
    pub id: u64,
    pub code_id: u64,
    pub frequency: u32,
    pub max: u32,
    pub region: Region,
    pub energy: u32,
}

impl Mappable for Spawn {
    type Key = u64;
    type SetValue = Spawn;
    type GetValue = Spawn;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    pub id: u64,
    pub frequency: u32,
    pub max: u32,
    pub region: Region,
    pub size: u32,
}

impl Mappable for Resource {
    type Key = u64;
    type SetValue = Resource;
    type GetValue = Resource;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub id: u64,
    pub time: u64,
    pub families: u32,
    pub alive: u32,
    pub eggs: u32,
    pub food: u32,
    pub energy: u64,
    pub mutations: u32,
    pub age: u64,
    pub last_births: u32,
    pub last_sons: u32,
    pub last_deaths: u32,
    pub last_kills: u32,
    pub last_mutations: u32,
}

impl Mappable for Stats {
    type Key = u64;
    type SetValue = Stats;
    type GetValue = Stats;
}
