use strum::{EnumIter, EnumString};

/// The five CPU-level interrupts plus the two simulation-layer interrupts
/// the `world` opcode raises.
///
/// Kept as a `strum`-derived enum so the canonical set can be registered
/// into an [`crate::Isa`] in one pass via [`Kind::iter`], while the
/// registry itself stays open to interrupts added by an embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    /// Raised every 64th tick by the scheduler.
    Timer,
    /// Raised by the `int` instruction.
    Software,
    /// Raised when fetch/decode finds no matching opcode.
    InstructionFault,
    /// Raised on a misaligned or out-of-range memory access.
    MemoryFault,
    /// Raised by `div`/`mod` family instructions on a zero divisor.
    DivideByZero,
    /// Raised when a `world` action's subcommand or destination is invalid.
    WorldAction,
    /// Raised for simulation-level notifications that are not action
    /// failures (reserved for future use by the scheduler).
    WorldEvent,
}

impl Kind {
    /// The canonical interrupt code assigned to this kind.
    ///
    /// Fixed so object code and serialized `Isa` registries stay portable;
    /// matches the ordering lists the interrupts in.
    pub const fn code(self) -> u8 {
        match self {
            Kind::Timer => 0,
            Kind::Software => 1,
            Kind::InstructionFault => 2,
            Kind::MemoryFault => 3,
            Kind::DivideByZero => 4,
            Kind::WorldAction => 5,
            Kind::WorldEvent => 6,
        }
    }

    /// Whether an unhandled occurrence of this interrupt is fatal to the
    /// issuing bug (no installed handler means the bug is killed rather
    /// than the interrupt being silently dropped).
    pub const fn fatal_if_unmasked(self) -> bool {
        matches!(
            self,
            Kind::InstructionFault | Kind::MemoryFault | Kind::DivideByZero | Kind::WorldAction
        )
    }

    /// Recover a `Kind` from its canonical code, the inverse of [`Kind::code`].
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Kind::Timer),
            1 => Some(Kind::Software),
            2 => Some(Kind::InstructionFault),
            3 => Some(Kind::MemoryFault),
            4 => Some(Kind::DivideByZero),
            5 => Some(Kind::WorldAction),
            6 => Some(Kind::WorldEvent),
            _ => None,
        }
    }

    /// Lower-case mnemonic used as the registry name.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Kind::Timer => "timer",
            Kind::Software => "software",
            Kind::InstructionFault => "instruction_fault",
            Kind::MemoryFault => "memory_fault",
            Kind::DivideByZero => "divide_by_zero",
            Kind::WorldAction => "world_action",
            Kind::WorldEvent => "world_event",
        }
    }
}

/// A scratch record written by an executor when it raises an interrupt, and
/// consumed by the CPU's dispatcher.
///
/// Value-semantics struct design notes: the executor writes into
/// it, the dispatcher reads and clears it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptRecord {
    /// Interrupt code raised.
    pub code: u8,
    /// Scratch word 0, copied into register 0 on dispatch.
    pub r0: u32,
    /// Scratch word 1, copied into register 1 on dispatch.
    pub r1: u32,
    /// Scratch word 2, copied into register 2 on dispatch.
    pub r2: u32,
}

impl InterruptRecord {
    /// Build a record carrying only an interrupt code.
    pub const fn code_only(code: u8) -> Self {
        Self {
            code,
            r0: 0,
            r1: 0,
            r2: 0,
        }
    }
}
