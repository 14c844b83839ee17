use sw_storage::ActionKind;

/// The closed table of `world` subcommands. `imm` selects one of these by
/// its family base code; anything else is invalid and raises the
/// world-action interrupt.
///
/// The discriminants are each subcommand's historical family base byte
/// (`myself`'s id/size/energy/position/orientation fields shared
/// `0x10..=0x14`, `info`'s shared `0x30..=0x34`), so an object file encoded
/// against that numbering still disassembles meaningfully even though this
/// closed table treats each field family as one subcommand rather than one
/// per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Nothing = 0x00,
    Myself = 0x10,
    Detect = 0x20,
    Info = 0x30,
    MoveForward = 0x40,
    MoveBackward = 0x41,
    TurnLeft = 0x42,
    TurnRight = 0x43,
    Attack = 0x50,
    Eat = 0x60,
    Egg = 0x70,
}

impl Subcommand {
    pub fn from_imm(imm: u16) -> Option<Self> {
        Some(match imm {
            0x00 => Subcommand::Nothing,
            0x10..=0x14 => Subcommand::Myself,
            0x20 => Subcommand::Detect,
            0x30..=0x34 => Subcommand::Info,
            0x40 => Subcommand::MoveForward,
            0x41 => Subcommand::MoveBackward,
            0x42 => Subcommand::TurnLeft,
            0x43 => Subcommand::TurnRight,
            0x50 => Subcommand::Attack,
            0x60 => Subcommand::Eat,
            0x70 => Subcommand::Egg,
            _ => return None,
        })
    }

    /// Which of the nine cost categories in [`sw_storage::ActionCosts`]
    /// this subcommand is billed against; forward/backward share "move"
    /// and left/right share "turn".
    pub fn cost_kind(self) -> ActionKind {
        match self {
            Subcommand::Nothing => ActionKind::Nothing,
            Subcommand::Myself => ActionKind::Myself,
            Subcommand::Detect => ActionKind::Detect,
            Subcommand::Info => ActionKind::Info,
            Subcommand::MoveForward | Subcommand::MoveBackward => ActionKind::Move,
            Subcommand::TurnLeft | Subcommand::TurnRight => ActionKind::Turn,
            Subcommand::Attack => ActionKind::Attack,
            Subcommand::Eat => ActionKind::Eat,
            Subcommand::Egg => ActionKind::Egg,
        }
    }
}

/// Result code written into `r0` when an action completes or is
/// interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Completed = 0,
    ActionInterrupted = 1,
    Failed = 2,
}
