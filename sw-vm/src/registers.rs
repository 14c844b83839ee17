use sw_types::Word;

use crate::error::MemoryError;
use crate::memory::{Endian, Memory};

/// Number of general-purpose registers, `r0..=r12`.
pub const GENERAL_REGISTER_COUNT: u8 = 13;
/// Index of the program counter.
pub const PC: u8 = 13;
/// Index of the stack pointer (`stp`).
pub const STP: u8 = 14;
/// Index of the interrupt table pointer (`itp`).
pub const ITP: u8 = 15;
/// Total number of registers.
pub const REGISTER_COUNT: u8 = 16;
/// Size in bytes of the register file.
pub const REGISTERS_SIZE: usize = REGISTER_COUNT as usize * 4;

/// The CPU's 16-entry register file: `r0..r12`, `pc`, `stp`,
/// `itp`, each a 32-bit word, stored big-endian like any other `Memory`.
///
/// All register-indexed accesses here use host-native byte order -- the
/// big-endian encoding only matters where a `Word` crosses the object-file
/// or raw-memory boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers(Memory);

impl Registers {
    /// A fresh register file, all zeroed.
    pub fn new() -> Self {
        Self(Memory::new(REGISTERS_SIZE))
    }

    /// Read register `index` (`0..16`).
    pub fn get(&self, index: u8) -> Word {
        self.0
            .get_word((index as u16) * 4, Endian::Host)
            .expect("register index is always in range")
    }

    /// Write register `index` (`0..16`).
    pub fn set(&mut self, index: u8, value: Word) {
        self.0
            .set_word((index as u16) * 4, value, Endian::Host)
            .expect("register index is always in range");
    }

    /// The program counter.
    pub fn pc(&self) -> Word {
        self.get(PC)
    }

    /// Set the program counter.
    pub fn set_pc(&mut self, value: Word) {
        self.set(PC, value);
    }

    /// Advance the program counter by one instruction width (4 bytes).
    pub fn advance_pc(&mut self) {
        self.set_pc(self.pc().wrapping_add(4));
    }

    /// The stack pointer.
    pub fn stp(&self) -> Word {
        self.get(STP)
    }

    /// Set the stack pointer.
    pub fn set_stp(&mut self, value: Word) {
        self.set(STP, value);
    }

    /// The interrupt table pointer.
    pub fn itp(&self) -> Word {
        self.get(ITP)
    }

    /// Zero every register, including `pc` -- `restart`'s effect, which
    /// means execution resumes at address zero.
    pub fn reset(&mut self) {
        self.0 = Memory::new(REGISTERS_SIZE);
    }

    /// Borrow the underlying 64-byte buffer, e.g. to persist as a
    /// `Registers` blob.
    pub fn as_memory(&self) -> &Memory {
        &self.0
    }

    /// Build a register file from a persisted 64-byte blob.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MemoryError> {
        if bytes.len() != REGISTERS_SIZE {
            return Err(MemoryError::AddressOutOfRange {
                address: 0,
                width: bytes.len() as u8,
                size: REGISTERS_SIZE,
            });
        }
        Ok(Self(Memory::from_bytes(bytes)))
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_registers_are_zero() {
        let regs = Registers::new();
        for i in 0..REGISTER_COUNT {
            assert_eq!(regs.get(i), 0);
        }
    }

    #[test]
    fn advance_pc_steps_by_instruction_width() {
        let mut regs = Registers::new();
        regs.advance_pc();
        assert_eq!(regs.pc(), 4);
    }

    #[test]
    fn reset_zeroes_pc_too() {
        let mut regs = Registers::new();
        regs.set_pc(0x100);
        regs.set(STP, 0x200);
        regs.reset();
        assert_eq!(regs.pc(), 0);
        assert_eq!(regs.get(STP), 0);
    }
}
