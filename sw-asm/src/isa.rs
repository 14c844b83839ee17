use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::interrupt::Kind as InterruptKind;

/// Arity and encoding shape of an opcode, as known to the assembler and the
/// CPU's fetch/decode stage -- everything about an instruction except the
/// function that actually executes it (that lives one layer up, in
/// `sw-vm::Isa`, since it needs `Memory` types this crate doesn't depend
/// on).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionMeta {
    /// Opcode byte.
    pub opcode: u8,
    /// Assembly mnemonic, case-sensitive.
    pub mnemonic: String,
    /// Number of register operands, `0..=3`.
    pub reg_count: u8,
    /// Whether the instruction also takes a 16-bit immediate operand
    /// (mutually exclusive with a third register operand).
    pub has_immediate: bool,
}

/// Metadata for a registered interrupt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptMeta {
    /// Interrupt name.
    pub name: String,
    /// Whether an unhandled occurrence kills the issuing bug.
    pub is_fatal_if_unmasked: bool,
}

/// The opcode/register/interrupt registry
///
/// Bidirectional lookups by code or name; re-registering an existing code or
/// name fails with [`Error::Duplicate`], and any miss fails with
/// [`Error::NotFound`]. This is the data half of the ISA -- the assembler,
/// disassembler and CPU core all consult it, but only `sw-vm::Isa` attaches
/// executors to the opcodes it describes.
#[derive(Debug, Default, Clone)]
pub struct Isa {
    instructions: HashMap<u8, InstructionMeta>,
    mnemonics: HashMap<String, u8>,
    registers: HashMap<u8, String>,
    register_codes: HashMap<String, u8>,
    interrupts: HashMap<u8, InterruptMeta>,
    interrupt_codes: HashMap<String, u8>,
}

impl Isa {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new opcode. Fails if `opcode` or `mnemonic` is already
    /// registered.
    pub fn add_instruction(
        &mut self,
        opcode: u8,
        mnemonic: &str,
        reg_count: u8,
        has_immediate: bool,
    ) -> Result<()> {
        if self.instructions.contains_key(&opcode) {
            return Err(Error::Duplicate(format!("opcode 0x{opcode:02x}")));
        }
        if self.mnemonics.contains_key(mnemonic) {
            return Err(Error::Duplicate(format!("mnemonic {mnemonic}")));
        }
        self.instructions.insert(
            opcode,
            InstructionMeta {
                opcode,
                mnemonic: mnemonic.to_string(),
                reg_count,
                has_immediate,
            },
        );
        self.mnemonics.insert(mnemonic.to_string(), opcode);
        Ok(())
    }

    /// Look up an opcode's metadata by its code.
    pub fn instruction_by_opcode(&self, opcode: u8) -> Result<&InstructionMeta> {
        self.instructions
            .get(&opcode)
            .ok_or_else(|| Error::NotFound(format!("opcode 0x{opcode:02x}")))
    }

    /// Look up an opcode's metadata by its mnemonic.
    pub fn instruction_by_mnemonic(&self, mnemonic: &str) -> Result<&InstructionMeta> {
        let opcode = self
            .mnemonics
            .get(mnemonic)
            .ok_or_else(|| Error::NotFound(format!("mnemonic {mnemonic}")))?;
        self.instruction_by_opcode(*opcode)
    }

    /// Register a register name, `code` being a 4-bit value.
    pub fn add_register(&mut self, code: u8, name: &str) -> Result<()> {
        let code = code & 0x0F;
        if self.registers.contains_key(&code) {
            return Err(Error::Duplicate(format!("register code {code}")));
        }
        if self.register_codes.contains_key(name) {
            return Err(Error::Duplicate(format!("register name {name}")));
        }
        self.registers.insert(code, name.to_string());
        self.register_codes.insert(name.to_string(), code);
        Ok(())
    }

    /// Name of the register at `code`.
    pub fn register_name(&self, code: u8) -> Result<&str> {
        self.registers
            .get(&(code & 0x0F))
            .map(String::as_str)
            .ok_or_else(|| Error::NotFound(format!("register code {code}")))
    }

    /// Code of the register named `name`.
    pub fn register_code(&self, name: &str) -> Result<u8> {
        self.register_codes
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("register name {name}")))
    }

    /// Register an interrupt kind.
    pub fn add_interrupt(&mut self, code: u8, name: &str, is_fatal_if_unmasked: bool) -> Result<()> {
        if self.interrupts.contains_key(&code) {
            return Err(Error::Duplicate(format!("interrupt code {code}")));
        }
        if self.interrupt_codes.contains_key(name) {
            return Err(Error::Duplicate(format!("interrupt name {name}")));
        }
        self.interrupts.insert(
            code,
            InterruptMeta {
                name: name.to_string(),
                is_fatal_if_unmasked,
            },
        );
        self.interrupt_codes.insert(name.to_string(), code);
        Ok(())
    }

    /// Metadata for the interrupt at `code`.
    pub fn interrupt_by_code(&self, code: u8) -> Result<&InterruptMeta> {
        self.interrupts
            .get(&code)
            .ok_or_else(|| Error::NotFound(format!("interrupt code {code}")))
    }

    /// Code of the interrupt named `name`.
    pub fn interrupt_code(&self, name: &str) -> Result<u8> {
        self.interrupt_codes
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("interrupt name {name}")))
    }

    /// Register the five CPU-level interrupts and two simulation-layer
    /// interrupts, using [`InterruptKind::code`] as the code
    /// space.
    pub fn add_default_interrupts(&mut self) -> Result<()> {
        use strum::IntoEnumIterator;
        for kind in InterruptKind::iter() {
            self.add_interrupt(kind.code(), kind.mnemonic(), kind.fatal_if_unmasked())?;
        }
        Ok(())
    }

    /// All registered opcode codes.
    pub fn opcodes(&self) -> impl Iterator<Item = u8> + '_ {
        self.instructions.keys().copied()
    }

    /// All registered register codes.
    pub fn register_codes_iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.registers.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_opcode_rejected() {
        let mut isa = Isa::new();
        isa.add_instruction(0x01, "add", 3, false).unwrap();
        assert!(matches!(
            isa.add_instruction(0x01, "sub", 3, false),
            Err(Error::Duplicate(_))
        ));
    }

    #[test]
    fn duplicate_mnemonic_rejected() {
        let mut isa = Isa::new();
        isa.add_instruction(0x01, "add", 3, false).unwrap();
        assert!(matches!(
            isa.add_instruction(0x02, "add", 3, false),
            Err(Error::Duplicate(_))
        ));
    }

    #[test]
    fn lookup_by_either_direction() {
        let mut isa = Isa::new();
        isa.add_instruction(0x01, "add", 3, false).unwrap();
        assert_eq!(isa.instruction_by_mnemonic("add").unwrap().opcode, 0x01);
        assert_eq!(isa.instruction_by_opcode(0x01).unwrap().mnemonic, "add");
    }

    #[test]
    fn not_found_both_directions() {
        let isa = Isa::new();
        assert!(matches!(
            isa.instruction_by_opcode(0x99),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            isa.instruction_by_mnemonic("nope"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn default_interrupts_cover_all_seven() {
        let mut isa = Isa::new();
        isa.add_default_interrupts().unwrap();
        assert_eq!(isa.interrupt_code("timer").unwrap(), 0);
        assert_eq!(isa.interrupt_code("world_event").unwrap(), 6);
        assert!(isa.interrupt_by_code(2).unwrap().is_fatal_if_unmasked);
        assert!(!isa.interrupt_by_code(0).unwrap().is_fatal_if_unmasked);
    }
}
