use std::collections::HashMap;

use sw_asm::{InstructionMeta, InterruptMeta};

use crate::control::ExecOutcome;
use crate::memory::Memory;
use crate::registers::Registers;

/// The function an opcode's metadata is paired with: read `inst`, mutate
/// `regs`/`mem`, and report what the CPU core should do next.
pub type Executor = fn(&mut Registers, &mut Memory, sw_asm::Instruction) -> ExecOutcome;

/// The full CPU instruction set: [`sw_asm::Isa`]'s opcode/register/interrupt
/// metadata, plus the executor each opcode dispatches to.
///
/// Kept as a thin wrapper rather than folding executors into `sw_asm::Isa`
/// directly, since that crate has no `Memory`/`Registers` types to write an
/// executor's signature against.
#[derive(Clone)]
pub struct Isa {
    inner: sw_asm::Isa,
    executors: HashMap<u8, Executor>,
}

impl Isa {
    /// An empty registry with no opcodes, registers or interrupts.
    pub fn new() -> Self {
        Self {
            inner: sw_asm::Isa::new(),
            executors: HashMap::new(),
        }
    }

    /// Register an opcode and the executor it dispatches to.
    pub fn add_instruction(
        &mut self,
        opcode: u8,
        mnemonic: &str,
        reg_count: u8,
        has_immediate: bool,
        executor: Executor,
    ) -> sw_asm::Result<()> {
        self.inner
            .add_instruction(opcode, mnemonic, reg_count, has_immediate)?;
        self.executors.insert(opcode, executor);
        Ok(())
    }

    /// Register a named register code, delegating to the inner registry.
    pub fn add_register(&mut self, code: u8, name: &str) -> sw_asm::Result<()> {
        self.inner.add_register(code, name)
    }

    /// Register the default interrupt set, delegating to the inner registry.
    pub fn add_default_interrupts(&mut self) -> sw_asm::Result<()> {
        self.inner.add_default_interrupts()
    }

    /// The opcode/register metadata registry, as consulted by the assembler
    /// and disassembler.
    pub fn metadata(&self) -> &sw_asm::Isa {
        &self.inner
    }

    /// Metadata for a single opcode.
    pub fn instruction_by_opcode(&self, opcode: u8) -> sw_asm::Result<&InstructionMeta> {
        self.inner.instruction_by_opcode(opcode)
    }

    /// Metadata for a single interrupt code.
    pub fn interrupt_by_code(&self, code: u8) -> sw_asm::Result<&InterruptMeta> {
        self.inner.interrupt_by_code(code)
    }

    /// The executor registered for `opcode`, if any.
    pub fn executor(&self, opcode: u8) -> Option<Executor> {
        self.executors.get(&opcode).copied()
    }
}

impl Default for Isa {
    fn default() -> Self {
        Self::new()
    }
}
