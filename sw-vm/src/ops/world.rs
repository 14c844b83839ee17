use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::Memory;
use crate::registers::Registers;

/// `world`: request a world action. The CPU core neither advances `pc` nor
/// raises an interrupt here -- the scheduler owns the subprotocol of spec
/// §4.M and resolves it later through [`crate::Cpu::complete_world_action`]
/// or [`crate::Cpu::fail_world_action`].
fn world(_regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    ExecOutcome::WorldAction(inst.immediate())
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x58, "world", 0, true, world).unwrap();
}
