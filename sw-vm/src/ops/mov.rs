use sw_asm::Instruction;
use sw_types::swap_halves;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::Memory;
use crate::registers::Registers;

fn mov(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, regs.get(inst.reg2));
    ExecOutcome::AdvancePc
}

fn swap(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, swap_halves(regs.get(inst.reg2)));
    ExecOutcome::AdvancePc
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x08, "move", 2, false, mov).unwrap();
    isa.add_instruction(0x0a, "swap", 2, false, swap).unwrap();
}
