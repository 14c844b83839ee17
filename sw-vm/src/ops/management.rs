use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::Memory;
use crate::registers::Registers;

fn stop(_regs: &mut Registers, _mem: &mut Memory, _inst: Instruction) -> ExecOutcome {
    ExecOutcome::Halt
}

fn restart(regs: &mut Registers, _mem: &mut Memory, _inst: Instruction) -> ExecOutcome {
    regs.reset();
    ExecOutcome::Jumped
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x00, "stop", 0, false, stop).unwrap();
    isa.add_instruction(0x01, "restart", 0, false, restart)
        .unwrap();
}
