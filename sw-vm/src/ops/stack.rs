use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::{Endian, Memory};
use crate::ops::fault::memory_fault;
use crate::registers::Registers;

fn push(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = regs.stp();
    match mem.set_word(address as u16, regs.get(inst.reg1), Endian::Host) {
        Ok(()) => {
            regs.set_stp(address.wrapping_sub(4));
            ExecOutcome::AdvancePc
        }
        Err(_) => memory_fault(regs, address),
    }
}

fn pop(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = regs.stp().wrapping_add(4);
    match mem.get_word(address as u16, Endian::Host) {
        Ok(value) => {
            regs.set_stp(address);
            regs.set(inst.reg1, value);
            ExecOutcome::AdvancePc
        }
        Err(_) => memory_fault(regs, address),
    }
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x0c, "push", 1, false, push).unwrap();
    isa.add_instruction(0x0e, "pop", 1, false, pop).unwrap();
}
