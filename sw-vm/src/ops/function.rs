use sw_asm::{Instruction, InterruptKind, InterruptRecord};

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::{Endian, Memory};
use crate::ops::fault::memory_fault;
use crate::registers::Registers;

fn call(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let stp = regs.stp();
    let return_address = regs.pc().wrapping_add(4);
    match mem.set_word(stp as u16, return_address, Endian::Host) {
        Ok(()) => {
            regs.set_stp(stp.wrapping_sub(4));
            regs.set_pc(inst.immediate() as u32);
            ExecOutcome::Jumped
        }
        Err(_) => memory_fault(regs, stp),
    }
}

fn ret(regs: &mut Registers, mem: &mut Memory, _inst: Instruction) -> ExecOutcome {
    let address = regs.stp().wrapping_add(4);
    match mem.get_word(address as u16, Endian::Host) {
        Ok(return_address) => {
            regs.set_stp(address);
            regs.set_pc(return_address);
            ExecOutcome::Jumped
        }
        Err(_) => memory_fault(regs, address),
    }
}

/// `int`: raise a software interrupt carrying the immediate as `r2`; the
/// CPU core performs the actual register save and handler dispatch.
fn int(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let code = InterruptKind::Software.code();
    ExecOutcome::RaiseInterrupt(InterruptRecord {
        code,
        r0: code as u32,
        r1: regs.pc(),
        r2: inst.immediate() as u32,
    })
}

/// `reti`: the inverse of the CPU core's interrupt dispatch -- restore all
/// 16 registers from the values it pushed onto the stack, resuming at the
/// saved `pc`.
fn reti(regs: &mut Registers, mem: &mut Memory, _inst: Instruction) -> ExecOutcome {
    let base = regs.stp();
    for i in (0..16u8).rev() {
        let address = base.wrapping_add((16 - i as u32) * 4);
        match mem.get_word(address as u16, Endian::Host) {
            Ok(value) => regs.set(i, value),
            Err(_) => return memory_fault(regs, address),
        }
    }
    ExecOutcome::Jumped
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x30, "call", 0, true, call).unwrap();
    isa.add_instruction(0x31, "int", 0, true, int).unwrap();
    isa.add_instruction(0x34, "ret", 0, false, ret).unwrap();
    isa.add_instruction(0x35, "reti", 0, false, reti).unwrap();
}
