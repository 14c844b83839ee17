use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::{Endian, Memory};
use crate::ops::fault::memory_fault;
use crate::registers::Registers;

fn load(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = inst.immediate() as u32;
    read_word(regs, mem, inst.reg1, address)
}

fn loadi(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, inst.immediate() as u32);
    ExecOutcome::AdvancePc
}

fn loadrr(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = regs.get(inst.reg2).wrapping_add(regs.get(inst.reg3()));
    read_word(regs, mem, inst.reg1, address)
}

fn loadri(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = regs.get(inst.reg2).wrapping_add(inst.immediate() as u32);
    read_word(regs, mem, inst.reg1, address)
}

fn store(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = inst.immediate() as u32;
    write_word(regs, mem, inst.reg1, address)
}

fn storerr(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = regs.get(inst.reg2).wrapping_add(regs.get(inst.reg3()));
    write_word(regs, mem, inst.reg1, address)
}

fn storeri(regs: &mut Registers, mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let address = regs.get(inst.reg2).wrapping_add(inst.immediate() as u32);
    write_word(regs, mem, inst.reg1, address)
}

fn read_word(regs: &mut Registers, mem: &Memory, dest: u8, address: u32) -> ExecOutcome {
    if !Memory::is_word_aligned(address as u16) {
        return memory_fault(regs, address);
    }
    match mem.get_word(address as u16, Endian::Host) {
        Ok(value) => {
            regs.set(dest, value);
            ExecOutcome::AdvancePc
        }
        Err(_) => memory_fault(regs, address),
    }
}

fn write_word(regs: &mut Registers, mem: &mut Memory, src: u8, address: u32) -> ExecOutcome {
    if !Memory::is_word_aligned(address as u16) {
        return memory_fault(regs, address);
    }
    let value = regs.get(src);
    match mem.set_word(address as u16, value, Endian::Host) {
        Ok(()) => ExecOutcome::AdvancePc,
        Err(_) => memory_fault(regs, address),
    }
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x10, "load", 1, true, load).unwrap();
    isa.add_instruction(0x11, "loadi", 1, true, loadi).unwrap();
    isa.add_instruction(0x12, "loadrr", 3, false, loadrr)
        .unwrap();
    isa.add_instruction(0x13, "loadri", 2, true, loadri)
        .unwrap();

    isa.add_instruction(0x18, "store", 1, true, store).unwrap();
    isa.add_instruction(0x1a, "storerr", 3, false, storerr)
        .unwrap();
    isa.add_instruction(0x1b, "storeri", 2, true, storeri)
        .unwrap();
}
