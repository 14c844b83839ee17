use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::Memory;
use crate::registers::Registers;

fn not(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, !regs.get(inst.reg2));
    ExecOutcome::AdvancePc
}

fn or(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, regs.get(inst.reg2) | regs.get(inst.reg3()));
    ExecOutcome::AdvancePc
}

fn ori(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, regs.get(inst.reg2) | inst.immediate() as u32);
    ExecOutcome::AdvancePc
}

fn and(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, regs.get(inst.reg2) & regs.get(inst.reg3()));
    ExecOutcome::AdvancePc
}

fn andi(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, regs.get(inst.reg2) & inst.immediate() as u32);
    ExecOutcome::AdvancePc
}

fn xor(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, regs.get(inst.reg2) ^ regs.get(inst.reg3()));
    ExecOutcome::AdvancePc
}

fn xori(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set(inst.reg1, regs.get(inst.reg2) ^ inst.immediate() as u32);
    ExecOutcome::AdvancePc
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x60, "not", 2, false, not).unwrap();
    isa.add_instruction(0x68, "or", 3, false, or).unwrap();
    isa.add_instruction(0x69, "ori", 2, true, ori).unwrap();
    isa.add_instruction(0x6a, "and", 3, false, and).unwrap();
    isa.add_instruction(0x6b, "andi", 2, true, andi).unwrap();
    isa.add_instruction(0x6c, "xor", 3, false, xor).unwrap();
    isa.add_instruction(0x6d, "xori", 2, true, xori).unwrap();
}
