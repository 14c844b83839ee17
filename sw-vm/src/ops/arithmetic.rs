use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::Memory;
use crate::ops::fault::divide_by_zero;
use crate::registers::Registers;

fn add(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let result = regs.get(inst.reg2).wrapping_add(regs.get(inst.reg3()));
    regs.set(inst.reg1, result);
    ExecOutcome::AdvancePc
}

fn addi(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let result = regs.get(inst.reg2).wrapping_add(inst.immediate() as u32);
    regs.set(inst.reg1, result);
    ExecOutcome::AdvancePc
}

fn sub(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let result = regs.get(inst.reg2).wrapping_sub(regs.get(inst.reg3()));
    regs.set(inst.reg1, result);
    ExecOutcome::AdvancePc
}

fn subi(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let result = regs.get(inst.reg2).wrapping_sub(inst.immediate() as u32);
    regs.set(inst.reg1, result);
    ExecOutcome::AdvancePc
}

fn multl(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as i32 as i64) * (regs.get(inst.reg3()) as i32 as i64);
    regs.set(inst.reg1, product as u32);
    ExecOutcome::AdvancePc
}

fn multli(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as i32 as i64) * (inst.immediate() as i32 as i64);
    regs.set(inst.reg1, product as u32);
    ExecOutcome::AdvancePc
}

fn multlu(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as u64) * (regs.get(inst.reg3()) as u64);
    regs.set(inst.reg1, product as u32);
    ExecOutcome::AdvancePc
}

fn multlui(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as u64) * (inst.immediate() as u64);
    regs.set(inst.reg1, product as u32);
    ExecOutcome::AdvancePc
}

fn multh(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as i32 as i64) * (regs.get(inst.reg3()) as i32 as i64);
    regs.set(inst.reg1, (product >> 32) as u32);
    ExecOutcome::AdvancePc
}

fn multhi(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as i32 as i64) * (inst.immediate() as i32 as i64);
    regs.set(inst.reg1, (product >> 32) as u32);
    ExecOutcome::AdvancePc
}

fn multhu(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as u64) * (regs.get(inst.reg3()) as u64);
    regs.set(inst.reg1, (product >> 32) as u32);
    ExecOutcome::AdvancePc
}

fn multhui(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let product = (regs.get(inst.reg2) as u64) * (inst.immediate() as u64);
    regs.set(inst.reg1, (product >> 32) as u32);
    ExecOutcome::AdvancePc
}

fn div(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2) as i32;
    let divisor = regs.get(inst.reg3()) as i32;
    if divisor == 0 {
        return divide_by_zero(regs, dividend as u32);
    }
    regs.set(inst.reg1, (dividend / divisor) as u32);
    ExecOutcome::AdvancePc
}

fn divi(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2) as i32;
    let divisor = inst.immediate() as i32;
    if divisor == 0 {
        return divide_by_zero(regs, dividend as u32);
    }
    regs.set(inst.reg1, (dividend / divisor) as u32);
    ExecOutcome::AdvancePc
}

fn divu(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2);
    let divisor = regs.get(inst.reg3());
    if divisor == 0 {
        return divide_by_zero(regs, dividend);
    }
    regs.set(inst.reg1, dividend / divisor);
    ExecOutcome::AdvancePc
}

fn divui(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2);
    let divisor = inst.immediate() as u32;
    if divisor == 0 {
        return divide_by_zero(regs, dividend);
    }
    regs.set(inst.reg1, dividend / divisor);
    ExecOutcome::AdvancePc
}

fn modulo(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2) as i32;
    let divisor = regs.get(inst.reg3()) as i32;
    if divisor == 0 {
        return divide_by_zero(regs, dividend as u32);
    }
    regs.set(inst.reg1, (dividend % divisor) as u32);
    ExecOutcome::AdvancePc
}

fn modi(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2) as i32;
    let divisor = inst.immediate() as i32;
    if divisor == 0 {
        return divide_by_zero(regs, dividend as u32);
    }
    regs.set(inst.reg1, (dividend % divisor) as u32);
    ExecOutcome::AdvancePc
}

fn modu(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2);
    let divisor = regs.get(inst.reg3());
    if divisor == 0 {
        return divide_by_zero(regs, dividend);
    }
    regs.set(inst.reg1, dividend % divisor);
    ExecOutcome::AdvancePc
}

fn modui(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    let dividend = regs.get(inst.reg2);
    let divisor = inst.immediate() as u32;
    if divisor == 0 {
        return divide_by_zero(regs, dividend);
    }
    regs.set(inst.reg1, dividend % divisor);
    ExecOutcome::AdvancePc
}

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x40, "add", 3, false, add).unwrap();
    isa.add_instruction(0x41, "addi", 2, true, addi).unwrap();
    isa.add_instruction(0x42, "sub", 3, false, sub).unwrap();
    isa.add_instruction(0x43, "subi", 2, true, subi).unwrap();
    isa.add_instruction(0x44, "multl", 3, false, multl).unwrap();
    isa.add_instruction(0x45, "multli", 2, true, multli)
        .unwrap();
    isa.add_instruction(0x46, "multlu", 3, false, multlu)
        .unwrap();
    isa.add_instruction(0x47, "multlui", 2, true, multlui)
        .unwrap();
    isa.add_instruction(0x48, "multh", 3, false, multh).unwrap();
    isa.add_instruction(0x49, "multhi", 2, true, multhi)
        .unwrap();
    isa.add_instruction(0x4a, "multhu", 3, false, multhu)
        .unwrap();
    isa.add_instruction(0x4b, "multhui", 2, true, multhui)
        .unwrap();
    isa.add_instruction(0x4c, "div", 3, false, div).unwrap();
    isa.add_instruction(0x4d, "divi", 2, true, divi).unwrap();
    isa.add_instruction(0x4e, "divu", 3, false, divu).unwrap();
    isa.add_instruction(0x4f, "divui", 2, true, divui).unwrap();
    isa.add_instruction(0x50, "mod", 3, false, modulo).unwrap();
    isa.add_instruction(0x51, "modi", 2, true, modi).unwrap();
    isa.add_instruction(0x52, "modu", 3, false, modu).unwrap();
    isa.add_instruction(0x53, "modui", 2, true, modui).unwrap();
}
