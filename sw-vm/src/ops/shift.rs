use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::Memory;
use crate::registers::Registers;

fn amount_reg(regs: &Registers, inst: Instruction) -> u32 {
    regs.get(inst.reg3()) & 0x1F
}

fn amount_imm(inst: Instruction) -> u32 {
    inst.immediate() as u32 & 0x1F
}

macro_rules! shift_pair {
    ($reg_name:ident, $imm_name:ident, $op:expr) => {
        fn $reg_name(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
            let value = regs.get(inst.reg2);
            let amount = amount_reg(regs, inst);
            regs.set(inst.reg1, $op(value, amount));
            ExecOutcome::AdvancePc
        }

        fn $imm_name(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
            let value = regs.get(inst.reg2);
            let amount = amount_imm(inst);
            regs.set(inst.reg1, $op(value, amount));
            ExecOutcome::AdvancePc
        }
    };
}

fn shl(value: u32, amount: u32) -> u32 {
    value.wrapping_shl(amount)
}

fn shr(value: u32, amount: u32) -> u32 {
    value.wrapping_shr(amount)
}

fn ashr(value: u32, amount: u32) -> u32 {
    (value as i32).wrapping_shr(amount) as u32
}

fn rotl(value: u32, amount: u32) -> u32 {
    value.rotate_left(amount)
}

fn rotr(value: u32, amount: u32) -> u32 {
    value.rotate_right(amount)
}

shift_pair!(sll, slli, shl);
shift_pair!(srl, srli, shr);
shift_pair!(sla, slai, shl);
shift_pair!(sra, srai, ashr);
shift_pair!(rl, rli, rotl);
shift_pair!(rr, rri, rotr);

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x70, "sll", 3, false, sll).unwrap();
    isa.add_instruction(0x71, "slli", 2, true, slli).unwrap();
    isa.add_instruction(0x72, "srl", 3, false, srl).unwrap();
    isa.add_instruction(0x73, "srli", 2, true, srli).unwrap();
    isa.add_instruction(0x74, "sla", 3, false, sla).unwrap();
    isa.add_instruction(0x75, "slai", 2, true, slai).unwrap();
    isa.add_instruction(0x76, "sra", 3, false, sra).unwrap();
    isa.add_instruction(0x77, "srai", 2, true, srai).unwrap();
    isa.add_instruction(0x78, "rl", 3, false, rl).unwrap();
    isa.add_instruction(0x79, "rli", 2, true, rli).unwrap();
    isa.add_instruction(0x7a, "rr", 3, false, rr).unwrap();
    isa.add_instruction(0x7b, "rri", 2, true, rri).unwrap();
}
