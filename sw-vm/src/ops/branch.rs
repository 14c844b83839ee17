use sw_asm::Instruction;

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::Memory;
use crate::registers::Registers;

fn branch(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
    regs.set_pc(inst.immediate() as u32);
    ExecOutcome::Jumped
}

fn taken(regs: &mut Registers, inst: Instruction, condition: bool) -> ExecOutcome {
    if condition {
        regs.set_pc(inst.immediate() as u32);
        ExecOutcome::Jumped
    } else {
        ExecOutcome::AdvancePc
    }
}

macro_rules! conditional {
    ($name:ident, $lhs:ident, $rhs:ident, $cond:expr) => {
        fn $name(regs: &mut Registers, _mem: &mut Memory, inst: Instruction) -> ExecOutcome {
            let $lhs = regs.get(inst.reg1);
            let $rhs = regs.get(inst.reg2);
            let result = $cond;
            taken(regs, inst, result)
        }
    };
}

conditional!(beq, a, b, a == b);
conditional!(bne, a, b, a != b);
conditional!(blt, a, b, (a as i32) < (b as i32));
conditional!(bltu, a, b, a < b);
conditional!(bgt, a, b, (a as i32) > (b as i32));
conditional!(bgtu, a, b, a > b);
conditional!(ble, a, b, (a as i32) <= (b as i32));
conditional!(bleu, a, b, a <= b);
conditional!(bge, a, b, (a as i32) >= (b as i32));
conditional!(bgeu, a, b, a >= b);

pub(crate) fn register(isa: &mut Isa) {
    isa.add_instruction(0x20, "b", 0, true, branch).unwrap();
    isa.add_instruction(0x21, "beq", 2, true, beq).unwrap();
    isa.add_instruction(0x22, "bne", 2, true, bne).unwrap();
    isa.add_instruction(0x23, "blt", 2, true, blt).unwrap();
    isa.add_instruction(0x24, "bltu", 2, true, bltu).unwrap();
    isa.add_instruction(0x25, "bgt", 2, true, bgt).unwrap();
    isa.add_instruction(0x26, "bgtu", 2, true, bgtu).unwrap();
    isa.add_instruction(0x27, "ble", 2, true, ble).unwrap();
    isa.add_instruction(0x28, "bleu", 2, true, bleu).unwrap();
    isa.add_instruction(0x29, "bge", 2, true, bge).unwrap();
    isa.add_instruction(0x2a, "bgeu", 2, true, bgeu).unwrap();
}
