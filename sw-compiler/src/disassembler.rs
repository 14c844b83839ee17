use sw_asm::decode;
use sw_types::Word;

/// Render `word` as assembly text.
///
/// A known opcode with every register code resolvable renders as
/// `mnemonic reg1 reg2 {reg3|0xNNNN}`; anything else -- an unknown opcode or
/// an unresolvable register code -- falls back to the raw-data rendering
/// `0xNNNNNNNN`, so every word in a program can always be disassembled.
pub fn disassemble(word: Word, isa: &sw_asm::Isa) -> String {
    let inst = decode(word);

    let Ok(meta) = isa.instruction_by_opcode(inst.opcode) else {
        return format!("0x{word:08x}");
    };

    let mut parts = vec![meta.mnemonic.clone()];
    let register_count = meta.reg_count.min(2);
    for reg in [inst.reg1, inst.reg2].into_iter().take(register_count as usize) {
        match isa.register_name(reg) {
            Ok(name) => parts.push(name.to_string()),
            Err(_) => return format!("0x{word:08x}"),
        }
    }

    if meta.reg_count == 3 {
        match isa.register_name(inst.reg3()) {
            Ok(name) => parts.push(name.to_string()),
            Err(_) => return format!("0x{word:08x}"),
        }
    } else if meta.has_immediate {
        parts.push(format!("0x{:04x}", inst.immediate()));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_asm::{encode, Instruction};

    #[test]
    fn known_instruction_round_trips_through_assemble_and_disassemble() {
        let full_isa = sw_vm::register_all();
        let isa = full_isa.metadata();
        let word = encode(Instruction::new(isa.instruction_by_mnemonic("addi").unwrap().opcode, 2, 0, 5));
        assert_eq!(disassemble(word, &isa), "addi r2 r0 0x0005");
    }

    #[test]
    fn three_register_instruction_renders_reg3() {
        let full_isa = sw_vm::register_all();
        let isa = full_isa.metadata();
        let opcode = isa.instruction_by_mnemonic("add").unwrap().opcode;
        let word = encode(Instruction::with_reg3(opcode, 2, 0, 1));
        assert_eq!(disassemble(word, &isa), "add r2 r0 r1");
    }

    #[test]
    fn unknown_opcode_falls_back_to_raw_data() {
        let isa = sw_asm::Isa::new();
        let word = encode(Instruction::new(0xFF, 0, 0, 0));
        assert_eq!(disassemble(word, &isa), format!("0x{word:08x}"));
    }
}
