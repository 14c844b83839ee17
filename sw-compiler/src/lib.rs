//! The Simple World assembly toolchain: the line-addressable source model,
//! the five-pass assembler, and the disassembler.

mod assembler;
mod disassembler;
mod error;
mod lex;
mod source;

pub use assembler::{assemble, Pragma, PragmaValue};
pub use disassembler::disassemble;
pub use error::{AssembleError, AssembleResult, SourceError, SourceResult};
pub use source::Source;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn isa() -> sw_asm::Isa {
        sw_vm::register_all().metadata().clone()
    }

    #[test]
    fn assembles_load_immediate_and_add() {
        let source = Source::from_lines([
            "loadi r0 0x0001",
            "loadi r1 0x0002",
            "add r2 r0 r1",
            "stop",
        ]);
        let (memory, pragmas) = assemble(&source, &[], &HashMap::new(), &isa()).unwrap();
        assert!(pragmas.is_empty());
        assert_eq!(memory.size(), 16);
    }

    #[test]
    fn labels_and_defines_resolve_to_byte_offsets() {
        let source = Source::from_lines([
            ".define START 0x0008",
            ".label entry",
            "b START",
            ".label loop",
            "b loop",
        ]);
        let (memory, _) = assemble(&source, &[], &HashMap::new(), &isa()).unwrap();
        assert_eq!(memory.size(), 8);
    }

    #[test]
    fn block_reserves_zeroed_rounded_space() {
        let source = Source::from_lines([".block 0x0006", "stop"]);
        let (memory, _) = assemble(&source, &[], &HashMap::new(), &isa()).unwrap();
        // 6 bytes rounds up to 8 (two words), plus the `stop` word.
        assert_eq!(memory.size(), 12);
    }

    #[test]
    fn unknown_mnemonic_fails_with_parse_error() {
        let source = Source::from_lines(["frobnicate r0"]);
        let result = assemble(&source, &[], &HashMap::new(), &isa());
        assert!(matches!(result, Err(AssembleError::ParseError { .. })));
    }

    #[test]
    fn pragma_is_retained_as_metadata_without_emitting_bytes() {
        let source = Source::from_lines([".pragma name \"bug one\"", "stop"]);
        let (memory, pragmas) = assemble(&source, &[], &HashMap::new(), &isa()).unwrap();
        assert_eq!(memory.size(), 4);
        assert_eq!(pragmas.len(), 1);
        assert_eq!(pragmas[0].name, "name");
    }
}
