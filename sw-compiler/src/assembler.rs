use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::lex::{BLOCK, COMMENT, DEFINE, HEX16, HEX32, IDENT, INCLUDE, LABEL, PRAGMA_NUMBER, PRAGMA_TEXT};
use sw_asm::{encode, Instruction};
use sw_vm::{Endian, Memory};

use crate::error::{AssembleError, AssembleResult, SourceError};
use crate::source::Source;

/// A `.pragma` directive: retained as metadata, never emits bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma {
    pub name: String,
    pub value: PragmaValue,
}

/// The value carried by a [`Pragma`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PragmaValue {
    Number(u32),
    Text(String),
}

/// Assemble `source` into a big-endian object image via a five-pass
/// pipeline.
pub fn assemble(
    source: &Source,
    include_paths: &[PathBuf],
    defines: &HashMap<String, u16>,
    isa: &sw_asm::Isa,
) -> AssembleResult<(Memory, Vec<Pragma>)> {
    let expanded = expand_includes(source, include_paths)?;
    let (stripped, mut symbols, pragmas) = collect_symbols(&expanded)?;
    for (name, value) in defines {
        if symbols.insert(name.clone(), *value as u32).is_some() {
            return Err(AssembleError::ParseError {
                line: 0,
                reason: format!("symbol {name} defined both as a caller default and in source"),
            });
        }
    }
    let substituted = substitute(&stripped, &symbols)?;
    let expanded_blocks = expand_blocks(&substituted)?;
    let memory = emit(&expanded_blocks, isa)?;
    Ok((memory, pragmas))
}

fn strip_comment(line: &str) -> &str {
    match COMMENT.find(line) {
        Some(m) => line[..m.start()].trim_end(),
        None => line,
    }
}

fn expand_includes(source: &Source, include_paths: &[PathBuf]) -> AssembleResult<Source> {
    let mut buffer = source.clone();
    let mut seen = HashSet::new();
    let mut i = 0;
    while i < buffer.line_count() {
        let line = buffer.get(i).map_err(AssembleError::Source)?.to_string();
        let trimmed = strip_comment(&line);
        let Some(captures) = INCLUDE.captures(trimmed) else {
            i += 1;
            continue;
        };
        let requested = captures.get(1).unwrap().as_str();
        let resolved = resolve_include(requested, include_paths).ok_or_else(|| AssembleError::ParseError {
            line: i + 1,
            reason: format!("include \"{requested}\" not found on the search path"),
        })?;
        let canonical = Source::canonical_path(&resolved).map_err(AssembleError::Source)?;
        if !seen.insert(canonical.clone()) {
            return Err(AssembleError::ParseError {
                line: i + 1,
                reason: format!("include \"{requested}\" included more than once (circular or duplicate)"),
            });
        }
        let included = Source::load(&resolved).map_err(AssembleError::Source)?;
        buffer.remove(i, 1).map_err(AssembleError::Source)?;
        buffer.insert_source(i, &included).map_err(AssembleError::Source)?;
        // Do not advance `i`: the spliced lines may themselves contain
        // further includes that must expand before we move past them.
    }
    Ok(buffer)
}

fn resolve_include(requested: &str, include_paths: &[PathBuf]) -> Option<PathBuf> {
    let requested_path = Path::new(requested);
    if requested_path.is_absolute() && requested_path.is_file() {
        return Some(requested_path.to_path_buf());
    }
    for base in include_paths {
        let candidate = base.join(requested_path);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    if requested_path.is_file() {
        return Some(requested_path.to_path_buf());
    }
    None
}

/// Per-line classification surviving past symbol collection.
enum Classified {
    Blank,
    Pragma(Pragma),
    Block(u32),
    Code(String),
}

fn collect_symbols(source: &Source) -> AssembleResult<(Vec<Classified>, HashMap<String, u32>, Vec<Pragma>)> {
    let mut symbols = HashMap::new();
    let mut pragmas = Vec::new();
    let mut classified = Vec::with_capacity(source.line_count());
    let mut offset: u32 = 0;

    for (idx, raw) in source.iter().enumerate() {
        let line_no = idx + 1;
        let trimmed = strip_comment(raw);
        if trimmed.trim().is_empty() {
            classified.push(Classified::Blank);
            continue;
        }

        if let Some(c) = DEFINE.captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
            let value = parse_hex(c.get(2).unwrap().as_str());
            if symbols.insert(name.clone(), value).is_some() {
                return Err(AssembleError::ParseError {
                    line: line_no,
                    reason: format!("symbol {name} defined twice"),
                });
            }
            classified.push(Classified::Blank);
            continue;
        }

        if let Some(c) = LABEL.captures(trimmed) {
            let name = c.get(1).unwrap().as_str().to_string();
            if symbols.insert(name.clone(), offset).is_some() {
                return Err(AssembleError::ParseError {
                    line: line_no,
                    reason: format!("symbol {name} defined twice"),
                });
            }
            classified.push(Classified::Blank);
            continue;
        }

        if let Some(c) = PRAGMA_NUMBER.captures(trimmed) {
            pragmas.push(Pragma {
                name: c.get(1).unwrap().as_str().to_string(),
                value: PragmaValue::Number(parse_hex(c.get(2).unwrap().as_str())),
            });
            classified.push(Classified::Pragma(pragmas.last().unwrap().clone()));
            continue;
        }
        if let Some(c) = PRAGMA_TEXT.captures(trimmed) {
            pragmas.push(Pragma {
                name: c.get(1).unwrap().as_str().to_string(),
                value: PragmaValue::Text(c.get(2).unwrap().as_str().to_string()),
            });
            classified.push(Classified::Pragma(pragmas.last().unwrap().clone()));
            continue;
        }

        if let Some(c) = BLOCK.captures(trimmed) {
            let size = parse_hex(c.get(1).unwrap().as_str());
            let rounded = size.div_ceil(4) * 4;
            classified.push(Classified::Block(size));
            offset += rounded;
            continue;
        }

        // Everything else is a data or instruction line; exactly 4 bytes.
        classified.push(Classified::Code(trimmed.to_string()));
        offset += 4;
    }

    Ok((classified, symbols, pragmas))
}

fn substitute(lines: &[Classified], symbols: &HashMap<String, u32>) -> AssembleResult<Vec<Classified>> {
    let mut out = Vec::with_capacity(lines.len());
    for classified in lines {
        match classified {
            Classified::Code(text) => {
                let replaced = replace_symbols(text, symbols);
                out.push(Classified::Code(replaced));
            }
            Classified::Blank => out.push(Classified::Blank),
            Classified::Pragma(p) => out.push(Classified::Pragma(p.clone())),
            Classified::Block(n) => out.push(Classified::Block(*n)),
        }
    }
    Ok(out)
}

fn replace_symbols(text: &str, symbols: &HashMap<String, u32>) -> String {
    IDENT
        .replace_all(text, |caps: &regex::Captures| {
            let word = &caps[0];
            match symbols.get(word) {
                Some(value) => format!("0x{value:04x}"),
                None => word.to_string(),
            }
        })
        .into_owned()
}

fn expand_blocks(lines: &[Classified]) -> AssembleResult<Vec<String>> {
    let mut out = Vec::new();
    for classified in lines {
        match classified {
            Classified::Blank | Classified::Pragma(_) => {}
            Classified::Block(size) => {
                let words = size.div_ceil(4);
                out.extend(std::iter::repeat(String::from("0x00000000")).take(words as usize));
            }
            Classified::Code(text) => out.push(text.clone()),
        }
    }
    Ok(out)
}

fn emit(lines: &[String], isa: &sw_asm::Isa) -> AssembleResult<Memory> {
    let mut memory = Memory::new(lines.len() * 4);
    for (i, line) in lines.iter().enumerate() {
        let word = encode_line(line, isa).map_err(|reason| AssembleError::ParseError {
            line: i + 1,
            reason,
        })?;
        memory
            .set_word((i * 4) as u16, word, Endian::Big)
            .expect("emission buffer is sized to fit every line");
    }
    Ok(memory)
}

fn encode_line(line: &str, isa: &sw_asm::Isa) -> Result<u32, String> {
    if let Some(c) = HEX32.captures(line) {
        if c.get(0).unwrap().as_str() == line {
            return Ok(parse_hex(c.get(1).unwrap().as_str()));
        }
    }

    let mut tokens = line.split_whitespace();
    let mnemonic = tokens.next().ok_or_else(|| "empty line reached emission".to_string())?;
    let operands: Vec<&str> = tokens.collect();

    let meta = isa
        .instruction_by_mnemonic(mnemonic)
        .map_err(|_| format!("unknown mnemonic {mnemonic}"))?;

    let register_operands = if meta.has_immediate {
        operands.len().saturating_sub(1)
    } else {
        operands.len()
    };
    if register_operands as u8 != meta.reg_count
        || (meta.has_immediate && operands.len() != meta.reg_count as usize + 1)
    {
        return Err(format!(
            "{mnemonic} expects {} register operand(s){}, got {}",
            meta.reg_count,
            if meta.has_immediate { " plus an immediate" } else { "" },
            operands.len()
        ));
    }

    let mut regs = [0u8; 3];
    for (slot, token) in regs.iter_mut().zip(operands.iter().take(meta.reg_count as usize)) {
        *slot = isa
            .register_code(token)
            .map_err(|_| format!("unknown register {token}"))?;
    }

    let data = if meta.has_immediate {
        let token = operands.last().unwrap();
        if !HEX16.is_match(token) {
            return Err(format!("expected a 16-bit immediate, got {token}"));
        }
        parse_hex(token) as u16
    } else if meta.reg_count == 3 {
        regs[2] as u16
    } else {
        0
    };

    Ok(encode(Instruction::new(meta.opcode, regs[0], regs[1], data)))
}

fn parse_hex(token: &str) -> u32 {
    u32::from_str_radix(token.trim_start_matches("0x").trim_start_matches("0X"), 16)
        .expect("token already validated by lexical regex")
}
