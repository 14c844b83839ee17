//! The lexical shapes, as regexes, built once and shared.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `#`-to-end-of-line comment, matched anywhere on the line.
    pub static ref COMMENT: Regex = Regex::new(r"#.*$").unwrap();
    /// A bare identifier, `[A-Za-z_][A-Za-z0-9_]*`, at a word boundary.
    pub static ref IDENT: Regex = Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap();
    /// A 16-bit hex literal, `0x` plus 1-4 hex digits.
    pub static ref HEX16: Regex = Regex::new(r"^0x[0-9A-Fa-f]{1,4}$").unwrap();
    /// A 32-bit hex literal, `0x` plus 1-8 hex digits.
    pub static ref HEX32: Regex = Regex::new(r"^(0x[0-9A-Fa-f]{1,8})$").unwrap();
    pub static ref INCLUDE: Regex =
        Regex::new(r#"^\s*\.include\s+"([^"]*)"\s*$"#).unwrap();
    pub static ref DEFINE: Regex =
        Regex::new(r"^\s*\.define\s+([A-Za-z_][A-Za-z0-9_]*)\s+(0x[0-9A-Fa-f]{1,4})\s*$").unwrap();
    pub static ref BLOCK: Regex = Regex::new(r"^\s*\.block\s+(0x[0-9A-Fa-f]{1,4})\s*$").unwrap();
    pub static ref LABEL: Regex =
        Regex::new(r"^\s*\.label\s+([A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap();
    pub static ref PRAGMA_NUMBER: Regex =
        Regex::new(r"^\s*\.pragma\s+([A-Za-z_][A-Za-z0-9_]*)\s+(0x[0-9A-Fa-f]{1,8})\s*$").unwrap();
    pub static ref PRAGMA_TEXT: Regex =
        Regex::new(r#"^\s*\.pragma\s+([A-Za-z_][A-Za-z0-9_]*)\s+"([^"]*)"\s*$"#).unwrap();
}
