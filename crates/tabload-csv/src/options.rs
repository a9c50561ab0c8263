//! CSV options

use std::fmt;
use std::str::FromStr;

/// Field delimiters understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `\t`
    Tab,
}

impl Delimiter {
    /// The delimiter byte
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
        }
    }

    /// The delimiter character
    pub fn as_char(self) -> char {
        self.as_byte() as char
    }

    /// Delimiter from a character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ',' => Some(Delimiter::Comma),
            ';' => Some(Delimiter::Semicolon),
            '\t' => Some(Delimiter::Tab),
            _ => None,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Semicolon => "semicolon",
            Delimiter::Tab => "tab",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Delimiter {
    type Err = String;

    /// Accepts the character itself (`,` `;` a literal tab or `\t`) or its name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\t" | "\\t" => return Ok(Delimiter::Tab),
            _ => {}
        }
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(d) = Delimiter::from_char(c) {
                return Ok(d);
            }
        }
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" => Ok(Delimiter::Comma),
            "semicolon" => Ok(Delimiter::Semicolon),
            "tab" => Ok(Delimiter::Tab),
            _ => Err(format!(
                "unsupported delimiter '{}' (expected ',', ';' or tab)",
                s
            )),
        }
    }
}

/// Options for reading CSV text
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    /// Field delimiter (default: comma)
    pub delimiter: Delimiter,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Records discarded before the header row
    pub skip_rows: usize,
    /// Type numbers and booleans instead of keeping every field as text
    pub infer_types: bool,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            quote: b'"',
            skip_rows: 0,
            infer_types: false,
        }
    }
}

/// Options for writing CSV files
#[derive(Debug, Clone)]
pub struct CsvWriteOptions {
    /// Field delimiter (default: comma)
    pub delimiter: Delimiter,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Write header row
    pub write_header: bool,
    /// Prefix the output with a UTF-8 byte-order mark
    pub byte_order_mark: bool,
    /// Line terminator
    pub line_terminator: LineTerminator,
}

impl Default for CsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            quote: b'"',
            write_header: true,
            byte_order_mark: false,
            line_terminator: LineTerminator::LF,
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
}
