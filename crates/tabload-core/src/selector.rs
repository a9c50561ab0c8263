//! Worksheet selection

use std::fmt;

/// Which worksheet of a workbook to read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelector {
    /// The first worksheet in workbook order
    #[default]
    First,
    /// A 0-based worksheet position
    Index(usize),
    /// A worksheet name (exact match)
    Name(String),
}

impl SheetSelector {
    /// Resolve against the workbook's worksheet names
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Option<usize> {
        match self {
            SheetSelector::First => (!names.is_empty()).then_some(0),
            SheetSelector::Index(i) => (*i < names.len()).then_some(*i),
            SheetSelector::Name(name) => names.iter().position(|n| n.as_ref() == name),
        }
    }

    /// Parse a command-line style selector: a number is a position, anything
    /// else a name
    pub fn parse(s: &str) -> Self {
        match s.parse::<usize>() {
            Ok(i) => SheetSelector::Index(i),
            Err(_) => SheetSelector::Name(s.to_string()),
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::First => write!(f, "first sheet"),
            SheetSelector::Index(i) => write!(f, "sheet #{}", i),
            SheetSelector::Name(name) => write!(f, "sheet '{}'", name),
        }
    }
}
