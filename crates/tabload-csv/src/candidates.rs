//! Ordered (delimiter, encoding) candidates

use std::fmt;

use crate::encoding::TextEncoding;
use crate::options::Delimiter;

/// Delimiters of the fixed fallback sequence, outer loop
pub const FALLBACK_DELIMITERS: [Delimiter; 3] =
    [Delimiter::Comma, Delimiter::Semicolon, Delimiter::Tab];

/// Encodings of the fixed fallback sequence, inner loop
pub const FALLBACK_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Utf8Sig,
    TextEncoding::Latin1,
];

/// One way of reading CSV bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub delimiter: Delimiter,
    pub encoding: TextEncoding,
}

impl Candidate {
    pub fn new(delimiter: Delimiter, encoding: TextEncoding) -> Self {
        Self {
            delimiter,
            encoding,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.delimiter, self.encoding)
    }
}

/// Build the ordered list of candidates to try
///
/// Hinted candidates come first:
/// - both hints: the exact pair
/// - delimiter only: that delimiter with each fallback encoding
/// - encoding only: each fallback delimiter with that encoding
///
/// They are followed by the nine fallback pairs (delimiter-major), skipping
/// any pair already planned.
pub fn candidate_plan(
    delimiter: Option<Delimiter>,
    encoding: Option<TextEncoding>,
) -> Vec<Candidate> {
    let mut plan = Vec::with_capacity(FALLBACK_DELIMITERS.len() * FALLBACK_ENCODINGS.len() + 3);

    match (delimiter, encoding) {
        (Some(d), Some(e)) => plan.push(Candidate::new(d, e)),
        (Some(d), None) => {
            plan.extend(FALLBACK_ENCODINGS.iter().map(|&e| Candidate::new(d, e)));
        }
        (None, Some(e)) => {
            plan.extend(FALLBACK_DELIMITERS.iter().map(|&d| Candidate::new(d, e)));
        }
        (None, None) => {}
    }

    for &d in &FALLBACK_DELIMITERS {
        for &e in &FALLBACK_ENCODINGS {
            let candidate = Candidate::new(d, e);
            if !plan.contains(&candidate) {
                plan.push(candidate);
            }
        }
    }

    plan
}
