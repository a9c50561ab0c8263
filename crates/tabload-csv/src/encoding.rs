//! Text encodings tried when decoding uploaded bytes

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A text encoding used to decode CSV bytes
///
/// Decoding is strict: malformed input is an error, never replaced with
/// U+FFFD. Plain UTF-8 also rejects a leading byte-order mark so that the
/// BOM-aware [`TextEncoding::Utf8Sig`] is the candidate that accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 without a byte-order mark
    Utf8,
    /// UTF-8 with an optional leading byte-order mark, which is stripped
    Utf8Sig,
    /// ISO-8859-1: every byte maps to the code point of the same value
    Latin1,
    /// Any other WHATWG encoding
    Other(&'static Encoding),
}

/// Failure to decode bytes with a given encoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Plain UTF-8 was asked to decode input starting with a byte-order mark
    #[error("unexpected UTF-8 byte-order mark")]
    ByteOrderMark,

    /// Input is not valid in the encoding
    #[error("{}", describe_malformed(.encoding, .offset))]
    Malformed {
        encoding: &'static str,
        offset: Option<usize>,
    },
}

fn describe_malformed(encoding: &str, offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!("invalid {} byte sequence at offset {}", encoding, offset),
        None => format!("invalid {} byte sequence", encoding),
    }
}

impl TextEncoding {
    /// Look up an encoding by label
    ///
    /// Labels are case-insensitive and accept `_` for `-`; besides the
    /// WHATWG labels known to `encoding_rs`, `utf-8-sig` and `latin-1` are
    /// recognised. Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => return Some(TextEncoding::Utf8),
            "utf-8-sig" | "utf8-sig" => return Some(TextEncoding::Utf8Sig),
            "latin-1" | "latin1" | "l1" | "iso-8859-1" | "iso8859-1" => {
                return Some(TextEncoding::Latin1)
            }
            _ => {}
        }

        let encoding = Encoding::for_label(normalized.as_bytes())?;
        if encoding == encoding_rs::UTF_8 {
            Some(TextEncoding::Utf8)
        } else {
            Some(TextEncoding::Other(encoding))
        }
    }

    /// Canonical name, as shown in attempt reports
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Other(encoding) => encoding.name(),
        }
    }

    /// Decode bytes into text
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, DecodeError> {
        match self {
            TextEncoding::Utf8 => {
                if bytes.starts_with(UTF8_BOM) {
                    return Err(DecodeError::ByteOrderMark);
                }
                decode_utf8(bytes, "utf-8")
            }
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                decode_utf8(body, "utf-8-sig").map_err(|err| match err {
                    DecodeError::Malformed {
                        encoding,
                        offset: Some(offset),
                    } if body.len() != bytes.len() => DecodeError::Malformed {
                        encoding,
                        offset: Some(offset + UTF8_BOM.len()),
                    },
                    other => other,
                })
            }
            TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes)),
            TextEncoding::Other(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or(DecodeError::Malformed {
                    encoding: encoding.name(),
                    offset: None,
                }),
        }
    }
}

fn decode_utf8<'a>(bytes: &'a [u8], name: &'static str) -> Result<Cow<'a, str>, DecodeError> {
    encoding_rs::UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| DecodeError::Malformed {
            encoding: name,
            offset: Some(Encoding::utf8_valid_up_to(bytes)),
        })
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labels() {
        assert_eq!(TextEncoding::from_label("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("utf_8_sig"), Some(TextEncoding::Utf8Sig));
        assert_eq!(TextEncoding::from_label("Latin1"), Some(TextEncoding::Latin1));
        assert_eq!(
            TextEncoding::from_label("windows-1252"),
            Some(TextEncoding::Other(encoding_rs::WINDOWS_1252))
        );
        assert_eq!(TextEncoding::from_label("klingon"), None);
    }

    #[test]
    fn test_utf8_is_strict() {
        assert_eq!(TextEncoding::Utf8.decode(b"caf\xC3\xA9").unwrap(), "café");
        assert_eq!(
            TextEncoding::Utf8.decode(b"ab\xE9"),
            Err(DecodeError::Malformed {
                encoding: "utf-8",
                offset: Some(2)
            })
        );
        assert_eq!(
            TextEncoding::Utf8.decode(b"\xEF\xBB\xBFa,b"),
            Err(DecodeError::ByteOrderMark)
        );
    }

    #[test]
    fn test_utf8_sig_strips_bom() {
        assert_eq!(TextEncoding::Utf8Sig.decode(b"\xEF\xBB\xBFa,b").unwrap(), "a,b");
        assert_eq!(TextEncoding::Utf8Sig.decode(b"a,b").unwrap(), "a,b");
        assert_eq!(
            TextEncoding::Utf8Sig.decode(b"\xEF\xBB\xBFa\xFF"),
            Err(DecodeError::Malformed {
                encoding: "utf-8-sig",
                offset: Some(4)
            })
        );
    }

    #[test]
    fn test_latin1_accepts_any_byte() {
        assert_eq!(TextEncoding::Latin1.decode(b"caf\xE9").unwrap(), "café");
        let all: Vec<u8> = (0..=255).collect();
        assert_eq!(TextEncoding::Latin1.decode(&all).unwrap().chars().count(), 256);
    }
}
