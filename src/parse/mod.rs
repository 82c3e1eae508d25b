//! Artifact parsers: raw text in, structured representation out.
//!
//! Parsers are tolerant: only input that cannot be read as text at all is
//! rejected with a `ParseError`, which callers convert into one terminal
//! finding. Malformed JSON-LD blocks are kept per block so siblings still
//! get evaluated.

pub mod framework;
pub mod html;
pub mod jsonld;
pub mod llms;
pub mod robots;
pub mod sitemap;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub line: Option<usize>,
    pub detail: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(l) => write!(f, "line {}: {}", l, self.detail),
            None => write!(f, "{}", self.detail),
        }
    }
}

impl std::error::Error for ParseError {}

/// Decode file bytes as UTF-8 (a leading BOM is dropped).
pub fn decode_text(bytes: &[u8]) -> Result<String, ParseError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            let line = valid.iter().filter(|b| **b == b'\n').count() + 1;
            Err(ParseError {
                line: Some(line),
                detail: format!("invalid UTF-8 at byte {}", e.valid_up_to()),
            })
        }
    }
}

/// Line-start offsets of a text, built once per parse.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex { starts }
    }

    /// 1-based line number of a byte offset.
    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_reports_line() {
        let err = decode_text(b"ok\nstill ok\n\xff\xfe").unwrap_err();
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn bom_is_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBF# Site").unwrap(), "# Site");
    }

    #[test]
    fn line_index_counts_newlines() {
        let lines = LineIndex::new("a\nb\nc\n");
        assert_eq!(lines.line(0), 1);
        assert_eq!(lines.line(1), 1);
        assert_eq!(lines.line(2), 2);
        assert_eq!(lines.line(4), 3);
        assert_eq!(lines.line(6), 4);
        assert_eq!(lines.line(100), 4);
    }
}
