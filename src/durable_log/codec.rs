//! CSV row codec
//!
//! Row format:
//!
//! ```text
//! count,knee_angle,note,timestamp\r\n
//! 5,92.3,"deep, slow",2024-05-01T18:30:12\r\n
//! ```
//!
//! - Comma delimited, CRLF terminated on write; LF, CRLF and bare CR are
//!   accepted on read
//! - A cell is quoted when it is empty or contains `,` `"` CR LF or
//!   leading/trailing whitespace; quotes inside are doubled
//! - Null or missing values are written as an empty unquoted cell, so a
//!   reader can tell them apart from an empty string (`""`)

use std::mem;

use serde_json::Value;

use super::errors::{LogError, LogResult};
use crate::record::Record;

const ROW_TERMINATOR: &str = "\r\n";

/// Encode a header row.
pub fn encode_header(names: &[String]) -> String {
    let mut out = String::with_capacity(names.len() * 12);
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_text(&mut out, name);
    }
    out.push_str(ROW_TERMINATOR);
    out
}

/// Encode one record in header order.
///
/// Fields the record has but the header lacks are not written. A row with
/// no cell text gets a lone delimiter so it never reads back as a blank line.
pub fn encode_row(header: &[String], record: &Record) -> String {
    let mut out = String::with_capacity(header.len() * 12);
    for (i, name) in header.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_value(&mut out, record.get(name));
    }
    if out.is_empty() {
        out.push(',');
    }
    out.push_str(ROW_TERMINATOR);
    out
}

fn push_value(out: &mut String, value: Option<&Value>) {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) => push_text(out, s),
        Some(Value::Number(n)) => out.push_str(&n.to_string()),
        Some(Value::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
        Some(nested) => push_text(out, &nested.to_string()),
    }
}

fn push_text(out: &mut String, s: &str) {
    if !needs_quotes(s) {
        out.push_str(s);
        return;
    }
    out.push('"');
    for ch in s.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || s.bytes().any(|b| matches!(b, b',' | b'"' | b'\r' | b'\n'))
}

/// A cell as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub text: String,
    /// Whether the cell was written quoted
    pub quoted: bool,
}

impl RawCell {
    /// An empty unquoted cell means "no value"
    pub fn is_absent(&self) -> bool {
        !self.quoted && self.text.is_empty()
    }
}

/// One parsed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub cells: Vec<RawCell>,
    /// 1-based line the row starts on
    pub line: usize,
    /// Byte offset just past the row terminator
    pub end: usize,
}

impl ParsedRow {
    /// A row made of a single empty unquoted cell (an empty line)
    pub fn is_blank(&self) -> bool {
        self.cells.len() == 1 && self.cells[0].is_absent()
    }
}

/// Streaming row parser over decoded log content.
pub struct RowParser<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> RowParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    fn parse_row(&mut self) -> LogResult<ParsedRow> {
        let bytes = self.input.as_bytes();
        let len = bytes.len();
        let start_line = self.line;
        let mut cells = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut i = self.pos;

        loop {
            if i < len && bytes[i] == b'"' {
                quoted = true;
                i += 1;
                let mut seg = i;
                loop {
                    if i >= len {
                        return Err(LogError::malformed(start_line, "unterminated quoted cell"));
                    }
                    match bytes[i] {
                        b'"' if i + 1 < len && bytes[i + 1] == b'"' => {
                            // keep one quote of the pair
                            field.push_str(&self.input[seg..=i]);
                            i += 2;
                            seg = i;
                        }
                        b'"' => {
                            field.push_str(&self.input[seg..i]);
                            i += 1;
                            break;
                        }
                        b'\n' => {
                            self.line += 1;
                            i += 1;
                        }
                        _ => i += 1,
                    }
                }
            }

            // Unquoted cell, or stray text after a closing quote
            let seg = i;
            while i < len && !matches!(bytes[i], b',' | b'\n' | b'\r') {
                i += 1;
            }
            field.push_str(&self.input[seg..i]);
            cells.push(RawCell {
                text: mem::take(&mut field),
                quoted: mem::replace(&mut quoted, false),
            });

            if i >= len {
                break;
            }
            match bytes[i] {
                b',' => {
                    i += 1;
                }
                b'\r' => {
                    i += 1;
                    if i < len && bytes[i] == b'\n' {
                        i += 1;
                    }
                    self.line += 1;
                    break;
                }
                _ => {
                    i += 1;
                    self.line += 1;
                    break;
                }
            }
        }

        self.pos = i;
        Ok(ParsedRow {
            cells,
            line: start_line,
            end: i,
        })
    }
}

impl<'a> Iterator for RowParser<'a> {
    type Item = LogResult<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        let result = self.parse_row();
        if result.is_err() {
            // stop after the first structural error
            self.pos = self.input.len();
        }
        Some(result)
    }
}
