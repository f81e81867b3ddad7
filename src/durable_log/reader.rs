//! Log recovery
//!
//! Reads the whole log and rebuilds the records it holds.
//!
//! - Missing or zero-byte file: empty result (cold start)
//! - First non-blank row is the header; blank rows are skipped
//! - Short rows leave trailing fields absent; non-empty cells past the
//!   header width are ignored and counted
//! - Known numeric fields are coerced leniently (see `record::coerce_cell`)
//! - I/O failure, invalid UTF-8 or an unterminated quoted cell is an error

use std::fs;
use std::io;
use std::path::Path;

use super::codec::{ParsedRow, RowParser};
use super::errors::{LogError, LogResult};
use crate::record::{coerce_cell, is_numeric_field, Cell, Record};

const UTF8_BOM: &str = "\u{feff}";

/// Counters collected while recovering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Data rows turned into records
    pub rows: usize,
    /// Numeric-field cells parsed as numbers
    pub numbers_coerced: usize,
    /// Numeric-field cells kept as text because they did not parse
    pub numbers_degraded: usize,
    /// Non-empty cells beyond the header width
    pub extra_cells: usize,
}

/// Result of reading the log
#[derive(Debug, Clone, Default)]
pub struct Recovered {
    pub records: Vec<Record>,
    /// Committed header, if the log has one
    pub header: Option<Vec<String>>,
    pub stats: RecoveryStats,
}

/// Header names plus the byte offset where data rows begin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpan {
    pub names: Vec<String>,
    pub end: usize,
}

/// Read every record from the log at `path`.
pub fn recover_file(path: &Path) -> LogResult<Recovered> {
    let Some(bytes) = read_bytes(path)? else {
        return Ok(Recovered::default());
    };
    let (content, _) = decode(&bytes)?;

    let mut rows = RowParser::new(content);
    let header = loop {
        match rows.next() {
            Some(row) => {
                let row = row?;
                if !row.is_blank() {
                    break header_names(row);
                }
            }
            None => return Ok(Recovered::default()),
        }
    };

    let mut stats = RecoveryStats::default();
    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        if row.is_blank() {
            continue;
        }
        records.push(row_to_record(&header, row, &mut stats));
    }
    stats.rows = records.len();

    Ok(Recovered {
        records,
        header: Some(header),
        stats,
    })
}

/// Read only the header of the log at `path`.
pub fn read_header(path: &Path) -> LogResult<Option<Vec<String>>> {
    match read_bytes(path)? {
        Some(bytes) => Ok(header_span(&bytes)?.map(|span| span.names)),
        None => Ok(None),
    }
}

/// Locate the header row in raw log bytes.
///
/// Only the bytes up to the end of the header row are decoded, so damage
/// further down the log does not hide the header from the writer.
pub fn header_span(bytes: &[u8]) -> LogResult<Option<HeaderSpan>> {
    let bom = if bytes.starts_with(UTF8_BOM.as_bytes()) {
        UTF8_BOM.len()
    } else {
        0
    };
    let header_end = bom + first_row_end(&bytes[bom..]);
    let (content, offset) = decode(&bytes[..header_end])?;
    for row in RowParser::new(content) {
        let row = row?;
        if row.is_blank() {
            continue;
        }
        let end = row.end + offset;
        return Ok(Some(HeaderSpan {
            names: header_names(row),
            end,
        }));
    }
    Ok(None)
}

/// Byte offset just past the first non-blank row, honoring quoted cells.
fn first_row_end(bytes: &[u8]) -> usize {
    let mut in_quotes = false;
    let mut row_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'\r' | b'\n' if !in_quotes => {
                let mut end = i + 1;
                if bytes[i] == b'\r' && bytes.get(end) == Some(&b'\n') {
                    end += 1;
                }
                if i > row_start {
                    return end;
                }
                row_start = end;
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn read_bytes(path: &Path) -> LogResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LogError::load(path, e)),
    }
}

/// Decode UTF-8, dropping a leading BOM. Returns the BOM length skipped.
fn decode(bytes: &[u8]) -> LogResult<(&str, usize)> {
    let content = std::str::from_utf8(bytes).map_err(|e| {
        let line = bytes[..e.valid_up_to()].iter().filter(|&&b| b == b'\n').count() + 1;
        LogError::malformed(line, format!("invalid UTF-8: {}", e))
    })?;
    match content.strip_prefix(UTF8_BOM) {
        Some(rest) => Ok((rest, UTF8_BOM.len())),
        None => Ok((content, 0)),
    }
}

fn header_names(row: ParsedRow) -> Vec<String> {
    row.cells.into_iter().map(|cell| cell.text).collect()
}

fn row_to_record(header: &[String], row: ParsedRow, stats: &mut RecoveryStats) -> Record {
    stats.extra_cells += row
        .cells
        .iter()
        .skip(header.len())
        .filter(|cell| !cell.is_absent())
        .count();

    let mut record = Record::new();
    for (name, cell) in header.iter().zip(row.cells) {
        if cell.is_absent() {
            continue;
        }
        let numeric = is_numeric_field(name) && !cell.text.is_empty();
        let value = coerce_cell(name, cell.text);
        if numeric {
            match value {
                Cell::Number(_) => stats.numbers_coerced += 1,
                Cell::Text(_) => stats.numbers_degraded += 1,
            }
        }
        record.insert(name.as_str(), value.into_value());
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_log(dir: &TempDir, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("log.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let recovered = recover_file(&dir.path().join("absent.csv")).unwrap();
        assert!(recovered.records.is_empty());
        assert!(recovered.header.is_none());
    }

    #[test]
    fn test_zero_byte_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, b"");
        let recovered = recover_file(&path).unwrap();
        assert!(recovered.records.is_empty());
        assert!(recovered.header.is_none());
    }

    #[test]
    fn test_recovers_and_coerces() {
        let dir = TempDir::new().unwrap();
        let path = write_log(
            &dir,
            b"count,knee_angle,session,timestamp\r\n5,92.3,7,2024-05-01T18:30:12\r\n",
        );
        let recovered = recover_file(&path).unwrap();
        assert_eq!(recovered.records.len(), 1);
        let record = &recovered.records[0];
        assert_eq!(record.get("count"), Some(&json!(5.0)));
        assert_eq!(record.get("knee_angle"), Some(&json!(92.3)));
        // not a known numeric field
        assert_eq!(record.get("session"), Some(&json!("7")));
        assert_eq!(recovered.stats.numbers_coerced, 2);
        assert_eq!(
            recovered.header,
            Some(vec![
                "count".to_string(),
                "knee_angle".to_string(),
                "session".to_string(),
                "timestamp".to_string()
            ])
        );
    }

    #[test]
    fn test_bad_numeric_cell_degrades() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, b"count,timestamp\nabc,2024-05-01T18:30:12\n");
        let recovered = recover_file(&path).unwrap();
        assert_eq!(recovered.records[0].get("count"), Some(&json!("abc")));
        assert_eq!(recovered.stats.numbers_degraded, 1);
    }

    #[test]
    fn test_short_and_long_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, b"a,b,c\n1\n1,2,3,4,5\n");
        let recovered = recover_file(&path).unwrap();
        assert_eq!(recovered.records[0].len(), 1);
        assert_eq!(recovered.records[1].len(), 3);
        assert_eq!(recovered.stats.extra_cells, 2);
    }

    #[test]
    fn test_absent_versus_empty_string() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, b"a,b\n,\"\"\n");
        let recovered = recover_file(&path).unwrap();
        let record = &recovered.records[0];
        assert!(!record.contains("a"));
        assert_eq!(record.get("b"), Some(&json!("")));
    }

    #[test]
    fn test_blank_lines_and_bom() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, "\u{feff}\ncount,note\n\n3,x\n\n".as_bytes());
        let recovered = recover_file(&path).unwrap();
        assert_eq!(
            recovered.header,
            Some(vec!["count".to_string(), "note".to_string()])
        );
        assert_eq!(recovered.records.len(), 1);
    }

    #[test]
    fn test_one_column_empty_row_is_a_record() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, b"timestamp\r\n,\r\n\r\nt2\r\n");
        let recovered = recover_file(&path).unwrap();
        assert_eq!(recovered.records.len(), 2);
        assert!(recovered.records[0].is_empty());
        assert_eq!(recovered.records[1].get("timestamp"), Some(&json!("t2")));
        assert_eq!(recovered.stats.extra_cells, 0);
    }

    #[test]
    fn test_invalid_utf8_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, b"count\n\xff\xfe\n");
        let err = recover_file(&path).unwrap_err();
        assert!(err.is_load());
        assert!(matches!(err, LogError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_header_span() {
        let span = header_span(b"\n count ,b\r\n1,2\r\n").unwrap().unwrap();
        assert_eq!(span.names, vec![" count ".to_string(), "b".to_string()]);
        assert_eq!(span.end, 12);

        let with_bom = "\u{feff}a\nb\n".as_bytes();
        assert_eq!(header_span(with_bom).unwrap().unwrap().end, 5);
    }

    #[test]
    fn test_header_span_ignores_damage_after_header() {
        let span = header_span(b"count,timestamp\r\n1,t\r\n\xff,t\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(span.names, vec!["count".to_string(), "timestamp".to_string()]);
        assert_eq!(span.end, 17);

        let quoted = header_span(b"\"a\nb\",c\n\xff\n").unwrap().unwrap();
        assert_eq!(quoted.names, vec!["a\nb".to_string(), "c".to_string()]);
        assert_eq!(quoted.end, 8);
    }

    #[test]
    fn test_read_header_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_header(&dir.path().join("none.csv")).unwrap(), None);
    }
}
