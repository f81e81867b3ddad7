//! JSON output for CLI commands
//!
//! Output is UTF-8 JSON on stdout, newline terminated.

use std::io::{self, Write};

use serde::Serialize;

use super::errors::CliResult;

/// Write a value as pretty JSON to stdout
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_json_to(&mut out, value)
}

/// Write a value as pretty JSON to any writer
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_to_buffer() {
        let mut buf = Vec::new();
        write_json_to(&mut buf, &json!([{"count": 5.0}])).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back[0]["count"], 5.0);
    }
}
