//! Durable log writer
//!
//! The log file is created lazily by the first append. The header is
//! committed by that first record and cached afterwards.
//!
//! Every row is encoded into one buffer and written with a single
//! `write_all` followed by `sync_data`, so a failed write never leaves a
//! half-written row behind earlier rows.
//!
//! Header evolution (policy `evolve`) rewrites only the header line,
//! through a temp file and rename. The bytes of existing data rows are
//! carried over unchanged.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::codec::{encode_header, encode_row};
use super::errors::{LogError, LogResult};
use super::policy::SchemaPolicy;
use super::reader::{self, Recovered};
use crate::record::Record;

/// What an append did to the file besides adding a row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The file was new (or empty) and a header was written
    pub header_created: bool,
    /// Columns appended to the header (policy `evolve`)
    pub columns_added: Vec<String>,
    /// Fields left out of the row (policy `drop_extra`)
    pub fields_dropped: Vec<String>,
}

/// Append-only CSV log of records.
#[derive(Debug)]
pub struct DurableLog {
    path: PathBuf,
    policy: SchemaPolicy,
    /// Committed header, once known
    header: Option<Vec<String>>,
}

impl DurableLog {
    /// Create a handle for the log at `path`. No I/O happens here.
    pub fn new(path: impl Into<PathBuf>, policy: SchemaPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            header: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> SchemaPolicy {
        self.policy
    }

    /// Cached header, if one has been read or written
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Read every record in the log.
    ///
    /// A missing file is a cold start and returns no records.
    pub fn recover(&mut self) -> LogResult<Recovered> {
        let recovered = reader::recover_file(&self.path)?;
        self.header = recovered.header.clone();
        Ok(recovered)
    }

    /// Check whether a record with these field names may be written.
    ///
    /// Only the `reject` policy refuses records; no state changes either way.
    pub fn admit<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> LogResult<()> {
        if self.policy != SchemaPolicy::Reject {
            return Ok(());
        }
        let Some(header) = self.load_header()? else {
            return Ok(());
        };
        let extra = fields_outside(header, names);
        if extra.is_empty() {
            Ok(())
        } else {
            Err(LogError::SchemaMismatch { fields: extra })
        }
    }

    /// Append one record.
    pub fn append(&mut self, record: &Record) -> LogResult<AppendOutcome> {
        let mut outcome = AppendOutcome::default();

        let Some(header) = self.load_header()?.map(<[String]>::to_vec) else {
            let header: Vec<String> = record.field_names().map(String::from).collect();
            let mut buf = encode_header(&header);
            buf.push_str(&encode_row(&header, record));
            self.write_all(buf.as_bytes())?;
            self.header = Some(header);
            outcome.header_created = true;
            return Ok(outcome);
        };

        let extra = fields_outside(&header, record.field_names());
        let header = if extra.is_empty() {
            header
        } else {
            match self.policy {
                SchemaPolicy::Reject => return Err(LogError::SchemaMismatch { fields: extra }),
                SchemaPolicy::DropExtra => {
                    outcome.fields_dropped = extra;
                    header
                }
                SchemaPolicy::Evolve => {
                    let mut evolved = header;
                    evolved.extend(extra.iter().cloned());
                    self.rewrite_header(&evolved)?;
                    self.header = Some(evolved.clone());
                    outcome.columns_added = extra;
                    evolved
                }
            }
        };

        self.write_all(encode_row(&header, record).as_bytes())?;
        Ok(outcome)
    }

    fn load_header(&mut self) -> LogResult<Option<&[String]>> {
        if self.header.is_none() {
            self.header = reader::read_header(&self.path)?;
        }
        Ok(self.header.as_deref())
    }

    fn write_all(&self, buf: &[u8]) -> LogResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LogError::append(parent, e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::append(&self.path, e))?;

        file.write_all(buf)
            .map_err(|e| LogError::append(&self.path, e))?;

        // fsync - the row is only acknowledged as durable after this
        file.sync_data()
            .map_err(|e| LogError::append(&self.path, e))
    }

    fn rewrite_header(&self, header: &[String]) -> LogResult<()> {
        let bytes = fs::read(&self.path).map_err(|e| LogError::append(&self.path, e))?;
        let body_start = reader::header_span(&bytes)?
            .map(|span| span.end)
            .unwrap_or(bytes.len());

        let mut buf = encode_header(header).into_bytes();
        buf.extend_from_slice(&bytes[body_start..]);

        let tmp_path = self.tmp_path();
        {
            let mut tmp = File::create(&tmp_path).map_err(|e| LogError::append(&tmp_path, e))?;
            tmp.write_all(&buf)
                .map_err(|e| LogError::append(&tmp_path, e))?;
            tmp.sync_all()
                .map_err(|e| LogError::append(&tmp_path, e))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| LogError::append(&self.path, e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn fields_outside<'a>(header: &[String], names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut extra: Vec<String> = Vec::new();
    for name in names {
        if !header.iter().any(|h| h == name) && !extra.iter().any(|e| e == name) {
            extra.push(name.to_string());
        }
    }
    extra
}
