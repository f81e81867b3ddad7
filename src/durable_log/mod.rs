//! Durable log subsystem for squatlog
//!
//! The durable log is the on-disk representation of every record: a
//! UTF-8, comma-delimited file with one header row and one row per
//! record, authoritative across restarts.
//!
//! # Design Principles
//!
//! - Append-only: data rows are never rewritten
//! - Header committed by the first record ever written
//! - Schema drift handled by an explicit `SchemaPolicy`
//! - Lenient recovery: bad numeric cells degrade to text
//! - One `write_all` + `sync_data` per row

mod codec;
mod errors;
mod policy;
mod reader;
mod writer;

pub use codec::{encode_header, encode_row, ParsedRow, RawCell, RowParser};
pub use errors::{LogError, LogResult};
pub use policy::SchemaPolicy;
pub use reader::{header_span, read_header, recover_file, HeaderSpan, Recovered, RecoveryStats};
pub use writer::{AppendOutcome, DurableLog};
