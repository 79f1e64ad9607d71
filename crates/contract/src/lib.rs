//! GrantFlow Contract Log Mirror
//!
//! Read-only projection of the external chain indexer's output. The
//! indexer writes JSONL files into a directory; this crate reads them and
//! serves the events ordered by block number. Nothing here ever writes.

mod error;
mod log;
mod mirror;

pub use error::MirrorError;
pub use log::ContractLog;
pub use mirror::LogMirror;
