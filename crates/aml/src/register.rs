//! Append-only JSONL flag register
//!
//! Each line of `flags.jsonl` is one JSON-serialized [`AmlFlag`]. The file
//! is only ever appended to; re-reads are the source of truth for queries.

use crate::error::FlagError;
use crate::flag::{AmlFlag, Severity};
use chrono::Utc;
use grantflow_core::{FlagId, RequestId};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

enum Backing {
    /// Durable register backed by a JSONL file
    Disk { path: PathBuf, file: File },
    /// In-memory register (for testing)
    Memory(Vec<AmlFlag>),
}

struct Inner {
    backing: Backing,
    next_id: FlagId,
}

/// Append-only register of AML flags.
pub struct FlagRegister {
    inner: Mutex<Inner>,
}

impl FlagRegister {
    /// Open (or create) a register at the given file path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FlagError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let existing = read_flags(&path)?;
        let next_id = existing.iter().map(|f| f.id).max().unwrap_or(0) + 1;

        Ok(Self {
            inner: Mutex::new(Inner {
                backing: Backing::Disk { path, file },
                next_id,
            }),
        })
    }

    /// Create an in-memory register (for testing)
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                backing: Backing::Memory(Vec::new()),
                next_id: 1,
            }),
        }
    }

    /// Record a flag delivered by the external detection service.
    pub fn record(
        &self,
        spending_request_id: RequestId,
        flag_type: &str,
        severity: Severity,
        description: &str,
    ) -> Result<AmlFlag, FlagError> {
        if flag_type.trim().is_empty() {
            return Err(FlagError::EmptyFlagType);
        }

        let mut inner = self.inner.lock().expect("flag register lock poisoned");
        let flag = AmlFlag {
            id: inner.next_id,
            spending_request_id,
            flag_type: flag_type.trim().to_string(),
            severity,
            description: description.to_string(),
            created_at: Utc::now(),
        };

        match &mut inner.backing {
            Backing::Disk { file, .. } => {
                let json = serde_json::to_string(&flag)?;
                writeln!(file, "{}", json)?;
                file.flush()?;
            }
            Backing::Memory(flags) => flags.push(flag.clone()),
        }
        inner.next_id += 1;
        Ok(flag)
    }

    /// Read every flag in the register, in record order.
    pub fn read_all(&self) -> Result<Vec<AmlFlag>, FlagError> {
        let inner = self.inner.lock().expect("flag register lock poisoned");
        match &inner.backing {
            Backing::Disk { path, .. } => read_flags(path),
            Backing::Memory(flags) => Ok(flags.clone()),
        }
    }

    /// Flags attached to one request, ordered by creation time ascending.
    pub fn flags_for_request(&self, id: RequestId) -> Result<Vec<AmlFlag>, FlagError> {
        let mut flags: Vec<AmlFlag> = self
            .read_all()?
            .into_iter()
            .filter(|f| f.spending_request_id == id)
            .collect();
        flags.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(flags)
    }

    /// Flags attached to any of the given requests, ordered by creation time.
    ///
    /// Backs the per-grant listing: the caller supplies the grant's request
    /// ids, keeping the register unaware of grants.
    pub fn flags_for_requests(&self, ids: &[RequestId]) -> Result<Vec<AmlFlag>, FlagError> {
        let mut flags: Vec<AmlFlag> = self
            .read_all()?
            .into_iter()
            .filter(|f| ids.contains(&f.spending_request_id))
            .collect();
        flags.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(flags)
    }

    /// The payment gate: does any high-severity flag exist for the request?
    pub fn has_high_severity(&self, id: RequestId) -> Result<bool, FlagError> {
        Ok(self
            .read_all()?
            .iter()
            .any(|f| f.spending_request_id == id && f.severity == Severity::High))
    }
}

fn read_flags(path: &Path) -> Result<Vec<AmlFlag>, FlagError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut flags = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let flag: AmlFlag = serde_json::from_str(&line)?;
        flags.push(flag);
    }

    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn record_and_list_ordered() {
        let register = FlagRegister::in_memory();
        register
            .record(7, "velocity", Severity::Low, "many requests in a day")
            .unwrap();
        register
            .record(7, "large_amount", Severity::High, "unusually large claim")
            .unwrap();
        register.record(8, "velocity", Severity::Medium, "").unwrap();

        let flags = register.flags_for_request(7).unwrap();
        assert_eq!(flags.len(), 2);
        assert!(flags[0].created_at <= flags[1].created_at);
        assert_eq!(flags[0].flag_type, "velocity");
    }

    #[test]
    fn high_severity_gate() {
        let register = FlagRegister::in_memory();
        register.record(1, "velocity", Severity::Medium, "").unwrap();
        assert!(!register.has_high_severity(1).unwrap());

        register.record(1, "sanctions", Severity::High, "").unwrap();
        assert!(register.has_high_severity(1).unwrap());
        assert!(!register.has_high_severity(2).unwrap());
    }

    #[test]
    fn empty_flag_type_rejected() {
        let register = FlagRegister::in_memory();
        assert!(matches!(
            register.record(1, "  ", Severity::Low, ""),
            Err(FlagError::EmptyFlagType)
        ));
    }

    #[test]
    fn disk_register_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aml").join("flags.jsonl");

        {
            let register = FlagRegister::new(&path).unwrap();
            register
                .record(3, "structuring", Severity::High, "split payments")
                .unwrap();
            register.record(4, "velocity", Severity::Low, "").unwrap();
        }

        let reopened = FlagRegister::new(&path).unwrap();
        assert_eq!(reopened.read_all().unwrap().len(), 2);
        assert!(reopened.has_high_severity(3).unwrap());

        // Ids keep increasing after reopen
        let next = reopened.record(5, "velocity", Severity::Low, "").unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn flags_for_requests_joins_multiple() {
        let register = FlagRegister::in_memory();
        register.record(1, "a", Severity::Low, "").unwrap();
        register.record(2, "b", Severity::Medium, "").unwrap();
        register.record(3, "c", Severity::High, "").unwrap();

        let flags = register.flags_for_requests(&[1, 3]).unwrap();
        assert_eq!(flags.len(), 2);
    }
}
