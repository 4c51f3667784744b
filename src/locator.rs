//! Record file discovery and sequence verification.

use crate::config::Config;
use crate::error::{Result, SalesError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// A discovered record file (`NNNNNNNN.rcd`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Numeric value of the 8-digit stem.
    pub serial: u32,
}

/// Lists the record files directly inside `dir`, sorted by name, and checks
/// their numbering.
///
/// Fails with [`SalesError::NonSequentialFiles`] if the serial numbers are not
/// a contiguous run. No file content is read.
pub fn discover(dir: &Path, config: &Config) -> Result<Vec<RecordFile>> {
    let records = list_record_files(dir, config)?;
    verify_sequential(&records)?;
    Ok(records)
}

/// Lists the record files directly inside `dir`, sorted by name.
pub fn list_record_files(dir: &Path, config: &Config) -> Result<Vec<RecordFile>> {
    let mut records = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if !config.is_record_file_name(&file_name) {
            continue;
        }

        let path = entry.path();
        // is_file follows symlinks
        if !path.is_file() {
            debug!("Skipping {}: not a regular file", file_name);
            continue;
        }

        let serial = file_name[..8]
            .parse::<u32>()
            .map_err(|e| SalesError::Unexpected {
                detail: format!("{}: {}", file_name, e),
            })?;
        records.push(RecordFile {
            path,
            file_name,
            serial,
        });
    }

    records.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    debug!("Discovered {} record files in {}", records.len(), dir.display());
    Ok(records)
}

/// Checks that each serial is exactly one more than the previous.
pub fn verify_sequential(records: &[RecordFile]) -> Result<()> {
    for pair in records.windows(2) {
        if pair[1].serial.checked_sub(pair[0].serial) != Some(1) {
            return Err(SalesError::NonSequentialFiles {
                former: pair[0].file_name.clone(),
                latter: pair[1].file_name.clone(),
            });
        }
    }
    Ok(())
}
