//! Definition tables: code to display name, plus the running total per code.

use crate::amount::Amount;
use crate::config::{DefinitionKind, DefinitionSource};
use crate::error::{Result, SalesError};
use crate::record::read_lines;
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

/// One defined code.
///
/// The name is fixed after load; only `total` changes during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub total: Amount,
}

/// A loaded definition file (`branch.lst` or `commodity.lst`).
///
/// # Invariants
///
/// - Every code matched the kind's code pattern in full
/// - Every total starts at zero and stays below [`Amount::CEILING`]
#[derive(Debug, Clone)]
pub struct DefinitionTable {
    kind: DefinitionKind,
    entries: HashMap<String, Definition>,
}

impl DefinitionTable {
    /// Creates an empty table.
    pub fn new(kind: DefinitionKind) -> Self {
        DefinitionTable {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Loads `source.file_name` from `dir`.
    ///
    /// Fails on the first malformed line; no partial table is returned.
    pub fn load(dir: &Path, source: &DefinitionSource) -> Result<Self> {
        let path = dir.join(&source.file_name);
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SalesError::FileNotFound { kind: source.kind },
            _ => SalesError::Io(e),
        })?;

        let mut table = DefinitionTable::new(source.kind);
        for (idx, line) in read_lines(file)?.iter().enumerate() {
            let (code, name) = split_entry(line)
                .filter(|(code, _)| source.is_valid_code(code))
                .ok_or(SalesError::InvalidFormat {
                    kind: source.kind,
                    line: idx + 1,
                })?;
            table.define(code, name);
        }

        debug!("Loaded {} codes from {}", table.len(), path.display());
        Ok(table)
    }

    /// Defines `code`, replacing any earlier name and resetting its total.
    pub fn define(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.entries.insert(
            code.into(),
            Definition {
                name: name.into(),
                total: Amount::ZERO,
            },
        );
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(|d| d.name.as_str())
    }

    pub fn total(&self, code: &str) -> Option<Amount> {
        self.entries.get(code).map(|d| d.total)
    }

    /// Stores an already-validated total for an existing code.
    ///
    /// Returns `false` if the code is not defined.
    pub fn commit(&mut self, code: &str, total: Amount) -> bool {
        match self.entries.get_mut(code) {
            Some(definition) => {
                definition.total = total;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by code.
    pub fn sorted_entries(&self) -> Vec<(&str, &Definition)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(code, definition)| (code.as_str(), definition))
            .collect();
        entries.sort_by_key(|(code, _)| *code);
        entries
    }
}

/// Splits `code,name`.
///
/// Trailing empty fields are dropped first, so `001,Tokyo,` is accepted while
/// `001,` has no name and is rejected.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let mut fields: Vec<&str> = line.split(',').collect();
    while fields.last().map_or(false, |field| field.is_empty()) {
        fields.pop();
    }
    match fields.as_slice() {
        [code, name] => Some((*code, *name)),
        _ => None,
    }
}
