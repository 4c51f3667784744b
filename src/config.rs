//! Run configuration: file names, code patterns and record layout.

use crate::error::Result;
use regex::Regex;
use std::fmt;

pub const BRANCH_DEFINITION_FILE: &str = "branch.lst";
pub const COMMODITY_DEFINITION_FILE: &str = "commodity.lst";
pub const BRANCH_SUMMARY_FILE: &str = "branch.out";
pub const COMMODITY_SUMMARY_FILE: &str = "commodity.out";
pub const RECORD_EXTENSION: &str = "rcd";

const BRANCH_CODE_PATTERN: &str = "[0-9]{3}";
const COMMODITY_CODE_PATTERN: &str = "[A-Za-z0-9]{8}";

/// Which definition table a file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Branch,
    Commodity,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Branch => write!(f, "branch definition file"),
            DefinitionKind::Commodity => write!(f, "commodity definition file"),
        }
    }
}

/// Everything needed to load one definition table and write its summary.
#[derive(Debug, Clone)]
pub struct DefinitionSource {
    pub kind: DefinitionKind,
    pub file_name: String,
    pub summary_file_name: String,
    code_pattern: Regex,
}

impl DefinitionSource {
    /// Builds a source whose code pattern must match the whole code.
    pub fn new(
        kind: DefinitionKind,
        file_name: impl Into<String>,
        summary_file_name: impl Into<String>,
        code_pattern: &str,
    ) -> Result<Self> {
        let code_pattern = Regex::new(&format!("^(?:{})$", code_pattern))?;
        Ok(DefinitionSource {
            kind,
            file_name: file_name.into(),
            summary_file_name: summary_file_name.into(),
            code_pattern,
        })
    }

    /// Returns `true` if `code` matches the pattern in full.
    pub fn is_valid_code(&self, code: &str) -> bool {
        self.code_pattern.is_match(code)
    }
}

/// Immutable run configuration, built once and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub branch: DefinitionSource,
    /// `None` disables commodity tracking (two-line records).
    pub commodity: Option<DefinitionSource>,
    record_name_pattern: Regex,
}

impl Config {
    /// Branch and commodity tracking, three-line records.
    pub fn full() -> Result<Self> {
        Ok(Config {
            branch: Self::branch_source()?,
            commodity: Some(DefinitionSource::new(
                DefinitionKind::Commodity,
                COMMODITY_DEFINITION_FILE,
                COMMODITY_SUMMARY_FILE,
                COMMODITY_CODE_PATTERN,
            )?),
            record_name_pattern: Self::record_pattern(RECORD_EXTENSION)?,
        })
    }

    /// Branch tracking only, two-line records.
    pub fn branch_only() -> Result<Self> {
        Ok(Config {
            branch: Self::branch_source()?,
            commodity: None,
            record_name_pattern: Self::record_pattern(RECORD_EXTENSION)?,
        })
    }

    fn branch_source() -> Result<DefinitionSource> {
        DefinitionSource::new(
            DefinitionKind::Branch,
            BRANCH_DEFINITION_FILE,
            BRANCH_SUMMARY_FILE,
            BRANCH_CODE_PATTERN,
        )
    }

    fn record_pattern(extension: &str) -> Result<Regex> {
        Ok(Regex::new(&format!(
            r"^[0-9]{{8}}\.{}$",
            regex::escape(extension)
        ))?)
    }

    /// Returns `true` if `file_name` looks like a record file.
    pub fn is_record_file_name(&self, file_name: &str) -> bool {
        self.record_name_pattern.is_match(file_name)
    }
}
