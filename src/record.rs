//! Sales record parsing, validation and aggregation.

use crate::amount::{Amount, AmountError};
use crate::definition::DefinitionTable;
use crate::error::{Result, SalesError};
use crate::locator::RecordFile;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read};
use std::str::FromStr;

/// The lines of a record file, split into fields but not yet checked
/// against the definition tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub file_name: String,
    pub branch: String,
    pub commodity: Option<String>,
    pub amount_text: String,
}

/// A validated sales event read from one record file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRecord {
    pub file_name: String,
    pub branch: String,
    /// Present only when commodity tracking is enabled.
    pub commodity: Option<String>,
    pub amount: Amount,
}

impl RawRecord {
    /// Splits the lines of a record file into fields.
    ///
    /// Only the line count is checked here.
    pub fn parse(file_name: &str, lines: Vec<String>, with_commodity: bool) -> Result<Self> {
        let expected = if with_commodity { 3 } else { 2 };
        if lines.len() != expected {
            return Err(SalesError::RecordFormat {
                file: file_name.to_string(),
                lines: lines.len(),
            });
        }

        let mut lines = lines.into_iter();
        // Length was checked above
        let branch = lines.next().unwrap_or_default();
        let commodity = if with_commodity { lines.next() } else { None };
        let amount_text = lines.next().unwrap_or_default();

        Ok(RawRecord {
            file_name: file_name.to_string(),
            branch,
            commodity,
            amount_text,
        })
    }

    /// Reads and splits a record file.
    pub fn read(file: &RecordFile, with_commodity: bool) -> Result<Self> {
        let lines = read_lines(File::open(&file.path)?)?;
        Self::parse(&file.file_name, lines, with_commodity)
    }

    /// Checks the branch code, then the commodity code, then the amount.
    pub fn validate(
        self,
        branches: &DefinitionTable,
        commodities: Option<&DefinitionTable>,
    ) -> Result<SalesRecord> {
        if !branches.contains(&self.branch) {
            return Err(SalesError::UnknownBranchCode {
                file: self.file_name,
                code: self.branch,
            });
        }

        if let (Some(code), Some(table)) = (&self.commodity, commodities) {
            if !table.contains(code) {
                return Err(SalesError::UnknownCommodityCode {
                    file: self.file_name,
                    code: code.clone(),
                });
            }
        }

        let amount = Amount::from_str(&self.amount_text).map_err(|e| match e {
            AmountError::Malformed(_) => {
                warn!("{}: {}", self.file_name, e);
                SalesError::Unexpected {
                    detail: format!("{}: {}", self.file_name, e),
                }
            }
            AmountError::OutOfRange(text) => SalesError::AmountOverflow {
                code: self.branch.clone(),
                total: text,
            },
        })?;

        Ok(SalesRecord {
            file_name: self.file_name,
            branch: self.branch,
            commodity: self.commodity,
            amount,
        })
    }
}

/// Reads every line, treating `\n`, `\r\n` and a lone `\r` as terminators.
///
/// A final terminator does not start another line.
pub fn read_lines<R: Read>(mut reader: R) -> io::Result<Vec<String>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut lines = Vec::new();
    let mut rest = text.as_str();
    while !rest.is_empty() {
        match rest.find(|c: char| c == '\r' || c == '\n') {
            Some(end) => {
                lines.push(rest[..end].to_string());
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
            }
            None => {
                lines.push(rest.to_string());
                rest = "";
            }
        }
    }
    Ok(lines)
}

/// Adds a validated record's amount to its branch and commodity totals.
///
/// Both new totals are computed before either is stored, so a record that
/// would overflow leaves every table untouched.
pub fn accumulate(
    record: &SalesRecord,
    branches: &mut DefinitionTable,
    commodities: Option<&mut DefinitionTable>,
) -> Result<()> {
    let branch_total = staged_total(branches, &record.branch, record.amount)?;

    let commodity = match (&record.commodity, commodities) {
        (Some(code), Some(table)) => {
            let total = staged_total(table, code, record.amount)?;
            Some((table, code, total))
        }
        _ => None,
    };

    branches.commit(&record.branch, branch_total);
    if let Some((table, code, total)) = commodity {
        table.commit(code, total);
    }

    debug!(
        "{}: added {} to branch {}{}",
        record.file_name,
        record.amount,
        record.branch,
        record
            .commodity
            .as_ref()
            .map(|c| format!(" and commodity {}", c))
            .unwrap_or_default()
    );
    Ok(())
}

fn staged_total(table: &DefinitionTable, code: &str, amount: Amount) -> Result<Amount> {
    let current = table.total(code).ok_or_else(|| SalesError::Unexpected {
        detail: format!("{} code {} is not defined", table.kind(), code),
    })?;

    current.checked_accumulate(amount).ok_or_else(|| {
        warn!(
            "Total for {} would reach the {}-digit ceiling ({} + {})",
            code,
            Amount::MAX_DIGITS,
            current,
            amount
        );
        SalesError::AmountOverflow {
            code: code.to_string(),
            total: (u128::from(current.value()) + u128::from(amount.value())).to_string(),
        }
    })
}

/// Reads, validates and accumulates one record file.
pub fn process(
    file: &RecordFile,
    branches: &mut DefinitionTable,
    mut commodities: Option<&mut DefinitionTable>,
) -> Result<SalesRecord> {
    let record =
        RawRecord::read(file, commodities.is_some())?.validate(branches, commodities.as_deref())?;
    accumulate(&record, branches, commodities.as_deref_mut())?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefinitionKind;
    use crate::error::ErrorKind;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn branch_table() -> DefinitionTable {
        let mut table = DefinitionTable::new(DefinitionKind::Branch);
        table.define("001", "Tokyo");
        table.define("002", "Osaka");
        table
    }

    fn commodity_table() -> DefinitionTable {
        let mut table = DefinitionTable::new(DefinitionKind::Commodity);
        table.define("SFT00001", "OS");
        table
    }

    fn raw(text: &str, with_commodity: bool) -> RawRecord {
        RawRecord::parse("00000001.rcd", lines(text), with_commodity).unwrap()
    }

    fn branch_record(code: &str, amount: u64) -> SalesRecord {
        SalesRecord {
            file_name: "00000001.rcd".to_string(),
            branch: code.to_string(),
            commodity: None,
            amount: Amount::new(amount),
        }
    }

    #[test]
    fn test_parse_branch_layout() {
        let record = raw("001\n100\n", false);
        assert_eq!(record.branch, "001");
        assert_eq!(record.commodity, None);
        assert_eq!(record.amount_text, "100");

        let record = record.validate(&branch_table(), None).unwrap();
        assert_eq!(record, branch_record("001", 100));
    }

    #[test]
    fn test_parse_full_layout() {
        let record = raw("001\nSFT00001\n2500\n", true)
            .validate(&branch_table(), Some(&commodity_table()))
            .unwrap();
        assert_eq!(record.commodity.as_deref(), Some("SFT00001"));
        assert_eq!(record.amount, Amount::new(2500));
    }

    #[test]
    fn test_parse_wrong_line_count() {
        let err = RawRecord::parse("00000004.rcd", lines("001\nSFT00001\n1\n2\n"), true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordFormatError);
        assert!(err.to_string().contains("00000004.rcd"));

        let err = RawRecord::parse("00000004.rcd", lines("001\nSFT00001\n1\n"), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordFormatError);
    }

    #[test]
    fn test_parse_leaves_amount_unchecked() {
        let record = raw("999\n12a\n", false);
        assert_eq!(record.amount_text, "12a");
    }

    #[test]
    fn test_malformed_amount_is_unknown_error() {
        for text in ["001\n-100\n", "001\n1.5\n", "001\n 100\n", "001\n\n"] {
            let err = raw(text, false).validate(&branch_table(), None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownError, "{:?}", text);
        }
    }

    #[test]
    fn test_validate_unknown_codes() {
        let branches = branch_table();
        let commodities = commodity_table();

        let err = raw("999\n1\n", false).validate(&branches, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownBranchCode);

        let err = raw("001\nXXX00000\n1\n", true)
            .validate(&branches, Some(&commodities))
            .unwrap_err();
        assert!(matches!(
            err,
            SalesError::UnknownCommodityCode { ref code, .. } if code == "XXX00000"
        ));
    }

    #[test]
    fn test_unknown_branch_reported_before_malformed_amount() {
        let err = raw("999\nSFT00001\n12a\n", true)
            .validate(&branch_table(), Some(&commodity_table()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownBranchCode);
    }

    #[test]
    fn test_unknown_commodity_reported_before_out_of_range_amount() {
        let err = raw("001\nXXX99999\n99999999999999999999999\n", true)
            .validate(&branch_table(), Some(&commodity_table()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommodityCode);
    }

    #[test]
    fn test_out_of_range_amount_is_overflow() {
        let err = raw("001\n99999999999999999999999\n", false)
            .validate(&branch_table(), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmountOverflow);
    }

    #[test]
    fn test_read_lines_terminators() {
        let read = |text: &str| read_lines(text.as_bytes()).unwrap();

        assert_eq!(read("001\n100\n"), ["001", "100"]);
        assert_eq!(read("001\r\n100\r\n"), ["001", "100"]);
        assert_eq!(read("001\r100\r"), ["001", "100"]);
        assert_eq!(read("001\n100"), ["001", "100"]);
        assert_eq!(read("001\n100\n\n"), ["001", "100", ""]);
        assert_eq!(read("001\r\r\n100"), ["001", "", "100"]);
        assert!(read("").is_empty());
    }

    #[test]
    fn test_accumulate_sums_per_code() {
        let mut branches = branch_table();
        accumulate(&branch_record("001", 100), &mut branches, None).unwrap();
        accumulate(&branch_record("001", 50), &mut branches, None).unwrap();

        assert_eq!(branches.total("001"), Some(Amount::new(150)));
        assert_eq!(branches.total("002"), Some(Amount::ZERO));
    }

    #[test]
    fn test_accumulate_at_ceiling_boundary() {
        let mut branches = branch_table();
        branches.commit("001", Amount::new(9_999_999_998));
        accumulate(&branch_record("001", 1), &mut branches, None).unwrap();
        assert_eq!(branches.total("001"), Some(Amount::new(9_999_999_999)));

        let err = accumulate(&branch_record("001", 1), &mut branches, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmountOverflow);
        assert_eq!(branches.total("001"), Some(Amount::new(9_999_999_999)));
    }

    #[test]
    fn test_commodity_overflow_commits_nothing() {
        let mut branches = branch_table();
        let mut commodities = commodity_table();
        commodities.commit("SFT00001", Amount::new(9_999_999_990));

        let record = SalesRecord {
            commodity: Some("SFT00001".to_string()),
            ..branch_record("001", 10)
        };
        let err = accumulate(&record, &mut branches, Some(&mut commodities)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AmountOverflow);
        assert_eq!(branches.total("001"), Some(Amount::ZERO));
        assert_eq!(commodities.total("SFT00001"), Some(Amount::new(9_999_999_990)));
    }
}
