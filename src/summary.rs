//! Summary output (`branch.out`, `commodity.out`).

use crate::amount::Amount;
use crate::definition::DefinitionTable;
use crate::error::{Result, SalesError};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One `code,name,total` output line.
#[derive(Debug, Serialize)]
pub struct SummaryRow<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub total: Amount,
}

/// Writes one line per defined code, sorted by code.
///
/// No header, no quoting, `\n` line terminator.
pub fn write_summary<W: Write>(writer: W, table: &DefinitionTable) -> csv::Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    for (code, definition) in table.sorted_entries() {
        csv_writer.serialize(SummaryRow {
            code,
            name: &definition.name,
            total: definition.total,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Creates or truncates `dir/file_name` and writes the summary into it.
///
/// Output already flushed before a failure is left in place.
pub fn write_summary_file(
    dir: &Path,
    file_name: &str,
    table: &DefinitionTable,
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let to_write_error = |source: csv::Error| SalesError::Write {
        file: file_name.to_string(),
        source,
    };

    let file = File::create(&path).map_err(|e| to_write_error(e.into()))?;
    write_summary(file, table).map_err(to_write_error)?;
    Ok(path)
}
