//! Run orchestration.
//!
//! A run moves through the stages below in order and stops at the first
//! error. No output file is created until every record has been aggregated.

use crate::config::Config;
use crate::definition::DefinitionTable;
use crate::error::{ErrorKind, Result, SalesError};
use crate::locator::{self, RecordFile};
use crate::record;
use crate::summary::write_summary_file;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline progress, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    DefinitionsLoaded,
    FilesDiscovered,
    FilesVerifiedSequential,
    RecordsAggregated,
    SummariesWritten,
    Aborted(ErrorKind),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Start => f.write_str("start"),
            Stage::DefinitionsLoaded => f.write_str("definitions loaded"),
            Stage::FilesDiscovered => f.write_str("files discovered"),
            Stage::FilesVerifiedSequential => f.write_str("files verified sequential"),
            Stage::RecordsAggregated => f.write_str("records aggregated"),
            Stage::SummariesWritten => f.write_str("summaries written"),
            Stage::Aborted(kind) => write!(f, "aborted ({:?})", kind),
        }
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records_processed: usize,
    pub outputs: Vec<PathBuf>,
}

/// The sales aggregation pipeline.
///
/// Owns the definition tables for the duration of one run and lends them to
/// the record processor one record at a time.
#[derive(Debug)]
pub struct SalesPipeline {
    config: Config,
    stage: Stage,
    branches: Option<DefinitionTable>,
    commodities: Option<DefinitionTable>,
}

impl SalesPipeline {
    /// Creates a pipeline that has not loaded anything yet.
    pub fn new(config: Config) -> Self {
        SalesPipeline {
            config,
            stage: Stage::Start,
            branches: None,
            commodities: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The branch table, once loaded.
    pub fn branches(&self) -> Option<&DefinitionTable> {
        self.branches.as_ref()
    }

    /// The commodity table, once loaded and if commodity tracking is enabled.
    pub fn commodities(&self) -> Option<&DefinitionTable> {
        self.commodities.as_ref()
    }

    /// Runs every stage against `dir`.
    pub fn run(&mut self, dir: &Path) -> Result<RunSummary> {
        let result = self.run_stages(dir);
        if let Err(e) = &result {
            warn!("Run aborted after stage '{}': {}", self.stage, e);
            self.stage = Stage::Aborted(e.kind());
        }
        result
    }

    fn run_stages(&mut self, dir: &Path) -> Result<RunSummary> {
        self.load_definitions(dir)?;
        let files = self.discover(dir)?;
        self.aggregate(&files)?;
        let outputs = self.write_summaries(dir)?;

        Ok(RunSummary {
            records_processed: files.len(),
            outputs,
        })
    }

    /// Loads the branch table and, if configured, the commodity table.
    pub fn load_definitions(&mut self, dir: &Path) -> Result<()> {
        let branches = DefinitionTable::load(dir, &self.config.branch)?;
        let commodities = match &self.config.commodity {
            Some(source) => Some(DefinitionTable::load(dir, source)?),
            None => None,
        };

        self.branches = Some(branches);
        self.commodities = commodities;
        self.advance(Stage::DefinitionsLoaded);
        Ok(())
    }

    /// Finds the record files and checks their numbering.
    pub fn discover(&mut self, dir: &Path) -> Result<Vec<RecordFile>> {
        let files = locator::list_record_files(dir, &self.config)?;
        self.advance(Stage::FilesDiscovered);
        locator::verify_sequential(&files)?;
        self.advance(Stage::FilesVerifiedSequential);
        Ok(files)
    }

    /// Validates and accumulates every record file, in order.
    pub fn aggregate(&mut self, files: &[RecordFile]) -> Result<()> {
        let branches = self.branches.as_mut().ok_or_else(not_loaded)?;
        for file in files {
            let record = record::process(file, branches, self.commodities.as_mut())?;
            debug!("Processed {} ({})", file.file_name, record.amount);
        }

        self.advance(Stage::RecordsAggregated);
        Ok(())
    }

    /// Writes the branch summary, then the commodity summary.
    pub fn write_summaries(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        let branches = self.branches.as_ref().ok_or_else(not_loaded)?;
        let mut outputs = vec![write_summary_file(
            dir,
            &self.config.branch.summary_file_name,
            branches,
        )?];

        if let (Some(source), Some(table)) = (&self.config.commodity, &self.commodities) {
            outputs.push(write_summary_file(dir, &source.summary_file_name, table)?);
        }

        self.advance(Stage::SummariesWritten);
        Ok(outputs)
    }

    fn advance(&mut self, stage: Stage) {
        info!("Stage: {}", stage);
        self.stage = stage;
    }
}

fn not_loaded() -> SalesError {
    SalesError::Unexpected {
        detail: "definitions have not been loaded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use std::fs;
    use tempfile::TempDir;

    fn write_files(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    #[test]
    fn test_branch_only_run() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("branch.lst", "001,Tokyo\n002,Osaka\n"),
                ("00000001.rcd", "001\n100\n"),
            ],
        );

        let mut pipeline = SalesPipeline::new(Config::branch_only().unwrap());
        let summary = pipeline.run(dir.path()).unwrap();

        assert_eq!(summary.records_processed, 1);
        assert_eq!(summary.outputs, [dir.path().join("branch.out")]);
        assert_eq!(pipeline.stage(), Stage::SummariesWritten);

        let output = fs::read_to_string(dir.path().join("branch.out")).unwrap();
        assert!(output.contains("001,Tokyo,100"));
        assert!(output.contains("002,Osaka,0"));
        assert!(!dir.path().join("commodity.out").exists());
    }

    #[test]
    fn test_full_run_updates_both_tables() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("branch.lst", "001,Tokyo\n"),
                ("commodity.lst", "SFT00001,OS\nSFT00002,Office\n"),
                ("00000001.rcd", "001\nSFT00001\n100\n"),
                ("00000002.rcd", "001\nSFT00002\n50\n"),
            ],
        );

        let mut pipeline = SalesPipeline::new(Config::full().unwrap());
        pipeline.run(dir.path()).unwrap();

        assert_eq!(
            pipeline.branches().unwrap().total("001"),
            Some(Amount::new(150))
        );
        let commodities = pipeline.commodities().unwrap();
        assert_eq!(commodities.total("SFT00001"), Some(Amount::new(100)));
        assert_eq!(commodities.total("SFT00002"), Some(Amount::new(50)));
    }

    #[test]
    fn test_failed_record_stops_run_before_output() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("branch.lst", "001,Tokyo\n"),
                ("00000001.rcd", "001\n100\n"),
                ("00000002.rcd", "001\n1\n2\n3\n"),
                ("00000003.rcd", "001\n100\n"),
            ],
        );

        let mut pipeline = SalesPipeline::new(Config::branch_only().unwrap());
        let err = pipeline.run(dir.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RecordFormatError);
        assert!(err.to_string().contains("00000002.rcd"));
        assert_eq!(
            pipeline.stage(),
            Stage::Aborted(ErrorKind::RecordFormatError)
        );
        assert_eq!(
            pipeline.branches().unwrap().total("001"),
            Some(Amount::new(100))
        );
        assert!(!dir.path().join("branch.out").exists());
    }

    #[test]
    fn test_aggregate_requires_definitions() {
        let mut pipeline = SalesPipeline::new(Config::branch_only().unwrap());
        let err = pipeline.aggregate(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownError);
    }
}
