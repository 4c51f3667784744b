//! # Sales Aggregator
//!
//! Validates a directory of daily sales record files against branch and
//! commodity definition files, then writes per-code totals.
//!
//! ## Design Principles
//!
//! - **All or nothing**: the first validation failure aborts the run before
//!   any output file is created
//! - **Sequential numbering**: record files must be numbered without gaps
//! - **10-digit ceiling**: every running total stays below 10,000,000,000
//! - **Deterministic output**: summary lines sorted by code
//!
//! ## Example
//!
//! ```no_run
//! use sales_aggregator::{Config, SalesPipeline};
//! use std::path::Path;
//!
//! let mut pipeline = SalesPipeline::new(Config::full().unwrap());
//! pipeline.run(Path::new("sales")).unwrap();
//! ```

pub mod amount;
pub mod config;
pub mod definition;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod record;
pub mod summary;

pub use amount::Amount;
pub use config::{Config, DefinitionKind, DefinitionSource};
pub use definition::{Definition, DefinitionTable};
pub use error::{ErrorKind, Result, SalesError};
pub use locator::RecordFile;
pub use pipeline::{RunSummary, SalesPipeline, Stage};
pub use record::{RawRecord, SalesRecord};
