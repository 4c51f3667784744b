//! Sales Aggregator CLI
//!
//! Reads `branch.lst`, `commodity.lst` and the `NNNNNNNN.rcd` record files in
//! the given directory and writes `branch.out` and `commodity.out` next to them.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- path/to/sales
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `info` to control logging verbosity
//! - `SALES_BRANCH_ONLY`: When set, ignore commodities and expect two-line records

use log::info;
use sales_aggregator::{Config, Result, SalesError, SalesPipeline};
use std::env;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        return Err(SalesError::MissingArgument);
    }

    let config = if env::var_os("SALES_BRANCH_ONLY").is_some() {
        Config::branch_only()?
    } else {
        Config::full()?
    };

    let mut pipeline = SalesPipeline::new(config);
    let summary = pipeline.run(Path::new(&args[1]))?;
    info!(
        "Aggregated {} record files into {} summaries",
        summary.records_processed,
        summary.outputs.len()
    );

    Ok(())
}
