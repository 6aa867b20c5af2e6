//! Benchmark driver for the skipset list variants
//!
//! Runs the requested suites (all of them when none are named) and writes
//! one CSV file per suite into the working directory. A CSV write failure is
//! logged and the remaining suites still run.
//!
//! ```text
//! skipset-bench                         # every suite
//! skipset-bench LazySkipList            # one suite
//! skipset-bench LazySkipList LockFreeSkipList
//! ```

mod config;
mod harness;
mod result;
mod suites;
mod timer;
mod worker;
mod workload;

use clap::Parser;
use log::{error, info};

use skipset_core::{Error, Result};

use crate::config::BenchmarkConfig;

const SUITE_NAMES: [&str; 4] = [
    "SequentialSkipList",
    "ConcurrentSkipList",
    "LazySkipList",
    "LockFreeSkipList",
];

/// Benchmarks the skip-list variants and dumps per-repetition CSV results
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Suites to run: SequentialSkipList, ConcurrentSkipList, LazySkipList,
    /// LockFreeSkipList. Runs every suite when empty.
    suites: Vec<String>,
}

fn validate_suite_names(requested: &[String]) -> Result<()> {
    for name in requested {
        if !SUITE_NAMES.contains(&name.as_str()) {
            return Err(Error::InvalidConfiguration(format!(
                "unknown suite name: {name}"
            )));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(invalid) = validate_suite_names(&cli.suites) {
        error!("{invalid}");
        std::process::exit(1);
    }

    let enabled = |name: &str| {
        cli.suites.is_empty() || cli.suites.iter().any(|suite| suite == name)
    };

    let builders: [fn() -> Vec<BenchmarkConfig>; 4] = [
        suites::sequential_suite,
        suites::concurrent_suite,
        suites::lazy_suite,
        suites::lock_free_suite,
    ];

    for (name, build) in SUITE_NAMES.into_iter().zip(builders) {
        if !enabled(name) {
            continue;
        }

        info!("running {name} benchmark");
        let configs = build();
        let results = harness::run_benchmarks(&configs);

        match harness::save_results_as_csv(&configs, &results, name) {
            Ok(file_name) => info!("{name}: results written to {file_name}"),
            Err(write_error) => error!("{name}: saving results failed: {write_error}"),
        }
    }
}
