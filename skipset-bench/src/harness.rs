//! Benchmark execution and CSV emission
//!
//! One benchmark spawns the configured worker pool once and runs every
//! repetition inside it. Worker 0 owns the setup steps (fresh list, timer);
//! barriers of pool width align the phase transitions across workers:
//!
//! 1. worker 0 builds a fresh list through the factory
//! 2. `prepare` runs (the default restricts itself to worker 0)
//! 3. every worker resets its thread-local statistics
//! 4. barrier, worker 0 starts the timer
//! 5. every worker runs `work`
//! 6. barrier, worker 0 stops the timer
//! 7. every worker merges its statistics into the repetition's aggregate
//! 8. `cleanup` runs, barrier, next repetition

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use chrono::Local;
use log::{debug, info};
use parking_lot::Mutex;

use skipset_core::{OrderedSet, Result, SkipListStatistics};

use crate::config::BenchmarkConfig;
use crate::result::BenchmarkResult;
use crate::timer::Timer;
use crate::worker::{current_worker_id, parallel};

/// Runs every repetition of one configuration and derives its metrics
pub fn run_benchmark(config: &BenchmarkConfig) -> Vec<BenchmarkResult> {
    assert!(config.number_of_threads >= 1);
    debug!("{config}");

    let repetitions = config.repetitions as usize;
    let shared_list: Mutex<Option<Arc<dyn OrderedSet>>> = Mutex::new(None);
    let durations = Mutex::new(vec![Duration::ZERO; repetitions]);
    let aggregates = Mutex::new(vec![SkipListStatistics::new(); repetitions]);
    let barrier = Barrier::new(config.number_of_threads);

    parallel(config.number_of_threads, || {
        for repetition in 0..repetitions {
            if current_worker_id() == 0 {
                *shared_list.lock() = Some((config.list_factory)());
            }
            barrier.wait();
            let list = shared_list.lock().clone().expect("worker 0 built the list");

            (config.workload.prepare)(config, list.as_ref());
            barrier.wait();

            SkipListStatistics::with_local(|statistics| statistics.reset());
            let mut timer = Timer::new();

            barrier.wait();
            if current_worker_id() == 0 {
                timer.start();
            }

            (config.workload.work)(config, list.as_ref());

            barrier.wait();
            if current_worker_id() == 0 {
                timer.stop();
                durations.lock()[repetition] = timer.elapsed();
            }

            SkipListStatistics::with_local(|statistics| {
                statistics.merge_into(&mut aggregates.lock()[repetition]);
            });

            (config.workload.cleanup)(config, list.as_ref());
            barrier.wait();
        }
    });

    durations
        .into_inner()
        .into_iter()
        .zip(aggregates.into_inner())
        .enumerate()
        .map(|(repetition, (duration, statistics))| {
            BenchmarkResult::new(repetition as u16, duration, &statistics)
        })
        .collect()
}

/// Runs a list of configurations in order
pub fn run_benchmarks(configs: &[BenchmarkConfig]) -> Vec<Vec<BenchmarkResult>> {
    configs
        .iter()
        .map(|config| {
            info!(
                "benchmark '{}': height {}, {} thread(s)",
                config.description, config.list_height, config.number_of_threads
            );
            run_benchmark(config)
        })
        .collect()
}

/// Writes one semicolon-separated row per repetition and returns the
/// filename
///
/// The filename carries the given prefix, the hostname, and a local
/// timestamp. There is no header row.
pub fn save_results_as_csv(
    configs: &[BenchmarkConfig],
    results: &[Vec<BenchmarkResult>],
    file_name_prefix: &str,
) -> Result<String> {
    let host = hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    let timestamp = Local::now().format("%Y-%m-%d_%H:%M:%S");
    let file_name = format!("{file_name_prefix}_{host}_{timestamp}.csv");

    let mut writer = BufWriter::new(File::create(&file_name)?);
    for (config, repetitions) in configs.iter().zip(results) {
        for result in repetitions {
            writeln!(writer, "{}", csv_row(config, result))?;
        }
    }
    writer.flush()?;

    Ok(file_name)
}

/// Configuration columns followed by the repetition's metrics
fn csv_row(config: &BenchmarkConfig, result: &BenchmarkResult) -> String {
    format!(
        "{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{};{}",
        config.description,
        config.list_height,
        config.number_of_threads,
        config.number_of_items,
        config.initial_number_of_items,
        config.scaling,
        result.repetition,
        result.total_time,
        result.total_throughput,
        result.number_of_insertions,
        result.percentage_failed_insert,
        result.average_retries_during_insert,
        result.insert_throughput,
        result.number_of_removals,
        result.percentage_failed_remove,
        result.average_retries_during_remove,
        result.remove_throughput,
        result.number_of_finds,
        result.average_retries_during_find,
        result.find_throughput,
    )
}
