//! Derived metrics of one benchmark repetition

use std::fmt;
use std::time::Duration;

use skipset_core::SkipListStatistics;

/// Throughput, failure, and retry figures for one repetition
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub repetition: u16,
    /// Wall-clock duration of the measured phase in seconds
    pub total_time: f64,
    /// Operations per second across all categories
    pub total_throughput: f64,
    pub number_of_insertions: usize,
    pub percentage_failed_insert: f64,
    pub average_retries_during_insert: f64,
    pub insert_throughput: f64,
    pub number_of_removals: usize,
    pub percentage_failed_remove: f64,
    pub average_retries_during_remove: f64,
    pub remove_throughput: f64,
    pub number_of_finds: usize,
    pub average_retries_during_find: f64,
    pub find_throughput: f64,
}

impl BenchmarkResult {
    /// Derives the metrics from a measured duration and the merged
    /// statistics of every worker
    pub fn new(repetition: u16, duration: Duration, statistics: &SkipListStatistics) -> Self {
        let total_time = duration.as_secs_f64();
        let throughput = |operations: usize| {
            if total_time > 0.0 {
                operations as f64 / total_time
            } else {
                0.0
            }
        };

        let operations = statistics.number_of_inserts()
            + statistics.number_of_deletions()
            + statistics.number_of_lookups();

        Self {
            repetition,
            total_time,
            total_throughput: throughput(operations),
            number_of_insertions: statistics.number_of_inserts(),
            percentage_failed_insert: statistics.percentage_failed_inserts(),
            average_retries_during_insert: statistics.average_retries_during_insert(),
            insert_throughput: throughput(statistics.number_of_inserts()),
            number_of_removals: statistics.number_of_deletions(),
            percentage_failed_remove: statistics.percentage_failed_deletions(),
            average_retries_during_remove: statistics.average_retries_during_deletion(),
            remove_throughput: throughput(statistics.number_of_deletions()),
            number_of_finds: statistics.number_of_lookups(),
            average_retries_during_find: statistics.average_retries_during_lookup(),
            find_throughput: throughput(statistics.number_of_lookups()),
        }
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "repetition: {}\ntotal time: {} s\ntotal throughput: {} Ops/s\n\
             insertions: {}\nfailed insertions: {} %\n\
             avg. retries during insert: {}\ninsert throughput: {} Ops/s\n\
             removals: {}\nfailed removals: {} %\n\
             avg. retries during remove: {}\nremove throughput: {} Ops/s\n\
             finds: {}\navg. retries during find: {}\nfind throughput: {} Ops/s",
            self.repetition,
            self.total_time,
            self.total_throughput,
            self.number_of_insertions,
            self.percentage_failed_insert * 100.0,
            self.average_retries_during_insert,
            self.insert_throughput,
            self.number_of_removals,
            self.percentage_failed_remove * 100.0,
            self.average_retries_during_remove,
            self.remove_throughput,
            self.number_of_finds,
            self.average_retries_during_find,
            self.find_throughput
        )
    }
}
