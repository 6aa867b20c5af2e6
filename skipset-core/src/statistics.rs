//! Per-thread operation counters for the skip-list implementations
//!
//! Every list operation records its start, its retries, and its outcome into
//! a thread-local [`SkipListStatistics`] instance. The benchmark harness
//! resets the thread-local counters before a measurement phase and merges
//! them into a shared aggregate afterwards; merging sums the counters and
//! keeps the maxima.

use std::cell::RefCell;

thread_local! {
    static LOCAL_STATISTICS: RefCell<SkipListStatistics> =
        RefCell::new(SkipListStatistics::new());
}

/// Counters for insertions, deletions, and lookups performed by one thread
///
/// Retries are tracked twice: a running total (for averages) and a per
/// operation counter that feeds the observed maximum number of retries a
/// single operation needed.
#[derive(Debug, Clone, Default)]
pub struct SkipListStatistics {
    insertions: usize,
    insertion_retries: usize,
    max_retries_during_insert: usize,
    failed_insertions: usize,
    successful_insertions: usize,
    insertion_retry_counter: usize,

    deletions: usize,
    deletion_retries: usize,
    max_retries_during_deletion: usize,
    failed_deletions: usize,
    successful_deletions: usize,
    deletion_retry_counter: usize,

    lookups: usize,
    lookup_retries: usize,
    max_retries_during_lookup: usize,
    lookup_retry_counter: usize,
}

impl SkipListStatistics {
    /// Creates a zeroed counter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every counter to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Runs `f` with the calling thread's statistics instance
    pub fn with_local<F, R>(f: F) -> R
    where
        F: FnOnce(&mut SkipListStatistics) -> R,
    {
        LOCAL_STATISTICS.with(|statistics| f(&mut statistics.borrow_mut()))
    }

    pub fn insertion_start(&mut self) {
        self.insertions += 1;
        self.insertion_retry_counter = 0;
    }

    pub fn insertion_retry(&mut self) {
        self.insertion_retries += 1;
        self.insertion_retry_counter += 1;
    }

    pub fn insertion_failure(&mut self) {
        self.failed_insertions += 1;
        self.max_retries_during_insert = self
            .max_retries_during_insert
            .max(self.insertion_retry_counter);
    }

    pub fn insertion_success(&mut self) {
        self.successful_insertions += 1;
        self.max_retries_during_insert = self
            .max_retries_during_insert
            .max(self.insertion_retry_counter);
    }

    pub fn deletion_start(&mut self) {
        self.deletions += 1;
        self.deletion_retry_counter = 0;
    }

    pub fn deletion_retry(&mut self) {
        self.deletion_retries += 1;
        self.deletion_retry_counter += 1;
    }

    pub fn deletion_failure(&mut self) {
        self.failed_deletions += 1;
        self.max_retries_during_deletion = self
            .max_retries_during_deletion
            .max(self.deletion_retry_counter);
    }

    pub fn deletion_success(&mut self) {
        self.successful_deletions += 1;
        self.max_retries_during_deletion = self
            .max_retries_during_deletion
            .max(self.deletion_retry_counter);
    }

    pub fn lookup_start(&mut self) {
        self.lookups += 1;
        self.lookup_retry_counter = 0;
    }

    pub fn lookup_retry(&mut self) {
        self.lookup_retries += 1;
        self.lookup_retry_counter += 1;
    }

    pub fn lookup_done(&mut self) {
        self.max_retries_during_lookup = self
            .max_retries_during_lookup
            .max(self.lookup_retry_counter);
    }

    /// Adds this thread's counters into `other`, keeping the maxima
    pub fn merge_into(&self, other: &mut SkipListStatistics) {
        other.insertions += self.insertions;
        other.insertion_retries += self.insertion_retries;
        other.max_retries_during_insert = other
            .max_retries_during_insert
            .max(self.max_retries_during_insert);
        other.failed_insertions += self.failed_insertions;
        other.successful_insertions += self.successful_insertions;

        other.deletions += self.deletions;
        other.deletion_retries += self.deletion_retries;
        other.max_retries_during_deletion = other
            .max_retries_during_deletion
            .max(self.max_retries_during_deletion);
        other.failed_deletions += self.failed_deletions;
        other.successful_deletions += self.successful_deletions;

        other.lookups += self.lookups;
        other.lookup_retries += self.lookup_retries;
        other.max_retries_during_lookup = other
            .max_retries_during_lookup
            .max(self.max_retries_during_lookup);
    }

    pub fn number_of_inserts(&self) -> usize {
        self.insertions
    }

    /// Average retries per started insertion, 0.0 when none started
    pub fn average_retries_during_insert(&self) -> f64 {
        ratio(self.insertion_retries, self.insertions)
    }

    pub fn maximum_retries_during_insert(&self) -> usize {
        self.max_retries_during_insert
    }

    /// Fraction of insertions that found the key already present
    pub fn percentage_failed_inserts(&self) -> f64 {
        ratio(
            self.failed_insertions,
            self.failed_insertions + self.successful_insertions,
        )
    }

    pub fn number_of_deletions(&self) -> usize {
        self.deletions
    }

    /// Average retries per started deletion, 0.0 when none started
    pub fn average_retries_during_deletion(&self) -> f64 {
        ratio(self.deletion_retries, self.deletions)
    }

    pub fn maximum_retries_during_deletion(&self) -> usize {
        self.max_retries_during_deletion
    }

    /// Fraction of deletions that found the key absent
    pub fn percentage_failed_deletions(&self) -> f64 {
        ratio(
            self.failed_deletions,
            self.failed_deletions + self.successful_deletions,
        )
    }

    pub fn number_of_lookups(&self) -> usize {
        self.lookups
    }

    /// Average retries per started lookup, 0.0 when none started
    pub fn average_retries_during_lookup(&self) -> f64 {
        ratio(self.lookup_retries, self.lookups)
    }

    pub fn maximum_retries_during_lookup(&self) -> usize {
        self.max_retries_during_lookup
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
