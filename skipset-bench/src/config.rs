//! Benchmark configuration
//!
//! One configuration fully describes a measured run: the list under test
//! (via a factory so every repetition starts fresh), the workload, the
//! thread count, the item counts, and the scaling mode.

use std::fmt;
use std::sync::Arc;

use skipset_core::OrderedSet;

use crate::workload::Workload;

/// Builds a fresh list for each repetition
pub type ListFactory = Arc<dyn Fn() -> Arc<dyn OrderedSet> + Send + Sync>;

/// How the total amount of work relates to the thread count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaling {
    /// Work per thread is constant; total work grows with the thread count
    Weak,
    /// Total work is constant; work per thread shrinks with the thread count
    Strong,
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scaling::Weak => write!(f, "weak"),
            Scaling::Strong => write!(f, "strong"),
        }
    }
}

/// Everything needed to run and label one benchmark
#[derive(Clone)]
pub struct BenchmarkConfig {
    pub description: String,
    pub repetitions: u16,
    /// Maximum height of the list under test, for the CSV label only
    pub list_height: u16,
    pub number_of_threads: usize,
    /// Items per thread under weak scaling, total items under strong scaling
    pub number_of_items: usize,
    /// Keys inserted before the measured phase begins
    pub initial_number_of_items: usize,
    pub scaling: Scaling,
    pub list_factory: ListFactory,
    pub workload: Workload,
}

impl BenchmarkConfig {
    /// Returns how many operations each worker thread performs
    pub fn items_per_thread(&self) -> usize {
        match self.scaling {
            Scaling::Weak => self.number_of_items,
            Scaling::Strong => self.number_of_items / self.number_of_threads,
        }
    }
}

impl fmt::Display for BenchmarkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "description: {}\nrepetitions: {}\nskip-list height: {}\n\
             number of threads: {}\nnumber of items: {}\n\
             initial number of items: {}\nscaling mode: {}",
            self.description,
            self.repetitions,
            self.list_height,
            self.number_of_threads,
            self.number_of_items,
            self.initial_number_of_items,
            self.scaling
        )
    }
}
