//! Workloads driven against a list by every worker thread
//!
//! A workload is a triple of callbacks over `(config, list)`. `prepare` runs
//! before the measured phase (the default restricts itself to worker 0),
//! `work` is the measured phase executed by every worker, and `cleanup` runs
//! after the timer stops. Workers tell themselves apart through
//! [`current_worker_id`].

use std::cell::RefCell;
use std::sync::Arc;

use rand::Rng;

use skipset_core::{Key, OrderedSet};

use crate::config::BenchmarkConfig;
use crate::worker::current_worker_id;

/// One phase of a workload
pub type WorkFn = Arc<dyn Fn(&BenchmarkConfig, &dyn OrderedSet) + Send + Sync>;

thread_local! {
    /// Keys pre-sampled per worker by the mixed workload's prepare phase, so
    /// the measured phase spends no time in the random number generator.
    static SAMPLED_KEYS: RefCell<Vec<Key>> = const { RefCell::new(Vec::new()) };
}

/// The three phases driven by the benchmark harness
#[derive(Clone)]
pub struct Workload {
    pub prepare: WorkFn,
    pub work: WorkFn,
    pub cleanup: WorkFn,
}

fn noop() -> WorkFn {
    Arc::new(|_, _| {})
}

/// Worker 0 fills the list with the initial keys
fn default_prepare() -> WorkFn {
    Arc::new(|config, list| {
        if current_worker_id() == 0 {
            for key in 0..config.initial_number_of_items as Key {
                list.insert(key);
            }
        }
    })
}

/// Worker 0 fills the list with every key the removal phase will target
fn remove_prepare() -> WorkFn {
    Arc::new(|config, list| {
        if current_worker_id() == 0 {
            let total = config.initial_number_of_items
                + config.items_per_thread() * config.number_of_threads;
            for key in 0..total as Key {
                list.insert(key);
            }
        }
    })
}

/// The contiguous key block owned by the calling worker
fn worker_key_range(config: &BenchmarkConfig) -> std::ops::Range<Key> {
    let items = config.items_per_thread();
    let first = (current_worker_id() * items + config.initial_number_of_items) as Key;
    first..first + items as Key
}

impl Workload {
    /// Each worker inserts its own key block in ascending order
    pub fn ascending_insert() -> Self {
        Self {
            prepare: default_prepare(),
            work: Arc::new(|config, list| {
                for key in worker_key_range(config) {
                    list.insert(key);
                }
            }),
            cleanup: noop(),
        }
    }

    /// Each worker inserts its own key block in descending order
    pub fn descending_insert() -> Self {
        Self {
            prepare: default_prepare(),
            work: Arc::new(|config, list| {
                for key in worker_key_range(config).rev() {
                    list.insert(key);
                }
            }),
            cleanup: noop(),
        }
    }

    /// Workers insert interleaved keys with a stride of one block, so
    /// neighbors in the list belong to different workers
    pub fn interleaving_insert() -> Self {
        Self {
            prepare: default_prepare(),
            work: Arc::new(|config, list| {
                let items = config.items_per_thread() as Key;
                let base = (config.initial_number_of_items + current_worker_id()) as Key;
                for index in 0..items {
                    list.insert(base + index * items);
                }
            }),
            cleanup: noop(),
        }
    }

    /// Each worker removes its own pre-inserted key block in ascending order
    pub fn ascending_remove() -> Self {
        Self {
            prepare: remove_prepare(),
            work: Arc::new(|config, list| {
                for key in worker_key_range(config) {
                    list.remove(key);
                }
            }),
            cleanup: noop(),
        }
    }

    /// Each worker removes its own pre-inserted key block in descending order
    pub fn descending_remove() -> Self {
        Self {
            prepare: remove_prepare(),
            work: Arc::new(|config, list| {
                for key in worker_key_range(config).rev() {
                    list.remove(key);
                }
            }),
            cleanup: noop(),
        }
    }

    /// Workers remove interleaved keys with a stride of one block
    pub fn interleaving_remove() -> Self {
        Self {
            prepare: remove_prepare(),
            work: Arc::new(|config, list| {
                let items = config.items_per_thread() as Key;
                let base = (config.initial_number_of_items + current_worker_id()) as Key;
                for index in 0..items {
                    list.remove(base + index * items);
                }
            }),
            cleanup: noop(),
        }
    }

    /// Splits the workers into inserters, removers, and searchers
    ///
    /// The first `ceil(inserting · T)` workers insert, the next block up to
    /// `ceil((inserting + removing) · T)` removes, and the rest search. Every
    /// worker runs over its own pre-sampled keys, drawn uniformly from
    /// `[0, initial + items]`.
    pub fn mixed(inserting: f64, removing: f64) -> Self {
        assert!(inserting >= 0.0);
        assert!(removing >= 0.0);
        assert!(inserting + removing <= 1.0);

        Self {
            prepare: Arc::new(|config, list| {
                if current_worker_id() == 0 {
                    for key in 0..config.initial_number_of_items as Key {
                        list.insert(key);
                    }
                }

                let items = config.items_per_thread();
                let upper = (config.initial_number_of_items + items) as Key;
                let mut rng = rand::thread_rng();
                SAMPLED_KEYS.with(|keys| {
                    let mut keys = keys.borrow_mut();
                    keys.clear();
                    keys.extend((0..items).map(|_| rng.gen_range(0..=upper)));
                });
            }),
            work: Arc::new(move |config, list| {
                let threads = config.number_of_threads as f64;
                let removing_from = (inserting * threads).ceil() as usize;
                let searching_from = ((inserting + removing) * threads).ceil() as usize;
                let worker = current_worker_id();

                SAMPLED_KEYS.with(|keys| {
                    for &key in keys.borrow().iter() {
                        if worker >= searching_from {
                            list.contains(key);
                        } else if worker >= removing_from {
                            list.remove(key);
                        } else {
                            list.insert(key);
                        }
                    }
                });
            }),
            cleanup: noop(),
        }
    }
}
