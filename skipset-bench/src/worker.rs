//! Worker pool with stable per-thread ids
//!
//! Workloads address threads by an id in `0..number_of_threads` rather than
//! by handle, so the id is stashed in a thread-local at spawn time and read
//! back wherever the workload needs it.

use std::cell::Cell;
use std::thread;

thread_local! {
    static WORKER_ID: Cell<usize> = const { Cell::new(0) };
}

/// Returns the id assigned to the calling worker
///
/// Threads outside a [`parallel`] pool report id 0.
pub fn current_worker_id() -> usize {
    WORKER_ID.with(Cell::get)
}

/// Runs `work` on `number_of_threads` workers and waits for all of them
///
/// Worker ids are assigned densely from 0.
pub fn parallel<F>(number_of_threads: usize, work: F)
where
    F: Fn() + Send + Sync,
{
    assert!(
        number_of_threads >= 1,
        "at least one worker thread is required"
    );

    thread::scope(|scope| {
        for worker_id in 0..number_of_threads {
            let work = &work;
            scope.spawn(move || {
                WORKER_ID.with(|id| id.set(worker_id));
                work();
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_every_worker_gets_a_distinct_id() {
        let seen = Mutex::new(Vec::new());

        parallel(8, || {
            seen.lock().unwrap().push(current_worker_id());
        });

        let mut ids = seen.into_inner().unwrap();
        ids.sort_unstable();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_workers_run_to_completion() {
        let executed = AtomicUsize::new(0);

        parallel(4, || {
            executed.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(executed.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_id_outside_a_pool_is_zero() {
        assert_eq!(current_worker_id(), 0);
    }
}
