//! Two-state wall-clock timer for the measurement phases
//!
//! Calling a transition from the wrong state is a programmer error and
//! panics; the harness never recovers from a mis-sequenced measurement.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Started,
    Stopped,
}

/// Measures one interval between `start` and `stop`
#[derive(Debug)]
pub struct Timer {
    state: State,
    start: Instant,
    elapsed: Duration,
}

impl Timer {
    /// Creates a stopped timer with zero elapsed time
    pub fn new() -> Self {
        Self {
            state: State::Stopped,
            start: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Starts the measurement
    ///
    /// # Panics
    ///
    /// Panics if the timer is already started.
    pub fn start(&mut self) {
        assert!(
            self.state == State::Stopped,
            "timer must be stopped before it can be started"
        );

        self.start = Instant::now();
        self.state = State::Started;
    }

    /// Stops the measurement
    ///
    /// # Panics
    ///
    /// Panics if the timer is not started.
    pub fn stop(&mut self) {
        assert!(
            self.state == State::Started,
            "timer must be started before it can be stopped"
        );

        self.elapsed = self.start.elapsed();
        self.state = State::Stopped;
    }

    /// Returns the last measured interval
    ///
    /// # Panics
    ///
    /// Panics if the timer is still running.
    pub fn elapsed(&self) -> Duration {
        assert!(
            self.state == State::Stopped,
            "timer must be stopped before reading the elapsed time"
        );

        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measures_a_positive_interval() {
        let mut timer = Timer::new();

        timer.start();
        std::thread::sleep(Duration::from_millis(5));
        timer.stop();

        assert!(timer.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_fresh_timer_reports_zero() {
        let timer = Timer::new();
        assert_eq!(timer.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_restart_measures_a_new_interval() {
        let mut timer = Timer::new();

        timer.start();
        timer.stop();
        let first = timer.elapsed();

        timer.start();
        std::thread::sleep(Duration::from_millis(5));
        timer.stop();

        assert!(timer.elapsed() >= first);
    }

    #[test]
    #[should_panic(expected = "timer must be stopped")]
    fn test_double_start_panics() {
        let mut timer = Timer::new();
        timer.start();
        timer.start();
    }

    #[test]
    #[should_panic(expected = "timer must be started")]
    fn test_stop_without_start_panics() {
        let mut timer = Timer::new();
        timer.stop();
    }

    #[test]
    #[should_panic(expected = "timer must be stopped")]
    fn test_elapsed_while_running_panics() {
        let mut timer = Timer::new();
        timer.start();
        let _ = timer.elapsed();
    }
}
