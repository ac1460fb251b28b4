//! Time measurement for quantum budgets and frame pacing

use std::time::{Duration, Instant};

/// Frame clock for hosts that drive `tick` from a real-time loop
///
/// Each call to [`FrameClock::advance`] measures the time since the previous
/// call, which is the quantum duration handed to the schedulers.
pub struct FrameClock {
    last_frame: Instant,
    delta: Duration,
    total: Duration,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            total: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Close the current frame and return its duration
    pub fn advance(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_frame);
        self.total += self.delta;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta
    }

    /// Duration of the last completed frame
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Accumulated duration of all completed frames
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Number of completed frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Simple stopwatch for measuring elapsed time
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch (no-op while already running)
    pub fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Reset the stopwatch to zero
    pub fn reset(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    /// Restart the stopwatch (reset and start)
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let running = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + running
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stopwatch_accumulates_across_stops() {
        let mut stopwatch = Stopwatch::start_new();
        thread::sleep(Duration::from_millis(2));
        stopwatch.stop();
        let first = stopwatch.elapsed();
        assert!(first >= Duration::from_millis(2));
        assert!(!stopwatch.is_running());

        stopwatch.start();
        thread::sleep(Duration::from_millis(2));
        assert!(stopwatch.elapsed() >= first + Duration::from_millis(2));
    }

    #[test]
    fn test_stopwatch_restart() {
        let mut stopwatch = Stopwatch::start_new();
        thread::sleep(Duration::from_millis(5));
        stopwatch.restart();
        assert!(stopwatch.is_running());
        assert!(stopwatch.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn test_frame_clock_counts_frames() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(1));
        let delta = clock.advance();
        clock.advance();
        assert!(delta >= Duration::from_millis(1));
        assert_eq!(clock.frame_count(), 2);
        assert!(clock.total() >= delta);
    }
}
