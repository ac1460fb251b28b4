//! Frame-amortized loop scheduling
//!
//! Spreads a bounded integer loop over several host frames instead of running
//! it in one blocking pass. The host owns a [`FrameScheduler`] and calls
//! [`FrameScheduler::tick`] once per frame; every active loop then runs one
//! slice and suspends at its next hold point.
//!
//! Two pacing strategies are available:
//! - **Exact steps**: the iterations are split into a fixed number of slices,
//!   one slice per frame.
//! - **Timed steps**: each slice runs until a wall-clock budget is exceeded.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//! use uniprep::scheduler::FrameScheduler;
//!
//! let mut scheduler = FrameScheduler::new();
//! scheduler
//!     .in_exact_steps(0, 1_000, 10, |i| { let _ = i * 2; }, |_| {}, || println!("done"))
//!     .unwrap();
//!
//! while scheduler.tick(Duration::from_millis(16)) > 0 {}
//! ```

mod scheduled_loop;

use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::config::SchedulerConfig;
use crate::foundation::time::Stopwatch;
use scheduled_loop::{Pacing, ScheduledLoop};

new_key_type! {
    /// Handle to a loop hosted by a [`FrameScheduler`]
    pub struct LoopHandle;
}

/// Errors returned when scheduling a loop
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// A fixed-step loop needs at least one quantum
    #[error("a fixed-step loop needs at least one quantum")]
    ZeroQuanta,
}

/// Host for every gradually executed loop
pub struct FrameScheduler {
    loops: SlotMap<LoopHandle, ScheduledLoop>,
    config: SchedulerConfig,
    frame: u64,
    elapsed: Duration,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Create a scheduler with default settings
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with explicit settings
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            loops: SlotMap::with_key(),
            config,
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Run `body(i)` for `i` in `start..end` spread over `quanta` frames
    ///
    /// The direction follows the sign of `end - start`, and `body(end)` is never
    /// called. The first iteration of every slice is followed by `on_hold(i)`
    /// and a suspension until the next tick; slice sizes differ by at most one.
    /// `on_done` runs once after the final iteration.
    ///
    /// Asking for more quanta than iterations clamps the quantum count to the
    /// iteration count, so every iteration gets its own frame.
    pub fn in_exact_steps(
        &mut self,
        start: i64,
        end: i64,
        quanta: u32,
        body: impl FnMut(i64) + 'static,
        on_hold: impl FnMut(i64) + 'static,
        on_done: impl FnOnce() + 'static,
    ) -> Result<LoopHandle, SchedulerError> {
        if quanta == 0 {
            return Err(SchedulerError::ZeroQuanta);
        }

        let iterations = start.abs_diff(end);
        let mut quanta = u64::from(quanta);
        if iterations < quanta {
            if self.config.warn_on_clamped_quanta {
                log::warn!(
                    "Loop {}..{} has {} iterations but {} quanta were requested, clamping",
                    start,
                    end,
                    iterations,
                    quanta
                );
            }
            quanta = iterations.max(1);
        }

        let pacing = Pacing::Exact {
            iterations,
            quanta,
            next_hold: 0,
        };
        Ok(self.schedule(start, end, pacing, body, on_hold, on_done))
    }

    /// Run `body(i)` for `i` in `start..end`, holding whenever a slice exceeds `budget`
    ///
    /// The stopwatch restarts at the beginning of every slice. After each body
    /// call whose slice has run strictly longer than `budget`, `on_hold(i)` is
    /// called and the loop suspends until the next tick.
    pub fn in_timed_steps(
        &mut self,
        start: i64,
        end: i64,
        budget: Duration,
        body: impl FnMut(i64) + 'static,
        on_hold: impl FnMut(i64) + 'static,
        on_done: impl FnOnce() + 'static,
    ) -> LoopHandle {
        let pacing = Pacing::Timed {
            budget,
            stopwatch: Stopwatch::new(),
        };
        self.schedule(start, end, pacing, body, on_hold, on_done)
    }

    fn schedule(
        &mut self,
        start: i64,
        end: i64,
        pacing: Pacing,
        body: impl FnMut(i64) + 'static,
        on_hold: impl FnMut(i64) + 'static,
        on_done: impl FnOnce() + 'static,
    ) -> LoopHandle {
        let scheduled = ScheduledLoop::new(
            start,
            end,
            pacing,
            Box::new(body),
            Box::new(on_hold),
            Box::new(on_done),
        );
        let handle = self.loops.insert(scheduled);
        log::debug!("Scheduled loop {:?} over {}..{}", handle, start, end);
        handle
    }

    /// Advance every active loop by one slice
    ///
    /// Call once per host frame with the frame's duration. Returns the number of
    /// loops still active afterward.
    pub fn tick(&mut self, quantum: Duration) -> usize {
        self.frame += 1;
        self.elapsed += quantum;

        let mut finished = Vec::new();
        for (handle, scheduled) in &mut self.loops {
            if scheduled.run_slice() {
                finished.push(handle);
            }
        }

        for handle in finished {
            self.loops.remove(handle);
            log::debug!("Loop {:?} finished on frame {}", handle, self.frame);
        }

        self.loops.len()
    }

    /// Drop a loop without calling its completion handler
    ///
    /// Returns `false` when the loop already finished or was never scheduled here.
    pub fn cancel(&mut self, handle: LoopHandle) -> bool {
        self.loops.remove(handle).is_some()
    }

    /// Whether the loop is still waiting for more ticks
    pub fn is_active(&self, handle: LoopHandle) -> bool {
        self.loops.contains_key(handle)
    }

    /// Index the loop will run next, if it is still active
    pub fn current_index(&self, handle: LoopHandle) -> Option<i64> {
        self.loops.get(handle).map(ScheduledLoop::current_index)
    }

    /// Number of active loops
    pub fn active_count(&self) -> usize {
        self.loops.len()
    }

    /// Number of ticks processed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sum of all quantum durations passed to [`tick`](Self::tick)
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Body(i64),
        Hold(i64),
        Done,
    }

    type Journal = Rc<RefCell<Vec<Call>>>;

    const FRAME: Duration = Duration::from_millis(16);

    fn exact(scheduler: &mut FrameScheduler, start: i64, end: i64, quanta: u32) -> (LoopHandle, Journal) {
        let journal: Journal = Rc::default();
        let (body_log, hold_log, done_log) = (journal.clone(), journal.clone(), journal.clone());
        let handle = scheduler
            .in_exact_steps(
                start,
                end,
                quanta,
                move |i| body_log.borrow_mut().push(Call::Body(i)),
                move |i| hold_log.borrow_mut().push(Call::Hold(i)),
                move || done_log.borrow_mut().push(Call::Done),
            )
            .unwrap();
        (handle, journal)
    }

    fn run_to_completion(scheduler: &mut FrameScheduler) -> u64 {
        let mut ticks = 0;
        while scheduler.active_count() > 0 {
            scheduler.tick(FRAME);
            ticks += 1;
            assert!(ticks < 10_000, "loop never finished");
        }
        ticks
    }

    fn count(journal: &Journal, predicate: impl Fn(&Call) -> bool) -> usize {
        journal.borrow().iter().filter(|call| predicate(call)).count()
    }

    fn holds(journal: &Journal) -> Vec<i64> {
        journal
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Hold(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_exact_steps_even_split() {
        let mut scheduler = FrameScheduler::new();
        let (_, journal) = exact(&mut scheduler, 0, 10, 5);

        let ticks = run_to_completion(&mut scheduler);

        assert_eq!(count(&journal, |c| matches!(c, Call::Body(_))), 10);
        assert_eq!(holds(&journal), vec![0, 2, 4, 6, 8]);
        assert_eq!(journal.borrow().last(), Some(&Call::Done));
        assert_eq!(count(&journal, |c| *c == Call::Done), 1);
        // Five held slices plus the frame that finishes the tail
        assert_eq!(ticks, 6);
    }

    #[test]
    fn test_exact_steps_one_slice_per_tick() {
        let mut scheduler = FrameScheduler::new();
        let (_, journal) = exact(&mut scheduler, 0, 10, 5);

        scheduler.tick(FRAME);
        assert_eq!(*journal.borrow(), vec![Call::Body(0), Call::Hold(0)]);

        scheduler.tick(FRAME);
        assert_eq!(
            journal.borrow()[2..],
            [Call::Body(1), Call::Body(2), Call::Hold(2)]
        );
    }

    #[test]
    fn test_exact_steps_uneven_split_holds_exactly_quanta() {
        for (iterations, quanta) in [(10_i64, 3_u32), (7, 2), (100, 7), (13, 13)] {
            let mut scheduler = FrameScheduler::new();
            let (_, journal) = exact(&mut scheduler, 0, iterations, quanta);
            run_to_completion(&mut scheduler);

            assert_eq!(count(&journal, |c| matches!(c, Call::Body(_))), iterations as usize);
            assert_eq!(holds(&journal).len(), quanta as usize);
            assert_eq!(count(&journal, |c| *c == Call::Done), 1);
        }
    }

    #[test]
    fn test_exact_steps_descending() {
        let mut scheduler = FrameScheduler::new();
        let (_, journal) = exact(&mut scheduler, 10, 0, 2);
        run_to_completion(&mut scheduler);

        let bodies: Vec<i64> = journal
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Body(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(bodies, (1..=10).rev().collect::<Vec<_>>());
        assert_eq!(holds(&journal), vec![10, 5]);
    }

    #[test]
    fn test_exact_steps_clamps_excess_quanta() {
        let mut scheduler = FrameScheduler::new();
        let (_, journal) = exact(&mut scheduler, 0, 3, 10);
        let ticks = run_to_completion(&mut scheduler);

        assert_eq!(holds(&journal), vec![0, 1, 2]);
        assert_eq!(count(&journal, |c| *c == Call::Done), 1);
        assert_eq!(ticks, 4);
    }

    #[test]
    fn test_exact_steps_rejects_zero_quanta() {
        let mut scheduler = FrameScheduler::new();
        let result = scheduler.in_exact_steps(0, 10, 0, |_| {}, |_| {}, || {});
        assert_eq!(result, Err(SchedulerError::ZeroQuanta));
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_empty_range_finishes_on_first_tick() {
        let mut scheduler = FrameScheduler::new();
        let (handle, journal) = exact(&mut scheduler, 5, 5, 3);
        assert!(scheduler.is_active(handle));

        assert_eq!(scheduler.tick(FRAME), 0);
        assert_eq!(*journal.borrow(), vec![Call::Done]);
        assert!(!scheduler.is_active(handle));
    }

    #[test]
    fn test_nothing_runs_before_first_tick() {
        let mut scheduler = FrameScheduler::new();
        let (handle, journal) = exact(&mut scheduler, 0, 4, 2);
        assert!(journal.borrow().is_empty());
        assert_eq!(scheduler.current_index(handle), Some(0));
    }

    #[test]
    fn test_timed_steps_large_budget_runs_in_one_tick() {
        let mut scheduler = FrameScheduler::new();
        let journal: Journal = Rc::default();
        let (body_log, hold_log, done_log) = (journal.clone(), journal.clone(), journal.clone());
        scheduler.in_timed_steps(
            0,
            1_000,
            Duration::from_secs(3600),
            move |i| body_log.borrow_mut().push(Call::Body(i)),
            move |i| hold_log.borrow_mut().push(Call::Hold(i)),
            move || done_log.borrow_mut().push(Call::Done),
        );

        assert_eq!(scheduler.tick(FRAME), 0);
        assert_eq!(count(&journal, |c| matches!(c, Call::Body(_))), 1_000);
        assert!(holds(&journal).is_empty());
        assert_eq!(journal.borrow().last(), Some(&Call::Done));
    }

    #[test]
    fn test_timed_steps_holds_when_budget_exceeded() {
        let mut scheduler = FrameScheduler::new();
        let journal: Journal = Rc::default();
        let (body_log, hold_log, done_log) = (journal.clone(), journal.clone(), journal.clone());
        scheduler.in_timed_steps(
            0,
            4,
            Duration::from_millis(1),
            move |i| {
                std::thread::sleep(Duration::from_millis(2));
                body_log.borrow_mut().push(Call::Body(i));
            },
            move |i| hold_log.borrow_mut().push(Call::Hold(i)),
            move || done_log.borrow_mut().push(Call::Done),
        );

        let ticks = run_to_completion(&mut scheduler);

        assert_eq!(count(&journal, |c| matches!(c, Call::Body(_))), 4);
        assert_eq!(holds(&journal), vec![0, 1, 2, 3]);
        assert_eq!(count(&journal, |c| *c == Call::Done), 1);
        assert_eq!(ticks, 5);
    }

    #[test]
    fn test_cancel_skips_done() {
        let mut scheduler = FrameScheduler::new();
        let (handle, journal) = exact(&mut scheduler, 0, 10, 5);
        scheduler.tick(FRAME);

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        scheduler.tick(FRAME);

        assert_eq!(count(&journal, |c| *c == Call::Done), 0);
        assert_eq!(count(&journal, |c| matches!(c, Call::Body(_))), 1);
    }

    #[test]
    fn test_loops_share_ticks() {
        let mut scheduler = FrameScheduler::new();
        let (_, first) = exact(&mut scheduler, 0, 4, 4);
        let (_, second) = exact(&mut scheduler, 0, 2, 2);

        assert_eq!(scheduler.tick(FRAME), 2);
        assert_eq!(holds(&first), vec![0]);
        assert_eq!(holds(&second), vec![0]);

        scheduler.tick(FRAME);
        scheduler.tick(FRAME);
        assert_eq!(count(&second, |c| *c == Call::Done), 1);
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(scheduler.frame(), 3);
        assert_eq!(scheduler.elapsed(), FRAME * 3);
    }
}
