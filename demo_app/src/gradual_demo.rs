//! Two long loops spread over frames, one by slice count and one by time budget

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;
use uniprep::scheduler::{FrameScheduler, LoopHandle, SchedulerError};

/// Iterations per loop
const ITERATIONS: i64 = 1_000_000;

/// Slices for the fixed-step loop
const QUANTA: u32 = 50;

/// Per-frame budget for the timed loop
const BUDGET: Duration = Duration::from_millis(2);

pub struct GradualDemo {
    exact: LoopHandle,
    timed: LoopHandle,
    frame: Rc<Cell<u64>>,
}

impl GradualDemo {
    /// Schedule both loops; `verbose` logs every iteration of the fixed-step loop
    pub fn start(scheduler: &mut FrameScheduler, verbose: bool) -> Result<Self, SchedulerError> {
        let frame = Rc::new(Cell::new(0));

        let done_frame = Rc::clone(&frame);
        let exact = scheduler.in_exact_steps(
            0,
            ITERATIONS,
            QUANTA,
            move |i| {
                let value = i as f32 * rand::thread_rng().gen::<f32>();
                if verbose {
                    log::trace!("{}", value);
                }
            },
            |_| {},
            move || log::info!("Done 1 after {} frames", done_frame.get()),
        )?;

        let holds = Rc::new(Cell::new(0u32));
        let hold_counter = Rc::clone(&holds);
        let timed = scheduler.in_timed_steps(
            0,
            ITERATIONS,
            BUDGET,
            |i| {
                // Some busy math
                let _ = (i as f32 / 99.9).powf((i + 1) as f32 / 3.3);
            },
            move |j| {
                hold_counter.set(hold_counter.get() + 1);
                log::debug!("Loop on hold at index [{}]", j);
            },
            move || log::info!("Done 2 in {} steps.", holds.get()),
        );

        Ok(Self { exact, timed, frame })
    }

    /// Record the frame number the completion messages report
    pub fn set_frame(&self, frame: u64) {
        self.frame.set(frame);
    }

    /// Whether either loop still has iterations left
    pub fn is_running(&self, scheduler: &FrameScheduler) -> bool {
        scheduler.is_active(self.exact) || scheduler.is_active(self.timed)
    }
}
