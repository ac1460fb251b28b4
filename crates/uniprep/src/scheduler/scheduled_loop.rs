//! State of a single gradually executed loop

use std::cmp::Ordering;
use std::time::Duration;

use crate::foundation::time::Stopwatch;

type IndexHandler = Box<dyn FnMut(i64)>;
type DoneHandler = Box<dyn FnOnce()>;

/// How a loop decides where to suspend
pub(super) enum Pacing {
    /// Hold after the first iteration of each of `quanta` near-equal slices
    Exact {
        iterations: u64,
        quanta: u64,
        next_hold: u64,
    },
    /// Hold once a slice has run longer than `budget`
    Timed { budget: Duration, stopwatch: Stopwatch },
}

impl Pacing {
    fn begin_slice(&mut self) {
        if let Self::Timed { stopwatch, .. } = self {
            stopwatch.restart();
        }
    }

    /// Decide whether to hold after the iteration at `offset` from the start
    fn should_hold(&mut self, offset: u64) -> bool {
        match self {
            Self::Exact {
                iterations,
                quanta,
                next_hold,
            } => {
                if *next_hold >= *quanta {
                    return false;
                }
                // Slice boundaries sit at floor(j * n / q)
                let boundary = u128::from(*next_hold) * u128::from(*iterations) / u128::from(*quanta);
                if u128::from(offset) == boundary {
                    *next_hold += 1;
                    true
                } else {
                    false
                }
            }
            Self::Timed { budget, stopwatch } => stopwatch.elapsed() > *budget,
        }
    }
}

/// A loop over `start..end` together with its callbacks
pub(super) struct ScheduledLoop {
    start: i64,
    end: i64,
    direction: i64,
    index: i64,
    pacing: Pacing,
    body: IndexHandler,
    on_hold: IndexHandler,
    on_done: Option<DoneHandler>,
}

impl ScheduledLoop {
    pub(super) fn new(
        start: i64,
        end: i64,
        pacing: Pacing,
        body: IndexHandler,
        on_hold: IndexHandler,
        on_done: DoneHandler,
    ) -> Self {
        Self {
            start,
            end,
            direction: match end.cmp(&start) {
                Ordering::Greater => 1,
                Ordering::Less => -1,
                Ordering::Equal => 0,
            },
            index: start,
            pacing,
            body,
            on_hold,
            on_done: Some(on_done),
        }
    }

    pub(super) fn current_index(&self) -> i64 {
        self.index
    }

    /// Run until the next hold point or the end of the range
    ///
    /// Returns `true` once the loop has finished and its completion handler ran.
    pub(super) fn run_slice(&mut self) -> bool {
        self.pacing.begin_slice();

        while self.index != self.end {
            let i = self.index;
            (self.body)(i);
            self.index += self.direction;

            if self.pacing.should_hold(self.start.abs_diff(i)) {
                (self.on_hold)(i);
                return false;
            }
        }

        if let Some(on_done) = self.on_done.take() {
            on_done();
        }
        true
    }
}
