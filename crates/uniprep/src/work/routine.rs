//! Suspendable routines expressed as step functions
//!
//! A routine is polled once per quantum by its executor. Each poll returns a
//! [`Step`] telling the executor whether to keep going, wait, or finish.

use std::time::Duration;

/// Condition a routine waits on before its next step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Resume on the next tick
    NextQuantum,
    /// Resume after this many ticks
    Quanta(u32),
    /// Resume once this much quantum time has accumulated
    Duration(Duration),
}

/// Outcome of a single routine step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// Nothing to report, step again next tick
    Continue,
    /// Record `T` as the latest value and step again next tick
    Yield(T),
    /// Suspend until the condition resolves
    Wait(WaitCondition),
    /// Finish with `T` as the result
    Complete(T),
    /// Finish with the latest yielded value as the result
    Done,
}

/// A suspendable routine polled by a work executor
pub trait Routine {
    /// Value produced by the routine
    type Output;

    /// Advance the routine by one step
    fn step(&mut self) -> Step<Self::Output>;
}

/// Routine backed by a closure
pub struct FnRoutine<F>(F);

impl<T, F> Routine for FnRoutine<F>
where
    F: FnMut() -> Step<T>,
{
    type Output = T;

    fn step(&mut self) -> Step<T> {
        (self.0)()
    }
}

/// Build a routine from a closure called once per step
pub fn from_fn<T, F>(step: F) -> FnRoutine<F>
where
    F: FnMut() -> Step<T>,
{
    FnRoutine(step)
}

/// Routine backed by a sequence of steps
///
/// Finishes with [`Step::Done`] once the sequence is exhausted.
pub struct StepSequence<I>(I);

impl<T, I> Routine for StepSequence<I>
where
    I: Iterator<Item = Step<T>>,
{
    type Output = T;

    fn step(&mut self) -> Step<T> {
        self.0.next().unwrap_or(Step::Done)
    }
}

/// Build a routine that replays `steps` in order
pub fn from_steps<T, I>(steps: I) -> StepSequence<I::IntoIter>
where
    I: IntoIterator<Item = Step<T>>,
{
    StepSequence(steps.into_iter())
}

/// Routine that waits for `duration` and then finishes without a value
pub fn delay(duration: Duration) -> StepSequence<std::array::IntoIter<Step<()>, 1>> {
    from_steps([Step::Wait(WaitCondition::Duration(duration))])
}

/// Countdown state for a pending [`WaitCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingWait {
    Ticks(u32),
    Time(Duration),
}

impl PendingWait {
    /// Countdown for `condition`, or `None` when the next tick already resumes
    pub(crate) fn new(condition: WaitCondition) -> Option<Self> {
        match condition {
            WaitCondition::NextQuantum | WaitCondition::Quanta(0 | 1) => None,
            WaitCondition::Quanta(n) => Some(Self::Ticks(n - 1)),
            WaitCondition::Duration(duration) => Some(Self::Time(duration)),
        }
    }

    /// Account for one tick; returns `true` when the routine may step this tick
    pub(crate) fn elapse(&mut self, quantum: Duration) -> bool {
        match self {
            Self::Ticks(0) => true,
            Self::Ticks(remaining) => {
                *remaining -= 1;
                false
            }
            Self::Time(remaining) => {
                *remaining = remaining.saturating_sub(quantum);
                remaining.is_zero()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sequence_finishes_when_exhausted() {
        let mut routine = from_steps([Step::Yield(1), Step::Continue]);
        assert_eq!(routine.step(), Step::Yield(1));
        assert_eq!(routine.step(), Step::Continue);
        assert_eq!(routine.step(), Step::Done);
        assert_eq!(routine.step(), Step::Done);
    }

    #[test]
    fn test_fn_routine_counts() {
        let mut calls = 0;
        let mut routine = from_fn(move || {
            calls += 1;
            if calls < 3 {
                Step::Continue
            } else {
                Step::Complete(calls)
            }
        });
        assert_eq!(routine.step(), Step::Continue);
        assert_eq!(routine.step(), Step::Continue);
        assert_eq!(routine.step(), Step::Complete(3));
    }

    #[test]
    fn test_pending_ticks() {
        assert_eq!(PendingWait::new(WaitCondition::NextQuantum), None);
        assert_eq!(PendingWait::new(WaitCondition::Quanta(1)), None);

        let mut wait = PendingWait::new(WaitCondition::Quanta(3)).unwrap();
        assert!(!wait.elapse(Duration::ZERO));
        assert!(!wait.elapse(Duration::ZERO));
        assert!(wait.elapse(Duration::ZERO));
    }

    #[test]
    fn test_pending_time() {
        let mut wait = PendingWait::new(WaitCondition::Duration(Duration::from_millis(40))).unwrap();
        assert!(!wait.elapse(Duration::from_millis(16)));
        assert!(!wait.elapse(Duration::from_millis(16)));
        assert!(wait.elapse(Duration::from_millis(16)));
    }
}
