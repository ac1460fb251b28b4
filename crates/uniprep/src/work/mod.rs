//! Promise-like work units over suspendable routines
//!
//! A [`Work`] wraps a [`Routine`] in a pooled executor owned by a
//! [`WorkRunner`]. The host calls [`WorkRunner::tick`] once per frame; every
//! running routine advances one step per tick, and when it finishes the
//! completion callback receives the last value the routine produced.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//! use uniprep::work::{routine, Step, WaitCondition, WorkRunner};
//!
//! let mut runner = WorkRunner::new();
//! let work = runner.create(routine::from_steps([
//!     Step::Wait(WaitCondition::Duration(Duration::from_millis(50))),
//!     Step::Yield("That's awesome".to_string()),
//! ]));
//! runner
//!     .begin(&work, |message| println!("{}", message.unwrap_or_default()))
//!     .unwrap();
//!
//! while runner.tick(Duration::from_millis(16)) > 0 {}
//! ```
//!
//! Pausing, resuming and ending are cooperative: they only take effect at the
//! next tick.

mod executor;
pub mod routine;

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use crate::config::WorkConfig;
use crate::pool::{ObjectPool, PoolError, PoolHandle};
use executor::WorkExecutor;

pub use routine::{Routine, Step, WaitCondition};

/// Unique identifier of a work unit, never reused by a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkId(u64);

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WORK_{}", self.0)
    }
}

/// Errors returned by work unit controls
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkError {
    /// The work unit finished or belongs to another runner
    #[error("{0} is not owned by this runner or has already finished")]
    UnknownWork(WorkId),
    /// `begin` was called twice
    #[error("{0} has already begun")]
    AlreadyStarted(WorkId),
    /// The executor pool rejected an operation
    #[error("executor pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Handle to a work unit producing `T`
pub struct Work<T> {
    handle: PoolHandle,
    id: WorkId,
    _output: PhantomData<fn() -> T>,
}

impl<T> Work<T> {
    /// Identifier of this work unit
    pub fn id(&self) -> WorkId {
        self.id
    }
}

impl<T> Clone for Work<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Work<T> {}

impl<T> fmt::Debug for Work<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Work").field(&self.id).finish()
    }
}

/// Snapshot of a work unit's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkStatus {
    /// Work identifier
    pub id: WorkId,
    /// Whether the routine is being stepped
    pub running: bool,
    /// Whether stepping is suspended
    pub paused: bool,
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Work ID : {} Running : {} Paused : {}",
            self.id, self.running, self.paused
        )
    }
}

/// Host for work units and their pooled executors
pub struct WorkRunner {
    executors: ObjectPool<WorkExecutor>,
    next_id: u64,
}

impl Default for WorkRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkRunner {
    /// Create a runner with an empty executor pool
    pub fn new() -> Self {
        Self::with_config(&WorkConfig::default())
    }

    /// Create a runner, prewarming executors as configured
    pub fn with_config(config: &WorkConfig) -> Self {
        let mut executors = ObjectPool::new(WorkExecutor::new);
        if config.prewarm_executors > 0 {
            executors.prewarm(config.prewarm_executors);
        }
        Self {
            executors,
            next_id: 0,
        }
    }

    /// Assign `routine` to a pooled executor; nothing runs until [`begin`](Self::begin)
    ///
    /// The executor stays reserved until the unit is begun and finishes, or is
    /// ended, so it counts toward [`active_count`](Self::active_count).
    pub fn create<R>(&mut self, routine: R) -> Work<R::Output>
    where
        R: Routine + 'static,
        R::Output: 'static,
    {
        self.next_id += 1;
        let id = WorkId(self.next_id);
        let handle = self.executors.acquire();
        if let Some(executor) = self.executors.get_mut(handle) {
            executor.assign(id, routine);
        }
        log::trace!("Created {} on executor {:?}", id, handle);
        Work {
            handle,
            id,
            _output: PhantomData,
        }
    }

    /// Start stepping the routine; `on_done` receives the last produced value
    ///
    /// The value is `None` when the routine ended before producing anything.
    pub fn begin<T: 'static>(
        &mut self,
        work: &Work<T>,
        on_done: impl FnOnce(Option<T>) + 'static,
    ) -> Result<(), WorkError> {
        let on_done: executor::DoneCallback<T> = Box::new(on_done);
        self.start(work, Some(on_done))
    }

    /// Start stepping the routine without a completion callback
    pub fn begin_silent<T: 'static>(&mut self, work: &Work<T>) -> Result<(), WorkError> {
        self.start(work, None)
    }

    fn start<T: 'static>(
        &mut self,
        work: &Work<T>,
        on_done: Option<executor::DoneCallback<T>>,
    ) -> Result<(), WorkError> {
        let executor = self.executor_mut(work)?;
        if executor.has_started() {
            return Err(WorkError::AlreadyStarted(work.id));
        }
        if !executor.begin(on_done) {
            return Err(WorkError::UnknownWork(work.id));
        }
        log::debug!("Began {}", work.id);
        Ok(())
    }

    /// Run `on_done` once `delay` of quantum time has elapsed
    pub fn start_delayed(&mut self, delay: Duration, on_done: impl FnOnce() + 'static) -> Work<()> {
        let work = self.create(routine::delay(delay));
        // Freshly created work cannot be rejected
        let _ = self.begin(&work, move |_| on_done());
        work
    }

    /// Suspend stepping from the next tick on
    pub fn pause<T>(&mut self, work: &Work<T>) -> Result<(), WorkError> {
        self.executor_mut(work)?.set_paused(true);
        Ok(())
    }

    /// Resume stepping from the next tick on
    pub fn resume<T>(&mut self, work: &Work<T>) -> Result<(), WorkError> {
        self.executor_mut(work)?.set_paused(false);
        Ok(())
    }

    /// Stop the routine; the next tick finalizes it with the last produced value
    pub fn end<T>(&mut self, work: &Work<T>) -> Result<(), WorkError> {
        self.executor_mut(work)?.end();
        log::debug!("Ending {}", work.id);
        Ok(())
    }

    /// Whether the routine is being stepped
    pub fn is_running<T>(&self, work: &Work<T>) -> bool {
        self.executor(work).is_some_and(WorkExecutor::is_running)
    }

    /// Whether the routine is paused
    pub fn is_paused<T>(&self, work: &Work<T>) -> bool {
        self.executor(work).is_some_and(WorkExecutor::is_paused)
    }

    /// Flags of a live work unit, `None` once it has finished
    pub fn status<T>(&self, work: &Work<T>) -> Option<WorkStatus> {
        self.executor(work).map(|executor| WorkStatus {
            id: work.id,
            running: executor.is_running(),
            paused: executor.is_paused(),
        })
    }

    /// Advance every running routine by one step
    ///
    /// Finished routines have their callbacks invoked and their executors
    /// returned to the pool. Returns the number of begun work units still
    /// alive; units that were created but never begun are not counted, so
    /// `while runner.tick(..) > 0 {}` ends even when some were never started.
    pub fn tick(&mut self, quantum: Duration) -> usize {
        let finished: Vec<PoolHandle> = self
            .executors
            .iter_in_use_mut()
            .filter_map(|(handle, executor)| executor.poll(quantum).then_some(handle))
            .collect();

        for handle in finished {
            if let Some(executor) = self.executors.get_mut(handle) {
                let id = executor.id();
                executor.finalize();
                log::debug!("Finished {:?}", id);
            }
            if let Err(err) = self.executors.release(handle) {
                log::error!("Failed to recycle executor {:?}: {}", handle, err);
            }
        }

        self.executors
            .iter_in_use_mut()
            .filter(|(_, executor)| executor.has_started())
            .count()
    }

    /// Number of work units created and not yet finished, begun or not
    pub fn active_count(&self) -> usize {
        self.executors.in_use_count()
    }

    /// Number of executors owned by the pool, busy or free
    pub fn executor_count(&self) -> usize {
        self.executors.len()
    }

    fn executor<T>(&self, work: &Work<T>) -> Option<&WorkExecutor> {
        self.executors
            .get(work.handle)
            .filter(|executor| executor.id() == Some(work.id))
    }

    fn executor_mut<T>(&mut self, work: &Work<T>) -> Result<&mut WorkExecutor, WorkError> {
        self.executors
            .get_mut(work.handle)
            .filter(|executor| executor.id() == Some(work.id))
            .ok_or(WorkError::UnknownWork(work.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    fn counting_routine(counter: Rc<Cell<u32>>) -> impl Routine<Output = u32> {
        routine::from_fn(move || {
            counter.set(counter.get() + 1);
            Step::Yield(counter.get())
        })
    }

    #[test]
    fn test_delayed_message_result() {
        let mut runner = WorkRunner::new();
        let result = Rc::new(RefCell::new(None));
        let sink = result.clone();

        let work = runner.create(routine::from_steps([
            Step::Wait(WaitCondition::Duration(Duration::from_millis(100))),
            Step::Yield("That's awesome".to_string()),
        ]));
        runner.begin(&work, move |message| *sink.borrow_mut() = message).unwrap();

        for _ in 0..8 {
            runner.tick(FRAME);
        }
        assert!(result.borrow().is_none());
        assert!(runner.is_running(&work));

        runner.tick(FRAME);
        assert_eq!(result.borrow().as_deref(), Some("That's awesome"));
        assert!(!runner.is_running(&work));
        assert_eq!(runner.active_count(), 0);
    }

    #[test]
    fn test_complete_value_is_result() {
        let mut runner = WorkRunner::new();
        let result = Rc::new(Cell::new(None));
        let sink = result.clone();

        let work = runner.create(routine::from_steps([Step::Yield(1), Step::Complete(2), Step::Yield(3)]));
        runner.begin(&work, move |value| sink.set(value)).unwrap();

        runner.tick(FRAME);
        assert_eq!(result.get(), None);
        runner.tick(FRAME);
        assert_eq!(result.get(), Some(2));
    }

    #[test]
    fn test_pause_halts_until_resume() {
        let mut runner = WorkRunner::new();
        let counter = Rc::new(Cell::new(0));
        let work = runner.create(counting_routine(counter.clone()));
        runner.begin_silent(&work).unwrap();

        runner.tick(FRAME);
        runner.tick(FRAME);
        assert_eq!(counter.get(), 2);

        runner.pause(&work).unwrap();
        assert!(runner.is_paused(&work));
        for _ in 0..3 {
            runner.tick(FRAME);
        }
        assert_eq!(counter.get(), 2);

        runner.resume(&work).unwrap();
        runner.tick(FRAME);
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_end_finalizes_with_last_value() {
        let mut runner = WorkRunner::new();
        let counter = Rc::new(Cell::new(0));
        let result = Rc::new(Cell::new(None));
        let sink = result.clone();

        let work = runner.create(counting_routine(counter.clone()));
        runner.begin(&work, move |value| sink.set(value)).unwrap();
        for _ in 0..3 {
            runner.tick(FRAME);
        }

        runner.end(&work).unwrap();
        assert!(!runner.is_running(&work));
        assert_eq!(result.get(), None);

        runner.tick(FRAME);
        assert_eq!(result.get(), Some(3));
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_end_while_paused_still_finalizes() {
        let mut runner = WorkRunner::new();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        let work = runner.create(counting_routine(Rc::default()));
        runner.begin(&work, move |_| flag.set(true)).unwrap();

        runner.pause(&work).unwrap();
        runner.end(&work).unwrap();
        runner.tick(FRAME);
        assert!(done.get());
    }

    #[test]
    fn test_end_before_any_value_yields_none() {
        let mut runner = WorkRunner::new();
        let result = Rc::new(RefCell::new(Some(0_u8)));
        let sink = result.clone();
        let work = runner.create(routine::from_fn(|| Step::<u8>::Continue));
        runner.begin(&work, move |value| *sink.borrow_mut() = value).unwrap();

        runner.tick(FRAME);
        runner.end(&work).unwrap();
        runner.tick(FRAME);
        assert_eq!(*result.borrow(), None);
    }

    #[test]
    fn test_wait_for_quanta() {
        let mut runner = WorkRunner::new();
        let counter = Rc::new(Cell::new(0));
        let steps = counter.clone();
        let work = runner.create(routine::from_fn(move || {
            steps.set(steps.get() + 1);
            Step::<()>::Wait(WaitCondition::Quanta(3))
        }));
        runner.begin_silent(&work).unwrap();

        runner.tick(FRAME);
        assert_eq!(counter.get(), 1);
        runner.tick(FRAME);
        runner.tick(FRAME);
        assert_eq!(counter.get(), 1);
        runner.tick(FRAME);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_executor_is_recycled() {
        let mut runner = WorkRunner::new();
        let first = runner.create(routine::from_steps([Step::Complete(1)]));
        runner.begin_silent(&first).unwrap();
        runner.tick(FRAME);
        assert_eq!(runner.executor_count(), 1);

        let second = runner.create(routine::from_steps([Step::Complete(2)]));
        assert_eq!(runner.executor_count(), 1);
        assert_ne!(first.id(), second.id());

        // The stale handle no longer controls the recycled executor
        assert_eq!(runner.pause(&first), Err(WorkError::UnknownWork(first.id())));
        assert!(runner.status(&first).is_none());
        assert!(runner.status(&second).is_some());
    }

    #[test]
    fn test_busy_executors_are_not_shared() {
        let mut runner = WorkRunner::new();
        let a = runner.create(counting_routine(Rc::default()));
        let b = runner.create(counting_routine(Rc::default()));
        assert_eq!(runner.executor_count(), 2);
        assert_eq!(runner.active_count(), 2);
        runner.begin_silent(&a).unwrap();
        assert!(runner.is_running(&a));
        assert!(!runner.is_running(&b));
    }

    #[test]
    fn test_begin_twice_is_rejected() {
        let mut runner = WorkRunner::new();
        let work = runner.create(counting_routine(Rc::default()));
        runner.begin_silent(&work).unwrap();
        assert_eq!(runner.begin_silent(&work), Err(WorkError::AlreadyStarted(work.id())));
    }

    #[test]
    fn test_end_unstarted_work_releases_executor() {
        let mut runner = WorkRunner::new();
        let work = runner.create(counting_routine(Rc::default()));
        runner.end(&work).unwrap();
        assert_eq!(runner.tick(FRAME), 0);
        assert_eq!(runner.active_count(), 0);
    }

    #[test]
    fn test_tick_count_ignores_unbegun_work() {
        let mut runner = WorkRunner::new();
        let idle = runner.create(counting_routine(Rc::default()));
        let delayed = runner.start_delayed(Duration::from_millis(20), || {});

        assert_eq!(runner.tick(FRAME), 1);
        let mut ticks = 1;
        while runner.tick(FRAME) > 0 {
            ticks += 1;
            assert!(ticks < 10, "tick kept counting unbegun work");
        }

        assert!(runner.status(&delayed).is_none());
        assert_eq!(runner.active_count(), 1);
        assert!(!runner.is_running(&idle));
        assert!(runner.status(&idle).is_some());
    }

    #[test]
    fn test_start_delayed() {
        let mut runner = WorkRunner::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        runner.start_delayed(Duration::from_millis(30), move || flag.set(true));

        runner.tick(FRAME);
        runner.tick(FRAME);
        assert!(!fired.get());
        runner.tick(FRAME);
        runner.tick(FRAME);
        assert!(fired.get());
    }

    #[test]
    fn test_status_display() {
        let mut runner = WorkRunner::with_config(&WorkConfig { prewarm_executors: 2 });
        assert_eq!(runner.executor_count(), 2);

        let work = runner.create(counting_routine(Rc::default()));
        runner.begin_silent(&work).unwrap();
        runner.pause(&work).unwrap();
        let status = runner.status(&work).unwrap();
        assert_eq!(
            status.to_string(),
            format!("Work ID : {} Running : true Paused : true", work.id())
        );
    }
}
