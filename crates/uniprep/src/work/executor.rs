//! Pooled executors that drive one routine at a time

use std::any::Any;
use std::time::Duration;

use super::routine::{PendingWait, Routine, Step, WaitCondition};
use super::WorkId;

/// Result of advancing a job by one step
enum Advance {
    Pending,
    Wait(WaitCondition),
    Finished,
}

/// Type-erased routine plus its completion callback
trait Job {
    fn advance(&mut self) -> Advance;

    /// Invoke the completion callback with the captured value
    fn finish(self: Box<Self>);

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub(super) type DoneCallback<T> = Box<dyn FnOnce(Option<T>)>;

struct TypedJob<T> {
    routine: Box<dyn Routine<Output = T>>,
    last: Option<T>,
    on_done: Option<DoneCallback<T>>,
}

impl<T: 'static> Job for TypedJob<T> {
    fn advance(&mut self) -> Advance {
        match self.routine.step() {
            Step::Continue => Advance::Pending,
            Step::Yield(value) => {
                self.last = Some(value);
                Advance::Pending
            }
            Step::Wait(condition) => Advance::Wait(condition),
            Step::Complete(value) => {
                self.last = Some(value);
                Advance::Finished
            }
            Step::Done => Advance::Finished,
        }
    }

    fn finish(self: Box<Self>) {
        if let Some(on_done) = self.on_done {
            on_done(self.last);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Lifecycle of the routine occupying an executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutorState {
    /// Routine assigned, waiting for `begin`
    Idle,
    /// Stepped once per tick
    Running,
    /// Finalized on the next tick
    Ending,
}

/// Drives a single routine; recycled through the runner's pool
pub(super) struct WorkExecutor {
    id: Option<WorkId>,
    job: Option<Box<dyn Job>>,
    state: ExecutorState,
    paused: bool,
    wait: Option<PendingWait>,
}

impl WorkExecutor {
    pub(super) fn new() -> Self {
        Self {
            id: None,
            job: None,
            state: ExecutorState::Idle,
            paused: false,
            wait: None,
        }
    }

    /// Install a routine; the executor must be fresh out of the pool
    pub(super) fn assign<R>(&mut self, id: WorkId, routine: R)
    where
        R: Routine + 'static,
        R::Output: 'static,
    {
        self.id = Some(id);
        self.job = Some(Box::new(TypedJob {
            routine: Box::new(routine),
            last: None,
            on_done: None,
        }));
        self.state = ExecutorState::Idle;
        self.paused = false;
        self.wait = None;
    }

    pub(super) fn id(&self) -> Option<WorkId> {
        self.id
    }

    pub(super) fn has_started(&self) -> bool {
        self.state != ExecutorState::Idle
    }

    /// Attach the completion callback and start stepping on the next tick
    ///
    /// Returns `false` if the installed job does not produce `T`.
    pub(super) fn begin<T: 'static>(&mut self, on_done: Option<DoneCallback<T>>) -> bool {
        let Some(job) = self
            .job
            .as_mut()
            .and_then(|job| job.as_any_mut().downcast_mut::<TypedJob<T>>())
        else {
            return false;
        };
        job.on_done = on_done;
        self.state = ExecutorState::Running;
        true
    }

    pub(super) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(super) fn end(&mut self) {
        self.state = ExecutorState::Ending;
    }

    pub(super) fn is_running(&self) -> bool {
        self.state == ExecutorState::Running
    }

    pub(super) fn is_paused(&self) -> bool {
        self.paused
    }

    /// Process one tick; returns `true` when the executor should be finalized
    pub(super) fn poll(&mut self, quantum: Duration) -> bool {
        match self.state {
            ExecutorState::Idle => false,
            ExecutorState::Ending => true,
            ExecutorState::Running => {
                if self.paused {
                    return false;
                }
                if let Some(wait) = self.wait.as_mut() {
                    if !wait.elapse(quantum) {
                        return false;
                    }
                    self.wait = None;
                }

                let finished = match self.job.as_mut().map(|job| job.advance()) {
                    Some(Advance::Pending) => false,
                    Some(Advance::Wait(condition)) => {
                        self.wait = PendingWait::new(condition);
                        false
                    }
                    Some(Advance::Finished) | None => true,
                };
                if finished {
                    self.state = ExecutorState::Ending;
                }
                finished
            }
        }
    }

    /// Run the completion callback and clear the executor for reuse
    pub(super) fn finalize(&mut self) {
        let job = self.job.take();
        self.id = None;
        self.state = ExecutorState::Idle;
        self.paused = false;
        self.wait = None;
        if let Some(job) = job {
            job.finish();
        }
    }
}
