//! # Uniprep
//!
//! Runtime helpers for games that spread work across frames, plus an offline
//! tool for packing triangle clusters into UV atlases.
//!
//! ## Features
//!
//! - **Frame scheduling**: Long loops split into per-frame slices, by count or by time budget
//! - **Work routines**: Resumable step functions with pause, resume, waits and completion callbacks
//! - **Object pooling**: Reusable instances behind generational handles
//! - **Contact events**: Trigger/collision callbacks and per-frame contact tracking
//! - **UV clustering**: Vertex merging and atlas-space transforms for triangle fragments
//!
//! There are no global singletons: the host owns a [`scheduler::FrameScheduler`]
//! and a [`work::WorkRunner`] and calls `tick` on them once per frame.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use uniprep::prelude::*;
//!
//! let mut scheduler = FrameScheduler::new();
//! scheduler
//!     .in_exact_steps(0, 100, 4, |_i| {}, |_i| {}, || println!("loop finished"))
//!     .unwrap();
//!
//! let mut runner = WorkRunner::new();
//! runner.start_delayed(Duration::from_millis(50), || println!("delay elapsed"));
//!
//! let frame = Duration::from_millis(16);
//! while scheduler.active_count() > 0 || runner.active_count() > 0 {
//!     scheduler.tick(frame);
//!     runner.tick(frame);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod events;
pub mod foundation;
pub mod mesh;
pub mod pool;
pub mod scheduler;
pub mod work;

/// Common imports for toolkit users
pub mod prelude {
    pub use crate::{
        config::{ClusterConfig, Config, SchedulerConfig, ToolkitConfig, WorkConfig},
        events::{ContactEvent, ContactListener, ContactTracker, EventAdapter, EventKind, EventRouter},
        foundation::{
            math::{Vec2, Vec3},
            time::{FrameClock, Stopwatch},
        },
        mesh::{ClusterError, FaceCluster, FaceFragment},
        pool::{ObjectPool, PoolError, PoolHandle},
        scheduler::{FrameScheduler, LoopHandle, SchedulerError},
        work::{routine, Routine, Step, WaitCondition, Work, WorkError, WorkRunner},
    };
}
