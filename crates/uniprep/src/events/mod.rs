//! Trigger and collision callbacks
//!
//! The host's physics layer reports contacts through the [`ContactListener`]
//! trait. [`EventAdapter`] implements it by forwarding each notification to a
//! single registered callback per event kind, so gameplay code can react to
//! contacts without an engine behind it.
//!
//! For hosts that only know which entities touch each frame,
//! [`ContactTracker`] derives enter/stay/exit events and [`EventRouter`]
//! delivers them to the adapter attached to each entity.
//!
//! # Usage
//!
//! ```rust
//! use uniprep::events::{ContactTracker, EventRouter};
//!
//! const FLOOR: u32 = 0;
//! const CRATE: u32 = 1;
//!
//! let mut router = EventRouter::new();
//! router.attach(CRATE).handle_trigger_enter(|other| {
//!     if *other == FLOOR {
//!         println!("crate reached the floor");
//!     }
//! });
//!
//! let mut tracker = ContactTracker::new();
//! tracker.set_trigger(FLOOR, true);
//! let events = tracker.update([(CRATE, FLOOR)]);
//! router.deliver_all(&events);
//! ```

mod adapter;
mod contact_tracker;
mod router;

pub use adapter::EventAdapter;
pub use contact_tracker::{ContactPair, ContactTracker};
pub use router::EventRouter;

/// Receiver of host contact notifications
///
/// Trigger notifications carry a `T` describing the other collider; collision
/// notifications carry a `C` describing the collision.
pub trait ContactListener<T, C = T> {
    /// Another collider entered this trigger volume
    fn on_trigger_enter(&mut self, other: &T);
    /// Another collider left this trigger volume
    fn on_trigger_exit(&mut self, other: &T);
    /// Another collider is still inside this trigger volume
    fn on_trigger_stay(&mut self, other: &T);
    /// A collision started
    fn on_collision_enter(&mut self, collision: &C);
    /// A collision ended
    fn on_collision_exit(&mut self, collision: &C);
    /// A collision is ongoing
    fn on_collision_stay(&mut self, collision: &C);
}

/// Point in a contact's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    /// First frame of contact
    Enter,
    /// Contact continues
    Stay,
    /// First frame without contact
    Exit,
}

/// The six contact notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Entered a trigger volume
    TriggerEnter,
    /// Left a trigger volume
    TriggerExit,
    /// Inside a trigger volume
    TriggerStay,
    /// Collision started
    CollisionEnter,
    /// Collision ended
    CollisionExit,
    /// Collision ongoing
    CollisionStay,
}

impl EventKind {
    /// Kind for a contact `phase`, as a trigger or a collision
    pub fn new(phase: ContactPhase, trigger: bool) -> Self {
        match (phase, trigger) {
            (ContactPhase::Enter, true) => Self::TriggerEnter,
            (ContactPhase::Exit, true) => Self::TriggerExit,
            (ContactPhase::Stay, true) => Self::TriggerStay,
            (ContactPhase::Enter, false) => Self::CollisionEnter,
            (ContactPhase::Exit, false) => Self::CollisionExit,
            (ContactPhase::Stay, false) => Self::CollisionStay,
        }
    }

    /// Phase of the contact
    pub fn phase(self) -> ContactPhase {
        match self {
            Self::TriggerEnter | Self::CollisionEnter => ContactPhase::Enter,
            Self::TriggerExit | Self::CollisionExit => ContactPhase::Exit,
            Self::TriggerStay | Self::CollisionStay => ContactPhase::Stay,
        }
    }

    /// Whether this is a trigger notification
    pub fn is_trigger(self) -> bool {
        matches!(self, Self::TriggerEnter | Self::TriggerExit | Self::TriggerStay)
    }
}

/// A contact notification addressed to `subject`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent<E> {
    /// Which notification
    pub kind: EventKind,
    /// Entity receiving the notification
    pub subject: E,
    /// The other entity involved
    pub other: E,
}
