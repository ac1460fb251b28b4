//! Per-entity adapter registry

use std::collections::HashMap;
use std::hash::Hash;

use super::{ContactEvent, EventAdapter};

/// Routes contact events to the adapter attached to their subject
///
/// Payloads are the other entity involved in the contact.
pub struct EventRouter<E> {
    adapters: HashMap<E, EventAdapter<E>>,
}

impl<E: Copy + Eq + Hash> Default for EventRouter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash> EventRouter<E> {
    /// Create an empty router
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Attach an adapter to `entity`, or return the one already attached
    pub fn attach(&mut self, entity: E) -> &mut EventAdapter<E> {
        self.adapters.entry(entity).or_default()
    }

    /// Remove the adapter attached to `entity`
    pub fn detach(&mut self, entity: E) -> Option<EventAdapter<E>> {
        self.adapters.remove(&entity)
    }

    /// Adapter attached to `entity`, if any
    pub fn get(&self, entity: E) -> Option<&EventAdapter<E>> {
        self.adapters.get(&entity)
    }

    /// Mutable adapter attached to `entity`, if any
    pub fn get_mut(&mut self, entity: E) -> Option<&mut EventAdapter<E>> {
        self.adapters.get_mut(&entity)
    }

    /// Whether `entity` has an adapter
    pub fn is_attached(&self, entity: E) -> bool {
        self.adapters.contains_key(&entity)
    }

    /// Number of attached adapters
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapter is attached
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Forward one event to its subject's adapter
    ///
    /// Returns `false` when the subject has no adapter attached.
    pub fn deliver(&mut self, event: &ContactEvent<E>) -> bool {
        match self.adapters.get_mut(&event.subject) {
            Some(adapter) => {
                adapter.dispatch(event.kind, &event.other);
                true
            }
            None => false,
        }
    }

    /// Forward a batch of events in order
    pub fn deliver_all<'a>(&mut self, events: impl IntoIterator<Item = &'a ContactEvent<E>>)
    where
        E: 'a,
    {
        for event in events {
            self.deliver(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_attach_is_idempotent() {
        let mut router: EventRouter<u32> = EventRouter::new();
        router.attach(1).handle_trigger_enter(|_| {});
        router.attach(1);

        assert_eq!(router.len(), 1);
        assert!(router.get(1).unwrap().is_registered(EventKind::TriggerEnter));
    }

    #[test]
    fn test_deliver_reaches_subject_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut router: EventRouter<u32> = EventRouter::new();
        router
            .attach(1)
            .handle_collision_enter(move |other| sink.borrow_mut().push(*other));
        router.attach(2);

        let event = ContactEvent {
            kind: EventKind::CollisionEnter,
            subject: 1,
            other: 9,
        };
        assert!(router.deliver(&event));
        assert!(router.deliver(&ContactEvent { subject: 2, ..event }));
        assert!(!router.deliver(&ContactEvent { subject: 3, ..event }));

        assert_eq!(*seen.borrow(), vec![9]);
    }

    #[test]
    fn test_detach() {
        let mut router: EventRouter<u32> = EventRouter::new();
        router.attach(4);
        assert!(router.detach(4).is_some());
        assert!(!router.is_attached(4));
        assert!(router.is_empty());
    }
}
