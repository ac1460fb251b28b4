//! Single-slot callbacks for trigger and collision notifications

use super::{ContactListener, EventKind};

type Handler<P> = Option<Box<dyn FnMut(&P)>>;

/// Forwards host contact notifications to registered callbacks
///
/// Each of the six event kinds has exactly one slot. Registering a callback
/// replaces the previous one, and notifications for an empty slot are ignored.
/// Trigger notifications carry a `T` payload, collision notifications a `C`.
pub struct EventAdapter<T, C = T> {
    trigger_enter: Handler<T>,
    trigger_exit: Handler<T>,
    trigger_stay: Handler<T>,
    collision_enter: Handler<C>,
    collision_exit: Handler<C>,
    collision_stay: Handler<C>,
}

impl<T, C> Default for EventAdapter<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> EventAdapter<T, C> {
    /// Create an adapter with every slot empty
    pub fn new() -> Self {
        Self {
            trigger_enter: None,
            trigger_exit: None,
            trigger_stay: None,
            collision_enter: None,
            collision_exit: None,
            collision_stay: None,
        }
    }

    /// Set the callback for entering a trigger volume
    pub fn handle_trigger_enter(&mut self, callback: impl FnMut(&T) + 'static) -> &mut Self {
        self.trigger_enter = Some(Box::new(callback));
        self
    }

    /// Set the callback for leaving a trigger volume
    pub fn handle_trigger_exit(&mut self, callback: impl FnMut(&T) + 'static) -> &mut Self {
        self.trigger_exit = Some(Box::new(callback));
        self
    }

    /// Set the callback for remaining inside a trigger volume
    pub fn handle_trigger_stay(&mut self, callback: impl FnMut(&T) + 'static) -> &mut Self {
        self.trigger_stay = Some(Box::new(callback));
        self
    }

    /// Set the callback for the start of a collision
    pub fn handle_collision_enter(&mut self, callback: impl FnMut(&C) + 'static) -> &mut Self {
        self.collision_enter = Some(Box::new(callback));
        self
    }

    /// Set the callback for the end of a collision
    pub fn handle_collision_exit(&mut self, callback: impl FnMut(&C) + 'static) -> &mut Self {
        self.collision_exit = Some(Box::new(callback));
        self
    }

    /// Set the callback for an ongoing collision
    pub fn handle_collision_stay(&mut self, callback: impl FnMut(&C) + 'static) -> &mut Self {
        self.collision_stay = Some(Box::new(callback));
        self
    }

    /// Empty the slot for `kind`
    pub fn clear(&mut self, kind: EventKind) {
        match kind {
            EventKind::TriggerEnter => self.trigger_enter = None,
            EventKind::TriggerExit => self.trigger_exit = None,
            EventKind::TriggerStay => self.trigger_stay = None,
            EventKind::CollisionEnter => self.collision_enter = None,
            EventKind::CollisionExit => self.collision_exit = None,
            EventKind::CollisionStay => self.collision_stay = None,
        }
    }

    /// Whether a callback is registered for `kind`
    pub fn is_registered(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::TriggerEnter => self.trigger_enter.is_some(),
            EventKind::TriggerExit => self.trigger_exit.is_some(),
            EventKind::TriggerStay => self.trigger_stay.is_some(),
            EventKind::CollisionEnter => self.collision_enter.is_some(),
            EventKind::CollisionExit => self.collision_exit.is_some(),
            EventKind::CollisionStay => self.collision_stay.is_some(),
        }
    }
}

impl<P> EventAdapter<P, P> {
    /// Forward a notification of any kind when both payloads share a type
    pub fn dispatch(&mut self, kind: EventKind, payload: &P) {
        let slot = match kind {
            EventKind::TriggerEnter => &mut self.trigger_enter,
            EventKind::TriggerExit => &mut self.trigger_exit,
            EventKind::TriggerStay => &mut self.trigger_stay,
            EventKind::CollisionEnter => &mut self.collision_enter,
            EventKind::CollisionExit => &mut self.collision_exit,
            EventKind::CollisionStay => &mut self.collision_stay,
        };
        invoke(slot, payload);
    }
}

fn invoke<P>(slot: &mut Handler<P>, payload: &P) {
    if let Some(callback) = slot.as_mut() {
        callback(payload);
    }
}

impl<T, C> ContactListener<T, C> for EventAdapter<T, C> {
    fn on_trigger_enter(&mut self, other: &T) {
        invoke(&mut self.trigger_enter, other);
    }

    fn on_trigger_exit(&mut self, other: &T) {
        invoke(&mut self.trigger_exit, other);
    }

    fn on_trigger_stay(&mut self, other: &T) {
        invoke(&mut self.trigger_stay, other);
    }

    fn on_collision_enter(&mut self, collision: &C) {
        invoke(&mut self.collision_enter, collision);
    }

    fn on_collision_exit(&mut self, collision: &C) {
        invoke(&mut self.collision_exit, collision);
    }

    fn on_collision_stay(&mut self, collision: &C) {
        invoke(&mut self.collision_stay, collision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Collider {
        name: &'static str,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Collision {
        impulse: f32,
    }

    #[test]
    fn test_registered_callback_receives_payload() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut adapter: EventAdapter<Collider, Collision> = EventAdapter::new();
        adapter.handle_trigger_enter(move |collider| sink.borrow_mut().push(collider.name));

        adapter.on_trigger_enter(&Collider { name: "Floor" });
        adapter.on_trigger_exit(&Collider { name: "Wall" });

        assert_eq!(*seen.borrow(), vec!["Floor"]);
    }

    #[test]
    fn test_registration_replaces_previous() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (seen.clone(), seen.clone());
        let mut adapter: EventAdapter<Collider, Collision> = EventAdapter::new();
        adapter.handle_collision_enter(move |c| first.borrow_mut().push(("first", c.impulse)));
        adapter.handle_collision_enter(move |c| second.borrow_mut().push(("second", c.impulse)));

        adapter.on_collision_enter(&Collision { impulse: 2.5 });

        assert_eq!(*seen.borrow(), vec![("second", 2.5)]);
    }

    #[test]
    fn test_unregistered_slots_are_noops() {
        let mut adapter: EventAdapter<Collider, Collision> = EventAdapter::default();
        adapter.on_trigger_stay(&Collider { name: "Water" });
        adapter.on_collision_exit(&Collision { impulse: 0.0 });
        assert!(!adapter.is_registered(EventKind::TriggerStay));
    }

    #[test]
    fn test_clear_and_dispatch() {
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let mut adapter: EventAdapter<u32> = EventAdapter::new();
        adapter
            .handle_trigger_stay(move |_| *sink.borrow_mut() += 1)
            .handle_collision_stay(|_| {});

        adapter.dispatch(EventKind::TriggerStay, &7);
        assert!(adapter.is_registered(EventKind::CollisionStay));

        adapter.clear(EventKind::TriggerStay);
        adapter.dispatch(EventKind::TriggerStay, &7);
        assert_eq!(*count.borrow(), 1);
        assert!(!adapter.is_registered(EventKind::TriggerStay));
    }
}
