//! Turns per-frame contact sets into enter/stay/exit events
//!
//! Hosts that only know which pairs touch this frame feed them to a
//! [`ContactTracker`], which compares them with the previous frame the same
//! way a broad-phase/narrow-phase collision system reports entered and exited
//! pairs.

use std::collections::HashSet;
use std::hash::Hash;

use super::{ContactEvent, ContactPhase, EventKind};

/// Unordered pair of touching entities (smaller entity stored first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactPair<E> {
    /// Entity with the smaller key
    pub entity_a: E,
    /// Entity with the larger key
    pub entity_b: E,
}

impl<E: Ord> ContactPair<E> {
    /// Create a pair, ordering the entities for consistency
    pub fn new(entity_a: E, entity_b: E) -> Self {
        if entity_a <= entity_b {
            Self { entity_a, entity_b }
        } else {
            Self {
                entity_a: entity_b,
                entity_b: entity_a,
            }
        }
    }
}

/// Tracks touching pairs across frames
pub struct ContactTracker<E> {
    triggers: HashSet<E>,
    current: HashSet<ContactPair<E>>,
    previous: HashSet<ContactPair<E>>,
}

impl<E: Copy + Eq + Hash + Ord> Default for ContactTracker<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Copy + Eq + Hash + Ord> ContactTracker<E> {
    /// Create a tracker with no contacts
    pub fn new() -> Self {
        Self {
            triggers: HashSet::new(),
            current: HashSet::new(),
            previous: HashSet::new(),
        }
    }

    /// Mark `entity` as a trigger volume; contacts involving it report trigger events
    pub fn set_trigger(&mut self, entity: E, is_trigger: bool) {
        if is_trigger {
            self.triggers.insert(entity);
        } else {
            self.triggers.remove(&entity);
        }
    }

    /// Whether `entity` is a trigger volume
    pub fn is_trigger(&self, entity: E) -> bool {
        self.triggers.contains(&entity)
    }

    /// Record this frame's touching pairs and return the resulting events
    ///
    /// Each pair yields one event per participant. Events are ordered enter,
    /// stay, exit; within a phase they follow the pair ordering. Self pairs
    /// are ignored.
    pub fn update(&mut self, touching: impl IntoIterator<Item = (E, E)>) -> Vec<ContactEvent<E>> {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();
        self.current.extend(
            touching
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| ContactPair::new(a, b)),
        );

        let entered = sorted(self.current.difference(&self.previous));
        let stayed = sorted(self.current.intersection(&self.previous));
        let exited = sorted(self.previous.difference(&self.current));

        let mut events = Vec::with_capacity(2 * (entered.len() + stayed.len() + exited.len()));
        for (phase, pairs) in [
            (ContactPhase::Enter, entered),
            (ContactPhase::Stay, stayed),
            (ContactPhase::Exit, exited),
        ] {
            for pair in pairs {
                self.push_events(&mut events, phase, pair);
            }
        }
        events
    }

    /// Pairs touching in the last update
    pub fn current_contacts(&self) -> &HashSet<ContactPair<E>> {
        &self.current
    }

    /// Forget every contact without reporting exits
    pub fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
    }

    fn push_events(&self, events: &mut Vec<ContactEvent<E>>, phase: ContactPhase, pair: ContactPair<E>) {
        let trigger = self.is_trigger(pair.entity_a) || self.is_trigger(pair.entity_b);
        let kind = EventKind::new(phase, trigger);
        events.push(ContactEvent {
            kind,
            subject: pair.entity_a,
            other: pair.entity_b,
        });
        events.push(ContactEvent {
            kind,
            subject: pair.entity_b,
            other: pair.entity_a,
        });
    }
}

fn sorted<'a, E: Copy + Ord + 'a>(pairs: impl Iterator<Item = &'a ContactPair<E>>) -> Vec<ContactPair<E>> {
    let mut pairs: Vec<_> = pairs.copied().collect();
    pairs.sort_unstable();
    pairs
}
