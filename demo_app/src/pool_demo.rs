//! Crates sprayed from an emitter and recycled when they hit the floor

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;
use uniprep::events::{ContactTracker, EventRouter};
use uniprep::foundation::math::Vec3;
use uniprep::pool::{ObjectPool, PoolHandle, PoolStats};

const GRAVITY: f32 = -9.81;

/// Height of the floor trigger volume
const FLOOR_HEIGHT: f32 = 0.0;

/// Anything the floor can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Body {
    Floor,
    Crate(PoolHandle),
}

/// A unit-mass falling crate
#[derive(Debug)]
struct Crate {
    position: Vec3,
    velocity: Vec3,
}

impl Crate {
    fn at_rest() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
        }
    }
}

pub struct PoolDemo {
    pool: ObjectPool<Crate>,
    tracker: ContactTracker<Body>,
    router: EventRouter<Body>,
    landed: Rc<RefCell<Vec<PoolHandle>>>,
    emission_rate: usize,
    max_force: Vec3,
    emitter: Vec3,
}

impl PoolDemo {
    pub fn new(emission_rate: usize, max_force: Vec3, emitter: Vec3) -> Self {
        let mut tracker = ContactTracker::new();
        tracker.set_trigger(Body::Floor, true);

        Self {
            pool: ObjectPool::new(Crate::at_rest),
            tracker,
            router: EventRouter::new(),
            landed: Rc::new(RefCell::new(Vec::new())),
            emission_rate,
            max_force,
            emitter,
        }
    }

    /// Emit, integrate, detect floor contacts and recycle landed crates
    pub fn update(&mut self, delta: Duration) {
        for _ in 0..self.emission_rate {
            self.emit();
        }

        let dt = delta.as_secs_f32();
        let mut touching = Vec::new();
        for (handle, body) in self.pool.iter_in_use_mut() {
            body.velocity.y += GRAVITY * dt;
            body.position += body.velocity * dt;
            if body.position.y <= FLOOR_HEIGHT {
                touching.push((Body::Crate(handle), Body::Floor));
            }
        }

        let events = self.tracker.update(touching);
        self.router.deliver_all(&events);

        for handle in self.landed.borrow_mut().drain(..) {
            if let Err(err) = self.pool.release(handle) {
                log::warn!("Could not recycle crate: {}", err);
            }
        }
    }

    fn emit(&mut self) {
        let handle = self.pool.acquire();
        let mut rng = rand::thread_rng();
        let force = Vec3::new(
            self.max_force.x * (rng.gen::<f32>() - 0.5),
            self.max_force.y * (rng.gen::<f32>() - 0.5),
            self.max_force.z * (rng.gen::<f32>() - 0.5),
        );

        // Pooled instances keep their old state
        if let Some(body) = self.pool.get_mut(handle) {
            body.position = self.emitter;
            body.velocity = force;
        }

        let landed = Rc::clone(&self.landed);
        self.router
            .attach(Body::Crate(handle))
            .handle_trigger_enter(move |other| {
                if *other == Body::Floor {
                    landed.borrow_mut().push(handle);
                }
            });
    }

    /// Crates currently in flight
    pub fn airborne(&self) -> usize {
        self.pool.in_use_count()
    }

    /// Total crates ever instantiated
    pub fn instantiated(&self) -> usize {
        self.pool.len()
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
