//! Object pooling
//!
//! Keeps instantiated objects alive between uses so hot paths recycle instead
//! of re-allocating. Objects are addressed by stable [`PoolHandle`]s; the pool
//! only grows and never resets an instance on its way in or out, so callers
//! restore whatever state they care about after [`ObjectPool::acquire`].
//!
//! # Usage
//!
//! ```rust
//! use uniprep::pool::ObjectPool;
//!
//! let mut pool = ObjectPool::new(|| Vec::<u8>::with_capacity(64));
//! let buffer = pool.acquire();
//! pool.get_mut(buffer).unwrap().push(7);
//! pool.release(buffer).unwrap();
//!
//! // The released instance comes straight back
//! assert_eq!(pool.acquire(), buffer);
//! ```

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to an object owned by an [`ObjectPool`]
    pub struct PoolHandle;
}

/// Errors returned by pool operations
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The handle was not issued by this pool
    #[error("handle {0:?} does not belong to this pool")]
    UnknownHandle(PoolHandle),
    /// The object is already back in the pool
    #[error("object {0:?} was already released")]
    AlreadyFree(PoolHandle),
}

/// Counters describing pool usage since creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Objects instantiated through the factory
    pub created: u64,
    /// Successful acquisitions (new or recycled)
    pub acquired: u64,
    /// Successful releases
    pub released: u64,
}

/// An instance together with its usage flag
struct PooledObject<T> {
    instance: T,
    in_use: bool,
}

/// Pool of reusable objects built by a factory
pub struct ObjectPool<T> {
    objects: SlotMap<PoolHandle, PooledObject<T>>,
    free: Vec<PoolHandle>,
    factory: Box<dyn FnMut() -> T>,
    stats: PoolStats,
}

impl<T> ObjectPool<T> {
    /// Create an empty pool; `factory` builds an instance whenever no free one exists
    pub fn new(factory: impl FnMut() -> T + 'static) -> Self {
        Self {
            objects: SlotMap::with_key(),
            free: Vec::new(),
            factory: Box::new(factory),
            stats: PoolStats::default(),
        }
    }

    /// Instantiate `count` objects up front and leave them free
    pub fn prewarm(&mut self, count: usize) {
        for _ in 0..count {
            let handle = self.instantiate(false);
            self.free.push(handle);
        }
        log::debug!("Prewarmed pool with {} objects ({} total)", count, self.objects.len());
    }

    /// Take a free object, instantiating a new one if none is available
    ///
    /// The most recently released object is handed out first.
    pub fn acquire(&mut self) -> PoolHandle {
        let handle = match self.free.pop() {
            Some(handle) => {
                if let Some(object) = self.objects.get_mut(handle) {
                    object.in_use = true;
                }
                handle
            }
            None => self.instantiate(true),
        };
        self.stats.acquired += 1;
        handle
    }

    /// Return an object to the pool for future [`acquire`](Self::acquire) calls
    pub fn release(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        let object = self
            .objects
            .get_mut(handle)
            .ok_or(PoolError::UnknownHandle(handle))?;
        if !object.in_use {
            return Err(PoolError::AlreadyFree(handle));
        }
        object.in_use = false;
        self.free.push(handle);
        self.stats.released += 1;
        Ok(())
    }

    /// Borrow an object, whether in use or free
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.objects.get(handle).map(|object| &object.instance)
    }

    /// Mutably borrow an object, whether in use or free
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.objects.get_mut(handle).map(|object| &mut object.instance)
    }

    /// Whether the object is currently handed out
    pub fn is_in_use(&self, handle: PoolHandle) -> bool {
        self.objects.get(handle).is_some_and(|object| object.in_use)
    }

    /// Iterate over the objects currently handed out
    pub fn iter_in_use_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.objects
            .iter_mut()
            .filter(|(_, object)| object.in_use)
            .map(|(handle, object)| (handle, &mut object.instance))
    }

    /// Total number of objects owned by the pool
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the pool has never instantiated anything
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects waiting to be acquired
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of objects currently handed out
    pub fn in_use_count(&self) -> usize {
        self.objects.len() - self.free.len()
    }

    /// Usage counters
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    fn instantiate(&mut self, in_use: bool) -> PoolHandle {
        let instance = (self.factory)();
        self.stats.created += 1;
        self.objects.insert(PooledObject { instance, in_use })
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("len", &self.len())
            .field("free", &self.free_count())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
