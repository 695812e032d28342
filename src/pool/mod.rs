//! Pooled-object manager: a fixed (or explicitly growable) set of reusable
//! entities handed out and reclaimed instead of created and dropped.
//!
//! Entities are cloned from a template when the pool is built, deactivated
//! straight away and parked in the available set. `acquire` pops the most
//! recently released entity (LIFO) and runs its activation hook; `release`
//! runs the deactivation hook and parks it again.

pub mod error;

pub use error::PoolError;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

/// Capability pair every pooled entity implements.
pub trait Reusable {
    /// Called when the entity moves from available to active.
    fn on_retrieved_from_pool(&mut self);

    /// Called when the entity moves from active to available, and once right
    /// after creation.
    fn on_returned_to_pool(&mut self);

    /// Called once when the pool creates the entity from its template.
    fn on_created(&mut self, _parent: &str, _index: usize) {}
}

/// What `acquire` does when no entity is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPolicy {
    /// Report `PoolError::CapacityExceeded`.
    #[default]
    Fixed,
    /// Clone one more entity from the template.
    GrowOnDemand,
}

/// Construction settings for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub capacity: i64,
    pub growth: GrowthPolicy,
}

impl PoolSettings {
    pub fn fixed(capacity: i64) -> Self {
        PoolSettings {
            capacity,
            growth: GrowthPolicy::Fixed,
        }
    }

    pub fn growable(capacity: i64) -> Self {
        PoolSettings {
            capacity,
            growth: GrowthPolicy::GrowOnDemand,
        }
    }
}

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(1);

/// Typed handle to an entity owned by an `ObjectPool<T>`.
pub struct PoolHandle<T> {
    pool_id: u32,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolHandle<T> {
    fn new(pool_id: u32, index: usize) -> Self {
        PoolHandle {
            pool_id,
            index,
            _marker: PhantomData,
        }
    }

    /// Slot index inside the owning pool.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for PoolHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolHandle<T> {}

impl<T> PartialEq for PoolHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pool_id == other.pool_id && self.index == other.index
    }
}

impl<T> Eq for PoolHandle<T> {}

impl<T> Hash for PoolHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool_id.hash(state);
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for PoolHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolHandle(pool={}, index={})", self.pool_id, self.index)
    }
}

impl<T> fmt::Display for PoolHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.pool_id)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    entity: T,
    active: bool,
}

/// Pool of reusable entities of one type.
#[derive(Debug)]
pub struct ObjectPool<T> {
    id: u32,
    parent: String,
    template: T,
    slots: Vec<Slot<T>>,
    available: Vec<usize>, // Stack of inactive slot indices, top is next out
    growth: GrowthPolicy,
}

impl<T: Reusable + Clone> ObjectPool<T> {
    /// Builds the pool and pre-creates `settings.capacity` inactive entities
    /// cloned from `template`, grouped under `parent`.
    pub fn new(
        template: Option<T>,
        parent: impl Into<String>,
        settings: PoolSettings,
    ) -> Result<Self, PoolError> {
        if settings.capacity <= 0 {
            return Err(PoolError::InvalidCapacity(settings.capacity));
        }
        let template = template.ok_or(PoolError::MissingTemplate)?;
        let capacity =
            usize::try_from(settings.capacity).map_err(|_| PoolError::InvalidCapacity(settings.capacity))?;

        let mut pool = ObjectPool {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            parent: parent.into(),
            template,
            slots: Vec::with_capacity(capacity),
            available: Vec::with_capacity(capacity),
            growth: settings.growth,
        };
        for _ in 0..capacity {
            pool.create_slot();
        }
        // First acquire hands out slot 0
        pool.available.reverse();

        log::info!(
            "Pool '{}' created with {} entities ({:?})",
            pool.parent,
            capacity,
            pool.growth
        );
        Ok(pool)
    }

    /// Takes an available entity, activates it and returns its handle.
    pub fn acquire(&mut self) -> Result<PoolHandle<T>, PoolError> {
        let index = match self.available.pop() {
            Some(index) => index,
            None => match self.growth {
                GrowthPolicy::Fixed => {
                    crate::debug_pool!("Pool '{}' exhausted at {} entities", self.parent, self.slots.len());
                    return Err(PoolError::CapacityExceeded {
                        capacity: self.slots.len(),
                    });
                }
                GrowthPolicy::GrowOnDemand => {
                    let index = self.create_slot();
                    // create_slot parks the new index; take it straight back
                    self.available.pop();
                    log::warn!(
                        "Pool '{}' grew to {} entities",
                        self.parent,
                        self.slots.len()
                    );
                    index
                }
            },
        };

        let slot = &mut self.slots[index];
        slot.active = true;
        slot.entity.on_retrieved_from_pool();

        let handle = PoolHandle::new(self.id, index);
        crate::debug_pool!("Pool '{}' acquired {}", self.parent, handle);
        Ok(handle)
    }

    /// Returns an entity to the pool. Returns `Ok(false)` when it was already
    /// available; the pool is left untouched in that case.
    pub fn release(&mut self, handle: PoolHandle<T>) -> Result<bool, PoolError> {
        let index = self.checked_index(handle)?;
        Ok(self.deactivate(index))
    }

    /// Returns every active entity to the pool. Returns how many were released.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for index in 0..self.slots.len() {
            if self.deactivate(index) {
                released += 1;
            }
        }
        crate::debug_pool!("Pool '{}' released all ({} entities)", self.parent, released);
        released
    }

    fn create_slot(&mut self) -> usize {
        let index = self.slots.len();
        let mut entity = self.template.clone();
        entity.on_created(&self.parent, index);
        entity.on_returned_to_pool();
        self.slots.push(Slot {
            entity,
            active: false,
        });
        self.available.push(index);
        index
    }
}

impl<T: Reusable> ObjectPool<T> {
    fn deactivate(&mut self, index: usize) -> bool {
        let slot = &mut self.slots[index];
        if !slot.active {
            return false;
        }
        slot.active = false;
        slot.entity.on_returned_to_pool();
        self.available.push(index);
        crate::debug_pool!("Pool '{}' released #{}", self.parent, index);
        true
    }
}

impl<T> ObjectPool<T> {
    fn checked_index(&self, handle: PoolHandle<T>) -> Result<usize, PoolError> {
        if self.owns(handle) {
            Ok(handle.index)
        } else {
            Err(PoolError::InvalidRelease {
                handle: handle.to_string(),
                pool: self.parent.clone(),
            })
        }
    }

    /// True when `handle` was issued by this pool.
    pub fn owns(&self, handle: PoolHandle<T>) -> bool {
        handle.pool_id == self.id && handle.index < self.slots.len()
    }

    pub fn is_active(&self, handle: PoolHandle<T>) -> bool {
        self.owns(handle) && self.slots[handle.index].active
    }

    /// Active entity behind `handle`, if any.
    pub fn get(&self, handle: PoolHandle<T>) -> Option<&T> {
        if self.is_active(handle) {
            Some(&self.slots[handle.index].entity)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: PoolHandle<T>) -> Option<&mut T> {
        if self.is_active(handle) {
            Some(&mut self.slots[handle.index].entity)
        } else {
            None
        }
    }

    /// Total entities owned, including any grown on demand.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.available.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth
    }

    pub fn active_handles(&self) -> Vec<PoolHandle<T>> {
        self.iter_active().map(|(handle, _)| handle).collect()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle<T>, &T)> {
        let id = self.id;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(move |(index, slot)| (PoolHandle::new(id, index), &slot.entity))
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle<T>, &mut T)> {
        let id = self.id;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(move |(index, slot)| (PoolHandle::new(id, index), &mut slot.entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    #[derive(Debug, Clone, Default)]
    struct Dummy {
        visible: bool,
        activations: u32,
        deactivations: u32,
        parent: String,
        created_index: usize,
    }

    impl Reusable for Dummy {
        fn on_retrieved_from_pool(&mut self) {
            self.visible = true;
            self.activations += 1;
        }

        fn on_returned_to_pool(&mut self) {
            self.visible = false;
            self.deactivations += 1;
        }

        fn on_created(&mut self, parent: &str, index: usize) {
            self.parent = parent.to_string();
            self.created_index = index;
        }
    }

    fn pool_of(capacity: i64, growth: GrowthPolicy) -> ObjectPool<Dummy> {
        ObjectPool::new(Some(Dummy::default()), "Holders", PoolSettings { capacity, growth }).unwrap()
    }

    fn assert_partitioned(pool: &ObjectPool<Dummy>) {
        let available: HashSet<usize> = pool.available.iter().copied().collect();
        assert_eq!(available.len(), pool.available.len(), "duplicate in available set");
        for (index, slot) in pool.slots.iter().enumerate() {
            assert_ne!(slot.active, available.contains(&index), "slot {} misfiled", index);
            assert_eq!(slot.active, slot.entity.visible);
        }
    }

    #[test]
    fn test_construction_creates_inactive_entities() {
        let pool = pool_of(6, GrowthPolicy::Fixed);
        assert_eq!(pool.capacity(), 6);
        assert_eq!(pool.available_count(), 6);
        assert_eq!(pool.active_count(), 0);
        for (index, slot) in pool.slots.iter().enumerate() {
            assert!(!slot.entity.visible);
            assert_eq!(slot.entity.deactivations, 1);
            assert_eq!(slot.entity.parent, "Holders");
            assert_eq!(slot.entity.created_index, index);
        }
        assert_partitioned(&pool);
    }

    #[test]
    fn test_invalid_configuration() {
        let zero = ObjectPool::new(Some(Dummy::default()), "Holders", PoolSettings::fixed(0));
        assert_eq!(zero.unwrap_err(), PoolError::InvalidCapacity(0));

        let negative = ObjectPool::new(Some(Dummy::default()), "Holders", PoolSettings::fixed(-3));
        assert_eq!(negative.unwrap_err(), PoolError::InvalidCapacity(-3));

        let missing = ObjectPool::<Dummy>::new(None, "Holders", PoolSettings::fixed(4));
        let err = missing.unwrap_err();
        assert_eq!(err, PoolError::MissingTemplate);
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_fixed_pool_exhaustion() {
        let mut pool = pool_of(4, GrowthPolicy::Fixed);
        let handles: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(pool.available_count(), 0);
        assert_eq!(pool.active_count(), 4);
        assert_eq!(handles.iter().collect::<HashSet<_>>().len(), 4);

        let err = pool.acquire().unwrap_err();
        assert_eq!(err, PoolError::CapacityExceeded { capacity: 4 });
        assert!(!err.is_configuration_error());
        assert_eq!(pool.capacity(), 4);
        assert_partitioned(&pool);
    }

    #[test]
    fn test_growable_pool_grows_by_one() {
        let mut pool = pool_of(4, GrowthPolicy::GrowOnDemand);
        for _ in 0..4 {
            pool.acquire().unwrap();
        }
        let fifth = pool.acquire().unwrap();
        assert_eq!(pool.capacity(), 5);
        assert_eq!(pool.active_count(), 5);
        assert_eq!(pool.available_count(), 0);
        assert_eq!(fifth.index(), 4);
        assert!(pool.get(fifth).unwrap().visible);
        assert_partitioned(&pool);
    }

    #[test]
    fn test_lifo_reuse_and_activation_count() {
        let mut pool = pool_of(4, GrowthPolicy::Fixed);
        let first = pool.acquire().unwrap();
        assert_eq!(first.index(), 0);
        pool.release(first).unwrap();
        let again = pool.acquire().unwrap();
        assert_eq!(again, first);
        assert_eq!(pool.get(again).unwrap().activations, 2);
        assert_eq!(pool.get(again).unwrap().deactivations, 2); // creation + release
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = pool_of(3, GrowthPolicy::Fixed);
        let a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();

        assert_eq!(pool.release(a), Ok(true));
        let available_once = pool.available.clone();
        assert_eq!(pool.release(a), Ok(false));
        assert_eq!(pool.available, available_once);
        assert_eq!(pool.slots[a.index()].entity.deactivations, 2);
        assert_eq!(pool.active_count(), 1);
        assert_partitioned(&pool);
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let mut pool = pool_of(2, GrowthPolicy::Fixed);
        let mut other = pool_of(2, GrowthPolicy::Fixed);
        let foreign = other.acquire().unwrap();
        let own = pool.acquire().unwrap();

        let before = pool.available.clone();
        let err = pool.release(foreign).unwrap_err();
        assert!(matches!(err, PoolError::InvalidRelease { .. }));
        assert_eq!(pool.available, before);
        assert!(pool.is_active(own));
        assert!(pool.get(foreign).is_none());
        assert!(!pool.owns(foreign));
    }

    #[test]
    fn test_release_all() {
        let mut pool = pool_of(6, GrowthPolicy::Fixed);
        let handles: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
        pool.release(handles[1]).unwrap();

        assert_eq!(pool.release_all(), 3);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.available_count(), pool.capacity());
        assert!(pool.active_handles().is_empty());
        assert_partitioned(&pool);
    }

    #[test]
    fn test_get_only_sees_active_entities() {
        let mut pool = pool_of(2, GrowthPolicy::Fixed);
        let handle = pool.acquire().unwrap();
        assert!(pool.get_mut(handle).is_some());
        pool.release(handle).unwrap();
        assert!(pool.get(handle).is_none());
        assert!(pool.get_mut(handle).is_none());
    }

    #[test]
    fn test_random_sequences_keep_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = pool_of(6, GrowthPolicy::Fixed);
        let mut held: Vec<PoolHandle<Dummy>> = Vec::new();
        let mut acquires = 0usize;
        let mut releases = 0usize;

        for _ in 0..500 {
            if rng.gen_bool(0.5) && held.len() < 6 {
                held.push(pool.acquire().unwrap());
                acquires += 1;
            } else if !held.is_empty() {
                let handle = held.swap_remove(rng.gen_range(0..held.len()));
                assert_eq!(pool.release(handle), Ok(true));
                releases += 1;
            }
            assert_eq!(pool.active_count(), acquires - releases);
            assert_eq!(pool.active_count(), held.len());
            assert_partitioned(&pool);
        }
    }
}
