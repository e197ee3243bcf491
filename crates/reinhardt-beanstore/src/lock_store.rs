//! Per-identifier creation locks
//!
//! A [`LockStore`] hands out one mutual-exclusion lock per bean identifier so
//! that at most one thread creates a given scoped instance at a time. Locks
//! are reference counted: an entry exists only while somebody holds or waits
//! for it, and is removed as soon as the last [`LockedBean`] is released.

use crate::identifier::BeanIdentifier;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

struct ReferenceCountedLock {
	lock: Arc<Mutex<()>>,
	// Holders plus waiters.
	count: usize,
}

/// Table of reference-counted per-identifier locks.
///
/// Cloning yields another handle to the same table.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{BeanIdentifier, LockStore};
///
/// let locks = LockStore::new();
/// let id = BeanIdentifier::new("cart");
///
/// let locked = locks.lock(&id);
/// assert_eq!(locks.lock_count(&id), 1);
///
/// locked.unlock();
/// assert!(locks.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct LockStore {
	locks: Arc<Mutex<HashMap<BeanIdentifier, ReferenceCountedLock>>>,
}

impl LockStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Blocks until the lock for `id` is acquired.
	///
	/// The table mutex is only held while the entry is looked up or created,
	/// so waiting on one identifier never blocks others.
	pub fn lock(&self, id: &BeanIdentifier) -> LockedBean {
		let lock = {
			let mut locks = self.locks.lock();
			let entry = locks
				.entry(id.clone())
				.or_insert_with(|| ReferenceCountedLock {
					lock: Arc::new(Mutex::new(())),
					count: 0,
				});
			entry.count += 1;
			entry.lock.clone()
		};
		let guard = lock.lock_arc();
		tracing::trace!(bean = %id, "Bean lock acquired");
		LockedBean {
			id: id.clone(),
			guard: Some(guard),
			store: self.clone(),
		}
	}

	/// Number of identifiers currently holding an entry.
	pub fn len(&self) -> usize {
		self.locks.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Outstanding acquisitions (holder and waiters) for `id`.
	pub fn lock_count(&self, id: &BeanIdentifier) -> usize {
		self.locks.lock().get(id).map_or(0, |entry| entry.count)
	}

	fn release(&self, id: &BeanIdentifier, guard: ArcMutexGuard<RawMutex, ()>) {
		let mut locks = self.locks.lock();
		drop(guard);
		let remaining = locks.get_mut(id).map(|entry| {
			entry.count -= 1;
			entry.count
		});
		match remaining {
			Some(0) => {
				locks.remove(id);
			}
			Some(_) => {}
			None => debug_assert!(false, "released lock for {id} missing from the lock store"),
		}
		tracing::trace!(bean = %id, "Bean lock released");
	}
}

impl fmt::Debug for LockStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LockStore")
			.field("locks", &self.len())
			.finish()
	}
}

/// An acquired per-identifier lock.
///
/// The lock is released by [`LockedBean::unlock`] or when the value is
/// dropped, which also covers early returns and panics in the critical
/// section. Release can therefore never happen without a matching
/// acquisition.
#[must_use = "the bean lock is released as soon as this value is dropped"]
pub struct LockedBean {
	id: BeanIdentifier,
	guard: Option<ArcMutexGuard<RawMutex, ()>>,
	store: LockStore,
}

impl LockedBean {
	/// Identifier this lock guards.
	pub fn id(&self) -> &BeanIdentifier {
		&self.id
	}

	pub fn unlock(self) {
		drop(self);
	}
}

impl Drop for LockedBean {
	fn drop(&mut self) {
		if let Some(guard) = self.guard.take() {
			self.store.release(&self.id, guard);
		}
	}
}

impl fmt::Debug for LockedBean {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LockedBean").field("id", &self.id).finish()
	}
}
