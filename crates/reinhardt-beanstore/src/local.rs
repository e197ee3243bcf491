//! In-memory bean store

use crate::error::BeanStoreResult;
use crate::identifier::BeanIdentifier;
use crate::instance::ContextualInstance;
use crate::lock_store::{LockStore, LockedBean};
use crate::store::BeanStore;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Bean store backed by a plain map, with no external attachment.
///
/// [`LocalBeanStore::new`] creates a store for single-threaded scopes whose
/// [`BeanStore::lock`] returns `None`. [`LocalBeanStore::concurrent`] creates
/// one whose lock store is built on first use.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{BeanIdentifier, BeanStore, ContextualInstance, LocalBeanStore};
///
/// let store = LocalBeanStore::new();
/// let id = BeanIdentifier::new("counter");
///
/// store.put(id.clone(), ContextualInstance::new(id.clone(), 1u64)).unwrap();
///
/// let instance = store.get(&id).unwrap().unwrap();
/// assert_eq!(*instance.instance::<u64>().unwrap(), 1);
/// assert!(store.lock(&id).unwrap().is_none());
/// ```
#[derive(Default)]
pub struct LocalBeanStore {
	instances: RwLock<HashMap<BeanIdentifier, ContextualInstance>>,
	locking: bool,
	lock_store: OnceCell<LockStore>,
}

impl LocalBeanStore {
	/// Creates a store that needs no locking.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store shared between threads.
	pub fn concurrent() -> Self {
		Self {
			locking: true,
			..Self::default()
		}
	}

	pub(crate) fn instance(&self, id: &BeanIdentifier) -> Option<ContextualInstance> {
		self.instances.read().get(id).cloned()
	}

	pub(crate) fn insert(&self, id: BeanIdentifier, instance: ContextualInstance) {
		self.instances.write().insert(id, instance);
	}

	pub(crate) fn take(&self, id: &BeanIdentifier) -> Option<ContextualInstance> {
		self.instances.write().remove(id)
	}

	pub(crate) fn holds(&self, id: &BeanIdentifier) -> bool {
		self.instances.read().contains_key(id)
	}

	pub(crate) fn identifiers(&self) -> Vec<BeanIdentifier> {
		self.instances.read().keys().cloned().collect()
	}

	/// Snapshot of every held entry.
	pub(crate) fn entries(&self) -> Vec<(BeanIdentifier, ContextualInstance)> {
		self.instances
			.read()
			.iter()
			.map(|(id, instance)| (id.clone(), instance.clone()))
			.collect()
	}

	pub fn len(&self) -> usize {
		self.instances.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.instances.read().is_empty()
	}

	/// Returns the lock store, creating it on first use.
	fn lock_store(&self) -> Option<&LockStore> {
		self.locking.then(|| self.lock_store.get_or_init(LockStore::new))
	}
}

impl BeanStore for LocalBeanStore {
	fn get(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>> {
		Ok(self.instance(id))
	}

	fn put(&self, id: BeanIdentifier, instance: ContextualInstance) -> BeanStoreResult<()> {
		self.insert(id, instance);
		Ok(())
	}

	fn remove(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>> {
		Ok(self.take(id))
	}

	fn contains(&self, id: &BeanIdentifier) -> BeanStoreResult<bool> {
		Ok(self.holds(id))
	}

	fn clear(&self) -> BeanStoreResult<()> {
		self.instances.write().clear();
		Ok(())
	}

	fn ids(&self) -> BeanStoreResult<Vec<BeanIdentifier>> {
		Ok(self.identifiers())
	}

	fn lock(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<LockedBean>> {
		Ok(self.lock_store().map(|locks| locks.lock(id)))
	}
}

impl fmt::Debug for LocalBeanStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LocalBeanStore")
			.field("instances", &self.len())
			.field("locking", &self.locking)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::thread;

	fn instance(id: &BeanIdentifier, value: u32) -> ContextualInstance {
		ContextualInstance::new(id.clone(), value)
	}

	#[rstest]
	fn test_put_get_remove() {
		// Arrange
		let store = LocalBeanStore::new();
		let id = BeanIdentifier::new("cart");

		// Act
		store.put(id.clone(), instance(&id, 7)).unwrap();
		let found = store.get(&id).unwrap();
		let removed = store.remove(&id).unwrap();

		// Assert
		assert_eq!(*found.unwrap().instance::<u32>().unwrap(), 7);
		assert!(removed.is_some());
		assert!(!store.contains(&id).unwrap());
		assert!(store.remove(&id).unwrap().is_none());
	}

	#[rstest]
	fn test_clear_and_ids() {
		// Arrange
		let store = LocalBeanStore::new();
		let a = BeanIdentifier::new("a");
		let b = BeanIdentifier::new("b");
		store.put(a.clone(), instance(&a, 1)).unwrap();
		store.put(b.clone(), instance(&b, 2)).unwrap();

		// Act
		let mut ids = store.ids().unwrap();
		ids.sort();
		store.clear().unwrap();

		// Assert
		assert_eq!(ids, vec![a, b]);
		assert!(store.is_empty());
	}

	#[rstest]
	fn test_lock_store_is_created_once() {
		// Arrange
		let store = LocalBeanStore::concurrent();

		// Act
		let first = store.lock_store().unwrap() as *const LockStore;
		let second = store.lock_store().unwrap() as *const LockStore;

		// Assert
		assert_eq!(first, second);
	}

	#[rstest]
	fn test_concurrent_create_if_absent_creates_once() {
		// Arrange
		let store = Arc::new(LocalBeanStore::concurrent());
		let id = BeanIdentifier::new("cart");
		let created = Arc::new(AtomicUsize::new(0));

		// Act
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let store = store.clone();
				let id = id.clone();
				let created = created.clone();
				thread::spawn(move || {
					let _locked = store.lock(&id).unwrap().unwrap();
					if !store.contains(&id).unwrap() {
						created.fetch_add(1, Ordering::SeqCst);
						store.put(id.clone(), instance(&id, 1)).unwrap();
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		// Assert
		assert_eq!(created.load(Ordering::SeqCst), 1);
		assert_eq!(store.len(), 1);
	}
}
