//! Bean store traits

use crate::error::BeanStoreResult;
use crate::identifier::BeanIdentifier;
use crate::instance::ContextualInstance;
use crate::lock_store::LockedBean;

/// Storage of the contextual instances of one scope instance.
///
/// Plain `get`/`put`/`remove` calls are not serialized against each other.
/// Callers that need create-if-absent semantics take the identifier's lock
/// first:
///
/// ```
/// use reinhardt_beanstore::{BeanIdentifier, BeanStore, ContextualInstance, LocalBeanStore};
///
/// # fn main() -> reinhardt_beanstore::BeanStoreResult<()> {
/// let store = LocalBeanStore::concurrent();
/// let id = BeanIdentifier::new("cart");
///
/// let locked = store.lock(&id)?;
/// if !store.contains(&id)? {
///     store.put(id.clone(), ContextualInstance::new(id.clone(), 0u32))?;
/// }
/// drop(locked);
///
/// assert!(store.contains(&id)?);
/// # Ok(())
/// # }
/// ```
pub trait BeanStore: Send + Sync {
	fn get(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>>;

	fn put(&self, id: BeanIdentifier, instance: ContextualInstance) -> BeanStoreResult<()>;

	/// Removes and returns the instance stored for `id`.
	fn remove(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>>;

	fn contains(&self, id: &BeanIdentifier) -> BeanStoreResult<bool> {
		Ok(self.get(id)?.is_some())
	}

	/// Removes every entry.
	///
	/// Destruction callbacks are not invoked; callers destroy instances
	/// beforehand using [`BeanStore::ids`].
	fn clear(&self) -> BeanStoreResult<()>;

	/// Snapshot of the identifiers currently held.
	fn ids(&self) -> BeanStoreResult<Vec<BeanIdentifier>>;

	/// Acquires the creation lock of `id`.
	///
	/// Returns `None` when the store needs no locking because its scope is
	/// only ever used by one thread.
	fn lock(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<LockedBean>>;
}

/// A bean store that can be bound to and unbound from external storage.
pub trait BoundBeanStore: BeanStore {
	/// Binds the store. Returns `false` if it was already attached.
	fn attach(&self) -> BeanStoreResult<bool>;

	/// Unbinds the store. Returns `false` if it was already detached.
	fn detach(&self) -> bool;

	fn is_attached(&self) -> bool;
}
