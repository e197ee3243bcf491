//! Session-scoped bean store
//!
//! Every request of a client gets its own [`SessionBeanStore`], all of them
//! attached to the same session attribute map. Two things differ from a
//! plain [`AttributeBeanStore`]:
//!
//! - A local miss always consults the session, because another store bound to
//!   the same session may have created the instance in the meantime.
//! - The lock store lives inside the session under [`LOCK_STORE_KEY`], so all
//!   stores of one session serialize instance creation against each other.

use crate::attribute::{AttributeBeanStore, LockStoreSource};
use crate::attributes::{Attribute, AttributeStore};
use crate::config::BeanStoreConfig;
use crate::error::{BeanStoreError, BeanStoreResult};
use crate::identifier::BeanIdentifier;
use crate::instance::ContextualInstance;
use crate::lock_store::{LockStore, LockedBean};
use crate::naming::NamingScheme;
use crate::store::{BeanStore, BoundBeanStore};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Session attribute holding the lock store shared by a session's stores.
///
/// Attribute-backed stores skip this key when scanning attribute names, so no
/// naming scheme can report it as a bean.
pub const LOCK_STORE_KEY: &str = "reinhardt.contexts.beanstore.LockStore";

// Serializes creation of shared lock stores across all sessions.
static LOCK_STORE_INIT: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Lock store kept in the session attribute map.
///
/// The first store that needs it creates it; later stores bound to the same
/// session find the existing one. Each store caches what it resolved.
#[derive(Debug, Default)]
pub struct SessionLockStore {
	resolved: OnceCell<LockStore>,
}

impl<A: AttributeStore> LockStoreSource<A> for SessionLockStore {
	fn lock_store(&self, attributes: &A) -> BeanStoreResult<Option<LockStore>> {
		if let Some(locks) = self.resolved.get() {
			return Ok(Some(locks.clone()));
		}
		let locks = shared_lock_store(attributes)?;
		Ok(Some(self.resolved.get_or_init(|| locks).clone()))
	}
}

fn shared_lock_store<A: AttributeStore>(attributes: &A) -> BeanStoreResult<LockStore> {
	if let Some(locks) = read_lock_store(attributes)? {
		return Ok(locks);
	}
	let _init = LOCK_STORE_INIT.lock();
	if let Some(locks) = read_lock_store(attributes)? {
		return Ok(locks);
	}
	let locks = LockStore::new();
	let attribute: Attribute = Arc::new(locks.clone());
	attributes.set_attribute(LOCK_STORE_KEY, attribute)?;
	tracing::debug!(key = LOCK_STORE_KEY, "Lock store created in session");
	Ok(locks)
}

fn read_lock_store<A: AttributeStore>(attributes: &A) -> BeanStoreResult<Option<LockStore>> {
	match attributes.attribute(LOCK_STORE_KEY)? {
		Some(attribute) => attribute
			.downcast_ref::<LockStore>()
			.cloned()
			.map(Some)
			.ok_or_else(|| BeanStoreError::IncompatibleAttribute {
				key: LOCK_STORE_KEY.to_string(),
			}),
		None => Ok(None),
	}
}

/// Bean store of the session scope.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{
///     BeanIdentifier, BeanStore, BeanStoreConfig, BoundBeanStore, ContextualInstance,
///     MapAttributeStore, SessionBeanStore, SimpleNamingScheme,
/// };
/// use std::sync::Arc;
///
/// # fn main() -> reinhardt_beanstore::BeanStoreResult<()> {
/// let session = MapAttributeStore::new();
/// let naming = Arc::new(SimpleNamingScheme::new("http.session")?);
///
/// let first = SessionBeanStore::new(naming.clone(), session.clone(), BeanStoreConfig::new());
/// let second = SessionBeanStore::new(naming, session, BeanStoreConfig::new());
/// first.attach()?;
/// second.attach()?;
///
/// let id = BeanIdentifier::new("cart");
/// first.put(id.clone(), ContextualInstance::new(id.clone(), 1u8))?;
/// assert!(second.get(&id)?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct SessionBeanStore<A> {
	inner: AttributeBeanStore<A, SessionLockStore>,
}

impl<A: AttributeStore> SessionBeanStore<A> {
	/// Creates a detached store over the session attribute map `attributes`.
	pub fn new(naming: Arc<dyn NamingScheme>, attributes: A, config: BeanStoreConfig) -> Self {
		Self {
			inner: AttributeBeanStore::with_lock_source(
				naming,
				attributes,
				config,
				SessionLockStore::default(),
			),
		}
	}

	pub fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
		self.inner.naming_scheme()
	}

	pub fn attributes(&self) -> &A {
		self.inner.attributes()
	}

	pub fn config(&self) -> &BeanStoreConfig {
		self.inner.config()
	}

	pub fn fetch_uninitialized_attributes(&self) -> BeanStoreResult<()> {
		self.inner.fetch_uninitialized_attributes()
	}
}

impl<A: AttributeStore> BeanStore for SessionBeanStore<A> {
	fn get(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>> {
		if let Some(instance) = self.inner.get(id)? {
			return Ok(Some(instance));
		}
		if !self.inner.is_attached() {
			return Ok(None);
		}
		// Not cached: another store of this session may replace the entry.
		let key = self.inner.naming_scheme().prefix(id);
		self.inner.fetch_attribute(&key)
	}

	fn put(&self, id: BeanIdentifier, instance: ContextualInstance) -> BeanStoreResult<()> {
		self.inner.put(id, instance)
	}

	fn remove(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>> {
		// Mirrors `get`: an instance created by another store of the session
		// is returned before its attribute is deleted.
		self.inner.remove_instance(id, true)
	}

	fn clear(&self) -> BeanStoreResult<()> {
		self.inner.clear()
	}

	fn ids(&self) -> BeanStoreResult<Vec<BeanIdentifier>> {
		self.inner.ids()
	}

	fn lock(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<LockedBean>> {
		self.inner.lock(id)
	}
}

impl<A: AttributeStore> BoundBeanStore for SessionBeanStore<A> {
	fn attach(&self) -> BeanStoreResult<bool> {
		self.inner.attach()
	}

	fn detach(&self) -> bool {
		self.inner.detach()
	}

	fn is_attached(&self) -> bool {
		self.inner.is_attached()
	}
}

impl<A: fmt::Debug> fmt::Debug for SessionBeanStore<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionBeanStore")
			.field("inner", &self.inner)
			.finish()
	}
}
