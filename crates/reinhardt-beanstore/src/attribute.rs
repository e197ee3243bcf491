//! Attribute-backed bean store
//!
//! [`AttributeBeanStore`] keeps a local cache of instances and writes it
//! through to an external [`AttributeStore`] while attached. Detached writes
//! stay local until the next [`attach`](BoundBeanStore::attach), at which
//! point the local cache is authoritative and overwrites conflicting
//! attributes.
//!
//! With lazy fetching enabled, attributes are read on first access instead
//! of being mirrored when attaching. The local cache is then incomplete on
//! purpose, so iteration merges local identifiers with the identifiers found
//! in the backing storage.

use crate::attributes::{Attribute, AttributeStore};
use crate::config::{BeanStoreConfig, IterationMode};
use crate::error::{BeanStoreError, BeanStoreResult};
use crate::identifier::BeanIdentifier;
use crate::instance::ContextualInstance;
use crate::local::LocalBeanStore;
use crate::lock_store::{LockStore, LockedBean};
use crate::naming::NamingScheme;
use crate::session::LOCK_STORE_KEY;
use crate::store::{BeanStore, BoundBeanStore};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Decides where an attribute-backed store gets its lock store from.
pub trait LockStoreSource<A>: Send + Sync {
	/// Returns `None` when the store needs no locking.
	fn lock_store(&self, attributes: &A) -> BeanStoreResult<Option<LockStore>>;
}

/// Locking disabled, for scopes only ever used by one thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocking;

impl<A> LockStoreSource<A> for NoLocking {
	fn lock_store(&self, _attributes: &A) -> BeanStoreResult<Option<LockStore>> {
		Ok(None)
	}
}

/// Lock store owned by a single bean store and created on first use.
#[derive(Debug, Default)]
pub struct PrivateLockStore {
	locks: OnceCell<LockStore>,
}

impl<A> LockStoreSource<A> for PrivateLockStore {
	fn lock_store(&self, _attributes: &A) -> BeanStoreResult<Option<LockStore>> {
		Ok(Some(self.locks.get_or_init(LockStore::new).clone()))
	}
}

/// Write-through bean store over an external attribute map.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{
///     AttributeBeanStore, AttributeStore, BeanIdentifier, BeanStore, BeanStoreConfig,
///     BoundBeanStore, ContextualInstance, MapAttributeStore, NamingScheme, SimpleNamingScheme,
/// };
/// use std::sync::Arc;
///
/// # fn main() -> reinhardt_beanstore::BeanStoreResult<()> {
/// let session = MapAttributeStore::new();
/// let naming = Arc::new(SimpleNamingScheme::new("http.session")?);
/// let store = AttributeBeanStore::new(naming.clone(), session.clone(), BeanStoreConfig::new());
///
/// store.attach()?;
/// let id = BeanIdentifier::new("cart");
/// store.put(id.clone(), ContextualInstance::new(id.clone(), 3u8))?;
///
/// assert!(session.attribute(&naming.prefix(&id))?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct AttributeBeanStore<A, L = PrivateLockStore> {
	local: LocalBeanStore,
	naming: Arc<dyn NamingScheme>,
	attributes: A,
	config: BeanStoreConfig,
	attached: AtomicBool,
	locks: L,
	iteration: Mutex<()>,
}

/// Attribute-backed store of a request; requests are handled by one thread,
/// so it does no locking.
pub type RequestBeanStore<A> = AttributeBeanStore<A, NoLocking>;

impl<A: AttributeStore> AttributeBeanStore<A, PrivateLockStore> {
	/// Creates a detached store with its own lock store.
	pub fn new(naming: Arc<dyn NamingScheme>, attributes: A, config: BeanStoreConfig) -> Self {
		Self::with_lock_source(naming, attributes, config, PrivateLockStore::default())
	}
}

impl<A: AttributeStore> AttributeBeanStore<A, NoLocking> {
	/// Creates a detached store whose [`BeanStore::lock`] returns `None`.
	pub fn unlocked(naming: Arc<dyn NamingScheme>, attributes: A, config: BeanStoreConfig) -> Self {
		Self::with_lock_source(naming, attributes, config, NoLocking)
	}
}

impl<A, L> AttributeBeanStore<A, L>
where
	A: AttributeStore,
	L: LockStoreSource<A>,
{
	/// Creates a detached store taking its lock store from `locks`.
	pub fn with_lock_source(
		naming: Arc<dyn NamingScheme>,
		attributes: A,
		config: BeanStoreConfig,
		locks: L,
	) -> Self {
		Self {
			local: LocalBeanStore::new(),
			naming,
			attributes,
			config,
			attached: AtomicBool::new(false),
			locks,
			iteration: Mutex::new(()),
		}
	}

	pub fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
		&self.naming
	}

	pub fn attributes(&self) -> &A {
		&self.attributes
	}

	pub fn config(&self) -> &BeanStoreConfig {
		&self.config
	}

	pub fn is_attribute_lazy_fetching_enabled(&self) -> bool {
		self.config.lazy_fetching
	}

	/// Copies every owned attribute missing from the local cache into it.
	pub fn fetch_uninitialized_attributes(&self) -> BeanStoreResult<()> {
		for key in self.prefixed_attribute_names()? {
			let id = self.naming.deprefix(&key)?;
			if self.local.holds(&id) {
				continue;
			}
			if let Some(instance) = self.fetch_attribute(&key)? {
				tracing::trace!(bean = %id, "Adding detached contextual instance");
				self.local.insert(id, instance);
			}
		}
		Ok(())
	}

	/// Reads the instance stored under `key` in the backing storage.
	pub(crate) fn fetch_attribute(&self, key: &str) -> BeanStoreResult<Option<ContextualInstance>> {
		match self.attributes.attribute(key)? {
			Some(attribute) => attribute
				.downcast::<ContextualInstance>()
				.map(|instance| Some((*instance).clone()))
				.map_err(|_| BeanStoreError::IncompatibleAttribute {
					key: key.to_string(),
				}),
			None => Ok(None),
		}
	}

	fn store_attribute(&self, key: &str, instance: ContextualInstance) -> BeanStoreResult<()> {
		let attribute: Attribute = Arc::new(instance);
		self.attributes.set_attribute(key, attribute)
	}

	/// Removes `id` locally and, while attached, from the backing storage.
	///
	/// On a local miss the backing attribute is read before it is deleted
	/// when `fetch_on_miss` is set, so the caller still receives the instance
	/// it has to destroy.
	pub(crate) fn remove_instance(
		&self,
		id: &BeanIdentifier,
		fetch_on_miss: bool,
	) -> BeanStoreResult<Option<ContextualInstance>> {
		let key = self.naming.prefix(id);
		let mut instance = self.local.take(id);
		if self.is_attached() {
			if instance.is_none() && fetch_on_miss {
				instance = self.fetch_attribute(&key)?;
			}
			self.attributes.remove_attribute(&key)?;
		}
		if instance.is_some() {
			tracing::trace!(bean = %id, "Contextual instance removed");
		}
		Ok(instance)
	}

	/// Names of the backing storage's attributes that this store owns.
	///
	/// The shared lock store of a session is never reported, whatever the
	/// naming scheme accepts.
	fn prefixed_attribute_names(&self) -> BeanStoreResult<Vec<String>> {
		match self.config.iteration {
			IterationMode::Concurrent => {
				let mut names = self
					.attributes
					.attribute_names()?
					.filter(|name| name != LOCK_STORE_KEY);
				Ok(self.naming.filter_ids(&mut names))
			}
			IterationMode::Snapshot => {
				// Only snapshots of this store are serialized; the copy is what
				// protects against writers on the shared backing storage.
				let snapshot: Vec<String> = {
					let _iteration = self.iteration.lock();
					self.attributes
						.attribute_names()?
						.filter(|name| name != LOCK_STORE_KEY)
						.collect()
				};
				Ok(self.naming.filter_ids(&mut snapshot.into_iter()))
			}
		}
	}
}

impl<A, L> BeanStore for AttributeBeanStore<A, L>
where
	A: AttributeStore,
	L: LockStoreSource<A>,
{
	fn get(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>> {
		if let Some(instance) = self.local.instance(id) {
			tracing::trace!(bean = %id, "Contextual instance found");
			return Ok(Some(instance));
		}
		if self.is_attached() && self.config.lazy_fetching {
			let key = self.naming.prefix(id);
			if let Some(instance) = self.fetch_attribute(&key)? {
				tracing::trace!(bean = %id, key = %key, "Contextual instance fetched lazily");
				self.local.insert(id.clone(), instance.clone());
				return Ok(Some(instance));
			}
		}
		Ok(None)
	}

	fn put(&self, id: BeanIdentifier, instance: ContextualInstance) -> BeanStoreResult<()> {
		tracing::trace!(bean = %id, contextual = %instance.bean(), "Adding contextual instance");
		self.local.insert(id.clone(), instance.clone());
		if self.is_attached() {
			self.store_attribute(&self.naming.prefix(&id), instance)?;
		}
		Ok(())
	}

	fn remove(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<ContextualInstance>> {
		self.remove_instance(id, self.config.lazy_fetching)
	}

	fn clear(&self) -> BeanStoreResult<()> {
		let attached = self.is_attached();
		for id in self.ids()? {
			if attached {
				self.attributes.remove_attribute(&self.naming.prefix(&id))?;
			}
			self.local.take(&id);
			tracing::trace!(bean = %id, "Contextual instance removed");
		}
		tracing::debug!(attached, "Bean store cleared");
		Ok(())
	}

	fn ids(&self) -> BeanStoreResult<Vec<BeanIdentifier>> {
		if !self.config.lazy_fetching {
			return Ok(self.local.identifiers());
		}
		let mut ids: HashSet<BeanIdentifier> = self.local.identifiers().into_iter().collect();
		for key in self.prefixed_attribute_names()? {
			ids.insert(self.naming.deprefix(&key)?);
		}
		Ok(ids.into_iter().collect())
	}

	fn lock(&self, id: &BeanIdentifier) -> BeanStoreResult<Option<LockedBean>> {
		Ok(self
			.locks
			.lock_store(&self.attributes)?
			.map(|locks| locks.lock(id)))
	}
}

impl<A, L> BoundBeanStore for AttributeBeanStore<A, L>
where
	A: AttributeStore,
	L: LockStoreSource<A>,
{
	fn attach(&self) -> BeanStoreResult<bool> {
		if self.attached.swap(true, Ordering::AcqRel) {
			return Ok(false);
		}
		tracing::debug!(lazy = self.config.lazy_fetching, "Bean store attached");
		if self.config.sync_on_attach {
			// Detached writes win over whatever the backing storage holds.
			for (id, instance) in self.local.entries() {
				tracing::trace!(bean = %id, "Updating backing storage with contextual instance");
				self.store_attribute(&self.naming.prefix(&id), instance)?;
			}
			if !self.config.lazy_fetching {
				self.fetch_uninitialized_attributes()?;
			}
		}
		Ok(true)
	}

	fn detach(&self) -> bool {
		let was_attached = self.attached.swap(false, Ordering::AcqRel);
		if was_attached {
			tracing::debug!("Bean store detached");
		}
		was_attached
	}

	fn is_attached(&self) -> bool {
		self.attached.load(Ordering::Acquire)
	}
}

impl<A: fmt::Debug, L> fmt::Debug for AttributeBeanStore<A, L> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AttributeBeanStore")
			.field("local", &self.local)
			.field("attributes", &self.attributes)
			.field("config", &self.config)
			.field("attached", &self.attached.load(Ordering::Acquire))
			.finish_non_exhaustive()
	}
}
