//! External attribute storage
//!
//! Attribute-backed bean stores mirror their instances into an external,
//! string-keyed attribute map such as a session. The map is owned by the
//! surrounding container; the store only needs the narrow
//! [`AttributeStore`] contract.

use crate::error::BeanStoreResult;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Value stored in an attribute map.
pub type Attribute = Arc<dyn Any + Send + Sync>;

/// Iterator over attribute names.
pub type AttributeNames<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// String-keyed external storage.
///
/// Failures are reported as [`BeanStoreError::Backend`] and propagated to
/// the bean store's caller unchanged.
///
/// [`BeanStoreError::Backend`]: crate::BeanStoreError::Backend
pub trait AttributeStore: Send + Sync {
	fn attribute(&self, key: &str) -> BeanStoreResult<Option<Attribute>>;

	fn set_attribute(&self, key: &str, value: Attribute) -> BeanStoreResult<()>;

	fn remove_attribute(&self, key: &str) -> BeanStoreResult<()>;

	/// Names of all attributes, including those owned by other stores.
	///
	/// The iterator may observe the live map; bean stores configured with
	/// [`IterationMode::Snapshot`] copy it before use.
	///
	/// [`IterationMode::Snapshot`]: crate::IterationMode::Snapshot
	fn attribute_names(&self) -> BeanStoreResult<AttributeNames<'_>>;
}

impl<A: AttributeStore + ?Sized> AttributeStore for Arc<A> {
	fn attribute(&self, key: &str) -> BeanStoreResult<Option<Attribute>> {
		(**self).attribute(key)
	}

	fn set_attribute(&self, key: &str, value: Attribute) -> BeanStoreResult<()> {
		(**self).set_attribute(key, value)
	}

	fn remove_attribute(&self, key: &str) -> BeanStoreResult<()> {
		(**self).remove_attribute(key)
	}

	fn attribute_names(&self) -> BeanStoreResult<AttributeNames<'_>> {
		(**self).attribute_names()
	}
}

/// Thread-safe in-process attribute map.
///
/// Clones share the same map, which makes it a stand-in for a session shared
/// by every request of a client.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{AttributeStore, MapAttributeStore};
/// use std::sync::Arc;
///
/// let session = MapAttributeStore::new();
/// let view = session.clone();
///
/// session.set_attribute("locale", Arc::new("en")).unwrap();
/// assert!(view.attribute("locale").unwrap().is_some());
/// ```
#[derive(Clone, Default)]
pub struct MapAttributeStore {
	attributes: Arc<RwLock<HashMap<String, Attribute>>>,
}

impl MapAttributeStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.attributes.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.attributes.read().is_empty()
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.attributes.read().contains_key(key)
	}
}

impl AttributeStore for MapAttributeStore {
	fn attribute(&self, key: &str) -> BeanStoreResult<Option<Attribute>> {
		Ok(self.attributes.read().get(key).cloned())
	}

	fn set_attribute(&self, key: &str, value: Attribute) -> BeanStoreResult<()> {
		self.attributes.write().insert(key.to_string(), value);
		Ok(())
	}

	fn remove_attribute(&self, key: &str) -> BeanStoreResult<()> {
		self.attributes.write().remove(key);
		Ok(())
	}

	fn attribute_names(&self) -> BeanStoreResult<AttributeNames<'_>> {
		let names: Vec<String> = self.attributes.read().keys().cloned().collect();
		Ok(Box::new(names.into_iter()))
	}
}

impl fmt::Debug for MapAttributeStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<String> = self.attributes.read().keys().cloned().collect();
		names.sort();
		f.debug_struct("MapAttributeStore")
			.field("attributes", &names)
			.finish()
	}
}
