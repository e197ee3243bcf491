//! Contextual instances held by bean stores

use crate::identifier::BeanIdentifier;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A live instance together with the contextual unit that created it.
///
/// The value is type-erased so that one store can hold instances of every
/// bean in a scope. Stores never look inside; callers recover the concrete
/// type with [`ContextualInstance::instance`].
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{BeanIdentifier, ContextualInstance};
///
/// let cart = ContextualInstance::new(BeanIdentifier::new("cart"), vec![1u32, 2, 3]);
///
/// let items = cart.instance::<Vec<u32>>().unwrap();
/// assert_eq!(items.len(), 3);
/// assert!(cart.instance::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct ContextualInstance {
	bean: BeanIdentifier,
	value: Arc<dyn Any + Send + Sync>,
}

impl ContextualInstance {
	/// Wraps `value` as an instance of the contextual unit `bean`.
	pub fn new<T: Any + Send + Sync>(bean: BeanIdentifier, value: T) -> Self {
		Self {
			bean,
			value: Arc::new(value),
		}
	}

	/// Wraps an already shared value.
	pub fn from_arc<T: Any + Send + Sync>(bean: BeanIdentifier, value: Arc<T>) -> Self {
		Self { bean, value }
	}

	/// Identifier of the contextual unit that defined this instance.
	pub fn bean(&self) -> &BeanIdentifier {
		&self.bean
	}

	/// Returns the instance if it is a `T`.
	pub fn instance<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.value.clone().downcast::<T>().ok()
	}

	/// Returns `true` if both handles refer to the same underlying instance.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.value, &other.value)
	}
}

impl fmt::Debug for ContextualInstance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContextualInstance")
			.field("bean", &self.bean)
			.finish_non_exhaustive()
	}
}
