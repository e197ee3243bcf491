//! Bean identifiers

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a contextual unit.
///
/// One identifier exists per injectable definition per deployment. It is
/// created once when the definition is registered and compared by value
/// afterwards. Cloning only bumps a reference count.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::BeanIdentifier;
///
/// let id = BeanIdentifier::new("bean-42");
/// assert_eq!(id.as_str(), "bean-42");
/// assert_eq!(id, BeanIdentifier::from("bean-42"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeanIdentifier(Arc<str>);

impl BeanIdentifier {
	/// Creates an identifier from its string form.
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	/// Returns the string form of this identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for BeanIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("BeanIdentifier").field(&&*self.0).finish()
	}
}

impl fmt::Display for BeanIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for BeanIdentifier {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for BeanIdentifier {
	fn from(id: String) -> Self {
		Self::new(id)
	}
}

impl AsRef<str> for BeanIdentifier {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for BeanIdentifier {
	fn borrow(&self) -> &str {
		&self.0
	}
}
