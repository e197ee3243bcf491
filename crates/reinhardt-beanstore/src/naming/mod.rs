//! Naming schemes
//!
//! Several logical bean stores can share one physical attribute map (a
//! session, for instance). A naming scheme turns a [`BeanIdentifier`] into a
//! key carrying the store's prefix, decodes such keys back, and recognizes
//! which keys of the shared map belong to its store.
//!
//! Keys have the shape `<prefix><delimiter><payload>`. The payload is either
//! the identifier itself or, when an [`IdentifierIndex`] is available, the
//! identifier's position in that index. Identifiers missing from the index
//! are written as [`LITERAL_FLAG`] followed by the identifier, so decoding
//! never depends on the index being complete.

mod conversation;
mod index;
mod simple;

pub use conversation::ConversationNamingScheme;
pub use index::{BeanIdentifierIndex, IdentifierIndex};
pub use simple::SimpleNamingScheme;

use crate::error::{BeanStoreError, BeanStoreResult};
use crate::identifier::BeanIdentifier;
use std::fmt;
use std::sync::Arc;

/// Delimiter separating a scheme's prefix from the payload.
pub const DEFAULT_DELIMITER: &str = "#";

/// Marks a payload holding a literal identifier in index-based keys.
///
/// The flag is not numeric, so it never collides with an index payload.
pub const LITERAL_FLAG: &str = "F_";

/// Prefixing strategy of one logical bean store.
///
/// Implementations guarantee `deprefix(&prefix(id)) == id` and reject keys
/// that belong to other schemes sharing the same backing map.
pub trait NamingScheme: Send + Sync {
	/// Returns `true` if `key` belongs to this scheme.
	fn accept(&self, key: &str) -> bool;

	/// Builds the key under which `id` is stored.
	fn prefix(&self, id: &BeanIdentifier) -> String;

	/// Recovers the identifier stored under `key`.
	fn deprefix(&self, key: &str) -> BeanStoreResult<BeanIdentifier>;

	fn prefix_all(&self, ids: &[BeanIdentifier]) -> Vec<String> {
		ids.iter().map(|id| self.prefix(id)).collect()
	}

	fn deprefix_all(&self, keys: &[String]) -> BeanStoreResult<Vec<BeanIdentifier>> {
		keys.iter().map(|key| self.deprefix(key)).collect()
	}

	/// Retains the keys this scheme owns.
	fn filter_ids(&self, keys: &mut dyn Iterator<Item = String>) -> Vec<String> {
		keys.filter(|key| self.accept(key)).collect()
	}
}

impl<N: NamingScheme + ?Sized> NamingScheme for Arc<N> {
	fn accept(&self, key: &str) -> bool {
		(**self).accept(key)
	}

	fn prefix(&self, id: &BeanIdentifier) -> String {
		(**self).prefix(id)
	}

	fn deprefix(&self, key: &str) -> BeanStoreResult<BeanIdentifier> {
		(**self).deprefix(key)
	}
}

/// How the payload of a key encodes the identifier.
#[derive(Clone, Default)]
pub(crate) enum PayloadEncoding {
	#[default]
	Literal,
	Indexed(Arc<dyn IdentifierIndex>),
}

impl PayloadEncoding {
	pub(crate) fn encode(&self, id: &BeanIdentifier) -> String {
		match self {
			Self::Literal => id.as_str().to_string(),
			Self::Indexed(index) => match index.index_of(id) {
				Some(position) => position.to_string(),
				None => format!("{LITERAL_FLAG}{id}"),
			},
		}
	}

	pub(crate) fn decode(&self, key: &str, payload: &str) -> BeanStoreResult<BeanIdentifier> {
		match self {
			Self::Literal => Ok(BeanIdentifier::from(payload)),
			Self::Indexed(index) => {
				if let Some(literal) = payload.strip_prefix(LITERAL_FLAG) {
					return Ok(BeanIdentifier::from(literal));
				}
				let position = payload
					.parse::<usize>()
					.map_err(|_| BeanStoreError::CorruptedKey {
						key: key.to_string(),
					})?;
				index
					.identifier_at(position)
					.ok_or_else(|| BeanStoreError::UnknownIndex {
						key: key.to_string(),
						index: position,
					})
			}
		}
	}
}

impl fmt::Debug for PayloadEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal => f.write_str("Literal"),
			Self::Indexed(_) => f.write_str("Indexed"),
		}
	}
}

/// Fails if `component` contains any of the reserved separators.
pub(crate) fn validate_component(
	component: &str,
	delimiter: &str,
	reserved: &[&str],
) -> BeanStoreResult<()> {
	if delimiter.is_empty() || component.contains(delimiter) {
		return Err(BeanStoreError::DelimiterInPrefix {
			prefix: component.to_string(),
			delimiter: delimiter.to_string(),
		});
	}
	if let Some(separator) = reserved.iter().find(|s| component.contains(**s)) {
		return Err(BeanStoreError::DelimiterInPrefix {
			prefix: component.to_string(),
			delimiter: (*separator).to_string(),
		});
	}
	Ok(())
}

/// Returns the payload of `key` if it starts with `prefix` and `delimiter`.
pub(crate) fn payload<'k>(key: &'k str, prefix: &str, delimiter: &str) -> Option<&'k str> {
	key.strip_prefix(prefix)?.strip_prefix(delimiter)
}
