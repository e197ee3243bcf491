//! Identifier index used for compact keys

use crate::identifier::BeanIdentifier;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Bidirectional mapping between identifiers and small integers.
pub trait IdentifierIndex: Send + Sync {
	fn index_of(&self, id: &BeanIdentifier) -> Option<usize>;

	fn identifier_at(&self, index: usize) -> Option<BeanIdentifier>;
}

/// Index over every identifier of a deployment.
///
/// Identifiers are sorted before positions are assigned, so all nodes that
/// register the same beans compute the same index. Until [`build`] is called
/// the index knows no identifier and naming schemes fall back to literal keys.
///
/// [`build`]: BeanIdentifierIndex::build
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{BeanIdentifier, BeanIdentifierIndex, IdentifierIndex};
///
/// let index = BeanIdentifierIndex::new();
/// assert!(index.build(vec![BeanIdentifier::new("b"), BeanIdentifier::new("a")]));
///
/// assert_eq!(index.index_of(&BeanIdentifier::new("a")), Some(0));
/// assert_eq!(index.identifier_at(1), Some(BeanIdentifier::new("b")));
/// ```
#[derive(Debug, Default)]
pub struct BeanIdentifierIndex {
	table: OnceCell<IndexTable>,
}

#[derive(Debug)]
struct IndexTable {
	identifiers: Vec<BeanIdentifier>,
	positions: HashMap<BeanIdentifier, usize>,
	hash: u64,
}

impl BeanIdentifierIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the index from `identifiers`. Duplicates are ignored.
	///
	/// Returns `false` without changing anything if the index was already
	/// built.
	pub fn build(&self, identifiers: impl IntoIterator<Item = BeanIdentifier>) -> bool {
		let mut identifiers: Vec<BeanIdentifier> = identifiers.into_iter().collect();
		identifiers.sort();
		identifiers.dedup();

		let mut built = false;
		self.table.get_or_init(|| {
			built = true;
			let positions = identifiers
				.iter()
				.enumerate()
				.map(|(position, id)| (id.clone(), position))
				.collect();
			let hash = fingerprint(&identifiers);
			tracing::debug!(size = identifiers.len(), hash, "Bean identifier index built");
			IndexTable {
				identifiers,
				positions,
				hash,
			}
		});
		built
	}

	pub fn is_built(&self) -> bool {
		self.table.get().is_some()
	}

	pub fn len(&self) -> usize {
		self.table.get().map_or(0, |table| table.identifiers.len())
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Fingerprint of the ordered identifiers.
	///
	/// Two nodes exchanging index-based keys must agree on this value.
	pub fn hash(&self) -> Option<u64> {
		self.table.get().map(|table| table.hash)
	}
}

impl IdentifierIndex for BeanIdentifierIndex {
	fn index_of(&self, id: &BeanIdentifier) -> Option<usize> {
		self.table.get()?.positions.get(id).copied()
	}

	fn identifier_at(&self, index: usize) -> Option<BeanIdentifier> {
		self.table.get()?.identifiers.get(index).cloned()
	}
}

// FNV-1a, stable across processes and toolchains.
fn fingerprint(identifiers: &[BeanIdentifier]) -> u64 {
	const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
	const PRIME: u64 = 0x0000_0100_0000_01b3;

	identifiers.iter().fold(OFFSET, |hash, id| {
		id.as_str()
			.bytes()
			.chain(std::iter::once(0))
			.fold(hash, |h, byte| (h ^ u64::from(byte)).wrapping_mul(PRIME))
	})
}
