//! Conversation naming scheme

use super::{
	DEFAULT_DELIMITER, IdentifierIndex, NamingScheme, PayloadEncoding, payload, validate_component,
};
use crate::error::{BeanStoreError, BeanStoreResult};
use crate::identifier::BeanIdentifier;
use parking_lot::RwLock;
use std::sync::Arc;

const OPEN: &str = "[";
const CLOSE: &str = "]";

/// Naming scheme for conversation-scoped stores.
///
/// Conversations live inside a session, so the effective prefix combines a
/// base prefix, the session id and the current conversation id:
/// `<base>[<session>][<cid>]`. Only keys of the current conversation are
/// accepted. The conversation id can change while the scheme is in use, for
/// instance when a transient conversation is promoted.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{BeanIdentifier, ConversationNamingScheme, NamingScheme};
///
/// let scheme = ConversationNamingScheme::new("conversation", "s-1", "1").unwrap();
/// let id = BeanIdentifier::new("wizard");
///
/// assert_eq!(scheme.prefix(&id), "conversation[s-1][1]#wizard");
///
/// scheme.set_cid("2").unwrap();
/// assert!(!scheme.accept("conversation[s-1][1]#wizard"));
/// assert!(scheme.accept("conversation[s-1][2]#wizard"));
/// ```
#[derive(Debug)]
pub struct ConversationNamingScheme {
	base: String,
	session_id: String,
	cid: RwLock<String>,
	delimiter: String,
	encoding: PayloadEncoding,
}

impl ConversationNamingScheme {
	pub fn new(
		base: impl Into<String>,
		session_id: impl Into<String>,
		cid: impl Into<String>,
	) -> BeanStoreResult<Self> {
		Self::with_delimiter(base, session_id, cid, DEFAULT_DELIMITER)
	}

	/// Creates a scheme with a custom delimiter.
	///
	/// None of the components may contain the delimiter; the session id and
	/// conversation id may not contain brackets either.
	pub fn with_delimiter(
		base: impl Into<String>,
		session_id: impl Into<String>,
		cid: impl Into<String>,
		delimiter: impl Into<String>,
	) -> BeanStoreResult<Self> {
		let base = base.into();
		let session_id = session_id.into();
		let cid = cid.into();
		let delimiter = delimiter.into();
		validate_component(&base, &delimiter, &[])?;
		validate_component(&session_id, &delimiter, &[OPEN, CLOSE])?;
		validate_component(&cid, &delimiter, &[OPEN, CLOSE])?;
		Ok(Self {
			base,
			session_id,
			cid: RwLock::new(cid),
			delimiter,
			encoding: PayloadEncoding::Literal,
		})
	}

	/// Encodes identifiers known to `index` as their position.
	pub fn with_index(mut self, index: Arc<dyn IdentifierIndex>) -> Self {
		self.encoding = PayloadEncoding::Indexed(index);
		self
	}

	pub fn cid(&self) -> String {
		self.cid.read().clone()
	}

	/// Switches the scheme to another conversation.
	pub fn set_cid(&self, cid: impl Into<String>) -> BeanStoreResult<()> {
		let cid = cid.into();
		validate_component(&cid, &self.delimiter, &[OPEN, CLOSE])?;
		*self.cid.write() = cid;
		Ok(())
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	fn effective_prefix(&self) -> String {
		format!(
			"{}{OPEN}{}{CLOSE}{OPEN}{}{CLOSE}",
			self.base,
			self.session_id,
			self.cid.read()
		)
	}
}

impl NamingScheme for ConversationNamingScheme {
	fn accept(&self, key: &str) -> bool {
		payload(key, &self.effective_prefix(), &self.delimiter).is_some()
	}

	fn prefix(&self, id: &BeanIdentifier) -> String {
		format!(
			"{}{}{}",
			self.effective_prefix(),
			self.delimiter,
			self.encoding.encode(id)
		)
	}

	fn deprefix(&self, key: &str) -> BeanStoreResult<BeanIdentifier> {
		let prefix = self.effective_prefix();
		let payload =
			payload(key, &prefix, &self.delimiter).ok_or_else(|| BeanStoreError::CorruptedKey {
				key: key.to_string(),
			})?;
		self.encoding.decode(key, payload)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::naming::BeanIdentifierIndex;
	use rstest::rstest;

	#[rstest]
	#[case("conv#ersation", "s", "1")]
	#[case("conversation", "s#1", "1")]
	#[case("conversation", "s", "1#")]
	#[case("conversation", "s]", "1")]
	#[case("conversation", "s", "[1")]
	fn test_invalid_components_are_rejected(
		#[case] base: &str,
		#[case] session: &str,
		#[case] cid: &str,
	) {
		// Act
		let result = ConversationNamingScheme::new(base, session, cid);

		// Assert
		assert!(matches!(
			result,
			Err(BeanStoreError::DelimiterInPrefix { .. })
		));
	}

	#[rstest]
	fn test_set_cid_validates() {
		// Arrange
		let scheme = ConversationNamingScheme::new("conversation", "s", "1").unwrap();

		// Act
		let result = scheme.set_cid("2#");

		// Assert
		assert!(result.is_err());
		assert_eq!(scheme.cid(), "1");
	}

	#[rstest]
	fn test_keys_of_other_sessions_are_rejected() {
		// Arrange
		let scheme = ConversationNamingScheme::new("conversation", "s-1", "1").unwrap();

		// Assert
		assert!(scheme.accept("conversation[s-1][1]#cart"));
		assert!(!scheme.accept("conversation[s-2][1]#cart"));
		assert!(!scheme.accept("conversation[s-1][11]#cart"));
	}

	#[rstest]
	fn test_round_trip_after_cid_change() {
		// Arrange
		let scheme = ConversationNamingScheme::new("conversation", "s-1", "1").unwrap();
		let id = BeanIdentifier::new("wizard");
		let old_key = scheme.prefix(&id);

		// Act
		scheme.set_cid("7").unwrap();
		let new_key = scheme.prefix(&id);

		// Assert
		assert_eq!(new_key, "conversation[s-1][7]#wizard");
		assert_eq!(scheme.deprefix(&new_key).unwrap(), id);
		assert!(scheme.deprefix(&old_key).is_err());
	}

	#[rstest]
	fn test_indexed_conversation_keys() {
		// Arrange
		let index = BeanIdentifierIndex::new();
		index.build(vec![BeanIdentifier::new("wizard")]);
		let scheme = ConversationNamingScheme::new("conversation", "s", "3")
			.unwrap()
			.with_index(Arc::new(index));

		// Act
		let known = scheme.prefix(&BeanIdentifier::new("wizard"));
		let unknown = scheme.prefix(&BeanIdentifier::new("cart"));

		// Assert
		assert_eq!(known, "conversation[s][3]#0");
		assert_eq!(unknown, "conversation[s][3]#F_cart");
		assert_eq!(
			scheme.deprefix(&unknown).unwrap(),
			BeanIdentifier::new("cart")
		);
	}
}
