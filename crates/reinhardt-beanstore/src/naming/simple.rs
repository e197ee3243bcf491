//! Fixed-prefix naming scheme

use super::{
	DEFAULT_DELIMITER, IdentifierIndex, NamingScheme, PayloadEncoding, payload, validate_component,
};
use crate::error::{BeanStoreError, BeanStoreResult};
use crate::identifier::BeanIdentifier;
use std::sync::Arc;

/// Naming scheme with a fixed prefix.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{BeanIdentifier, NamingScheme, SimpleNamingScheme};
///
/// let scheme = SimpleNamingScheme::new("http.session").unwrap();
/// let id = BeanIdentifier::new("bean-42");
///
/// assert_eq!(scheme.prefix(&id), "http.session#bean-42");
/// assert_eq!(scheme.deprefix("http.session#bean-42").unwrap(), id);
/// assert!(!scheme.accept("http.request#bean-42"));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleNamingScheme {
	prefix: String,
	delimiter: String,
	encoding: PayloadEncoding,
}

impl SimpleNamingScheme {
	/// Creates a scheme using [`DEFAULT_DELIMITER`].
	pub fn new(prefix: impl Into<String>) -> BeanStoreResult<Self> {
		Self::with_delimiter(prefix, DEFAULT_DELIMITER)
	}

	/// Creates a scheme with a custom delimiter.
	///
	/// Fails with [`BeanStoreError::DelimiterInPrefix`] if the prefix
	/// contains the delimiter or the delimiter is empty.
	pub fn with_delimiter(
		prefix: impl Into<String>,
		delimiter: impl Into<String>,
	) -> BeanStoreResult<Self> {
		let prefix = prefix.into();
		let delimiter = delimiter.into();
		validate_component(&prefix, &delimiter, &[])?;
		Ok(Self {
			prefix,
			delimiter,
			encoding: PayloadEncoding::Literal,
		})
	}

	/// Encodes identifiers known to `index` as their position.
	pub fn with_index(mut self, index: Arc<dyn IdentifierIndex>) -> Self {
		self.encoding = PayloadEncoding::Indexed(index);
		self
	}

	pub fn prefix_str(&self) -> &str {
		&self.prefix
	}

	pub fn delimiter(&self) -> &str {
		&self.delimiter
	}
}

impl NamingScheme for SimpleNamingScheme {
	fn accept(&self, key: &str) -> bool {
		payload(key, &self.prefix, &self.delimiter).is_some()
	}

	fn prefix(&self, id: &BeanIdentifier) -> String {
		format!(
			"{}{}{}",
			self.prefix,
			self.delimiter,
			self.encoding.encode(id)
		)
	}

	fn deprefix(&self, key: &str) -> BeanStoreResult<BeanIdentifier> {
		let payload =
			payload(key, &self.prefix, &self.delimiter).ok_or_else(|| BeanStoreError::CorruptedKey {
				key: key.to_string(),
			})?;
		self.encoding.decode(key, payload)
	}
}
