//! Bean store errors

use thiserror::Error;

/// Errors raised by naming schemes, bean stores and their backing storage.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BeanStoreError {
	/// A naming scheme prefix contains its own delimiter.
	///
	/// This is an integration fault: keys produced by such a scheme could not
	/// be told apart from keys of other schemes sharing the backing map.
	#[error("Prefix '{prefix}' must not contain the delimiter '{delimiter}'")]
	DelimiterInPrefix { prefix: String, delimiter: String },

	/// A key does not originate from the naming scheme asked to decode it.
	#[error("Key '{key}' was not produced by this naming scheme")]
	CorruptedKey { key: String },

	/// A key encodes an index the identifier index does not know about.
	#[error("Key '{key}' refers to unknown bean identifier index {index}")]
	UnknownIndex { key: String, index: usize },

	/// An attribute under a key owned by the store holds an unexpected value.
	#[error("Attribute '{key}' does not hold a value of the expected type")]
	IncompatibleAttribute { key: String },

	/// The external attribute storage failed.
	#[error("Attribute storage error: {0}")]
	Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BeanStoreError {
	/// Wraps an error raised by an external attribute storage.
	pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		Self::Backend(err.into())
	}
}

/// Result type for bean store operations.
pub type BeanStoreResult<T> = Result<T, BeanStoreError>;
