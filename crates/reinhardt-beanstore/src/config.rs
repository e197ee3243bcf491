//! Bean store settings

use serde::{Deserialize, Serialize};

/// How an attribute-backed store walks the names of its backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationMode {
	/// The backing storage tolerates modification while its names are being
	/// iterated, so names are consumed directly.
	Concurrent,
	/// Names are copied into a snapshot before they are processed.
	///
	/// The copy is what guards against other writers on the backing storage.
	/// The store's iteration mutex only serializes snapshots taken by that
	/// one store.
	#[default]
	Snapshot,
}

/// Behaviour switches of an attribute-backed bean store.
///
/// Every field has a default, so the settings can be embedded partially in a
/// configuration file.
///
/// # Examples
///
/// ```
/// use reinhardt_beanstore::{BeanStoreConfig, IterationMode};
///
/// let config: BeanStoreConfig = serde_json::from_str(r#"{"lazy_fetching": true}"#).unwrap();
/// assert!(config.lazy_fetching);
/// assert!(config.sync_on_attach);
/// assert_eq!(config.iteration, IterationMode::Snapshot);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeanStoreConfig {
	/// Fetch instances from the backing storage on first access instead of
	/// mirroring the whole backing storage when attaching.
	pub lazy_fetching: bool,
	/// Synchronize the local cache with the backing storage when attaching.
	pub sync_on_attach: bool,
	/// Iteration strategy over the backing storage's names.
	pub iteration: IterationMode,
}

impl BeanStoreConfig {
	/// Creates the default settings: eager fetching, synchronization on
	/// attach and snapshot iteration.
	pub fn new() -> Self {
		Self {
			lazy_fetching: false,
			sync_on_attach: true,
			iteration: IterationMode::Snapshot,
		}
	}

	pub fn with_lazy_fetching(mut self, enabled: bool) -> Self {
		self.lazy_fetching = enabled;
		self
	}

	pub fn with_sync_on_attach(mut self, enabled: bool) -> Self {
		self.sync_on_attach = enabled;
		self
	}

	pub fn with_iteration(mut self, mode: IterationMode) -> Self {
		self.iteration = mode;
		self
	}
}

impl Default for BeanStoreConfig {
	fn default() -> Self {
		Self::new()
	}
}
