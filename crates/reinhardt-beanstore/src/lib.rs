//! # Reinhardt Bean Store
//!
//! Storage of scoped contextual instances for Reinhardt dependency injection.
//!
//! Each scope instance (a request, a session, a conversation, the
//! application) holds the live instances created for its beans in a
//! [`BeanStore`]. This crate provides:
//!
//! - **Naming schemes**: prefixed keys so several logical stores share one
//!   physical attribute map ([`SimpleNamingScheme`],
//!   [`ConversationNamingScheme`], optionally compacted by a
//!   [`BeanIdentifierIndex`])
//! - **Lock store**: reference-counted per-bean creation locks
//!   ([`LockStore`])
//! - **Local store**: a plain in-memory map ([`LocalBeanStore`])
//! - **Attribute-backed store**: write-through cache over external storage
//!   with attach/detach and lazy fetching ([`AttributeBeanStore`])
//! - **Session store**: shares its lock store through the session itself
//!   ([`SessionBeanStore`])
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_beanstore::{
//!     BeanIdentifier, BeanStore, BeanStoreConfig, BoundBeanStore, ContextualInstance,
//!     MapAttributeStore, SessionBeanStore, SimpleNamingScheme,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> reinhardt_beanstore::BeanStoreResult<()> {
//! let session = MapAttributeStore::new();
//! let naming = Arc::new(SimpleNamingScheme::new("http.session")?);
//! let store = SessionBeanStore::new(naming, session, BeanStoreConfig::new());
//! store.attach()?;
//!
//! let id = BeanIdentifier::new("shopping-cart");
//! if let Some(_locked) = store.lock(&id)? {
//!     if !store.contains(&id)? {
//!         store.put(id.clone(), ContextualInstance::new(id.clone(), Vec::<String>::new()))?;
//!     }
//! }
//!
//! // Scope end: destroy instances, then clear.
//! for id in store.ids()? {
//!     let _instance = store.get(&id)?;
//! }
//! store.clear()?;
//! # Ok(())
//! # }
//! ```

pub mod attribute;
pub mod attributes;
pub mod config;
pub mod error;
pub mod identifier;
pub mod instance;
pub mod local;
pub mod lock_store;
pub mod naming;
pub mod session;
pub mod store;

pub use attribute::{
	AttributeBeanStore, LockStoreSource, NoLocking, PrivateLockStore, RequestBeanStore,
};
pub use attributes::{Attribute, AttributeNames, AttributeStore, MapAttributeStore};
pub use config::{BeanStoreConfig, IterationMode};
pub use error::{BeanStoreError, BeanStoreResult};
pub use identifier::BeanIdentifier;
pub use instance::ContextualInstance;
pub use local::LocalBeanStore;
pub use lock_store::{LockStore, LockedBean};
pub use naming::{
	BeanIdentifierIndex, ConversationNamingScheme, DEFAULT_DELIMITER, IdentifierIndex,
	LITERAL_FLAG, NamingScheme, SimpleNamingScheme,
};
pub use session::{LOCK_STORE_KEY, SessionBeanStore, SessionLockStore};
pub use store::{BeanStore, BoundBeanStore};
