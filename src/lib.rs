//! # Reinhardt Contexts
//!
//! Scoped contextual-instance storage for Reinhardt dependency injection.
//!
//! Each scope (request, session, conversation, application) keeps the live
//! instances created for its beans in a bean store. Stores can be bound to an
//! external attribute map such as an HTTP session so that instances survive
//! across requests and are shared between concurrent requests of one session.
//!
//! ## Feature Flags
//!
//! - `beanstore` (default) - Bean stores, naming schemes and lock stores
//!
//! ## Example
//!
//! ```rust
//! # #[cfg(feature = "beanstore")]
//! # fn main() -> reinhardt_contexts::beanstore::BeanStoreResult<()> {
//! use reinhardt_contexts::beanstore::{
//!     BeanIdentifier, BeanStore, BeanStoreConfig, BoundBeanStore, ContextualInstance,
//!     MapAttributeStore, SessionBeanStore, SimpleNamingScheme,
//! };
//! use std::sync::Arc;
//!
//! let naming = Arc::new(SimpleNamingScheme::new("http.session")?);
//! let store = SessionBeanStore::new(naming, MapAttributeStore::new(), BeanStoreConfig::new());
//! store.attach()?;
//!
//! let id = BeanIdentifier::new("preferences");
//! store.put(id.clone(), ContextualInstance::new(id.clone(), 42u32))?;
//! assert!(store.contains(&id)?);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "beanstore"))]
//! # fn main() {}
//! ```

#[cfg(feature = "beanstore")]
pub mod beanstore;

#[cfg(feature = "beanstore")]
pub use beanstore::{
	BeanIdentifier, BeanStore, BeanStoreConfig, BeanStoreError, BeanStoreResult, BoundBeanStore,
	ContextualInstance,
};
