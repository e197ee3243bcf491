//! Bean store module.
//!
//! This module provides storage for scoped contextual instances.
//!
//! # Examples
//!
//! ```rust,no_run
//! use reinhardt_contexts::beanstore::{LocalBeanStore, SessionBeanStore, SimpleNamingScheme};
//! ```

#[cfg(feature = "beanstore")]
pub use reinhardt_beanstore::*;
