//! # schemata-storage
//!
//! The contract between the schema engine and whatever actually stores content.
//!
//! This crate defines the traits and types a content store must provide so that joins can be
//! resolved and CSV imports can look up related records. It does not contain any
//! implementations; those are provided by separate crates.
//!
//! ## Overview
//!
//! - [`ContentManager`] is the capability object for one content type: `get` for instance
//!   records, `get_indexes` for index/summary records, and an optional instance type marker
//!   used to choose between them.
//! - [`ManagerRegistry`] resolves a content type name to a [`Manager`].
//! - [`Criteria`] and [`GetOptions`] describe what to fetch. [`WithJoins`] in the options is
//!   how the caller bounds the manager's own nested join resolution.
//!
//! ## Example
//!
//! ```ignore
//! use schemata_storage::{Criteria, GetOptions, ManagerRegistry, Manager};
//!
//! async fn people(registry: &dyn ManagerRegistry, cx: &RequestContext) -> StorageResult<GetResult> {
//!     let Some(Manager::Dedicated(manager)) = registry.manager("person") else {
//!         return Err(StorageError::unknown_type("person"));
//!     };
//!     manager.get(cx, &Criteria::ids(["123"]), &GetOptions::default()).await
//! }
//! ```

mod error;
mod traits;
mod types;

// Re-export everything from submodules
pub use error::StorageError;
pub use traits::{ContentManager, Manager, ManagerRegistry};
pub use types::{Criteria, GetOptions, GetResult, WithJoins};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared content manager.
pub type DynManager = std::sync::Arc<dyn ContentManager>;

/// Type alias for a shared manager registry.
pub type DynManagers = std::sync::Arc<dyn ManagerRegistry>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use schemata_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::StorageError;
    pub use crate::traits::{ContentManager, Manager, ManagerRegistry};
    pub use crate::types::{Criteria, GetOptions, GetResult, WithJoins};
    pub use crate::{DynManager, DynManagers, StorageResult};
}
