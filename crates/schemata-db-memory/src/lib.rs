//! In-memory content managers.
//!
//! [`MemoryManager`] keeps the records of one content type (or of many, when used as a
//! generic manager) in insertion order and answers [`Criteria`] queries by scanning them.
//! Given a schema, it resolves that schema's joins on the records it returns, honoring the
//! caller's `withJoins`, the same way a persistent backend would.
//!
//! [`MemoryManagers`] is the matching [`ManagerRegistry`].
//!
//! # Example
//!
//! ```ignore
//! use schemata_db_memory::{MemoryManager, MemoryManagers};
//!
//! let managers = MemoryManagers::new();
//! let people = managers.register_dedicated("person", MemoryManager::new("person"));
//! people.insert(json!({"title": "Ada Lovelace"})).await?;
//! ```
//!
//! [`Criteria`]: schemata_storage::Criteria
//! [`ManagerRegistry`]: schemata_storage::ManagerRegistry

pub mod manager;
pub mod registry;

pub use manager::{INDEX_FIELDS, MemoryManager};
pub use registry::MemoryManagers;
