//! Guardian Store - persistence contracts and backends.
//!
//! The lifecycle engine only ever talks to the repository traits defined
//! here ([`AppealRepository`], [`ResourceStore`], [`PolicyStore`],
//! [`ProviderStore`]). Two backends implement them:
//!
//! - **In-memory** ([`memory`]): `RwLock`-guarded maps. Used by tests and
//!   single-process embedded deployments.
//! - **`SurrealDB`** ([`db`] + [`surreal`], behind the **`db`** feature):
//!   an embedded document engine (`mem://` in tests). `Database::migrate()`
//!   bootstraps tables and indexes.
//!
//! Both backends close the intake duplicate race: `bulk_insert` re-checks
//! the `(appellant, resource, role, pending)` tuple atomically — under the
//! write lock in memory, inside a transaction on `SurrealDB` — and fails
//! the whole batch with [`StorageError::Conflict`] on collision.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod memory;
pub mod repository;

#[cfg(feature = "db")]
pub mod db;
#[cfg(feature = "db")]
pub mod surreal;

pub use error::{StorageError, StorageResult};
pub use memory::{
    MemoryAppealRepository, MemoryPolicyStore, MemoryProviderStore, MemoryResourceStore,
};
pub use repository::{AppealFilter, AppealRepository, PolicyStore, ProviderStore, ResourceStore};

#[cfg(feature = "db")]
pub use db::Database;
#[cfg(feature = "db")]
pub use surreal::{
    SurrealAppealRepository, SurrealPolicyStore, SurrealProviderStore, SurrealResourceStore,
};
