//! Embedded `SurrealDB` engine wrapper.
//!
//! The [`Database`] struct wraps a `SurrealDB` connection used by the
//! durable repository implementations in [`crate::surreal`].
//!
//! # Connection Strings
//!
//! | Mode | Connection | Backend |
//! |------|-----------|---------|
//! | Embedded (deployment) | `surrealkv://path/to/data` | `SurrealKV` |
//! | Embedded (test) | `mem://` | In-memory |
//!
//! # Usage
//!
//! ```rust,ignore
//! use guardian_store::Database;
//!
//! let db = Database::connect_embedded("path/to/data").await?;
//! // or
//! let db = Database::connect_memory().await?;
//! db.migrate().await?;
//! ```

use crate::error::{StorageError, StorageResult};

/// Re-export `SurrealDB` for direct query access when needed.
pub use surrealdb;

/// Schema bootstrap executed by [`Database::migrate`].
///
/// Records are stored under a `data` field so domain ids never collide with
/// the engine's record ids; the indexes mirror the lookups the repositories
/// issue.
const MIGRATE_QUERY: &str = "
    DEFINE TABLE IF NOT EXISTS appeal SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS appeal_resource ON TABLE appeal FIELDS data.resource_id;
    DEFINE INDEX IF NOT EXISTS appeal_status ON TABLE appeal FIELDS data.status;
    DEFINE TABLE IF NOT EXISTS resource SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS policy SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS provider SCHEMALESS;
";

/// `SurrealDB` engine wrapper.
pub struct Database {
    inner: surrealdb::Surreal<surrealdb::engine::any::Any>,
}

impl Database {
    /// Connect to an embedded `SurrealDB` at the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect(endpoint: &str) -> StorageResult<Self> {
        let db: surrealdb::Surreal<surrealdb::engine::any::Any> = surrealdb::Surreal::init();
        db.connect(endpoint)
            .await
            .map_err(|e: surrealdb::Error| StorageError::Connection(e.to_string()))?;
        db.use_ns("guardian")
            .use_db("main")
            .await
            .map_err(|e: surrealdb::Error| StorageError::Connection(e.to_string()))?;
        Ok(Self { inner: db })
    }

    /// Connect to an embedded `SurrealDB` with `SurrealKV` storage.
    ///
    /// Data is persisted to the given directory path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_embedded(path: &str) -> StorageResult<Self> {
        Self::connect(&format!("surrealkv://{path}")).await
    }

    /// Connect to an in-memory `SurrealDB` (for tests).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub async fn connect_memory() -> StorageResult<Self> {
        Self::connect("mem://").await
    }

    /// Bring the schema up: tables and the indexes the repositories rely
    /// on. Idempotent; this is the single operational migrate entry point.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if a definition fails.
    pub async fn migrate(&self) -> StorageResult<()> {
        self.inner
            .query(MIGRATE_QUERY)
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?
            .check()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(())
    }

    /// Get a reference to the underlying `SurrealDB` client.
    #[must_use]
    pub fn client(&self) -> &surrealdb::Surreal<surrealdb::engine::any::Any> {
        &self.inner
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_and_migrate() {
        let db = Database::connect_memory().await.unwrap();
        db.migrate().await.unwrap();
        // Idempotent.
        db.migrate().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_embedded_writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        let db = Database::connect_embedded(path.to_str().unwrap())
            .await
            .unwrap();
        db.migrate().await.unwrap();

        db.client()
            .query("CREATE type::thing('resource', 'probe') SET data = { urn: 'db/1' }")
            .await
            .unwrap()
            .check()
            .unwrap();
        let mut response = db
            .client()
            .query("SELECT VALUE data.urn FROM type::thing('resource', 'probe')")
            .await
            .unwrap();
        let urns: Vec<String> = response.take(0).unwrap();
        assert_eq!(urns, vec!["db/1".to_string()]);
    }
}
