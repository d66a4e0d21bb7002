//! Key-value store used by the auth client
//!
//! The client keeps its configuration, session tokens and in-flight values in
//! a [`Store`]. [`SessionStore`] is the stock implementation: it forwards every
//! call to a session-scoped [`SessionStorage`] facility, which lives as long as
//! one browser tab (or, natively, one [`MemorySessionStorage`] value).
//!
//! # Example
//!
//! ```
//! use spa_auth::store::{MemorySessionStorage, SessionStore, Store};
//!
//! # async fn example() -> spa_auth::Result<()> {
//! let store = SessionStore::new(MemorySessionStorage::new());
//! store.set_data("theme", "dark").await?;
//! assert_eq!(store.get_data("theme").await?.as_deref(), Some("dark"));
//! store.remove_data("theme").await?;
//! assert_eq!(store.get_data("theme").await?, None);
//! # Ok(())
//! # }
//! ```

pub mod session;

use async_trait::async_trait;

use crate::error::Result;

/// Store trait required by the auth client
///
/// Values are strings. Every operation is async so that implementations may
/// sit on top of facilities that are not synchronous; [`SessionStore`] itself
/// completes immediately.
#[async_trait]
pub trait Store: Send + Sync {
    /// Save `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// Returns whatever error the backing facility raised
    async fn set_data(&self, key: &str, value: &str) -> Result<()>;

    /// Get the value stored under `key`, or `None` if absent
    ///
    /// # Errors
    /// Returns whatever error the backing facility raised
    async fn get_data(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`; removing an absent key is not an error
    ///
    /// # Errors
    /// Returns whatever error the backing facility raised
    async fn remove_data(&self, key: &str) -> Result<()>;
}

// Blanket implementation for boxed trait objects
#[async_trait]
impl Store for Box<dyn Store> {
    async fn set_data(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_data(key, value).await
    }

    async fn get_data(&self, key: &str) -> Result<Option<String>> {
        (**self).get_data(key).await
    }

    async fn remove_data(&self, key: &str) -> Result<()> {
        (**self).remove_data(key).await
    }
}

pub use session::{MemorySessionStorage, SessionStorage, SessionStore};
