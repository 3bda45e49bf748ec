//! Key/value storage areas backing the session
//!
//! [`MemoryStorage`] is the per-tab area: it lives and dies with the client
//! instance. [`FileStorage`] is the long-lived area older releases kept the
//! session in; the client only ever purges it.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    /// Stored value, or `None` when absent or unreadable
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    /// Removing a missing key is not an error
    fn remove_item(&self, key: &str) -> AppResult<()>;
}
