mod file;
#[cfg(test)]
mod tests;

use std::collections::HashSet;

use async_trait::async_trait;
pub use file::FileUserStore;
use mockall::automock;
use teloxide::types::ChatId;
use thiserror::Error;

/// Errors of the user store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store file exists but could not be read.
    #[error("Failed to read user store {path}: {source}")]
    Read {
        /// Path of the store file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The store file could not be written.
    #[error("Failed to write user store {path}: {source}")]
    Write {
        /// Path of the store file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Result type of the user store.
pub type StorageResult<T> = Result<T, StorageError>;

/// The set of chats that have talked to the bot.
#[automock]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load every known chat id. An empty set is returned if nothing was
    /// stored yet.
    async fn load(&self) -> StorageResult<HashSet<ChatId>>;

    /// Record a chat id. Returns `true` if the id was not known before.
    async fn save(&self, chat_id: ChatId) -> StorageResult<bool>;
}
