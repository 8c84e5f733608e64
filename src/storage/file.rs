use std::{
    collections::HashSet,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use teloxide::types::ChatId;
use tokio::{fs, sync::Mutex};

use super::{StorageError, StorageResult, UserStore};

/// A user store backed by a plain text file with one decimal chat id per line.
///
/// Every `save` reads the whole file and rewrites it when a new id shows up.
/// All access goes through one mutex so concurrent saves can't drop each
/// other's ids.
pub struct FileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileUserStore {
    /// Creates a store backed by the file at `path`. The file is created on the
    /// first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    async fn read_ids(&self) -> StorageResult<HashSet<ChatId>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => return Err(StorageError::Read { path: self.display_path(), source }),
        };

        Ok(parse_ids(&content))
    }

    async fn write_ids(&self, ids: &HashSet<ChatId>) -> StorageResult<()> {
        let write_err = |source| StorageError::Write { path: self.display_path(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        // Write next to the target and rename over it, so a crash mid-write
        // never leaves a truncated file behind.
        let tmp_path = tmp_path_for(&self.path);
        fs::write(&tmp_path, format_ids(ids)).await.map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).await.map_err(write_err)?;

        Ok(())
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn load(&self) -> StorageResult<HashSet<ChatId>> {
        let _guard = self.lock.lock().await;
        self.read_ids().await
    }

    async fn save(&self, chat_id: ChatId) -> StorageResult<bool> {
        let _guard = self.lock.lock().await;

        let mut ids = self.read_ids().await?;
        if !ids.insert(chat_id) {
            return Ok(false);
        }

        self.write_ids(&ids).await?;
        tracing::debug!("Stored new chat {chat_id}, {} known in total", ids.len());

        Ok(true)
    }
}

fn parse_ids(content: &str) -> HashSet<ChatId> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<i64>() {
            Ok(id) => Some(ChatId(id)),
            Err(e) => {
                tracing::warn!("Skipping malformed user store line {line:?}: {e}");
                None
            }
        })
        .collect()
}

fn format_ids(ids: &HashSet<ChatId>) -> String {
    let mut ids: Vec<i64> = ids.iter().map(|id| id.0).collect();
    ids.sort_unstable();
    ids.iter().map(|id| format!("{id}\n")).collect()
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
