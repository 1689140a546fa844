//! Filesystem-backed collaborators used by the command line tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

use super::{MapQueue, MapStorage, Notifier, Playlist};

/// Stores maps below a root directory
#[derive(Debug, Clone)]
pub struct FsStorage {
    pub root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MapStorage for FsStorage {
    async fn exists(&self, dir: &Path) -> Result<bool> {
        Ok(fs::try_exists(self.root.join(dir)).await?)
    }

    async fn mkdir(&self, dir: &Path) -> Result<()> {
        let path = self.root.join(dir);
        fs::create_dir_all(&path)
            .await
            .with_context(|| format!("creating {}", path.display()))
    }

    async fn write_map(&self, file: &Path, content: &[u8]) -> Result<()> {
        let path = self.root.join(file);
        // tmp -> rename, a partial map is never visible under its final name
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))
    }
}

/// Treats every map file in `<root>/<target_dir>` as part of the playlist.
#[derive(Debug)]
pub struct DirectoryPlaylist {
    root: PathBuf,
    target_dir: PathBuf,
    added: Mutex<Vec<PathBuf>>,
}

impl DirectoryPlaylist {
    pub fn new(root: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), target_dir: target_dir.into(), added: Mutex::new(Vec::new()) }
    }

    /// Files registered during this run
    pub async fn added(&self) -> Vec<PathBuf> {
        self.added.lock().await.clone()
    }
}

impl Playlist for DirectoryPlaylist {
    async fn has_map(&self, map_uid: &str) -> bool {
        let file = self.root.join(&self.target_dir).join(format!("{}.Map.Gbx", map_uid));
        fs::try_exists(file).await.unwrap_or(false)
    }

    async fn add_map(&self, file: &Path) -> Result<bool> {
        if !fs::try_exists(self.root.join(file)).await? {
            return Ok(false);
        }
        self.added.lock().await.push(file.to_path_buf());
        Ok(true)
    }

    async fn refresh(&self) -> Result<()> {
        let added = self.added.lock().await.len();
        info!(added, "playlist refreshed");
        Ok(())
    }
}

/// Writes notifications to the log, stripping game text formatting codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) {
        info!("{}", strip_format_codes(message));
    }
}

/// Queue stand-in that only logs what would be queued
#[derive(Debug, Clone, Copy, Default)]
pub struct LogQueue;

impl MapQueue for LogQueue {
    async fn enqueue(&self, actor: &str, map_uid: &str) -> Result<()> {
        info!(actor, map_uid, "map queued");
        Ok(())
    }
}

/// Removes `$`-prefixed formatting codes (`$fff`, `$<`, `$>`, `$o` ...); `$$` is a literal dollar.
pub fn strip_format_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('$') => out.push('$'),
            Some(h) if h.is_ascii_hexdigit() => {
                // colour codes take three hex digits
                for _ in 0..2 {
                    if chars.peek().is_some_and(|n| n.is_ascii_hexdigit()) {
                        chars.next();
                    }
                }
            }
            _ => {}
        }
    }
    out
}
