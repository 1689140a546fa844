//! Add-maps workflow: look maps up, download them into storage, register them
//! in the playlist and tell the players about it.
//!
//! The game server side is reached through the collaborator traits below; one
//! failing map never stops the remaining ones.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{debug, error, info};

use crate::client::{MapInfo, TokenClient};

pub mod local;

pub const SERVICE_LABEL: &str = "NadeoServices";

/// Where downloaded map files are written
pub trait MapStorage {
    fn exists(&self, dir: &Path) -> impl Future<Output = Result<bool>> + Send;
    fn mkdir(&self, dir: &Path) -> impl Future<Output = Result<()>> + Send;
    fn write_map(&self, file: &Path, content: &[u8]) -> impl Future<Output = Result<()>> + Send;
}

/// Map list of the game server
pub trait Playlist {
    fn has_map(&self, map_uid: &str) -> impl Future<Output = bool> + Send;
    /// `Ok(false)` when the server refused the file
    fn add_map(&self, file: &Path) -> impl Future<Output = Result<bool>> + Send;
    fn refresh(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Optional queue for playing freshly added maps next
pub trait MapQueue {
    fn enqueue(&self, actor: &str, map_uid: &str) -> impl Future<Output = Result<()>> + Send;
}

/// User-facing notifications
pub trait Notifier {
    fn notify(&self, message: &str) -> impl Future<Output = ()> + Send;
}

/// Placeholder queue type for importers without a queue
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQueue;

impl MapQueue for NoQueue {
    async fn enqueue(&self, _actor: &str, _map_uid: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: Vec<String>,
    /// `(map uid, reason)`
    pub failed: Vec<(String, String)>,
}

pub struct MapImporter<'a, S, P, N, Q = NoQueue> {
    client: &'a TokenClient,
    storage: S,
    playlist: P,
    notifier: N,
    queue: Option<Q>,
    target_dir: PathBuf,
}

impl<'a, S, P, N> MapImporter<'a, S, P, N, NoQueue>
where
    S: MapStorage,
    P: Playlist,
    N: Notifier,
{
    pub fn new(client: &'a TokenClient, storage: S, playlist: P, notifier: N, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            storage,
            playlist,
            notifier,
            queue: None,
            target_dir: target_dir.into(),
        }
    }
}

impl<'a, S, P, N, Q> MapImporter<'a, S, P, N, Q>
where
    S: MapStorage,
    P: Playlist,
    N: Notifier,
    Q: MapQueue,
{
    /// Enqueue every added map for `actor` after importing
    pub fn with_queue<Q2: MapQueue>(self, queue: Q2) -> MapImporter<'a, S, P, N, Q2> {
        MapImporter {
            client: self.client,
            storage: self.storage,
            playlist: self.playlist,
            notifier: self.notifier,
            queue: Some(queue),
            target_dir: self.target_dir,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn playlist(&self) -> &P {
        &self.playlist
    }

    pub async fn add_maps<T: AsRef<str>>(&self, actor: &str, map_uids: &[T]) -> ImportReport {
        let infos = self.client.get_map_infos(map_uids).await;
        let mut report = ImportReport::default();

        if let Err(e) = self.ensure_target_dir().await {
            error!(dir = %self.target_dir.display(), error = %e, "failed to prepare map directory");
        }

        for info in &infos {
            match self.add_map(info).await {
                Ok(()) => {
                    report.added.push(info.map_uid.clone());
                    let message = format!(
                        "$ff0Admin $<$fff{}$> has added{} the map $<$fff{}$> from {}...",
                        actor,
                        if self.queue.is_some() { " and juked" } else { "" },
                        info.name,
                        SERVICE_LABEL
                    );
                    self.notifier.notify(&message).await;
                }
                Err(e) => {
                    error!(map_uid = %info.map_uid, error = %e, "map not added");
                    self.notifier
                        .notify(&format!("$ff0Error: Can't add map $<$fff{}$>, Error: {}", info.name, e))
                        .await;
                    report.failed.push((info.map_uid.clone(), e.to_string()));
                }
            }
        }

        if let Err(e) = self.playlist.refresh().await {
            debug!(error = %e, "playlist refresh failed");
        }

        if let Some(queue) = &self.queue {
            for map_uid in &report.added {
                if let Err(e) = queue.enqueue(actor, map_uid).await {
                    error!(map_uid = %map_uid, error = %e, "failed to enqueue map");
                }
            }
        }

        info!(added = report.added.len(), failed = report.failed.len(), "map import finished");
        report
    }

    async fn ensure_target_dir(&self) -> Result<()> {
        if !self.storage.exists(&self.target_dir).await? {
            self.storage.mkdir(&self.target_dir).await?;
        }
        Ok(())
    }

    async fn add_map(&self, info: &MapInfo) -> Result<()> {
        if self.playlist.has_map(&info.map_uid).await {
            bail!("Map is already in playlist, skipping download");
        }

        let download = self.client.download(&info.file_url).await?;
        if !download.is_success() {
            bail!("Download failed with status {}", download.status());
        }
        let content = download.bytes().await?;

        let file = self.target_dir.join(info.file_name());
        self.storage.write_map(&file, &content).await?;

        if !self.playlist.add_map(&file).await? {
            bail!("Unknown error while adding the map");
        }
        Ok(())
    }
}
