//! A JSON array document on disk mirrored by an in-memory copy.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use wastelog_core::ports::StoreError;

pub(crate) struct JsonCollection<T> {
    path: PathBuf,
    items: RwLock<Vec<T>>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Load the document at `path`, starting empty when it does not exist yet.
    pub(crate) async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let items: Vec<T> = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        log::debug!("loaded {} documents from {}", items.len(), path.display());

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    pub(crate) async fn read<R>(&self, view: impl FnOnce(&[T]) -> R) -> R {
        let items = self.items.read().await;
        view(&items)
    }

    /// Apply `change` to a copy, write the copy to disk, then publish it.
    ///
    /// Readers see either the old or the new contents, never a partial edit,
    /// and a failed write leaves both memory and disk untouched.
    pub(crate) async fn update<R>(
        &self,
        change: impl FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut items = self.items.write().await;
        let mut next = items.clone();
        let outcome = change(&mut next)?;
        self.persist(&next).await?;
        *items = next;
        Ok(outcome)
    }

    async fn persist(&self, items: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(items)?;
        let staging = self.path.with_extension("json.tmp");

        let mut file = File::create(&staging).await?;
        file.write_all(&bytes).await?;
        // Contents must be durable before the rename makes them visible.
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}
