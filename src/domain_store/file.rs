//! An JSON file-backed implementation of the [`DomainStore`][super::DomainStore] trait.
//!
//! Wraps a [`InMemoryDomainStore`][super::memory::InMemoryDomainStore] instance, persisting
//! updates to a JSON file on disk that can be reloaded across restarts.
use crate::domain::Domain;
use crate::domain_store::memory::InMemoryDomainStore;
use crate::domain_store::DomainStore;
use crate::error::Error;
use std::io::ErrorKind;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// An file-backed implementation of a domain store. After each update a JSON file on disk is
/// replaced with the new data. This file can be reloaded across restarts to avoid losing state.
///
/// Wraps a [`InMemoryDomainStore`][super::memory::InMemoryDomainStore], operating the same way
/// except for maintaining state beyond in-memory. An update only becomes visible in memory once
/// it has been written to disk.
#[derive(Default, Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileDomainStore {
    domain_store: InMemoryDomainStore,
    path: String,
}

impl FileDomainStore {
    /// Save the state of the domain store as JSON to the store's configured path, or return an
    /// Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if a domain in the store can't be serialized to JSON.
    ///
    /// Returns [`Error::IO`] if the serialized store state can't be written to the backing file
    /// path.
    pub async fn save(&self) -> Result<(), Error> {
        write_state(&self.path, &self.domain_store).await
    }

    /// Load a [`FileDomainStore`] from the JSON domain state located at the given path, creating
    /// an empty state file if there is none, or return an Error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidJSON`] if the JSON state file is invalid.
    ///
    /// Returns [`Error::IO`] if the path can't be opened or read.
    pub async fn try_from_file(p: &str) -> Result<Self, Error> {
        let domain_store = match fs::read(p).await {
            Ok(contents) => serde_json::from_slice(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("creating empty domain store at {p}");
                let empty = InMemoryDomainStore::default();
                write_state(p, &empty).await?;
                empty
            }
            Err(err) => return Err(Error::IO(err)),
        };
        Ok(Self {
            path: p.to_string(),
            domain_store,
        })
    }
}

/// Write `state` next to `path` and rename it over `path`, so a failed or interrupted write
/// leaves the previous state file intact.
async fn write_state(path: &str, state: &InMemoryDomainStore) -> Result<(), Error> {
    let data = serde_json::to_string_pretty(state)?;
    let staging = format!("{path}.tmp");

    let mut output_file = fs::File::create(&staging).await?;
    output_file.write_all(data.as_bytes()).await?;
    output_file.sync_all().await?;
    drop(output_file);

    if let Err(err) = fs::rename(&staging, path).await {
        if let Err(cleanup) = fs::remove_file(&staging).await {
            tracing::warn!("failed to remove {staging}: {cleanup}");
        }
        return Err(Error::IO(err));
    }
    Ok(())
}

#[async_trait::async_trait]
impl DomainStore for FileDomainStore {
    async fn put(&mut self, domain: Domain) -> Result<(), Error> {
        let mut updated = self.domain_store.clone();
        updated.put(domain).await?;
        write_state(&self.path, &updated).await?;
        self.domain_store = updated;
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Option<Domain> {
        self.domain_store.get(id).await
    }

    async fn find_by_token(&self, token: &str) -> Option<Domain> {
        self.domain_store.find_by_token(token).await
    }

    async fn list(&self) -> Vec<Domain> {
        self.domain_store.list().await
    }
}
