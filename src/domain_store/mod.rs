//! Domain storage.
//!
//! Supports a generic interface for persisting [`Domain`]s by id, and for looking them up by
//! verification token.
//!
//! Two implementations are provided, [`memory::InMemoryDomainStore`] and
//! [`file::FileDomainStore`]. The former is not durable across restarts. The latter will write its
//! state to disk for each update and load this state again on startup.

use crate::domain::Domain;
use crate::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod file;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use file::FileDomainStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryDomainStore;

/// `DynDomainStore` is a type alias for a [`DomainStore`] that can be used by multiple read/write
/// consumers that coordinate through an [`Arc`] and a [`RwLock`] wrapping the [`DomainStore`].
#[allow(clippy::module_name_repetitions)]
pub type DynDomainStore = Arc<RwLock<dyn DomainStore + Send + Sync>>;

/// An async trait describing storage of [`Domain`]s.
///
/// Verification tokens are unique across the store.
#[async_trait::async_trait]
pub trait DomainStore {
    /// Insert or replace the domain with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateVerificationToken`] if another domain already uses the
    /// domain's verification token.
    async fn put(&mut self, domain: Domain) -> Result<(), Error>;

    /// Get the domain with the given id (if any).
    async fn get(&self, id: &Uuid) -> Option<Domain>;

    /// Get the domain using the given verification token (if any).
    async fn find_by_token(&self, token: &str) -> Option<Domain>;

    /// Get every stored domain, ordered by name.
    async fn list(&self) -> Vec<Domain>;
}
