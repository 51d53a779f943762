//! DNS lookups used during verification.
//!
//! Supports a generic interface for fetching the `TXT` and `MX` records of a domain, failing with
//! a small fixed vocabulary of [`LookupError`]s so that callers can tell a domain that doesn't
//! exist apart from one that simply has no records of the requested type.
//!
//! Two implementations are provided, [`resolver::ResolverDnsLookup`] and
//! [`memory::InMemoryDnsLookup`]. The former queries real nameservers through
//! [trust-dns-resolver]. The latter answers from a fixed set of records, which is handy for tests
//! and for dry runs loaded from JSON.
//!
//! [trust-dns-resolver]: https://docs.rs/trust-dns-resolver

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod memory;
pub mod resolver;

#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryDnsLookup;
#[allow(clippy::module_name_repetitions)]
pub use resolver::ResolverDnsLookup;

/// `DynDnsLookup` is a type alias for a [`DnsLookup`] shared between concurrent verifications.
#[allow(clippy::module_name_repetitions)]
pub type DynDnsLookup = Arc<dyn DnsLookup + Send + Sync>;

/// A single `MX` answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        MxRecord {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// LookupError enumerates how a [`DnsLookup`] can fail.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The queried name does not exist (`NXDOMAIN`).
    #[error("DNS name \"{0}\" does not exist")]
    NotFound(String),

    /// The name exists but has no records of the requested type.
    #[error("no {record_type} records found for \"{name}\"")]
    NoData {
        name: String,
        record_type: &'static str,
    },

    /// Any other failure, e.g. a timeout or a `SERVFAIL`.
    #[error("{0}")]
    Other(String),
}

/// An async trait describing the DNS queries a verification pass needs.
///
/// Implementations own their timeout and retry policy.
#[async_trait::async_trait]
pub trait DnsLookup {
    /// Get the `TXT` records for `name`. Each record is returned as the list of character-string
    /// chunks it was published with.
    async fn resolve_txt(&self, name: &str) -> Result<Vec<Vec<String>>, LookupError>;

    /// Get the `MX` records for `name`.
    async fn resolve_mx(&self, name: &str) -> Result<Vec<MxRecord>, LookupError>;
}

/// Lowercase `name` and strip any trailing root dot, e.g. `MX1.Example.NET.` to
/// `mx1.example.net`.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}
