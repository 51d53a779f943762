//! Forward Crab
//!
//! Domain verification for a mail forwarding service. Before mail for a domain is accepted and
//! relayed, its owner has to prove control of the domain and point its mail routing at the
//! service:
//!
//! * Free plan domains publish their forwarding rules as `TXT` directives, e.g.
//!   `forward-email=hello:owner@example.org`.
//! * Paid plan domains publish a per-domain verification token, e.g.
//!   `forward-email-site-verification=Xy7Gq2Lm9P`, and configure recipients elsewhere.
//! * Every domain must list all of the service's [MX exchanges][Config::exchanges].
//!
//! The [`txt`] and [`mx`] modules implement the two checks, [`verify::Verifier`] combines them
//! into a [`verify::VerificationOutcome`], and [`domain::DomainService`] enforces the invariants
//! of a [`domain::Domain`] and keeps its cached verification flags current.
//!
#![warn(clippy::pedantic)]

pub mod config;
pub mod dns_lookup;
pub mod domain;
pub mod domain_store;
pub mod error;
pub mod mx;
pub mod txt;
pub mod validate;
pub mod verify;

pub use config::{Config, SharedConfig};
pub use dns_lookup::{InMemoryDnsLookup, ResolverDnsLookup};
pub use domain::{Domain, DomainService};
pub use domain_store::{FileDomainStore, InMemoryDomainStore};
pub use verify::{VerificationOutcome, Verifier};
