//! Verifying a domain's DNS configuration.
//!
//! A [`Verifier`] checks two things for a [`Domain`], concurrently:
//!
//! * its `TXT` records, judged by the [`policy`] for the domain's plan, and
//! * its `MX` records, which must include every exchange in
//!   [`Config::exchanges`][crate::config::Config::exchanges].
//!
//! Neither check stops the other from running. Every problem found is rendered with the
//! configured [`MessageRenderer`] and reported in the [`VerificationOutcome`], deduplicated by
//! message and in the order found.

pub mod policy;
mod problem;
pub mod render;

pub use problem::{Problem, ProblemKind};
pub use render::{DynMessageRenderer, EnglishRenderer, MessageRenderer};

use crate::config::SharedConfig;
use crate::dns_lookup::{DynDnsLookup, LookupError};
use crate::domain::Domain;
use crate::validate::is_fqdn;
use crate::{mx, txt};
use std::collections::HashSet;
use std::sync::Arc;

/// The result of a single verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub txt_ok: bool,
    pub mx_ok: bool,
    pub errors: Vec<Problem>,
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        self.txt_ok && self.mx_ok
    }
}

#[derive(Clone)]
pub struct Verifier {
    config: SharedConfig,
    lookup: DynDnsLookup,
    renderer: DynMessageRenderer,
}

impl Verifier {
    /// Create a verifier rendering messages in English.
    pub fn new(config: SharedConfig, lookup: DynDnsLookup) -> Self {
        Self::with_renderer(config, lookup, Arc::new(EnglishRenderer))
    }

    pub fn with_renderer(
        config: SharedConfig,
        lookup: DynDnsLookup,
        renderer: DynMessageRenderer,
    ) -> Self {
        Verifier {
            config,
            lookup,
            renderer,
        }
    }

    /// Run the `TXT` and `MX` checks for `domain`. Never fails: lookup failures are reported as
    /// problems in the outcome.
    pub async fn verify(&self, domain: &Domain) -> VerificationOutcome {
        let (txt_verdict, mx_result) = tokio::join!(self.verify_txt(domain), self.verify_mx(domain));

        let mut problems = txt_verdict.problems;
        let mx_ok = match mx_result {
            Ok(()) => true,
            Err(problem) => {
                problems.push(problem);
                false
            }
        };
        if !txt_verdict.ok || !mx_ok {
            problems.push(ProblemKind::PurgeDnsCache {
                domain: domain.name.clone(),
            });
        }

        let locale = domain
            .locale
            .as_deref()
            .unwrap_or(&self.config.default_locale);
        let errors = dedup_by_message(
            problems
                .into_iter()
                .map(|kind| {
                    let message = self.renderer.render(&kind, locale);
                    Problem::new(kind, message)
                })
                .collect(),
        );

        tracing::info!(
            "verified \"{}\": txt {}, mx {}, {} problem(s)",
            domain.name,
            txt_verdict.ok,
            mx_ok,
            errors.len()
        );
        VerificationOutcome {
            txt_ok: txt_verdict.ok,
            mx_ok,
            errors,
        }
    }

    async fn verify_txt(&self, domain: &Domain) -> policy::TxtVerdict {
        let policy = policy::for_domain(domain, &self.config);
        let failed = |problem| policy::TxtVerdict {
            ok: false,
            problems: vec![problem],
        };

        if !is_fqdn(&domain.name) {
            return failed(ProblemKind::InvalidFqdn {
                domain: domain.name.clone(),
            });
        }

        let records = match self.lookup.resolve_txt(&domain.name).await {
            Ok(records) => records,
            Err(LookupError::NotFound(_)) => {
                return failed(ProblemKind::DomainNotFound {
                    domain: domain.name.clone(),
                })
            }
            Err(LookupError::NoData { .. }) => return failed(policy.missing_records()),
            Err(LookupError::Other(message)) => {
                tracing::error!("TXT lookup for \"{}\" failed: {message}", domain.name);
                return failed(ProblemKind::Other { message });
            }
        };

        match txt::parse(&records, &self.config.record_prefix, true) {
            Ok(parsed) => policy.evaluate(&parsed),
            // Only reachable when empty results are disallowed.
            Err(err) => failed(ProblemKind::Other {
                message: err.to_string(),
            }),
        }
    }

    async fn verify_mx(&self, domain: &Domain) -> Result<(), ProblemKind> {
        mx::check(self.lookup.as_ref(), &domain.name, &self.config.exchanges).await
    }
}

fn dedup_by_message(problems: Vec<Problem>) -> Vec<Problem> {
    let mut seen = HashSet::new();
    problems
        .into_iter()
        .filter(|problem| seen.insert(problem.message.clone()))
        .collect()
}
