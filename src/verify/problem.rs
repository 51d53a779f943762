use crate::dns_lookup::MxRecord;
use serde::Serialize;

/// ProblemKind enumerates everything a verification pass can find wrong with a domain's DNS.
///
/// Each variant carries the arguments a [`MessageRenderer`][super::MessageRenderer] needs to
/// produce display text; none of them carry text of their own except [`ProblemKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemKind {
    /// The domain name does not exist in DNS.
    DomainNotFound { domain: String },

    /// The domain is an IP literal or otherwise can't carry `TXT` records.
    InvalidFqdn { domain: String },

    /// A paid plan domain has no `<prefix>-site-verification=` record. `record` is the full
    /// record value the owner should publish.
    MissingVerificationToken { record: String },

    /// A paid plan domain publishes more than one verification token.
    MultipleVerificationTokens { record: String },

    /// A paid plan domain publishes a single verification token that isn't its own.
    IncorrectVerificationToken { record: String },

    /// A paid plan domain publishes forwarding directives instead of using aliases.
    PaidPlanMustUseAliases {
        domain: String,
        record_prefix: String,
    },

    /// A free plan domain has no forwarding directives.
    MissingTxtRecord {
        domain: String,
        record_prefix: String,
    },

    /// The domain's `MX` records don't include every required exchange. `expected` lists the
    /// records the owner should publish.
    MissingMxRecords {
        domain: String,
        expected: Vec<MxRecord>,
    },

    /// Advisory appended whenever a check fails: public DNS caches may still hold old answers.
    PurgeDnsCache { domain: String },

    /// A forwarding directive whose recipient isn't a valid email address.
    MalformedDirective {
        record_prefix: String,
        directive: String,
    },

    /// A resolver failure outside the known vocabulary, passed through verbatim.
    Other { message: String },
}

/// A [`ProblemKind`] together with the message it was rendered to.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct Problem {
    pub kind: ProblemKind,
    pub message: String,
}

impl Problem {
    pub fn new(kind: ProblemKind, message: String) -> Self {
        Problem { kind, message }
    }
}
