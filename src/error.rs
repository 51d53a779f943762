//! Error types.

use crate::verify::Problem;
use trust_dns_resolver::error::ResolveError;
use uuid::Uuid;

/// Error enumerates the possible Forward Crab error states.
///
/// Verification findings are not errors: they are collected as [`Problem`]s in a
/// [`VerificationOutcome`][crate::verify::VerificationOutcome]. Only
/// [`DomainService::verify_records`][crate::domain::DomainService::verify_records] turns them into
/// an [`Error`], using [`Error::Problem`] or [`Error::Problems`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a [`Domain`][crate::domain::Domain] name is blank, or neither a fully
    /// qualified domain name nor an IP literal.
    #[error("\"{0}\" is not a valid domain name or IP address")]
    InvalidDomain(String),

    /// Returned when a [`Domain`][crate::domain::Domain] already carries a verification token
    /// containing anything other than ASCII letters and digits.
    #[error("verification token must only contain letters and digits")]
    InvalidVerificationToken,

    /// Returned when a [`Domain`][crate::domain::Domain] has no member with the admin role.
    #[error("at least one admin is required for a domain")]
    AtLeastOneAdminRequired,

    /// Returned when a pending invite is addressed to an invalid email address.
    #[error("invite email \"{0}\" is not a valid email address")]
    InvalidInviteEmail(String),

    /// Returned when a domain's SMTP port is not a valid TCP port.
    #[error("SMTP port \"{0}\" is not a valid port")]
    InvalidSmtpPort(String),

    /// Returned when a domain's maximum number of recipients per alias is out of range.
    #[error("max recipients per alias must be between 0 and {max}, found {actual}")]
    InvalidMaxRecipients { actual: u32, max: u32 },

    /// Returned by a [`DomainStore`][crate::domain_store::DomainStore] when another domain
    /// already uses the same verification token.
    #[error("verification token is already in use by another domain")]
    DuplicateVerificationToken,

    /// Returned when re-verifying a domain that isn't in the store.
    #[error("domain {0} does not exist")]
    DomainDoesNotExist(Uuid),

    /// Returned by [`txt::parse`][crate::txt::parse] when empty results are disallowed and no
    /// directive was found under the record prefix.
    #[error("no \"{0}=\" TXT record directives found")]
    MissingTxtRecord(String),

    /// Returned by an explicit re-verify when exactly one problem was found.
    #[error(transparent)]
    Problem(#[from] Problem),

    /// Returned by an explicit re-verify when more than one problem was found.
    #[error("{}", report(.0))]
    Problems(Vec<Problem>),

    /// Returned when a loaded [`Config`][crate::config::Config] is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Returned when the DNS resolver can't be constructed.
    #[error("DNS resolver error")]
    Resolver(#[from] ResolveError),

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g. to
    /// [trying to load a `Config`][crate::config::Config::try_from_file], or to
    /// [trying to load a `FileDomainStore`][crate::domain_store::file::FileDomainStore::try_from_file])
    /// fails due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

fn report(problems: &[Problem]) -> String {
    problems
        .iter()
        .map(|problem| format!("- {problem}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::ProblemKind;

    #[test]
    fn combined_report_lists_every_message_in_order() {
        let problems = vec![
            Problem::new(
                ProblemKind::Other {
                    message: "first".to_string(),
                },
                "first".to_string(),
            ),
            Problem::new(
                ProblemKind::Other {
                    message: "second".to_string(),
                },
                "second".to_string(),
            ),
        ];
        assert_eq!(Error::Problems(problems).to_string(), "- first\n- second");
    }
}
