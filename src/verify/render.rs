//! Turning [`ProblemKind`]s into display text.

use crate::verify::ProblemKind;
use std::sync::Arc;

/// `DynMessageRenderer` is a type alias for a shared [`MessageRenderer`].
pub type DynMessageRenderer = Arc<dyn MessageRenderer + Send + Sync>;

/// Renders a problem for display in the given locale.
///
/// Implementations should fall back to a default language for locales they don't know rather
/// than fail. Two different problems must not render to the same text, since verification
/// deduplicates problems by their rendered message.
pub trait MessageRenderer {
    fn render(&self, kind: &ProblemKind, locale: &str) -> String;
}

/// Plain English messages, used for every locale.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishRenderer;

impl MessageRenderer for EnglishRenderer {
    fn render(&self, kind: &ProblemKind, _locale: &str) -> String {
        match kind {
            ProblemKind::DomainNotFound { domain } => {
                format!("Domain \"{domain}\" does not exist on DNS.")
            }
            ProblemKind::InvalidFqdn { domain } => {
                format!("\"{domain}\" is not a fully qualified domain name and can't have TXT records.")
            }
            ProblemKind::MissingVerificationToken { record } => format!(
                "Domain is missing the verification TXT record. Add a TXT record with the value \"{record}\"."
            ),
            ProblemKind::MultipleVerificationTokens { record } => format!(
                "Domain has multiple verification TXT records. Remove all of them except \"{record}\"."
            ),
            ProblemKind::IncorrectVerificationToken { record } => format!(
                "Domain has an incorrect verification TXT record. Its value must be \"{record}\"."
            ),
            ProblemKind::PaidPlanMustUseAliases {
                domain,
                record_prefix,
            } => format!(
                "Domain \"{domain}\" is on a paid plan and must configure its recipients as aliases. \
                 Remove all TXT records prefixed with \"{record_prefix}=\" and try again."
            ),
            ProblemKind::MissingTxtRecord {
                domain,
                record_prefix,
            } => format!(
                "Domain \"{domain}\" is missing a TXT record prefixed with \"{record_prefix}=\"."
            ),
            ProblemKind::MissingMxRecords { domain, expected } => {
                let records: Vec<String> = expected
                    .iter()
                    .map(|mx| format!("{} {}", mx.preference, mx.exchange))
                    .collect();
                format!(
                    "Domain \"{domain}\" is missing required MX records. Its MX records must include: {}.",
                    records.join(", ")
                )
            }
            ProblemKind::PurgeDnsCache { domain } => format!(
                "If you recently changed the DNS records of \"{domain}\", they may not have propagated yet. \
                 Purge public DNS caches for \"{domain}\" and try again."
            ),
            ProblemKind::MalformedDirective {
                record_prefix,
                directive,
            } => format!(
                "Domain has an invalid \"{record_prefix}\" TXT record due to an invalid email address of \"{directive}\"."
            ),
            ProblemKind::Other { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns_lookup::MxRecord;

    #[test]
    fn mx_records_are_listed_with_priorities() {
        let message = EnglishRenderer.render(
            &ProblemKind::MissingMxRecords {
                domain: "example.com".to_string(),
                expected: vec![
                    MxRecord::new(10, "mx1.example.net"),
                    MxRecord::new(20, "mx2.example.net"),
                ],
            },
            "en",
        );
        assert!(message.ends_with("10 mx1.example.net, 20 mx2.example.net."));
    }

    #[test]
    fn other_passes_through() {
        let kind = ProblemKind::Other {
            message: "SERVFAIL".to_string(),
        };
        assert_eq!(EnglishRenderer.render(&kind, "fr"), "SERVFAIL");
    }
}
