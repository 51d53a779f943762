//! Plan dependent rules for judging a domain's `TXT` records.
//!
//! Free plan domains configure forwarding through `TXT` directives. Paid plan domains configure
//! recipients as aliases instead, and only publish their verification token.

use crate::config::Config;
use crate::domain::Domain;
use crate::txt::ParsedTxt;
use crate::verify::ProblemKind;

/// The result of evaluating parsed `TXT` records against a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtVerdict {
    pub ok: bool,
    pub problems: Vec<ProblemKind>,
}

impl TxtVerdict {
    fn from_problems(problems: Vec<ProblemKind>) -> Self {
        TxtVerdict {
            ok: problems.is_empty(),
            problems,
        }
    }
}

pub trait TxtPolicy {
    fn evaluate(&self, parsed: &ParsedTxt) -> TxtVerdict;

    /// The problem reported when the domain has no `TXT` records at all.
    fn missing_records(&self) -> ProblemKind;
}

/// Select the policy for the domain's plan.
pub fn for_domain(domain: &Domain, config: &Config) -> Box<dyn TxtPolicy + Send + Sync> {
    if domain.plan.is_paid() {
        let token = domain
            .verification_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty());
        Box::new(PaidPlanPolicy {
            domain: domain.name.clone(),
            record_prefix: config.record_prefix.clone(),
            record: config.verification_record(token.unwrap_or_default()),
            token: token.map(ToString::to_string),
        })
    } else {
        Box::new(FreePlanPolicy {
            domain: domain.name.clone(),
            record_prefix: config.record_prefix.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FreePlanPolicy {
    pub domain: String,
    pub record_prefix: String,
}

impl TxtPolicy for FreePlanPolicy {
    fn evaluate(&self, parsed: &ParsedTxt) -> TxtVerdict {
        let mut problems = parsed.parse_errors.clone();
        if !parsed.has_directives() {
            problems.push(self.missing_records());
        }
        TxtVerdict::from_problems(problems)
    }

    fn missing_records(&self) -> ProblemKind {
        ProblemKind::MissingTxtRecord {
            domain: self.domain.clone(),
            record_prefix: self.record_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaidPlanPolicy {
    pub domain: String,
    pub record_prefix: String,
    /// The domain's own token. A domain without one never passes.
    pub token: Option<String>,
    /// The full record value carrying `token`, for display.
    pub record: String,
}

impl TxtPolicy for PaidPlanPolicy {
    fn evaluate(&self, parsed: &ParsedTxt) -> TxtVerdict {
        let mut problems = parsed.parse_errors.clone();
        if parsed.has_directives() {
            problems.push(ProblemKind::PaidPlanMustUseAliases {
                domain: self.domain.clone(),
                record_prefix: self.record_prefix.clone(),
            });
        }
        match parsed.verifications.as_slice() {
            [] => problems.push(self.missing_records()),
            [token] if self.token.as_deref() == Some(token.as_str()) => {}
            [_] => problems.push(ProblemKind::IncorrectVerificationToken {
                record: self.record.clone(),
            }),
            _ => problems.push(ProblemKind::MultipleVerificationTokens {
                record: self.record.clone(),
            }),
        }
        TxtVerdict::from_problems(problems)
    }

    fn missing_records(&self) -> ProblemKind {
        ProblemKind::MissingVerificationToken {
            record: self.record.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::txt::ForwardingAddress;

    fn paid() -> PaidPlanPolicy {
        PaidPlanPolicy {
            domain: "example.com".to_string(),
            record_prefix: "forward-email".to_string(),
            token: Some("abc123".to_string()),
            record: "forward-email-site-verification=abc123".to_string(),
        }
    }

    fn free() -> FreePlanPolicy {
        FreePlanPolicy {
            domain: "example.com".to_string(),
            record_prefix: "forward-email".to_string(),
        }
    }

    fn with_tokens(tokens: &[&str]) -> ParsedTxt {
        ParsedTxt {
            verifications: tokens.iter().map(ToString::to_string).collect(),
            ..ParsedTxt::default()
        }
    }

    fn with_forwarding() -> ParsedTxt {
        ParsedTxt {
            forwarding_addresses: vec![ForwardingAddress {
                local_part: "a".to_string(),
                recipient: "b@example.org".to_string(),
            }],
            ..ParsedTxt::default()
        }
    }

    #[test]
    fn paid_accepts_its_own_token() {
        let verdict = paid().evaluate(&with_tokens(&["abc123"]));
        assert!(verdict.ok);
        assert!(verdict.problems.is_empty());
    }

    #[test]
    fn paid_token_failures() {
        let policy = paid();
        assert_eq!(
            policy.evaluate(&with_tokens(&[])).problems,
            vec![policy.missing_records()]
        );
        assert!(matches!(
            policy.evaluate(&with_tokens(&["zzz999"])).problems[..],
            [ProblemKind::IncorrectVerificationToken { .. }]
        ));
        let verdict = policy.evaluate(&with_tokens(&["abc123", "zzz999"]));
        assert!(!verdict.ok);
        assert!(matches!(
            verdict.problems[..],
            [ProblemKind::MultipleVerificationTokens { .. }]
        ));
    }

    #[test]
    fn paid_without_a_token_never_passes() {
        let policy = PaidPlanPolicy {
            token: None,
            record: "forward-email-site-verification=".to_string(),
            ..paid()
        };
        let verdict = policy.evaluate(&with_tokens(&[""]));
        assert!(!verdict.ok);
        assert!(matches!(
            verdict.problems[..],
            [ProblemKind::IncorrectVerificationToken { .. }]
        ));
        assert_eq!(
            policy.evaluate(&with_tokens(&[])).problems,
            vec![policy.missing_records()]
        );
    }

    #[test]
    fn blank_domain_token_is_treated_as_missing() {
        let mut domain = Domain::new("example.com", uuid::Uuid::new_v4());
        domain.plan = crate::domain::Plan::Team;
        domain.verification_token = Some("  ".to_string());
        let config = Config::with_exchanges(vec!["mx1.example.net".to_string()]);
        let verdict = for_domain(&domain, &config).evaluate(&with_tokens(&[""]));
        assert!(!verdict.ok);
    }

    #[test]
    fn paid_rejects_directives() {
        let mut parsed = with_forwarding();
        parsed.verifications.push("abc123".to_string());
        let verdict = paid().evaluate(&parsed);
        assert!(!verdict.ok);
        assert!(matches!(
            verdict.problems[..],
            [ProblemKind::PaidPlanMustUseAliases { .. }]
        ));
    }

    #[test]
    fn free_needs_a_directive() {
        let policy = free();
        assert!(policy.evaluate(&with_forwarding()).ok);
        let verdict = policy.evaluate(&with_tokens(&["abc123"]));
        assert!(!verdict.ok);
        assert_eq!(verdict.problems, vec![policy.missing_records()]);
    }

    fn only_malformed() -> ParsedTxt {
        ParsedTxt {
            parse_errors: vec![ProblemKind::MalformedDirective {
                record_prefix: "forward-email".to_string(),
                directive: "a:not-an-email".to_string(),
            }],
            ..ParsedTxt::default()
        }
    }

    #[test]
    fn free_with_only_malformed_directives_is_not_missing_records() {
        let verdict = free().evaluate(&only_malformed());
        assert!(!verdict.ok);
        assert!(matches!(
            verdict.problems[..],
            [ProblemKind::MalformedDirective { .. }]
        ));
    }

    #[test]
    fn paid_with_only_malformed_directives_must_use_aliases() {
        let mut parsed = only_malformed();
        parsed.verifications.push("abc123".to_string());
        let verdict = paid().evaluate(&parsed);
        assert!(matches!(
            verdict.problems[..],
            [
                ProblemKind::MalformedDirective { .. },
                ProblemKind::PaidPlanMustUseAliases { .. }
            ]
        ));
    }

    #[test]
    fn free_fails_on_parse_errors() {
        let mut parsed = with_forwarding();
        parsed.parse_errors.push(ProblemKind::MalformedDirective {
            record_prefix: "forward-email".to_string(),
            directive: "c:nope".to_string(),
        });
        let verdict = free().evaluate(&parsed);
        assert!(!verdict.ok);
        assert_eq!(verdict.problems.len(), 1);
    }
}
