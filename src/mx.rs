//! Checking a domain's `MX` records against the required exchanges.

use crate::dns_lookup::{normalize_name, DnsLookup, LookupError, MxRecord};
use crate::verify::ProblemKind;
use std::collections::HashSet;

const PRIORITY_STEP: u16 = 10;

/// The records a domain should publish for `exchanges`, numbered `10`, `20`, ... in order.
pub fn expected_records(exchanges: &[String]) -> Vec<MxRecord> {
    (1..)
        .map(|i: u16| i.saturating_mul(PRIORITY_STEP))
        .zip(exchanges)
        .map(|(preference, exchange)| MxRecord::new(preference, exchange.clone()))
        .collect()
}

/// Check that every one of `exchanges` appears among the `MX` records of `domain`.
///
/// Order and preference don't matter, and additional exchanges are tolerated. Exchange names are
/// compared case-insensitively and without their trailing root dot.
///
/// # Errors
///
/// Returns the [`ProblemKind`] describing why the check failed.
pub async fn check(
    lookup: &(dyn DnsLookup + Send + Sync),
    domain: &str,
    exchanges: &[String],
) -> Result<(), ProblemKind> {
    let missing = || ProblemKind::MissingMxRecords {
        domain: domain.to_string(),
        expected: expected_records(exchanges),
    };

    let records = match lookup.resolve_mx(domain).await {
        Ok(records) => records,
        Err(LookupError::NotFound(_)) => {
            return Err(ProblemKind::DomainNotFound {
                domain: domain.to_string(),
            })
        }
        Err(LookupError::NoData { .. }) => return Err(missing()),
        Err(LookupError::Other(message)) => {
            tracing::error!("MX lookup for \"{domain}\" failed: {message}");
            return Err(ProblemKind::Other { message });
        }
    };

    let found: HashSet<String> = records
        .iter()
        .map(|mx| normalize_name(&mx.exchange))
        .collect();
    if exchanges
        .iter()
        .all(|exchange| found.contains(&normalize_name(exchange)))
    {
        Ok(())
    } else {
        tracing::debug!("\"{domain}\" MX records {found:?} don't cover {exchanges:?}");
        Err(missing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns_lookup::InMemoryDnsLookup;

    fn exchanges() -> Vec<String> {
        vec!["mx1.example.net".to_string(), "mx2.example.net".to_string()]
    }

    #[test]
    fn priorities_step_by_ten() {
        assert_eq!(
            expected_records(&exchanges()),
            vec![
                MxRecord::new(10, "mx1.example.net"),
                MxRecord::new(20, "mx2.example.net"),
            ]
        );
    }

    #[tokio::test]
    async fn superset_in_any_order_passes() {
        let lookup = InMemoryDnsLookup::default()
            .with_mx("example.com", 5, "backup.example.org")
            .with_mx("example.com", 20, "MX1.example.net.")
            .with_mx("example.com", 10, "mx2.example.net.");
        assert_eq!(check(&lookup, "example.com", &exchanges()).await, Ok(()));
    }

    #[tokio::test]
    async fn partial_set_fails() {
        let lookup = InMemoryDnsLookup::default().with_mx("example.com", 10, "mx1.example.net");
        assert_eq!(
            check(&lookup, "example.com", &exchanges()).await,
            Err(ProblemKind::MissingMxRecords {
                domain: "example.com".to_string(),
                expected: expected_records(&exchanges()),
            })
        );
    }

    #[tokio::test]
    async fn resolver_failures_are_mapped() {
        let lookup = InMemoryDnsLookup::default()
            .with_txt("txt-only.com", "v=spf1 -all")
            .with_failure("broken.com", "SERVFAIL");
        assert_eq!(
            check(&lookup, "missing.com", &exchanges()).await,
            Err(ProblemKind::DomainNotFound {
                domain: "missing.com".to_string()
            })
        );
        assert!(matches!(
            check(&lookup, "txt-only.com", &exchanges()).await,
            Err(ProblemKind::MissingMxRecords { .. })
        ));
        assert_eq!(
            check(&lookup, "broken.com", &exchanges()).await,
            Err(ProblemKind::Other {
                message: "SERVFAIL".to_string()
            })
        );
    }
}
