//! A [trust-dns-resolver] backed implementation of the [`DnsLookup`][super::DnsLookup] trait.
//!
//! [trust-dns-resolver]: https://docs.rs/trust-dns-resolver
use crate::config::Config;
use crate::dns_lookup::{DnsLookup, LookupError, MxRecord};
use crate::error::Error;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

const DNS_PORT: u16 = 53;

/// Queries the [`Config::nameservers`] with the configured timeout and attempt count.
///
/// Names are always queried as absolute names so the system search list never applies.
#[derive(Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct ResolverDnsLookup {
    resolver: TokioAsyncResolver,
}

impl ResolverDnsLookup {
    /// Build a resolver from the DNS settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolver`] if the resolver can't be constructed, or if the system
    /// resolver configuration can't be read when no nameservers are configured.
    pub fn try_from_config(config: &Config) -> Result<Self, Error> {
        let resolver_config = resolver_config(config)?;
        let mut opts = ResolverOpts::default();
        opts.timeout = config.resolver_timeout;
        opts.attempts = config.resolver_attempts;
        opts.use_hosts_file = false;

        tracing::debug!(
            "resolver using {:?} (timeout {:?}, {} attempts)",
            config.nameservers,
            config.resolver_timeout,
            config.resolver_attempts
        );
        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts)?,
        })
    }
}

/// The configured nameservers, or the system resolver configuration when there are none.
fn resolver_config(config: &Config) -> Result<ResolverConfig, Error> {
    if config.nameservers.is_empty() {
        let (system, _) = read_system_conf()?;
        return Ok(system);
    }
    Ok(ResolverConfig::from_parts(
        None,
        vec![],
        NameServerConfigGroup::from_ips_clear(&config.nameservers, DNS_PORT, true),
    ))
}

fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

fn lookup_error(name: &str, record_type: &'static str, err: &ResolveError) -> LookupError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NXDomain =>
        {
            LookupError::NotFound(name.to_string())
        }
        ResolveErrorKind::NoRecordsFound { .. } => LookupError::NoData {
            name: name.to_string(),
            record_type,
        },
        _ => {
            tracing::warn!("{record_type} lookup for \"{name}\" failed: {err}");
            LookupError::Other(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl DnsLookup for ResolverDnsLookup {
    async fn resolve_txt(&self, name: &str) -> Result<Vec<Vec<String>>, LookupError> {
        let lookup = self
            .resolver
            .txt_lookup(absolute(name).as_str())
            .await
            .map_err(|err| lookup_error(name, "TXT", &err))?;
        let records: Vec<Vec<String>> = lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                    .collect()
            })
            .collect();
        tracing::debug!("found {} TXT records for \"{name}\"", records.len());
        Ok(records)
    }

    async fn resolve_mx(&self, name: &str) -> Result<Vec<MxRecord>, LookupError> {
        let lookup = self
            .resolver
            .mx_lookup(absolute(name).as_str())
            .await
            .map_err(|err| lookup_error(name, "MX", &err))?;
        let records: Vec<MxRecord> = lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), mx.exchange().to_utf8()))
            .collect();
        tracing::debug!("found {} MX records for \"{name}\"", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_queried_absolute() {
        assert_eq!(absolute("example.com"), "example.com.");
        assert_eq!(absolute("example.com."), "example.com.");
    }

    #[test]
    fn other_resolver_failures_pass_through() {
        let err = ResolveError::from("connection refused");
        assert_eq!(
            lookup_error("example.com", "MX", &err),
            LookupError::Other(err.to_string())
        );
    }

    #[test]
    fn configured_nameservers_are_used() {
        let mut config = Config::with_exchanges(vec!["mx1.example.net".to_string()]);
        config.nameservers = vec!["192.0.2.53".parse().unwrap()];
        let resolver_config = resolver_config(&config).unwrap();
        assert!(!resolver_config.name_servers().is_empty());
        assert!(resolver_config
            .name_servers()
            .iter()
            .all(|ns| ns.socket_addr == "192.0.2.53:53".parse::<std::net::SocketAddr>().unwrap()));
    }

    #[tokio::test]
    async fn builds_from_config() {
        let config = Config::with_exchanges(vec!["mx1.example.net".to_string()]);
        assert!(ResolverDnsLookup::try_from_config(&config).is_ok());
    }
}
