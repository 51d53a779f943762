use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

const MAX_TOKEN_LENGTH: usize = 128;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Prefix of the TXT records read during verification, e.g. `forward-email` for
    /// `forward-email=...` directives and `forward-email-site-verification=...` tokens.
    #[serde(default = "default_record_prefix")]
    pub record_prefix: String,
    /// MX exchanges every verified domain must list, in display order.
    pub exchanges: Vec<String>,
    /// Nameservers queried on port 53. Empty uses the system resolver configuration.
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<IpAddr>,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_resolver_timeout")]
    pub resolver_timeout: Duration,
    #[serde(default = "default_resolver_attempts")]
    pub resolver_attempts: usize,
    #[serde(default = "default_verification_token_length")]
    pub verification_token_length: usize,
    /// JSON file holding the domain store. Domains are kept in memory only when unset.
    pub domain_store_path: Option<String>,
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_record_prefix() -> String {
    "forward-email".to_string()
}

fn default_nameservers() -> Vec<IpAddr> {
    vec![
        IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
        IpAddr::V4(Ipv4Addr::new(1, 0, 0, 1)),
    ]
}

fn default_resolver_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_resolver_attempts() -> usize {
    2
}

fn default_verification_token_length() -> usize {
    10
}

fn default_locale() -> String {
    "en".to_string()
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Build a config from the given exchanges with every other setting at its default.
    pub fn with_exchanges(exchanges: Vec<String>) -> Self {
        Config {
            record_prefix: default_record_prefix(),
            exchanges,
            nameservers: default_nameservers(),
            resolver_timeout: default_resolver_timeout(),
            resolver_attempts: default_resolver_attempts(),
            verification_token_length: default_verification_token_length(),
            domain_store_path: None,
            default_locale: default_locale(),
        }
    }

    /// The `TXT` record value that proves ownership for the given token.
    pub fn verification_record(&self, token: &str) -> String {
        format!("{}-site-verification={token}", self.record_prefix)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.record_prefix.trim().is_empty() {
            return Err(Error::InvalidConfig("record_prefix must not be blank".into()));
        }
        if self.exchanges.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one MX exchange is required".into(),
            ));
        }
        if !(1..=MAX_TOKEN_LENGTH).contains(&self.verification_token_length) {
            return Err(Error::InvalidConfig(format!(
                "verification_token_length must be between 1 and {MAX_TOKEN_LENGTH}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_with_defaults() {
        let f = write_config(r#"{"exchanges": ["mx1.example.net", "mx2.example.net"]}"#);
        let config = Config::try_from_file(f.path()).unwrap();
        assert_eq!(config.record_prefix, "forward-email");
        assert_eq!(config.resolver_timeout, Duration::from_secs(10));
        assert_eq!(config.nameservers.len(), 2);
        assert_eq!(
            config.verification_record("abc123"),
            "forward-email-site-verification=abc123"
        );
    }

    #[test]
    fn durations_are_seconds() {
        let f = write_config(r#"{"exchanges": ["mx1.example.net"], "resolver_timeout": 3}"#);
        let config = Config::try_from_file(f.path()).unwrap();
        assert_eq!(config.resolver_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_missing_exchanges() {
        let f = write_config(r#"{"exchanges": []}"#);
        assert!(matches!(
            Config::try_from_file(f.path()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_blank_prefix() {
        let f = write_config(r#"{"exchanges": ["mx1.example.net"], "record_prefix": " "}"#);
        assert!(matches!(
            Config::try_from_file(f.path()),
            Err(Error::InvalidConfig(_))
        ));
    }
}
