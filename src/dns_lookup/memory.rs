use crate::dns_lookup::{normalize_name, DnsLookup, LookupError, MxRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fixed in-memory implementation of [`DnsLookup`].
///
/// A name that appears in neither record map fails with [`LookupError::NotFound`]. A name that
/// only has records of the other type fails with [`LookupError::NoData`]. Names listed in
/// `failures` fail with [`LookupError::Other`] for every query.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryDnsLookup {
    #[serde(default)]
    txt_records: HashMap<String, Vec<Vec<String>>>,
    #[serde(default)]
    mx_records: HashMap<String, Vec<MxRecord>>,
    #[serde(default)]
    failures: HashMap<String, String>,
}

impl InMemoryDnsLookup {
    /// Add a single-chunk `TXT` record for `name`.
    #[must_use]
    pub fn with_txt(self, name: &str, value: &str) -> Self {
        self.with_txt_chunks(name, &[value])
    }

    /// Add a `TXT` record for `name` published as several character-strings.
    #[must_use]
    pub fn with_txt_chunks(mut self, name: &str, chunks: &[&str]) -> Self {
        self.txt_records
            .entry(normalize_name(name))
            .or_default()
            .push(chunks.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub fn with_mx(mut self, name: &str, preference: u16, exchange: &str) -> Self {
        self.mx_records
            .entry(normalize_name(name))
            .or_default()
            .push(MxRecord::new(preference, exchange));
        self
    }

    /// Make every query for `name` fail with [`LookupError::Other`].
    #[must_use]
    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.failures
            .insert(normalize_name(name), message.to_string());
        self
    }

    fn check_name(&self, name: &str) -> Result<(), LookupError> {
        if let Some(message) = self.failures.get(name) {
            return Err(LookupError::Other(message.clone()));
        }
        if !self.txt_records.contains_key(name) && !self.mx_records.contains_key(name) {
            return Err(LookupError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsLookup for InMemoryDnsLookup {
    async fn resolve_txt(&self, name: &str) -> Result<Vec<Vec<String>>, LookupError> {
        let name = normalize_name(name);
        self.check_name(&name)?;
        self.txt_records
            .get(&name)
            .cloned()
            .ok_or(LookupError::NoData {
                name,
                record_type: "TXT",
            })
    }

    async fn resolve_mx(&self, name: &str) -> Result<Vec<MxRecord>, LookupError> {
        let name = normalize_name(name);
        self.check_name(&name)?;
        self.mx_records
            .get(&name)
            .cloned()
            .ok_or(LookupError::NoData {
                name,
                record_type: "MX",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_names_do_not_exist() {
        let lookup = InMemoryDnsLookup::default();
        assert_eq!(
            lookup.resolve_txt("example.com").await,
            Err(LookupError::NotFound("example.com".to_string()))
        );
    }

    #[tokio::test]
    async fn missing_record_type_is_no_data() {
        let lookup = InMemoryDnsLookup::default().with_mx("example.com", 10, "mx1.example.net");
        assert!(matches!(
            lookup.resolve_txt("example.com").await,
            Err(LookupError::NoData {
                record_type: "TXT",
                ..
            })
        ));
        assert_eq!(
            lookup.resolve_mx("EXAMPLE.com.").await.unwrap(),
            vec![MxRecord::new(10, "mx1.example.net")]
        );
    }

    #[tokio::test]
    async fn chunks_are_kept_per_record() {
        let lookup = InMemoryDnsLookup::default()
            .with_txt_chunks("example.com", &["forward-email=a:b@", "example.org"])
            .with_txt("example.com", "v=spf1 -all");
        let records = lookup.resolve_txt("example.com").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], vec!["forward-email=a:b@", "example.org"]);
    }

    #[tokio::test]
    async fn failures_apply_to_every_query() {
        let lookup = InMemoryDnsLookup::default().with_failure("example.com", "SERVFAIL");
        assert_eq!(
            lookup.resolve_mx("example.com").await,
            Err(LookupError::Other("SERVFAIL".to_string()))
        );
    }

    #[test]
    fn loads_from_json() {
        let lookup: InMemoryDnsLookup = serde_json::from_str(
            r#"{"mx_records": {"example.com": [{"preference": 10, "exchange": "mx1.example.net"}]}}"#,
        )
        .unwrap();
        assert!(lookup.mx_records.contains_key("example.com"));
    }
}
