//! Parsing of forwarding and verification `TXT` records.
//!
//! Two kinds of records are recognised, both under the configured
//! [`Config::record_prefix`][crate::config::Config::record_prefix] (`forward-email` below):
//!
//! ```text
//! forward-email-site-verification=Xy7Gq2Lm9P
//! forward-email=hello:owner@example.org, !spam, support:help@example.org
//! ```
//!
//! The first proves ownership of the domain. The second carries comma separated forwarding
//! directives, which may be spread over any number of records:
//!
//! * `local:recipient@example.org` forwards `local@domain` to the recipient.
//! * `!local` or `!local:recipient@example.org` ignores mail for `local@domain`.
//! * `example.org`, `192.0.2.1` or `anyone@example.org` forwards every address of the domain.

use crate::error::Error;
use crate::validate::{domain_part, is_email, is_fqdn, is_ip};
use crate::verify::ProblemKind;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref REPEATED_COMMAS: Regex = Regex::new(",+").unwrap();
}

/// Forward mail for `local_part@domain` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingAddress {
    pub local_part: String,
    pub recipient: String,
}

/// Drop mail for `local_part@domain`, optionally naming the recipient it would have reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredAddress {
    pub local_part: String,
    pub recipient: Option<String>,
}

/// The classification of a single directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedAddress {
    Forwarding(ForwardingAddress),
    /// Forward every local part to `target`, a domain, an IP or an email address.
    Global { target: String },
    Ignored(IgnoredAddress),
}

/// Everything recovered from a domain's `TXT` records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedTxt {
    pub verifications: Vec<String>,
    pub forwarding_addresses: Vec<ForwardingAddress>,
    pub global_forwarding_addresses: Vec<String>,
    pub ignored_addresses: Vec<IgnoredAddress>,
    pub parse_errors: Vec<ProblemKind>,
}

impl ParsedTxt {
    /// True if any forwarding directive was published. Malformed directives count even though
    /// they are kept out of the address lists.
    pub fn has_directives(&self) -> bool {
        !self.parse_errors.is_empty()
            || !self.forwarding_addresses.is_empty()
            || !self.global_forwarding_addresses.is_empty()
            || !self.ignored_addresses.is_empty()
    }

    fn push(&mut self, address: ParsedAddress) {
        match address {
            ParsedAddress::Forwarding(forwarding) => self.forwarding_addresses.push(forwarding),
            ParsedAddress::Global { target } => self.global_forwarding_addresses.push(target),
            ParsedAddress::Ignored(ignored) => self.ignored_addresses.push(ignored),
        }
    }
}

/// Parse the raw `TXT` records of a domain, each given as its list of chunks.
///
/// Malformed forwarding directives are reported in [`ParsedTxt::parse_errors`] and never abort
/// parsing.
///
/// # Errors
///
/// Returns [`Error::MissingTxtRecord`] if `allow_empty` is false and no directive was found.
pub fn parse(
    records: &[Vec<String>],
    record_prefix: &str,
    allow_empty: bool,
) -> Result<ParsedTxt, Error> {
    let verification_prefix = format!("{record_prefix}-site-verification=");
    let directive_prefix = format!("{record_prefix}=");

    let mut parsed = ParsedTxt::default();
    let mut directive_values = vec![];
    for record in records {
        let record = record.concat();
        if let Some(value) = record.strip_prefix(&directive_prefix) {
            directive_values.push(value.to_string());
        } else if let Some(token) = record.strip_prefix(&verification_prefix) {
            parsed.verifications.push(token.to_string());
        }
    }

    let directives = split_directives(&directive_values);
    if !allow_empty && directives.is_empty() {
        return Err(Error::MissingTxtRecord(record_prefix.to_string()));
    }

    for directive in directives {
        match classify(&directive.to_lowercase()) {
            Ok(Some(address)) => parsed.push(address),
            Ok(None) => tracing::debug!("dropping unrecognised directive \"{directive}\""),
            Err(directive) => parsed.parse_errors.push(ProblemKind::MalformedDirective {
                record_prefix: record_prefix.to_string(),
                directive,
            }),
        }
    }
    Ok(parsed)
}

fn split_directives(values: &[String]) -> Vec<String> {
    let joined = values.join(",");
    let joined = REPEATED_COMMAS.replace_all(&joined, ",");
    let joined = joined.trim();
    if joined.is_empty() {
        return vec![];
    }
    joined.split(',').map(|d| d.trim().to_string()).collect()
}

/// Classify a lowercased directive. `Err` carries a malformed directive back to the caller,
/// `Ok(None)` means the directive isn't recognised and should be dropped.
fn classify(directive: &str) -> Result<Option<ParsedAddress>, String> {
    if directive.contains(':') {
        let parts: Vec<&str> = directive.split(':').collect();
        if let Some(local_part) = parts[0].strip_prefix('!') {
            let recipient = parts
                .get(1)
                .map(|r| r.trim())
                .filter(|r| !r.is_empty())
                .map(ToString::to_string);
            return Ok(Some(ParsedAddress::Ignored(IgnoredAddress {
                local_part: local_part.to_string(),
                recipient,
            })));
        }
        return match parts.as_slice() {
            [local_part, recipient] if !local_part.is_empty() && is_email(recipient) => {
                Ok(Some(ParsedAddress::Forwarding(ForwardingAddress {
                    local_part: (*local_part).to_string(),
                    recipient: (*recipient).to_string(),
                })))
            }
            _ => Err(directive.to_string()),
        };
    }

    if let Some(local_part) = directive.strip_prefix('!') {
        return Ok(Some(ParsedAddress::Ignored(IgnoredAddress {
            local_part: local_part.to_string(),
            recipient: None,
        })));
    }

    if is_fqdn(directive) || is_ip(directive) {
        return Ok(Some(ParsedAddress::Global {
            target: directive.to_string(),
        }));
    }

    let domain = domain_part(directive);
    if (is_fqdn(domain) || is_ip(domain)) && is_email(directive) {
        return Ok(Some(ParsedAddress::Global {
            target: directive.to_string(),
        }));
    }
    Ok(None)
}
