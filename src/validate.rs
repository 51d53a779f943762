//! Syntax checks for domain names, IP literals and email addresses.
//!
//! These are deliberately syntactic: nothing here touches the network.

use std::net::IpAddr;

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const MAX_LOCAL_PART_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;

/// True if `s` is a fully qualified domain name with a top level domain, e.g. `example.com`.
///
/// Trailing dots, underscores, empty labels and all-numeric TLDs are rejected.
pub fn is_fqdn(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_DOMAIN_LEN {
        return false;
    }
    let labels: Vec<&str> = s.split('.').collect();
    let Some((tld, _)) = labels.split_last() else {
        return false;
    };
    if labels.len() < 2 || !is_valid_tld(tld) {
        return false;
    }
    labels.iter().all(|label| is_valid_label(label))
}

/// True if `s` is an IPv4 or IPv6 literal.
pub fn is_ip(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

/// True if `s` is an email address whose domain part is a fully qualified domain name.
pub fn is_email(s: &str) -> bool {
    if s.len() > MAX_EMAIL_LEN {
        return false;
    }
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    is_valid_local_part(local) && is_fqdn(&domain.to_lowercase())
}

/// The domain part of an email-like string, or the whole string when there's no `@`.
pub fn domain_part(s: &str) -> &str {
    s.rsplit_once('@').map_or(s, |(_, domain)| domain)
}

fn is_valid_tld(tld: &str) -> bool {
    if let Some(punycode) = tld.strip_prefix("xn--") {
        return !punycode.is_empty()
            && punycode
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
    }
    tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}

fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_PART_LEN {
        return false;
    }
    if let Some(quoted) = local
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return is_valid_quoted_string(quoted);
    }
    local.split('.').all(|atom| {
        !atom.is_empty()
            && atom
                .chars()
                .all(|c| c.is_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c))
    })
}

fn is_valid_quoted_string(content: &str) -> bool {
    let mut escape = false;
    for c in content.chars() {
        if escape {
            escape = false;
        } else if c == '\\' {
            escape = true;
        } else if c == '"' {
            return false;
        }
    }
    !escape
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fqdns() {
        assert!(is_fqdn("example.com"));
        assert!(is_fqdn("mx1.forward.example.co.uk"));
        assert!(is_fqdn("xn--bcher-kva.xn--p1ai"));
        assert!(is_fqdn("exämple.中国"));
        assert!(!is_fqdn("localhost"));
        assert!(!is_fqdn("example.com."));
        assert!(!is_fqdn("exa_mple.com"));
        assert!(!is_fqdn("-example.com"));
        assert!(!is_fqdn("example..com"));
        assert!(!is_fqdn("example.c"));
        assert!(!is_fqdn("example.123"));
        assert!(!is_fqdn("not a domain"));
        assert!(!is_fqdn(""));
    }

    #[test]
    fn ips() {
        assert!(is_ip("127.0.0.1"));
        assert!(is_ip("2001:db8::1"));
        assert!(!is_ip("256.0.0.1"));
        assert!(!is_ip("example.com"));
    }

    #[test]
    fn emails() {
        assert!(is_email("b@example.com"));
        assert!(is_email("first.last+tag@example.com"));
        assert!(is_email("\"with space\"@example.com"));
        assert!(!is_email("not-an-email"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("user@"));
        assert!(!is_email("user@localhost"));
        assert!(!is_email("no..dots@example.com"));
        assert!(!is_email("spaces here@example.com"));
    }

    #[test]
    fn domain_parts() {
        assert_eq!(domain_part("user@example.com"), "example.com");
        assert_eq!(domain_part("example.com"), "example.com");
    }
}
