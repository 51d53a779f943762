//! Domains under verification.
//!
//! A [`Domain`] is the unit of persistence. Its invariants are enforced by
//! [`DomainService::validate`], which runs every time a domain is saved and also refreshes the
//! cached [`Domain::has_txt_record`] and [`Domain::has_mx_record`] flags.

pub mod service;
pub mod token;

pub use service::DomainService;
pub use token::{AlphanumericTokenGenerator, TokenGenerator};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SMTP_PORT: &str = "25";
pub const MAX_RECIPIENTS_PER_ALIAS: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    EnhancedProtection,
    Team,
}

impl Plan {
    pub fn is_paid(self) -> bool {
        self != Plan::Free
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: Uuid,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    /// A fully qualified domain name or an IP literal, lowercased.
    pub name: String,
    #[serde(default)]
    pub plan: Plan,
    /// Generated on first validation and never changed afterwards.
    #[serde(default)]
    pub verification_token: Option<String>,
    #[serde(default)]
    pub has_txt_record: bool,
    #[serde(default)]
    pub has_mx_record: bool,
    /// Global domains are always on the team plan.
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub invites: Vec<Invite>,
    #[serde(default)]
    pub max_recipients_per_alias: u32,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: String,
    /// Locale for rendering verification problems. Not persisted.
    #[serde(skip)]
    pub locale: Option<String>,
}

fn default_smtp_port() -> String {
    DEFAULT_SMTP_PORT.to_string()
}

impl Domain {
    /// A new free plan domain administered by `admin`.
    pub fn new(name: &str, admin: Uuid) -> Self {
        Domain {
            id: Uuid::new_v4(),
            name: name.to_string(),
            plan: Plan::default(),
            verification_token: None,
            has_txt_record: false,
            has_mx_record: false,
            is_global: false,
            members: vec![Member {
                user: admin,
                role: Role::Admin,
            }],
            invites: vec![],
            max_recipients_per_alias: 0,
            smtp_port: default_smtp_port(),
            locale: None,
        }
    }

    pub fn has_admin(&self) -> bool {
        self.members.iter().any(|m| m.role == Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let domain: Domain = serde_json::from_str(
            r#"{"id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "name": "example.com"}"#,
        )
        .unwrap();
        assert_eq!(domain.plan, Plan::Free);
        assert_eq!(domain.smtp_port, "25");
        assert!(domain.members.is_empty());
        assert!(domain.verification_token.is_none());
    }

    #[test]
    fn plans() {
        assert!(!Plan::Free.is_paid());
        assert!(Plan::EnhancedProtection.is_paid());
        assert_eq!(
            serde_json::to_string(&Plan::EnhancedProtection).unwrap(),
            "\"enhanced_protection\""
        );
    }
}
