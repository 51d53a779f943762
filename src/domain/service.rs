use crate::config::SharedConfig;
use crate::domain::token::is_valid_token;
use crate::domain::{
    AlphanumericTokenGenerator, Domain, Plan, TokenGenerator, MAX_RECIPIENTS_PER_ALIAS,
};
use crate::domain_store::DynDomainStore;
use crate::error::Error;
use crate::validate::{is_email, is_fqdn, is_ip};
use crate::verify::Verifier;
use std::sync::Arc;
use uuid::Uuid;

// Upper bound on regenerating a token that collides with a stored one.
const TOKEN_ATTEMPTS: usize = 10;

/// Owns the [`Domain`] lifecycle: validation on save and explicit re-verification.
#[derive(Clone)]
pub struct DomainService {
    config: SharedConfig,
    store: DynDomainStore,
    verifier: Verifier,
    tokens: Arc<dyn TokenGenerator + Send + Sync>,
}

impl DomainService {
    pub fn new(config: SharedConfig, store: DynDomainStore, verifier: Verifier) -> Self {
        DomainService {
            config,
            store,
            verifier,
            tokens: Arc::new(AlphanumericTokenGenerator),
        }
    }

    #[must_use]
    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator + Send + Sync>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Enforce the invariants of `domain`, then verify its DNS records and cache the result in
    /// its `has_txt_record` and `has_mx_record` flags.
    ///
    /// Verification problems never fail validation; use [`DomainService::verify_records`] to
    /// surface them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDomain`], [`Error::InvalidVerificationToken`],
    /// [`Error::AtLeastOneAdminRequired`], [`Error::InvalidInviteEmail`],
    /// [`Error::InvalidSmtpPort`] or [`Error::InvalidMaxRecipients`] for the corresponding broken
    /// invariant, and [`Error::DuplicateVerificationToken`] if no unique token could be generated.
    pub async fn validate(&self, domain: &mut Domain) -> Result<(), Error> {
        if domain.is_global {
            domain.plan = Plan::Team;
        }

        domain.name = domain.name.trim().to_lowercase();
        if domain.name.is_empty() || !(is_fqdn(&domain.name) || is_ip(&domain.name)) {
            return Err(Error::InvalidDomain(domain.name.clone()));
        }

        let needs_token = domain
            .verification_token
            .as_deref()
            .map_or(true, |token| token.trim().is_empty());
        if needs_token {
            domain.verification_token = Some(self.unique_token().await?);
        } else if !domain
            .verification_token
            .as_deref()
            .is_some_and(is_valid_token)
        {
            return Err(Error::InvalidVerificationToken);
        }

        if !domain.has_admin() {
            return Err(Error::AtLeastOneAdminRequired);
        }

        for invite in &mut domain.invites {
            invite.email = invite.email.trim().to_lowercase();
            if !is_email(&invite.email) {
                return Err(Error::InvalidInviteEmail(invite.email.clone()));
            }
        }

        if domain.smtp_port.parse::<u16>().is_err() {
            return Err(Error::InvalidSmtpPort(domain.smtp_port.clone()));
        }

        if domain.max_recipients_per_alias > MAX_RECIPIENTS_PER_ALIAS {
            return Err(Error::InvalidMaxRecipients {
                actual: domain.max_recipients_per_alias,
                max: MAX_RECIPIENTS_PER_ALIAS,
            });
        }

        let outcome = self.verifier.verify(domain).await;
        domain.has_txt_record = outcome.txt_ok;
        domain.has_mx_record = outcome.mx_ok;
        Ok(())
    }

    /// Validate `domain` and persist it, returning the stored value.
    ///
    /// # Errors
    ///
    /// Returns any error from [`DomainService::validate`] or from the store.
    pub async fn save(&self, mut domain: Domain) -> Result<Domain, Error> {
        self.validate(&mut domain).await?;
        self.store.write().await.put(domain.clone()).await?;
        tracing::debug!("saved domain \"{}\" ({})", domain.name, domain.id);
        Ok(domain)
    }

    pub async fn get(&self, id: &Uuid) -> Option<Domain> {
        self.store.read().await.get(id).await
    }

    /// Re-verify the stored domain `id`, persist the refreshed flags, and report any problems
    /// rendered in `locale`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DomainDoesNotExist`] for an unknown `id`, [`Error::Problem`] when exactly
    /// one problem was found and [`Error::Problems`] when several were.
    pub async fn verify_records(&self, id: &Uuid, locale: &str) -> Result<(), Error> {
        let mut domain = self
            .get(id)
            .await
            .ok_or(Error::DomainDoesNotExist(*id))?;
        domain.locale = Some(locale.to_string());

        let outcome = self.verifier.verify(&domain).await;
        domain.has_txt_record = outcome.txt_ok;
        domain.has_mx_record = outcome.mx_ok;
        self.store.write().await.put(domain).await?;

        let mut errors = outcome.errors;
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0).into()),
            _ => Err(Error::Problems(errors)),
        }
    }

    async fn unique_token(&self) -> Result<String, Error> {
        let store = self.store.read().await;
        for _ in 0..TOKEN_ATTEMPTS {
            let token = self.tokens.generate(self.config.verification_token_length);
            if store.find_by_token(&token).await.is_none() {
                return Ok(token);
            }
            tracing::warn!("generated verification token collided, retrying");
        }
        Err(Error::DuplicateVerificationToken)
    }
}
