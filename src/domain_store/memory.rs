use crate::domain::Domain;
use crate::domain_store::DomainStore;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryDomainStore {
    domains: HashMap<Uuid, Domain>,
}

#[async_trait::async_trait]
impl DomainStore for InMemoryDomainStore {
    async fn put(&mut self, domain: Domain) -> Result<(), Error> {
        if let Some(token) = &domain.verification_token {
            let taken = self
                .domains
                .values()
                .any(|d| d.id != domain.id && d.verification_token.as_ref() == Some(token));
            if taken {
                return Err(Error::DuplicateVerificationToken);
            }
        }
        self.domains.insert(domain.id, domain);
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Option<Domain> {
        self.domains.get(id).cloned()
    }

    async fn find_by_token(&self, token: &str) -> Option<Domain> {
        self.domains
            .values()
            .find(|d| d.verification_token.as_deref() == Some(token))
            .cloned()
    }

    async fn list(&self) -> Vec<Domain> {
        let mut domains: Vec<Domain> = self.domains.values().cloned().collect();
        domains.sort_by(|a, b| a.name.cmp(&b.name));
        domains
    }
}
