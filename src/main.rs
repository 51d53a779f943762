use anyhow::{anyhow, Result};
use forwardcrab::domain_store::DynDomainStore;
use forwardcrab::{
    Config, DomainService, FileDomainStore, InMemoryDomainStore, ResolverDnsLookup, SharedConfig,
    Verifier,
};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut args = std::env::args().take(3);
    let (program_name, config_file, domain_id) = (
        args.next().unwrap_or("forwardcrab".to_string()),
        args.next(),
        args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let domain_id = domain_id
        .map(|id| Uuid::parse_str(&id))
        .transpose()
        .map_err(|err| anyhow!("invalid domain id: {err}"))?;

    let store = store_init(&config).await?;
    let lookup = Arc::new(ResolverDnsLookup::try_from_config(&config)?);
    let verifier = Verifier::new(config.clone(), lookup);
    let service = DomainService::new(config.clone(), store.clone(), verifier);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        res = verify_all(&service, &store, domain_id, &config.default_locale) => res?,
    }
    tracing::info!("goodbye");
    Ok(())
}

async fn verify_all(
    service: &DomainService,
    store: &DynDomainStore,
    domain_id: Option<Uuid>,
    locale: &str,
) -> Result<()> {
    let ids: Vec<Uuid> = match domain_id {
        Some(id) => vec![id],
        None => store.read().await.list().await.iter().map(|d| d.id).collect(),
    };
    tracing::info!("verifying {} domain(s)", ids.len());

    for id in ids {
        match service.verify_records(&id, locale).await {
            Ok(()) => tracing::info!("domain {id} is verified"),
            Err(forwardcrab::error::Error::DomainDoesNotExist(id)) => {
                return Err(anyhow!("domain {id} does not exist"));
            }
            Err(err) => tracing::warn!("domain {id} failed verification:\n{err}"),
        }
    }
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forwardcrab=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!(
            "usage: {program_name} /path/to/config.json [domain-id]"
        )),
        Some(config_file) => {
            tracing::debug!("loaded config from {config_file}");
            let config = Config::try_from_file(&config_file)?;
            Ok(Arc::new(config))
        }
    }
}

async fn store_init(config: &Config) -> Result<DynDomainStore> {
    let store: DynDomainStore = match &config.domain_store_path {
        Some(path) => {
            tracing::info!("loading domains from {path}");
            Arc::new(RwLock::new(FileDomainStore::try_from_file(path).await?))
        }
        None => {
            tracing::info!("no domain_store_path configured, domains are kept in memory");
            Arc::new(RwLock::new(InMemoryDomainStore::default()))
        }
    };
    Ok(store)
}
