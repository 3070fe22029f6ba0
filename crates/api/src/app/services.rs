//! Service wiring: document store, notifier, and the services built on them.

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;

use atelier_infra::notify::{LogNotifier, NotificationDispatcher, Notifier, NotifyError, SmtpNotifier};
use atelier_infra::store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, StoreError};
use atelier_infra::{
    CatalogCache, CatalogService, EnquiryService, NewsletterService, OrderCoordinator,
    UserDirectory,
};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("document store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("notifier setup failed: {0}")]
    Notifier(#[from] NotifyError),
}

/// Everything a request handler may call into.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub orders: OrderCoordinator,
    pub directory: UserDirectory,
    pub enquiries: EnquiryService,
    pub newsletter: NewsletterService,
}

impl AppServices {
    /// Wire services over an already constructed store and notifier.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        let notifications = NotificationDispatcher::new(notifier);
        let cache = CatalogCache::new(config.catalog_cache_capacity, config.catalog_cache_ttl);
        let directory = UserDirectory::new(store.clone(), notifications.clone());

        Self {
            catalog: CatalogService::new(store.clone(), cache.clone()),
            orders: OrderCoordinator::new(
                store.clone(),
                Arc::new(directory.clone()),
                notifications.clone(),
                cache,
            )
            .with_max_retries(config.order_max_retries),
            directory,
            enquiries: EnquiryService::new(store.clone()),
            newsletter: NewsletterService::new(store, notifications),
        }
    }
}

/// Postgres when `DATABASE_URL` is set (schema applied on startup), in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let store =
                PostgresDocumentStore::connect(url.expose_secret(), config.database_max_connections)
                    .await?;
            store.migrate().await?;
            tracing::info!("using postgres document store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "smtp notifications enabled");
            Arc::new(SmtpNotifier::new(settings)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set; notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    Ok(AppServices::new(store, notifier, config))
}
