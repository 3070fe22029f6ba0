//! Newsletter subscriptions and campaign delivery.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use atelier_core::{CampaignId, DomainError, ExpectedVersion};
use atelier_parties::{Campaign, Subscriber};

use crate::notify::{NotificationDispatcher, templates};
use crate::store::{DocumentStore, DocumentStoreExt, StoreError, UnitOfWork};

#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error("campaign {0} not found")]
    CampaignNotFound(CampaignId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct NewsletterService {
    store: Arc<dyn DocumentStore>,
    notifications: NotificationDispatcher,
}

impl NewsletterService {
    pub fn new(store: Arc<dyn DocumentStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Idempotent: subscribing an existing address keeps the original record.
    pub async fn subscribe(&self, email: &str) -> Result<Subscriber, NewsletterError> {
        let subscriber = Subscriber::new(email, Utc::now())?;
        let mut uow = UnitOfWork::new();
        uow.insert(&subscriber)?;
        match self.store.commit(uow).await {
            Ok(()) => {
                tracing::info!("newsletter subscription added");
                Ok(subscriber)
            }
            Err(StoreError::Conflict(_) | StoreError::Duplicate(_)) => Ok(self
                .store
                .load::<Subscriber>(&subscriber.email)
                .await?
                .map(|v| v.document)
                .unwrap_or(subscriber)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create_campaign(
        &self,
        subject: String,
        content: String,
    ) -> Result<Campaign, NewsletterError> {
        let campaign = Campaign::draft(CampaignId::new(), subject, content, Utc::now())?;
        let mut uow = UnitOfWork::new();
        uow.insert(&campaign)?;
        self.store.commit(uow).await?;
        Ok(campaign)
    }

    /// Campaigns, newest first.
    pub async fn campaigns(&self) -> Result<Vec<Campaign>, NewsletterError> {
        let mut campaigns: Vec<Campaign> = self
            .store
            .load_all::<Campaign>()
            .await?
            .into_iter()
            .map(|v| v.document)
            .collect();
        campaigns.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(campaigns)
    }

    /// Deliver a campaign to every subscriber and record the outcome.
    #[tracing::instrument(skip(self), err)]
    pub async fn send_campaign(&self, id: CampaignId) -> Result<Campaign, NewsletterError> {
        let current = self
            .store
            .load::<Campaign>(&id.to_string())
            .await?
            .ok_or(NewsletterError::CampaignNotFound(id))?;
        current.document.ensure_sendable()?;

        let subscribers = self.store.load_all::<Subscriber>().await?;
        let mut failures = 0u32;
        for s in &subscribers {
            let message = templates::campaign(
                &s.document.email,
                current.document.subject(),
                current.document.content(),
            );
            if let Err(err) = self.notifications.deliver(&message).await {
                failures += 1;
                tracing::warn!(error = %err, "campaign delivery failed for one recipient");
            }
        }

        let mut campaign = current.document.clone();
        let recipients = u32::try_from(subscribers.len()).unwrap_or(u32::MAX);
        campaign.record_delivery(recipients, failures, Utc::now());

        let mut uow = UnitOfWork::new();
        uow.put(&campaign, ExpectedVersion::Exact(current.version))?;
        self.store.commit(uow).await?;
        tracing::info!(recipients, failures, "campaign delivered");
        Ok(campaign)
    }
}
