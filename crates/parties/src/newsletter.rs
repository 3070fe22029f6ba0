use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::error::require_non_empty;
use atelier_core::{CampaignId, Document, DomainError, DomainResult};

use crate::contact::normalize_email;

/// A newsletter recipient, unique by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn new(email: &str, subscribed_at: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            email: normalize_email(email)?,
            subscribed_at,
        })
    }
}

impl Document for Subscriber {
    const COLLECTION: &'static str = "subscribers";

    fn document_id(&self) -> String {
        self.email.clone()
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Sent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    id: CampaignId,
    subject: String,
    content: String,
    status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    recipient_count: u32,
    created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn draft(
        id: CampaignId,
        subject: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let subject = subject.into();
        let content = content.into();
        require_non_empty("subject", &subject)?;
        require_non_empty("content", &content)?;
        Ok(Self {
            id,
            subject,
            content,
            status: CampaignStatus::Draft,
            sent_at: None,
            recipient_count: 0,
            created_at,
        })
    }

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn recipient_count(&self) -> u32 {
        self.recipient_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ensure_sendable(&self) -> DomainResult<()> {
        if self.status == CampaignStatus::Sent {
            return Err(DomainError::conflict(format!(
                "campaign {} was already sent",
                self.id
            )));
        }
        Ok(())
    }

    /// Record the outcome of a delivery run.
    pub fn record_delivery(&mut self, recipients: u32, failures: u32, at: DateTime<Utc>) {
        self.recipient_count = recipients;
        self.sent_at = Some(at);
        self.status = if failures == 0 {
            CampaignStatus::Sent
        } else {
            CampaignStatus::Failed
        };
    }
}

impl Document for Campaign {
    const COLLECTION: &'static str = "campaigns";

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
