use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atelier_core::{Document, DomainResult, UserId};

use crate::contact::normalize_email;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountStateError {
    #[error("account {uid} is already approved")]
    AlreadyApproved { uid: UserId },
}

/// A storefront customer known to the directory.
///
/// New sign-ups start `Pending` until an administrator approves them. The
/// `admin` flag is the single privileged capability checked by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    uid: UserId,
    email: String,
    display_name: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    mobile_number: String,
    status: AccountStatus,
    #[serde(default)]
    admin: bool,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approved_at: Option<DateTime<Utc>>,
}

impl UserAccount {
    pub fn register(
        uid: UserId,
        email: &str,
        display_name: impl Into<String>,
        company_name: impl Into<String>,
        mobile_number: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            uid,
            email: normalize_email(email)?,
            display_name: display_name.into().trim().to_string(),
            company_name: company_name.into().trim().to_string(),
            mobile_number: mobile_number.into().trim().to_string(),
            status: AccountStatus::Pending,
            admin: false,
            created_at,
            approved_at: None,
        })
    }

    pub fn uid(&self) -> &UserId {
        &self.uid
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn mobile_number(&self) -> &str {
        &self.mobile_number
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Administrators must also be approved.
    pub fn is_admin(&self) -> bool {
        self.admin && self.status == AccountStatus::Approved
    }

    pub fn approve(&mut self, at: DateTime<Utc>) -> Result<(), AccountStateError> {
        if self.status == AccountStatus::Approved {
            return Err(AccountStateError::AlreadyApproved {
                uid: self.uid.clone(),
            });
        }
        self.status = AccountStatus::Approved;
        self.approved_at = Some(at);
        Ok(())
    }

    /// Grant administrator rights, approving the account if needed.
    pub fn grant_admin(&mut self, at: DateTime<Utc>) {
        if self.status == AccountStatus::Pending {
            self.status = AccountStatus::Approved;
            self.approved_at = Some(at);
        }
        self.admin = true;
    }
}

impl Document for UserAccount {
    const COLLECTION: &'static str = "users";

    fn document_id(&self) -> String {
        self.uid.to_string()
    }
}
