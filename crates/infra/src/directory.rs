//! Account directory: customer profiles, the admin capability, and the
//! sign-up approval workflow.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use atelier_auth::Principal;
use atelier_core::{DomainError, ExpectedVersion, UserId};
use atelier_parties::{AccountStateError, AccountStatus, UserAccount};

use crate::notify::{NotificationDispatcher, templates};
use crate::store::{DocumentStore, DocumentStoreExt, StoreError, UnitOfWork};

/// Contact fields copied onto new orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub company_name: String,
    pub mobile_number: String,
}

/// Purchaser profile lookup. Absence is not an error.
#[async_trait::async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn profile(&self, uid: &UserId) -> Result<Option<ProfileFields>, StoreError>;
}

/// The single privileged capability ("is this caller an administrator").
#[async_trait::async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn is_privileged(&self, uid: &UserId) -> Result<bool, StoreError>;
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("account {0} not found")]
    NotFound(UserId),

    #[error("account {0} is already registered")]
    AlreadyRegistered(UserId),

    #[error(transparent)]
    State(#[from] AccountStateError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn DocumentStore>,
    notifications: NotificationDispatcher,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    pub async fn account(&self, uid: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self
            .store
            .load::<UserAccount>(uid.as_str())
            .await?
            .map(|v| v.document))
    }

    /// Record the caller as a pending account awaiting approval.
    #[tracing::instrument(skip(self, caller), fields(uid = %caller.uid), err)]
    pub async fn register(
        &self,
        caller: &Principal,
        display_name: Option<String>,
        company_name: String,
        mobile_number: String,
    ) -> Result<UserAccount, DirectoryError> {
        let account = UserAccount::register(
            caller.uid.clone(),
            &caller.email,
            display_name.unwrap_or_else(|| caller.display_name.clone()),
            company_name,
            mobile_number,
            Utc::now(),
        )?;

        let mut uow = UnitOfWork::new();
        uow.insert(&account)?;
        match self.store.commit(uow).await {
            Ok(()) => Ok(account),
            Err(StoreError::Conflict(_)) => Err(DirectoryError::AlreadyRegistered(caller.uid.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Pending accounts, oldest first.
    pub async fn pending(&self) -> Result<Vec<UserAccount>, DirectoryError> {
        let mut pending: Vec<UserAccount> = self
            .store
            .load_all::<UserAccount>()
            .await?
            .into_iter()
            .map(|v| v.document)
            .filter(|a| a.status() == AccountStatus::Pending)
            .collect();
        pending.sort_by_key(|a| a.created_at());
        Ok(pending)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn approve(&self, uid: &UserId) -> Result<UserAccount, DirectoryError> {
        let mut current = self
            .store
            .load::<UserAccount>(uid.as_str())
            .await?
            .ok_or_else(|| DirectoryError::NotFound(uid.clone()))?;
        current.document.approve(Utc::now())?;

        let mut uow = UnitOfWork::new();
        uow.put(&current.document, current.expected())?;
        self.store.commit(uow).await?;

        let account = current.document;
        self.notifications
            .dispatch(templates::account_approved(&account));
        tracing::info!(uid = %uid, "account approved");
        Ok(account)
    }

    /// Rejection removes the account record.
    #[tracing::instrument(skip(self), err)]
    pub async fn reject(&self, uid: &UserId) -> Result<(), DirectoryError> {
        let current = self
            .store
            .load::<UserAccount>(uid.as_str())
            .await?
            .ok_or_else(|| DirectoryError::NotFound(uid.clone()))?;

        let mut uow = UnitOfWork::new();
        uow.delete::<UserAccount>(uid.as_str(), current.expected());
        self.store.commit(uow).await?;
        tracing::info!(uid = %uid, "account rejected");
        Ok(())
    }

    /// Make `uid` an approved administrator, creating the account if needed.
    pub async fn grant_admin(
        &self,
        uid: &UserId,
        email: &str,
        display_name: &str,
    ) -> Result<UserAccount, DirectoryError> {
        let now = Utc::now();
        let (mut account, expected) = match self.store.load::<UserAccount>(uid.as_str()).await? {
            Some(v) => {
                let expected = v.expected();
                (v.document, expected)
            }
            None => (
                UserAccount::register(uid.clone(), email, display_name, "", "", now)?,
                ExpectedVersion::ABSENT,
            ),
        };
        account.grant_admin(now);

        let mut uow = UnitOfWork::new();
        uow.put(&account, expected)?;
        self.store.commit(uow).await?;
        tracing::info!(uid = %uid, "admin capability granted");
        Ok(account)
    }
}

#[async_trait::async_trait]
impl ProfileLookup for UserDirectory {
    async fn profile(&self, uid: &UserId) -> Result<Option<ProfileFields>, StoreError> {
        Ok(self
            .store
            .load::<UserAccount>(uid.as_str())
            .await?
            .map(|v| ProfileFields {
                company_name: v.document.company_name().to_string(),
                mobile_number: v.document.mobile_number().to_string(),
            }))
    }
}

#[async_trait::async_trait]
impl AccessPolicy for UserDirectory {
    async fn is_privileged(&self, uid: &UserId) -> Result<bool, StoreError> {
        Ok(self
            .store
            .load::<UserAccount>(uid.as_str())
            .await?
            .is_some_and(|v| v.document.is_admin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::store::InMemoryDocumentStore;

    fn directory() -> UserDirectory {
        UserDirectory::new(
            Arc::new(InMemoryDocumentStore::new()),
            NotificationDispatcher::new(Arc::new(RecordingNotifier::new())),
        )
    }

    fn caller(uid: &str) -> Principal {
        Principal {
            uid: UserId::new(uid).unwrap(),
            email: format!("{uid}@example.com"),
            display_name: uid.to_string(),
        }
    }

    #[tokio::test]
    async fn registration_approval_flow() {
        let dir = directory();
        let c = caller("u1");
        dir.register(&c, None, "Acme".into(), "0123".into()).await.unwrap();
        assert_eq!(dir.pending().await.unwrap().len(), 1);
        assert!(matches!(
            dir.register(&c, None, String::new(), String::new()).await,
            Err(DirectoryError::AlreadyRegistered(_))
        ));

        let approved = dir.approve(&c.uid).await.unwrap();
        assert_eq!(approved.status(), AccountStatus::Approved);
        assert!(dir.pending().await.unwrap().is_empty());
        assert!(matches!(
            dir.approve(&c.uid).await,
            Err(DirectoryError::State(AccountStateError::AlreadyApproved { .. }))
        ));

        let profile = dir.profile(&c.uid).await.unwrap().unwrap();
        assert_eq!(profile.company_name, "Acme");
    }

    #[tokio::test]
    async fn reject_removes_account() {
        let dir = directory();
        let c = caller("u2");
        dir.register(&c, None, String::new(), String::new()).await.unwrap();
        dir.reject(&c.uid).await.unwrap();
        assert!(dir.account(&c.uid).await.unwrap().is_none());
        assert!(matches!(
            dir.reject(&c.uid).await,
            Err(DirectoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn only_granted_admins_are_privileged() {
        let dir = directory();
        let c = caller("u3");
        dir.register(&c, None, String::new(), String::new()).await.unwrap();
        assert!(!dir.is_privileged(&c.uid).await.unwrap());

        dir.grant_admin(&c.uid, "ignored@example.com", "ignored").await.unwrap();
        assert!(dir.is_privileged(&c.uid).await.unwrap());

        let unknown = UserId::new("ghost").unwrap();
        assert!(!dir.is_privileged(&unknown).await.unwrap());
        dir.grant_admin(&unknown, "ghost@example.com", "Ghost").await.unwrap();
        assert!(dir.is_privileged(&unknown).await.unwrap());
    }
}
