use std::sync::Arc;

use atelier_core::UserId;
use atelier_infra::UserDirectory;
use atelier_infra::notify::{LogNotifier, NotificationDispatcher};
use atelier_infra::store::PostgresDocumentStore;

/// Grant the admin capability, creating an approved account if none exists.
pub async fn grant(
    store: PostgresDocumentStore,
    uid: &str,
    email: &str,
    name: &str,
) -> anyhow::Result<()> {
    let uid = UserId::new(uid)?;
    let directory = UserDirectory::new(
        Arc::new(store),
        NotificationDispatcher::new(Arc::new(LogNotifier)),
    );

    let account = directory.grant_admin(&uid, email, name).await?;
    tracing::info!(uid = %uid, email = %account.email(), "Admin granted");
    Ok(())
}
