use atelier_infra::store::PostgresDocumentStore;

pub async fn run(store: &PostgresDocumentStore) -> anyhow::Result<()> {
    tracing::info!("Applying document store schema...");
    store.migrate().await?;
    tracing::info!("Migrations complete");
    Ok(())
}
