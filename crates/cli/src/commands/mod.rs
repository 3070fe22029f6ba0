pub mod admin;
pub mod migrate;
pub mod seed;

use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};

use atelier_infra::store::PostgresDocumentStore;

pub async fn connect() -> anyhow::Result<PostgresDocumentStore> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .context("DATABASE_URL not set")?;

    tracing::info!("Connecting to database...");
    Ok(PostgresDocumentStore::connect(database_url.expose_secret(), 2).await?)
}
