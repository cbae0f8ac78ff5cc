//! Applies the schema migrations under `migrations/` to the configured database.

use people_service::config::Config;
use people_service::db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    people_service::obs::init_tracing(&config.env);
    let db = Database::new(&config.database_url).await?;

    tracing::info!("start migrations");
    db.migrate().await?;
    tracing::info!("migration finished");

    db.close().await;
    Ok(())
}
