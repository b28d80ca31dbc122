use anyhow::Context;

use rollback_harness::{
    config::Config,
    db::create_pool_with_config,
    logging,
    queries::{GREETING_SQL, UPDATE_SQL},
    transaction::{pooled, TxHandle},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        max_connections = config.pool.max_connections,
        acquire_timeout_secs = config.pool.acquire_timeout_secs,
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool_with_config(&config.database_url.to_url(), config.pool)
        .await
        .context("Unable to connect to database")?;

    let greeting: String = sqlx::query_scalar(GREETING_SQL)
        .fetch_one(&pool)
        .await
        .context("QueryRow failed")?;
    println!("{}", greeting);

    let mut tx = pooled::begin(&pool).await.context("BeginTx failed")?;
    let body = async {
        let rows = tx.execute(UPDATE_SQL).await.context("Exec failed")?;
        tx.commit().await.context("Commit failed")?;
        tracing::info!(rows, "update committed");
        Ok::<(), anyhow::Error>(())
    }
    .await;

    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Rollback failed");
    }
    body?;

    pool.close().await;
    Ok(())
}
