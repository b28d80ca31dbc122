//! Rollback-in-cleanup scenarios.
//!
//! A scenario begins a transaction, runs [`UPDATE_SQL`], optionally commits,
//! and then always rolls back the way a deferred cleanup would. The outcome
//! of that last rollback is what gets compared across flavors.

use diesel_async::AsyncPgConnection;
use serde::Serialize;
use sqlx::PgPool;
use std::fmt;

use crate::db::{create_pool_with_config, ConnectionString, PoolConfig};
use crate::error::TxError;
use crate::queries::UPDATE_SQL;
use crate::transaction::{native, orm, pooled, Flavor, TxHandle};

/// Classification of the cleanup rollback's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    TxDone,
    TxClosed,
    Failed(String),
}

impl From<&Result<(), TxError>> for Outcome {
    fn from(result: &Result<(), TxError>) -> Self {
        match result {
            Ok(()) => Outcome::Ok,
            Err(TxError::TxDone) => Outcome::TxDone,
            Err(TxError::TxClosed) => Outcome::TxClosed,
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok => f.write_str("ok"),
            Outcome::TxDone => f.write_str("tx_done"),
            Outcome::TxClosed => f.write_str("tx_closed"),
            Outcome::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub flavor: Flavor,
    pub commit: bool,
}

impl Scenario {
    pub fn new(flavor: Flavor, commit: bool) -> Self {
        Self { flavor, commit }
    }

    /// Every flavor, committed first and then not.
    pub fn all() -> Vec<Scenario> {
        Flavor::ALL
            .iter()
            .flat_map(|&flavor| [true, false].map(|commit| Scenario::new(flavor, commit)))
            .collect()
    }

    pub fn name(&self) -> String {
        let step = if self.commit { "commit" } else { "no-commit" };
        format!("{}/{}", self.flavor, step)
    }

    /// What the cleanup rollback is expected to return.
    ///
    /// The ORM session reports success even after a commit.
    pub fn expected(&self) -> Outcome {
        match (self.flavor, self.commit) {
            (Flavor::Pooled, true) => Outcome::TxDone,
            (Flavor::Native, true) => Outcome::TxClosed,
            _ => Outcome::Ok,
        }
    }
}

#[derive(Debug)]
pub struct CleanupReport {
    /// Result of the update and optional commit.
    pub body: Result<(), TxError>,
    /// Result of the rollback that always runs afterwards.
    pub rollback: Result<(), TxError>,
}

/// Execute the update, commit when asked, then roll back regardless of how
/// the body ended.
pub async fn run_with_deferred_rollback<T>(tx: &mut T, commit: bool) -> CleanupReport
where
    T: TxHandle + ?Sized,
{
    let body = async {
        let rows = tx.execute(UPDATE_SQL).await?;
        tracing::debug!(rows, commit, "update executed");
        if commit {
            tx.commit().await?;
        }
        Ok::<(), TxError>(())
    }
    .await;

    let rollback = tx.rollback().await;
    if let Err(e) = &rollback {
        tracing::debug!(error = %e, "deferred rollback returned an error");
    }

    CleanupReport { body, rollback }
}

/// One open connection per flavor, reused sequentially across scenarios.
pub struct Connections {
    pub pool: PgPool,
    pub client: tokio_postgres::Client,
    pub orm: AsyncPgConnection,
}

impl Connections {
    pub async fn open(dsn: &ConnectionString, pool_config: PoolConfig) -> anyhow::Result<Self> {
        let url = dsn.to_url();
        let pool = create_pool_with_config(&url, pool_config).await?;
        let client = native::connect(&url).await?;
        let orm = orm::connect(&url).await?;
        tracing::info!(database_url = %dsn, "Opened pooled, native and orm connections");
        Ok(Self { pool, client, orm })
    }
}

/// Run one scenario and classify its cleanup rollback.
///
/// Failures before the cleanup (begin, update, commit) are returned as
/// errors rather than outcomes.
pub async fn run_scenario(conns: &mut Connections, scenario: Scenario) -> Result<Outcome, TxError> {
    let report = match scenario.flavor {
        Flavor::Pooled => {
            let mut tx = pooled::begin(&conns.pool).await?;
            run_with_deferred_rollback(&mut tx, scenario.commit).await
        }
        Flavor::Native => {
            let mut tx = native::begin(&mut conns.client).await?;
            run_with_deferred_rollback(&mut tx, scenario.commit).await
        }
        Flavor::Orm => {
            let mut tx = orm::begin(&mut conns.orm).await?;
            run_with_deferred_rollback(&mut tx, scenario.commit).await
        }
    };
    report.body?;

    let outcome = Outcome::from(&report.rollback);
    tracing::info!(scenario = %scenario.name(), outcome = %outcome, "scenario finished");
    Ok(outcome)
}
