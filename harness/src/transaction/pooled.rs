//! `sqlx` flavor: a pool-backed transaction.
//!
//! The pooled connection goes back to the pool when the inner transaction is
//! committed, rolled back or dropped. Once it is gone every call reports
//! [`TxError::TxDone`].

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{Flavor, TxHandle, TxState};
use crate::error::TxError;

pub struct PooledTx {
    inner: Option<Transaction<'static, Postgres>>,
    state: TxState,
}

/// Begin a transaction on a connection acquired from `pool`.
pub async fn begin(pool: &PgPool) -> Result<PooledTx, TxError> {
    let tx = pool.begin().await?;
    Ok(PooledTx {
        inner: Some(tx),
        state: TxState::Active,
    })
}

#[async_trait]
impl TxHandle for PooledTx {
    fn flavor(&self) -> Flavor {
        Flavor::Pooled
    }

    fn state(&self) -> TxState {
        self.state
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, TxError> {
        let tx = self.inner.as_mut().ok_or(TxError::TxDone)?;
        let result = sqlx::query(sql).execute(&mut **tx).await?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), TxError> {
        let tx = self.inner.take().ok_or(TxError::TxDone)?;
        match tx.commit().await {
            Ok(()) => {
                self.state = TxState::Committed;
                Ok(())
            }
            Err(e) => {
                // The server aborts a transaction whose COMMIT failed.
                self.state = TxState::RolledBack;
                Err(e.into())
            }
        }
    }

    async fn rollback(&mut self) -> Result<(), TxError> {
        let tx = self.inner.take().ok_or(TxError::TxDone)?;
        self.state = TxState::RolledBack;
        tx.rollback().await?;
        Ok(())
    }
}
