//! `tokio-postgres` flavor: a transaction borrowed from a single client.

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Transaction};

use super::{Flavor, TxHandle, TxState};
use crate::error::TxError;

/// Open a client and drive its connection on a background task.
pub async fn connect(database_url: &str) -> Result<Client, TxError> {
    let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "postgres connection terminated");
        }
    });
    Ok(client)
}

pub struct NativeTx<'a> {
    inner: Option<Transaction<'a>>,
    state: TxState,
}

pub async fn begin(client: &mut Client) -> Result<NativeTx<'_>, TxError> {
    let tx = client.transaction().await?;
    Ok(NativeTx {
        inner: Some(tx),
        state: TxState::Active,
    })
}

#[async_trait]
impl<'a> TxHandle for NativeTx<'a> {
    fn flavor(&self) -> Flavor {
        Flavor::Native
    }

    fn state(&self) -> TxState {
        self.state
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, TxError> {
        let tx = self.inner.as_ref().ok_or(TxError::TxClosed)?;
        Ok(tx.execute(sql, &[]).await?)
    }

    async fn commit(&mut self) -> Result<(), TxError> {
        let tx = self.inner.take().ok_or(TxError::TxClosed)?;
        match tx.commit().await {
            Ok(()) => {
                self.state = TxState::Committed;
                Ok(())
            }
            Err(e) => {
                self.state = TxState::RolledBack;
                Err(e.into())
            }
        }
    }

    async fn rollback(&mut self) -> Result<(), TxError> {
        let tx = self.inner.take().ok_or(TxError::TxClosed)?;
        self.state = TxState::RolledBack;
        tx.rollback().await?;
        Ok(())
    }
}
