//! `diesel` flavor: an ORM session over a single async connection.
//!
//! Transaction bookkeeping is left to diesel's transaction manager. Rolling
//! back when the manager reports no open transaction is treated as a no-op,
//! so a cleanup rollback after commit succeeds silently. Commit keeps
//! diesel's error.
//!
//! An `OrmTx` dropped without commit or rollback leaves its transaction open
//! on the connection; the next [`begin`] rolls it back before starting.

use async_trait::async_trait;
use diesel::result::Error as DieselError;
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::{
    AnsiTransactionManager, AsyncConnection, AsyncPgConnection, RunQueryDsl, TransactionManager,
};
use std::num::NonZeroU32;

use super::{Flavor, TxHandle, TxState};
use crate::error::TxError;
use crate::schema::users;

pub async fn connect(database_url: &str) -> Result<AsyncPgConnection, TxError> {
    Ok(AsyncPgConnection::establish(database_url).await?)
}

/// Name of the user row `id`, read outside any transaction handle.
pub async fn user_name(conn: &mut AsyncPgConnection, id: i32) -> Result<String, TxError> {
    let name = users::table
        .find(id)
        .select(users::name)
        .first::<String>(conn)
        .await?;
    Ok(name)
}

pub struct OrmTx<'a> {
    conn: &'a mut AsyncPgConnection,
    state: TxState,
}

type Manager = AnsiTransactionManager;

fn open_depth(conn: &mut AsyncPgConnection) -> Result<Option<NonZeroU32>, TxError> {
    let status =
        <Manager as TransactionManager<AsyncPgConnection>>::transaction_manager_status_mut(conn);
    Ok(status.transaction_depth()?)
}

pub async fn begin(conn: &mut AsyncPgConnection) -> Result<OrmTx<'_>, TxError> {
    while let Some(depth) = open_depth(conn)? {
        tracing::warn!(
            depth = depth.get(),
            "rolling back transaction abandoned on this connection"
        );
        <Manager as TransactionManager<AsyncPgConnection>>::rollback_transaction(conn).await?;
    }
    <Manager as TransactionManager<AsyncPgConnection>>::begin_transaction(conn).await?;
    Ok(OrmTx {
        conn,
        state: TxState::Active,
    })
}

impl<'a> OrmTx<'a> {
    fn ensure_active(&self) -> Result<(), TxError> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(DieselError::NotInTransaction.into())
        }
    }

    /// DSL form of the fixture update.
    pub async fn rename_user(&mut self, id: i32, name: &str) -> Result<usize, TxError> {
        self.ensure_active()?;
        let rows = diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::name.eq(name))
            .execute(&mut *self.conn)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl<'a> TxHandle for OrmTx<'a> {
    fn flavor(&self) -> Flavor {
        Flavor::Orm
    }

    fn state(&self) -> TxState {
        self.state
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, TxError> {
        self.ensure_active()?;
        let rows = diesel::sql_query(sql).execute(&mut *self.conn).await?;
        Ok(rows as u64)
    }

    async fn commit(&mut self) -> Result<(), TxError> {
        let result =
            <Manager as TransactionManager<AsyncPgConnection>>::commit_transaction(&mut *self.conn)
                .await;
        match result {
            Ok(()) => {
                self.state = TxState::Committed;
                Ok(())
            }
            // A second commit leaves the first outcome in place.
            Err(DieselError::NotInTransaction) => Err(DieselError::NotInTransaction.into()),
            Err(e) => {
                self.state = TxState::RolledBack;
                Err(e.into())
            }
        }
    }

    async fn rollback(&mut self) -> Result<(), TxError> {
        let result = <Manager as TransactionManager<AsyncPgConnection>>::rollback_transaction(
            &mut *self.conn,
        )
        .await;
        match result {
            Ok(()) => {
                self.state = TxState::RolledBack;
                Ok(())
            }
            Err(DieselError::NotInTransaction) => {
                tracing::debug!(state = ?self.state, "rollback without open transaction ignored");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
