//! Transaction handles for the three client flavors.
//!
//! Every client library consumes its transaction on commit, so a cleanup that
//! rolls back afterwards cannot be expressed against the library types
//! directly. Each handle here keeps the library transaction behind its own
//! state and decides what a second termination returns.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::error::TxError;

pub mod native;
pub mod orm;
pub mod pooled;

pub use native::NativeTx;
pub use orm::OrmTx;
pub use pooled::PooledTx;

/// Which client layer a handle wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// `sqlx` pool and transaction.
    Pooled,
    /// `tokio-postgres` client.
    Native,
    /// `diesel` through `diesel-async`.
    Orm,
}

impl Flavor {
    pub const ALL: [Flavor; 3] = [Flavor::Pooled, Flavor::Native, Flavor::Orm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Pooled => "pooled",
            Flavor::Native => "native",
            Flavor::Orm => "orm",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    Active,
    Committed,
    RolledBack,
}

impl TxState {
    pub fn is_active(self) -> bool {
        matches!(self, TxState::Active)
    }
}

/// A transaction that may be terminated more than once.
///
/// After the first `commit` or `rollback` the connection has been handed
/// back; later calls never touch it again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TxHandle: Send {
    fn flavor(&self) -> Flavor;

    fn state(&self) -> TxState;

    /// Run a statement inside the transaction and return the affected rows.
    async fn execute(&mut self, sql: &str) -> Result<u64, TxError>;

    async fn commit(&mut self) -> Result<(), TxError>;

    async fn rollback(&mut self) -> Result<(), TxError>;
}
