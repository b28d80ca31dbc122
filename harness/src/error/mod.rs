use thiserror::Error;

/// Errors surfaced by the transaction handles and connection helpers.
///
/// `TxDone` and `TxClosed` are the terminal-state sentinels. Each client
/// flavor reports its own, so callers can tell which layer refused the call.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("transaction has already been committed or rolled back")]
    TxDone,
    #[error("tx is closed")]
    TxClosed,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("driver error: {0}")]
    Driver(#[from] tokio_postgres::Error),
    #[error("orm error: {0}")]
    Orm(#[from] diesel::result::Error),
    #[error("orm connection error: {0}")]
    OrmConnection(#[from] diesel::result::ConnectionError),
    #[error("invalid connection string: {0}")]
    InvalidDsn(String),
}

impl TxError {
    /// True for the "already closed" sentinels, false for everything else.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxError::TxDone | TxError::TxClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_sentinels_are_distinct() {
        assert!(TxError::TxDone.is_terminal());
        assert!(TxError::TxClosed.is_terminal());
        assert_ne!(
            std::mem::discriminant(&TxError::TxDone),
            std::mem::discriminant(&TxError::TxClosed)
        );
    }

    #[test]
    fn statement_failures_are_not_terminal() {
        assert!(!TxError::Database(sqlx::Error::RowNotFound).is_terminal());
        assert!(!TxError::Orm(diesel::result::Error::NotInTransaction).is_terminal());
        assert!(!TxError::InvalidDsn("empty".into()).is_terminal());
    }

    #[test]
    fn display_messages_match_sentinels() {
        assert_eq!(
            TxError::TxDone.to_string(),
            "transaction has already been committed or rolled back"
        );
        assert_eq!(TxError::TxClosed.to_string(), "tx is closed");
    }
}
