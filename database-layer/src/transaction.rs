// Transaction management
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use futures::future::BoxFuture;
use sqlx::{PgConnection, Postgres, Transaction};
use std::fmt::Display;
use tracing::{debug, error, warn};

/// Runs multi-statement work as one all-or-nothing unit
#[derive(Clone, Debug)]
pub struct TransactionManager {
    pool: DatabasePool,
}

impl TransactionManager {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Begin a new transaction at the server's default isolation level (READ COMMITTED)
    pub async fn begin(&self) -> DatabaseResult<Transaction<'static, Postgres>> {
        debug!("Beginning transaction");

        self.pool.pool().begin().await.map_err(DatabaseError::from)
    }

    /// Run `work` inside a transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back every statement it issued
    /// when it returns `Err`. A failed commit is reported as an error and
    /// leaves the database untouched.
    pub async fn run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>> + Send,
        T: Send,
        E: From<DatabaseError> + Display + Send,
    {
        let mut tx = self.begin().await?;

        match work(&mut *tx).await {
            Ok(value) => {
                tx.commit().await.map_err(|e| {
                    error!("Failed to commit transaction: {}", e);
                    DatabaseError::TransactionFailed(e.to_string())
                })?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(work_error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    // The server discards the transaction when the connection drops.
                    warn!("Rollback failed: {}", rollback_error);
                }
                debug!("Transaction rolled back: {}", work_error);
                Err(work_error)
            }
        }
    }
}
