//! Database layer for the ward billing engine
//!
//! Provides the pieces every repository needs and nothing domain specific:
//!
//! - [`DatabasePool`]: an explicitly constructed, cloneable PostgreSQL pool
//!   with health checks and embedded schema migrations
//! - [`TransactionManager`]: a unit of work that commits on success and
//!   rolls back every statement on failure
//! - [`DatabaseError`]: error taxonomy that separates retryable pool and
//!   connectivity failures from query failures
//!
//! # Example
//!
//! ```rust,no_run
//! use database_layer::{DatabasePool, DatabaseError, PoolConfig, TransactionManager};
//! use futures::FutureExt;
//!
//! # async fn demo() -> Result<(), DatabaseError> {
//! let pool = DatabasePool::new("postgres://localhost/iv_db", &PoolConfig::default()).await?;
//! pool.run_migrations().await?;
//!
//! let tx = TransactionManager::new(pool.clone());
//! let archived: i64 = tx
//!     .run(|conn| {
//!         async move {
//!             let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM discharged_patients")
//!                 .fetch_one(conn)
//!                 .await?;
//!             Ok::<_, DatabaseError>(count.0)
//!         }
//!         .boxed()
//!     })
//!     .await?;
//! # let _ = archived;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod transaction;

pub use connection::*;
pub use error::*;
pub use transaction::*;
