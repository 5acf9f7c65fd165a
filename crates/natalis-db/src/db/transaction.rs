//! Database transaction utilities
//!
//! This module provides a guard for multi-step operations that need atomicity.

use sqlx::{Sqlite, SqlitePool, Transaction};
use std::ops::{Deref, DerefMut};

/// A database transaction wrapper with explicit commit/rollback
///
/// # Example
///
/// ```ignore
/// use natalis_db::TransactionGuard;
///
/// async fn example(pool: &sqlx::SqlitePool) -> Result<(), sqlx::Error> {
///     let mut tx = TransactionGuard::begin(pool).await?;
///     sqlx::query("DELETE FROM ...").execute(&mut **tx).await?;
///     tx.commit().await?;
///     Ok(())
/// }
/// ```
pub struct TransactionGuard<'a> {
    transaction: Option<Transaction<'a, Sqlite>>,
}

impl<'a> TransactionGuard<'a> {
    /// Begin a new database transaction
    pub async fn begin(pool: &'a SqlitePool) -> Result<Self, sqlx::Error> {
        let transaction = pool.begin().await?;

        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// Commit the transaction
    pub async fn commit(mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.transaction.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    /// Rollback the transaction
    pub async fn rollback(mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

impl<'a> Deref for TransactionGuard<'a> {
    type Target = Transaction<'a, Sqlite>;

    fn deref(&self) -> &Self::Target {
        self.transaction
            .as_ref()
            .expect("Transaction was already committed or rolled back")
    }
}

impl<'a> DerefMut for TransactionGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.transaction
            .as_mut()
            .expect("Transaction was already committed or rolled back")
    }
}

impl<'a> Drop for TransactionGuard<'a> {
    fn drop(&mut self) {
        // sqlx queues a rollback when the inner transaction is dropped
        if self.transaction.is_some() {
            tracing::warn!("Transaction was dropped without explicit commit or rollback - rolling back");
        }
    }
}
