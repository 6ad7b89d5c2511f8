use deadpool_diesel::postgres::Pool;

use crate::errors::DatabaseError;

/// Runs blocking diesel work on a pooled connection and tags failures with `operation`.
pub trait PoolExt {
    /// ```ignore
    /// let vaults = pool
    ///     .interact_with_context("list vaults".to_string(), Vault::find_all)
    ///     .await?;
    /// ```
    fn interact_with_context<F, T, E>(
        &self,
        operation: String,
        f: F,
    ) -> impl std::future::Future<Output = Result<T, DatabaseError>> + Send
    where
        F: FnOnce(&mut diesel::PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<DatabaseError> + Send + 'static;
}

impl PoolExt for Pool {
    async fn interact_with_context<F, T, E>(
        &self,
        operation: String,
        f: F,
    ) -> Result<T, DatabaseError>
    where
        F: FnOnce(&mut diesel::PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<DatabaseError> + Send + 'static,
    {
        let conn = self.get().await.map_err(|e| {
            tracing::error!(operation = %operation, error = %e, "Could not check out a database connection");
            DatabaseError::Pool {
                operation: operation.clone(),
                message: e.to_string(),
            }
        })?;

        let result = conn.interact(f).await.map_err(|e| {
            tracing::error!(operation = %operation, error = %e, "Database interaction aborted");
            DatabaseError::Interaction {
                operation: operation.clone(),
                message: e.to_string(),
            }
        })?;

        result.map_err(|e| {
            let err = e.into().with_operation(&operation);
            if !err.is_not_found() {
                tracing::error!(operation = %operation, error = %err, "Database query failed");
            }
            err
        })
    }
}
