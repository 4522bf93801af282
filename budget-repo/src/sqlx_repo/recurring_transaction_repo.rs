use crate::recurring_transaction_repo::RecurringTransactionRepoError::RecurringTransactionNotFound;
use crate::recurring_transaction_repo::{
    NewRecurringTransaction, RecurringTransaction, RecurringTransactionRepo,
    RecurringTransactionRepoError,
};
use crate::sqlx_repo::SQLxRepo;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct RecurringTransactionEntry {
    id: i32,
    name: String,
}

impl From<RecurringTransactionEntry> for RecurringTransaction {
    fn from(value: RecurringTransactionEntry) -> Self {
        RecurringTransaction {
            id: value.id,
            name: value.name,
        }
    }
}

#[async_trait]
impl RecurringTransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn create_recurring_transaction(
        &self,
        user_id: &str,
        new_recurring_transaction: NewRecurringTransaction,
    ) -> Result<RecurringTransaction, RecurringTransactionRepoError> {
        let entry: RecurringTransactionEntry = query_as(
            "INSERT INTO recurring_transactions(user_id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(user_id)
        .bind(&new_recurring_transaction.name)
        .fetch_one(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Unable to create recurring transaction {}",
                new_recurring_transaction.name
            )
        })?;
        Ok(entry.into())
    }

    #[instrument(skip(self))]
    async fn get_recurring_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecurringTransaction>, RecurringTransactionRepoError> {
        let recurring_transactions = query_as::<_, RecurringTransactionEntry>(
            "SELECT id, name FROM recurring_transactions WHERE user_id = $1 ORDER BY name, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get recurring transactions for user {}", user_id))?
        .into_iter()
        .map(RecurringTransaction::from)
        .collect();
        Ok(recurring_transactions)
    }

    #[instrument(skip(self))]
    async fn delete_recurring_transaction(
        &self,
        user_id: &str,
        recurring_transaction_id: i32,
    ) -> Result<RecurringTransaction, RecurringTransactionRepoError> {
        let entry: Option<RecurringTransactionEntry> = query_as(
            "DELETE FROM recurring_transactions WHERE user_id = $1 AND id = $2 RETURNING id, name",
        )
        .bind(user_id)
        .bind(recurring_transaction_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Unable to delete recurring transaction {}",
                recurring_transaction_id
            )
        })?;
        entry
            .map(RecurringTransaction::from)
            .ok_or(RecurringTransactionNotFound(recurring_transaction_id))
    }
}
