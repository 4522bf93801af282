use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecurringTransaction {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewRecurringTransaction {
    pub name: String,
}

impl NewRecurringTransaction {
    pub fn new(name: String) -> Self {
        NewRecurringTransaction { name }
    }

    pub fn to_recurring_transaction(self, id: i32) -> RecurringTransaction {
        RecurringTransaction {
            id,
            name: self.name,
        }
    }
}

#[derive(Error, Debug)]
pub enum RecurringTransactionRepoError {
    #[error("Recurring transaction with id {0} not found")]
    RecurringTransactionNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait RecurringTransactionRepo: Sync + Send {
    async fn create_recurring_transaction(
        &self,
        user_id: &str,
        new_recurring_transaction: NewRecurringTransaction,
    ) -> Result<RecurringTransaction, RecurringTransactionRepoError>;

    async fn get_recurring_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecurringTransaction>, RecurringTransactionRepoError>;

    /// Deletes the recurring transaction; linked transactions keep existing without a link.
    async fn delete_recurring_transaction(
        &self,
        user_id: &str,
        recurring_transaction_id: i32,
    ) -> Result<RecurringTransaction, RecurringTransactionRepoError>;
}
