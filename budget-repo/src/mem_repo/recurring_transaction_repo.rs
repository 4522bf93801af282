use crate::mem_repo::MemRepo;
use crate::recurring_transaction_repo::RecurringTransactionRepoError::RecurringTransactionNotFound;
use crate::recurring_transaction_repo::{
    NewRecurringTransaction, RecurringTransaction, RecurringTransactionRepo,
    RecurringTransactionRepoError,
};
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
impl RecurringTransactionRepo for MemRepo {
    async fn create_recurring_transaction(
        &self,
        user_id: &str,
        new_recurring_transaction: NewRecurringTransaction,
    ) -> Result<RecurringTransaction, RecurringTransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_id();
        let recurring_transaction = new_recurring_transaction.to_recurring_transaction(id);

        write_guard
            .recurring_transactions
            .insert(id, recurring_transaction.clone());
        write_guard
            .user_recurring_transactions
            .entry(user_id.to_owned())
            .or_insert_with(HashSet::new)
            .insert(id);

        Ok(recurring_transaction)
    }

    async fn get_recurring_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<RecurringTransaction>, RecurringTransactionRepoError> {
        let read_guard = self.read_lock()?;

        let Some(ids) = read_guard.user_recurring_transactions.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut recurring_transactions: Vec<RecurringTransaction> = ids
            .iter()
            .map(|id| {
                read_guard
                    .recurring_transactions
                    .get(id)
                    .expect("recurring_transactions should have all the ids in user_recurring_transactions")
            })
            .cloned()
            .collect();
        recurring_transactions.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(recurring_transactions)
    }

    async fn delete_recurring_transaction(
        &self,
        user_id: &str,
        recurring_transaction_id: i32,
    ) -> Result<RecurringTransaction, RecurringTransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        let Some(ids) = write_guard.user_recurring_transactions.get_mut(user_id) else {
            return Err(RecurringTransactionNotFound(recurring_transaction_id));
        };
        if !ids.remove(&recurring_transaction_id) {
            return Err(RecurringTransactionNotFound(recurring_transaction_id));
        }

        let recurring_transaction = write_guard
            .recurring_transactions
            .remove(&recurring_transaction_id)
            .expect("recurring transaction should exist if there is an entry in user_recurring_transactions");
        for transaction in write_guard.transactions.values_mut() {
            if transaction.recurring_transaction_id == Some(recurring_transaction_id) {
                transaction.recurring_transaction_id = None;
            }
        }
        Ok(recurring_transaction)
    }
}
