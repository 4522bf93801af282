use crate::mem_repo::{MemRepo, State};
use crate::transaction_repo::TransactionRepoError::{DuplicateTransaction, TransactionNotFound};
use crate::transaction_repo::{
    NewTransaction, PageOptions, Transaction, TransactionRepo, TransactionRepoError,
};
use async_trait::async_trait;
use std::collections::HashSet;

impl State {
    /// Enforces the (user, date, amount, label) uniqueness of stored transactions.
    fn check_duplicate(
        &self,
        user: &str,
        transaction: &NewTransaction,
        ignored_id: Option<i32>,
    ) -> Result<(), TransactionRepoError> {
        let duplicate = self.transactions_of(user).into_iter().any(|t| {
            Some(t.id) != ignored_id
                && t.date == transaction.date
                && t.amount == transaction.amount
                && t.label == transaction.label
        });
        if duplicate {
            Err(DuplicateTransaction {
                label: transaction.label.clone(),
                amount: transaction.amount,
                date: transaction.date,
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TransactionRepo for MemRepo {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        if !read_guard.owns_transaction(user, transaction_id) {
            return Err(TransactionNotFound(transaction_id));
        }

        let transaction = read_guard
            .transactions
            .get(&transaction_id)
            .expect("transactions should contain same ids as user_transactions")
            .clone();
        Ok(transaction)
    }

    async fn get_all_transactions(
        &self,
        user: &str,
        page_options: Option<PageOptions>,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let read_guard = self.read_lock()?;

        let transactions = read_guard.transactions_of(user).into_iter().cloned();
        let transactions = match page_options {
            Some(page_options) => transactions
                .skip(page_options.offset as usize)
                .take(page_options.limit as usize)
                .collect(),
            None => transactions.collect(),
        };

        Ok(transactions)
    }

    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard.check_duplicate(user, &new_transaction, None)?;

        let id = write_guard.next_id();
        let transaction = new_transaction.to_transaction(id);

        write_guard.transactions.insert(id, transaction.clone());
        write_guard
            .user_transactions
            .entry(user.to_owned())
            .or_insert_with(HashSet::new)
            .insert(id);

        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_transaction(user, transaction_id) {
            return Err(TransactionNotFound(transaction_id));
        }
        write_guard.check_duplicate(user, &updated_transaction, Some(transaction_id))?;

        let transaction = updated_transaction.to_transaction(transaction_id);
        write_guard
            .transactions
            .insert(transaction_id, transaction.clone());
        Ok(transaction)
    }

    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut write_guard = self.write_lock()?;

        if !write_guard.owns_transaction(user, transaction_id) {
            return Err(TransactionNotFound(transaction_id));
        }

        write_guard
            .user_transactions
            .get_mut(user)
            .expect("owned transactions should be present in user_transactions")
            .remove(&transaction_id);
        let transaction = write_guard
            .transactions
            .remove(&transaction_id)
            .expect("transactions should contain same ids as user_transactions");
        Ok(transaction)
    }
}
