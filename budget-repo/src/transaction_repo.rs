use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;

pub struct PageOptions {
    pub offset: i64,
    pub limit: i64,
}

#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;

    /// Returns the user's transactions, most recent first.
    async fn get_all_transactions(
        &self,
        user: &str,
        page_options: Option<PageOptions>,
    ) -> Result<Vec<Transaction>, TransactionRepoError>;

    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError>;

    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError>;
}

#[derive(Error, Debug)]
pub enum TransactionRepoError {
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error("A transaction labelled {label:?} for {amount} on {date} already exists")]
    DuplicateTransaction {
        label: String,
        amount: Decimal,
        date: NaiveDate,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    pub id: i32,
    pub label: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub budget_month: String,
    pub tags: HashSet<i32>,
    pub recurring_transaction_id: Option<i32>,
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date).then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTransaction {
    pub label: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub budget_month: Option<String>,
    #[serde(default)]
    pub tags: HashSet<i32>,
    #[serde(default)]
    pub recurring_transaction_id: Option<i32>,
}

impl NewTransaction {
    pub fn new(
        label: String,
        amount: Decimal,
        date: NaiveDate,
        tags: HashSet<i32>,
        recurring_transaction_id: Option<i32>,
    ) -> NewTransaction {
        NewTransaction {
            label,
            amount,
            date,
            budget_month: None,
            tags,
            recurring_transaction_id,
        }
    }

    /// Budget month to store, defaulting to the month of the transaction date.
    pub fn resolved_budget_month(&self) -> String {
        self.budget_month
            .clone()
            .unwrap_or_else(|| budget_month_of(self.date))
    }

    pub fn to_transaction(self, id: i32) -> Transaction {
        let budget_month = self.resolved_budget_month();
        Transaction {
            id,
            label: self.label,
            amount: self.amount,
            date: self.date,
            budget_month,
            tags: self.tags,
            recurring_transaction_id: self.recurring_transaction_id,
        }
    }
}

/// Formats a date as a `YYYY-MM` budget month.
pub fn budget_month_of(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
