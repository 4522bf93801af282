use crate::sqlx_repo::SQLxRepo;
use crate::transaction_repo::TransactionRepoError::{DuplicateTransaction, TransactionNotFound};
use crate::transaction_repo::{
    NewTransaction, PageOptions, Transaction, TransactionRepo, TransactionRepoError,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{query, query_as, Executor, Postgres, QueryBuilder};
use tracing::instrument;

const SELECT_TRANSACTIONS: &str = r#"
    SELECT t.id, t.label, t.amount, t.date, t.budget_month, t.recurring_transaction_id,
           COALESCE(ARRAY_AGG(tt.tag_id) FILTER (WHERE tt.tag_id IS NOT NULL), '{}') AS tags
    FROM transactions t
    LEFT JOIN transaction_tags tt ON tt.transaction_id = t.id
    WHERE t.user_id = "#;

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    label: String,
    amount: Decimal,
    date: NaiveDate,
    budget_month: String,
    recurring_transaction_id: Option<i32>,
    tags: Vec<i32>,
}

impl From<TransactionEntry> for Transaction {
    fn from(value: TransactionEntry) -> Self {
        Transaction {
            id: value.id,
            label: value.label,
            amount: value.amount,
            date: value.date,
            budget_month: value.budget_month,
            tags: value.tags.into_iter().collect(),
            recurring_transaction_id: value.recurring_transaction_id,
        }
    }
}

fn map_write_error(error: sqlx::Error, transaction: &NewTransaction) -> TransactionRepoError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => DuplicateTransaction {
            label: transaction.label.clone(),
            amount: transaction.amount,
            date: transaction.date,
        },
        _ => TransactionRepoError::Other(
            anyhow::Error::new(error).context("Unable to write transaction"),
        ),
    }
}

impl SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction_entry(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Option<TransactionEntry>, TransactionRepoError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(SELECT_TRANSACTIONS);
        query_builder
            .push_bind(user)
            .push(" AND t.id = ")
            .push_bind(transaction_id)
            .push(" GROUP BY t.id");
        let transaction_entry = query_builder
            .build_query_as::<TransactionEntry>()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Unable to get transaction {}", transaction_id))?;
        Ok(transaction_entry)
    }

    #[instrument(skip(db_executor, new_transaction))]
    async fn insert_transaction_entry<'e, E>(
        db_executor: E,
        user: &str,
        new_transaction: &NewTransaction,
    ) -> Result<i32, TransactionRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (id,): (i32,) = query_as(
            "INSERT INTO transactions(user_id, label, amount, date, budget_month, recurring_transaction_id) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(user)
        .bind(&new_transaction.label)
        .bind(new_transaction.amount)
        .bind(new_transaction.date)
        .bind(new_transaction.resolved_budget_month())
        .bind(new_transaction.recurring_transaction_id)
        .fetch_one(db_executor)
        .await
        .map_err(|e| map_write_error(e, new_transaction))?;
        Ok(id)
    }

    #[instrument(skip(db_executor, updated_transaction))]
    async fn update_transaction_entry<'e, E>(
        db_executor: E,
        user: &str,
        transaction_id: i32,
        updated_transaction: &NewTransaction,
    ) -> Result<(), TransactionRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = query(
            "UPDATE transactions SET label = $1, amount = $2, date = $3, budget_month = $4, recurring_transaction_id = $5 WHERE user_id = $6 AND id = $7",
        )
        .bind(&updated_transaction.label)
        .bind(updated_transaction.amount)
        .bind(updated_transaction.date)
        .bind(updated_transaction.resolved_budget_month())
        .bind(updated_transaction.recurring_transaction_id)
        .bind(user)
        .bind(transaction_id)
        .execute(db_executor)
        .await
        .map_err(|e| map_write_error(e, updated_transaction))?;
        if result.rows_affected() == 0 {
            Err(TransactionNotFound(transaction_id))
        } else {
            Ok(())
        }
    }

    /// Links the transaction to the given tags, ignoring tags the user does not own.
    #[instrument(skip(db_executor))]
    async fn insert_transaction_tags<'e, E>(
        db_executor: E,
        user: &str,
        transaction_id: i32,
        tags: &[i32],
    ) -> Result<(), TransactionRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        query(
            "INSERT INTO transaction_tags(transaction_id, tag_id) SELECT $1, id FROM tags WHERE user_id = $2 AND id = ANY($3)",
        )
        .bind(transaction_id)
        .bind(user)
        .bind(tags)
        .execute(db_executor)
        .await
        .with_context(|| format!("Unable to tag transaction {}", transaction_id))?;
        Ok(())
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        self.get_transaction_entry(user, transaction_id)
            .await?
            .ok_or(TransactionNotFound(transaction_id))
            .map(|t| t.into())
    }

    #[instrument(skip(self, page_options))]
    async fn get_all_transactions(
        &self,
        user: &str,
        page_options: Option<PageOptions>,
    ) -> Result<Vec<Transaction>, TransactionRepoError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(SELECT_TRANSACTIONS);
        query_builder
            .push_bind(user)
            .push(" GROUP BY t.id ORDER BY t.date DESC, t.id DESC");
        if let Some(po) = page_options {
            query_builder
                .push(" OFFSET ")
                .push_bind(po.offset)
                .push(" LIMIT ")
                .push_bind(po.limit);
        }
        let transactions = query_builder
            .build_query_as::<TransactionEntry>()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get transactions for user {}", user))?
            .into_iter()
            .map(|transaction_entry| transaction_entry.into())
            .collect();

        Ok(transactions)
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_new_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to begin DB transaction")?;

        let id = Self::insert_transaction_entry(&mut *db_transaction, user, &new_transaction).await?;
        let tags: Vec<i32> = new_transaction.tags.iter().copied().collect();
        Self::insert_transaction_tags(&mut *db_transaction, user, id, &tags).await?;

        db_transaction
            .commit()
            .await
            .context("Unable to commit DB transaction")?;

        self.get_transaction(user, id).await
    }

    #[instrument(skip(self, updated_transaction))]
    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, TransactionRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to begin DB transaction")?;

        Self::update_transaction_entry(
            &mut *db_transaction,
            user,
            transaction_id,
            &updated_transaction,
        )
        .await?;
        query("DELETE FROM transaction_tags WHERE transaction_id = $1")
            .bind(transaction_id)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to clear tags of transaction {}", transaction_id))?;
        let tags: Vec<i32> = updated_transaction.tags.iter().copied().collect();
        Self::insert_transaction_tags(&mut *db_transaction, user, transaction_id, &tags).await?;

        db_transaction
            .commit()
            .await
            .context("Unable to commit DB transaction")?;

        self.get_transaction(user, transaction_id).await
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, TransactionRepoError> {
        let transaction = self.get_transaction(user, transaction_id).await?;

        let result = query("DELETE FROM transactions WHERE user_id = $1 AND id = $2")
            .bind(user)
            .bind(transaction_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete transaction {}", transaction_id))?;
        if result.rows_affected() == 0 {
            return Err(TransactionNotFound(transaction_id));
        }

        Ok(transaction)
    }
}
