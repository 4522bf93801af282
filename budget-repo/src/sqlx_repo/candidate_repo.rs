use crate::candidate_repo::{
    AmountPattern, CandidateRepo, CandidateRepoError, ExactLabelMatches, LabelledTarget,
    TargetUsage,
};
use crate::recurring_transaction_repo::RecurringTransaction;
use crate::sqlx_repo::SQLxRepo;
use crate::tag_repo::Tag;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::instrument;

/// SQL fragments describing how a target kind is linked to transactions.
///
/// `LINKS` must yield `(transaction_id, target_id)` pairs. Target columns are selected from
/// the alias `x`.
trait SqlTarget: Sized + Send + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static str;
    const LINKS: &'static str;

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

impl SqlTarget for Tag {
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static str = "x.id, x.name, x.color";
    const LINKS: &'static str = "SELECT transaction_id, tag_id AS target_id FROM transaction_tags";

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Tag {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            color: row.try_get("color")?,
        })
    }
}

impl SqlTarget for RecurringTransaction {
    const TABLE: &'static str = "recurring_transactions";
    const COLUMNS: &'static str = "x.id, x.name";
    const LINKS: &'static str = "SELECT id AS transaction_id, recurring_transaction_id AS target_id FROM transactions WHERE recurring_transaction_id IS NOT NULL";

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(RecurringTransaction {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

/// Joins `t` (transactions) to its targets `x`, owned by the same user.
fn push_target_join<T: SqlTarget>(query_builder: &mut QueryBuilder<Postgres>, transactions: &str) {
    query_builder.push(format!(
        " FROM {transactions} t JOIN ({links}) l ON l.transaction_id = t.id JOIN {table} x ON x.id = l.target_id AND x.user_id = t.user_id",
        links = T::LINKS,
        table = T::TABLE,
    ));
}

/// `LIMIT` bind value; counts beyond `i64::MAX` mean no limit.
fn sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn push_excluded(query_builder: &mut QueryBuilder<Postgres>, exclude_id: Option<i32>) {
    if let Some(id) = exclude_id {
        query_builder.push(" AND t.id <> ").push_bind(id);
    }
}

fn push_has_target<T: SqlTarget>(query_builder: &mut QueryBuilder<Postgres>) {
    query_builder.push(format!(
        " AND EXISTS (SELECT 1 FROM ({links}) l JOIN {table} x ON x.id = l.target_id AND x.user_id = t.user_id WHERE l.transaction_id = t.id)",
        links = T::LINKS,
        table = T::TABLE,
    ));
}

fn push_amount_pattern(query_builder: &mut QueryBuilder<Postgres>, pattern: AmountPattern) {
    match pattern {
        AmountPattern::Positive => {
            query_builder.push(" AND t.amount > 0");
        }
        AmountPattern::AbsBelow(bound) => {
            query_builder.push(" AND ABS(t.amount) < ").push_bind(bound);
        }
        AmountPattern::Between(min, max) => {
            query_builder
                .push(" AND t.amount BETWEEN ")
                .push_bind(min)
                .push(" AND ")
                .push_bind(max);
        }
    }
}

fn usages_from_rows<T: SqlTarget>(rows: Vec<PgRow>) -> Result<Vec<TargetUsage<T>>, sqlx::Error> {
    rows.iter()
        .map(|row| {
            let count: i64 = row.try_get("usage_count")?;
            Ok(TargetUsage::new(T::from_row(row)?, count as u64))
        })
        .collect()
}

impl SQLxRepo {
    #[instrument(skip(self))]
    async fn exact_label_matches_of<T: SqlTarget>(
        &self,
        user: &str,
        label: &str,
        exclude_id: Option<i32>,
    ) -> Result<ExactLabelMatches<T>, CandidateRepoError> {
        let mut total_query =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions t WHERE t.user_id = ");
        total_query
            .push_bind(user)
            .push(" AND t.label = ")
            .push_bind(label);
        push_excluded(&mut total_query, exclude_id);
        let total: i64 = total_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Unable to count transactions labelled {:?}", label))?;

        let mut query_builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, COUNT(*) AS usage_count",
            T::COLUMNS
        ));
        push_target_join::<T>(&mut query_builder, "transactions");
        query_builder
            .push(" WHERE t.user_id = ")
            .push_bind(user)
            .push(" AND t.label = ")
            .push_bind(label);
        push_excluded(&mut query_builder, exclude_id);
        query_builder.push(" GROUP BY x.id ORDER BY usage_count DESC, x.name, x.id");
        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get targets of label {:?}", label))?;

        Ok(ExactLabelMatches {
            total: total as u64,
            targets: usages_from_rows(rows).context("Unable to decode target")?,
        })
    }

    #[instrument(skip(self))]
    async fn labelled_targets_of<T: SqlTarget>(
        &self,
        user: &str,
        exclude_id: Option<i32>,
        window: usize,
    ) -> Result<Vec<LabelledTarget<T>>, CandidateRepoError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "WITH recent AS (SELECT t.id, t.user_id, t.label, t.date FROM transactions t WHERE t.user_id = ",
        );
        query_builder.push_bind(user);
        push_excluded(&mut query_builder, exclude_id);
        push_has_target::<T>(&mut query_builder);
        query_builder
            .push(" ORDER BY t.date DESC, t.id DESC LIMIT ")
            .push_bind(sql_limit(window))
            .push(format!(") SELECT t.label AS transaction_label, {}", T::COLUMNS));
        push_target_join::<T>(&mut query_builder, "recent");
        query_builder.push(" ORDER BY t.date DESC, t.id DESC, x.id");

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get labelled transactions for user {}", user))?;

        let labelled = rows
            .iter()
            .map(|row| {
                Ok(LabelledTarget {
                    label: row.try_get("transaction_label")?,
                    target: T::from_row(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .context("Unable to decode labelled target")?;
        Ok(labelled)
    }

    #[instrument(skip(self))]
    async fn keyword_targets_of<T: SqlTarget>(
        &self,
        user: &str,
        keyword: &str,
        exclude_id: Option<i32>,
        window: usize,
    ) -> Result<Vec<T>, CandidateRepoError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(
            "WITH matching AS (SELECT t.id, t.user_id, t.date FROM transactions t WHERE t.user_id = ",
        );
        query_builder
            .push_bind(user)
            .push(" AND POSITION(")
            .push_bind(keyword.to_uppercase())
            .push(" IN UPPER(t.label)) > 0");
        push_excluded(&mut query_builder, exclude_id);
        push_has_target::<T>(&mut query_builder);
        query_builder
            .push(" ORDER BY t.date DESC, t.id DESC LIMIT ")
            .push_bind(sql_limit(window))
            .push(format!(") SELECT {}, MAX(t.date) AS last_used", T::COLUMNS));
        push_target_join::<T>(&mut query_builder, "matching");
        query_builder.push(" GROUP BY x.id ORDER BY last_used DESC, x.id");

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get targets for keyword {:?}", keyword))?;

        let targets = rows
            .iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .context("Unable to decode target")?;
        Ok(targets)
    }

    #[instrument(skip(self))]
    async fn most_used_targets_of<T: SqlTarget>(
        &self,
        user: &str,
        limit: usize,
    ) -> Result<Vec<TargetUsage<T>>, CandidateRepoError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, COUNT(*) AS usage_count",
            T::COLUMNS
        ));
        push_target_join::<T>(&mut query_builder, "transactions");
        query_builder
            .push(" WHERE t.user_id = ")
            .push_bind(user)
            .push(" GROUP BY x.id ORDER BY usage_count DESC, x.name, x.id LIMIT ")
            .push_bind(sql_limit(limit));

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get most used targets for user {}", user))?;

        Ok(usages_from_rows(rows).context("Unable to decode target")?)
    }

    #[instrument(skip(self))]
    async fn amount_targets_of<T: SqlTarget>(
        &self,
        user: &str,
        pattern: AmountPattern,
        exclude_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<TargetUsage<T>>, CandidateRepoError> {
        let mut query_builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, COUNT(*) AS usage_count",
            T::COLUMNS
        ));
        push_target_join::<T>(&mut query_builder, "transactions");
        query_builder.push(" WHERE t.user_id = ").push_bind(user);
        push_amount_pattern(&mut query_builder, pattern);
        push_excluded(&mut query_builder, exclude_id);
        query_builder
            .push(" GROUP BY x.id ORDER BY usage_count DESC, x.name, x.id LIMIT ")
            .push_bind(sql_limit(limit));

        let rows = query_builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to get targets for amount pattern {:?}", pattern))?;

        Ok(usages_from_rows(rows).context("Unable to decode target")?)
    }
}

macro_rules! impl_candidate_repo {
    ($target:ty) => {
        #[async_trait]
        impl CandidateRepo<$target> for SQLxRepo {
            async fn exact_label_matches(
                &self,
                user: &str,
                label: &str,
                exclude_id: Option<i32>,
            ) -> Result<ExactLabelMatches<$target>, CandidateRepoError> {
                self.exact_label_matches_of(user, label, exclude_id).await
            }

            async fn labelled_targets(
                &self,
                user: &str,
                exclude_id: Option<i32>,
                window: usize,
            ) -> Result<Vec<LabelledTarget<$target>>, CandidateRepoError> {
                self.labelled_targets_of(user, exclude_id, window).await
            }

            async fn keyword_targets(
                &self,
                user: &str,
                keyword: &str,
                exclude_id: Option<i32>,
                window: usize,
            ) -> Result<Vec<$target>, CandidateRepoError> {
                self.keyword_targets_of(user, keyword, exclude_id, window)
                    .await
            }

            async fn most_used_targets(
                &self,
                user: &str,
                limit: usize,
            ) -> Result<Vec<TargetUsage<$target>>, CandidateRepoError> {
                self.most_used_targets_of(user, limit).await
            }

            async fn amount_targets(
                &self,
                user: &str,
                pattern: AmountPattern,
                exclude_id: Option<i32>,
                limit: usize,
            ) -> Result<Vec<TargetUsage<$target>>, CandidateRepoError> {
                self.amount_targets_of(user, pattern, exclude_id, limit)
                    .await
            }
        }
    };
}

impl_candidate_repo!(Tag);
impl_candidate_repo!(RecurringTransaction);
