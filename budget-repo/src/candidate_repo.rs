//! Read-only queries the recommendation engine runs against a user's history.
//!
//! Every query is scoped to one user and returns resolved targets (tags or recurring
//! transactions). Ids that no longer resolve to a target are skipped by the implementations.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CandidateRepoError {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Transactions sharing the subject's exact label.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactLabelMatches<T> {
    /// Number of transactions with that label, whether or not they have a target.
    pub total: u64,
    /// Targets of those transactions with the number of transactions carrying each one.
    pub targets: Vec<TargetUsage<T>>,
}

impl<T> ExactLabelMatches<T> {
    pub fn empty() -> Self {
        ExactLabelMatches {
            total: 0,
            targets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetUsage<T> {
    pub target: T,
    pub count: u64,
}

impl<T> TargetUsage<T> {
    pub fn new(target: T, count: u64) -> Self {
        TargetUsage { target, count }
    }
}

/// A transaction label paired with one target assigned to that transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledTarget<T> {
    pub label: String,
    pub target: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountPattern {
    /// Strictly positive amounts (refunds, income).
    Positive,
    /// Amounts whose absolute value is strictly below the bound.
    AbsBelow(Decimal),
    /// Amounts in the inclusive range.
    Between(Decimal, Decimal),
}

impl AmountPattern {
    pub fn matches(&self, amount: Decimal) -> bool {
        match *self {
            AmountPattern::Positive => amount > Decimal::ZERO,
            AmountPattern::AbsBelow(bound) => amount.abs() < bound,
            AmountPattern::Between(min, max) => amount >= min && amount <= max,
        }
    }
}

#[async_trait]
pub trait CandidateRepo<T>: Sync + Send {
    /// Counts the user's transactions whose label is byte-equal to `label`, and the targets
    /// assigned to them.
    async fn exact_label_matches(
        &self,
        user: &str,
        label: &str,
        exclude_id: Option<i32>,
    ) -> Result<ExactLabelMatches<T>, CandidateRepoError>;

    /// Labels of the `window` most recent transactions that have a target, one entry per
    /// (transaction, target) pair.
    async fn labelled_targets(
        &self,
        user: &str,
        exclude_id: Option<i32>,
        window: usize,
    ) -> Result<Vec<LabelledTarget<T>>, CandidateRepoError>;

    /// Distinct targets of at most `window` transactions whose uppercased label contains
    /// `keyword`.
    async fn keyword_targets(
        &self,
        user: &str,
        keyword: &str,
        exclude_id: Option<i32>,
        window: usize,
    ) -> Result<Vec<T>, CandidateRepoError>;

    /// The user's targets ordered by number of linked transactions, unused targets omitted.
    async fn most_used_targets(
        &self,
        user: &str,
        limit: usize,
    ) -> Result<Vec<TargetUsage<T>>, CandidateRepoError>;

    /// Targets most used on transactions whose amount matches `pattern`.
    async fn amount_targets(
        &self,
        user: &str,
        pattern: AmountPattern,
        exclude_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<TargetUsage<T>>, CandidateRepoError>;
}
