//! Suggests tags and recurring transactions for a transaction from the user's history.
//!
//! A [`Recommender`] runs every [`strategy`], then [`merge`]s the candidates into a ranked list.
//! The same pipeline serves both target kinds through [`RecommendationTarget`].

use crate::config::RecommendationConfig;
use crate::user::UserId;
use budget_repo::candidate_repo::{CandidateRepo, CandidateRepoError};
use budget_repo::recurring_transaction_repo::RecurringTransaction;
use budget_repo::tag_repo::Tag;
use budget_repo::transaction_repo::Transaction;
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

pub mod confidence;
mod handlers;
pub mod keywords;
pub mod merge;
pub mod normalize;
pub mod similarity;
pub mod strategy;
pub mod target;

pub use handlers::{recommendation_service, TransactionDraft};
pub use target::RecommendationTarget;

pub type TagRecommender = Recommender<Tag>;
pub type RecurringTransactionRecommender = Recommender<RecurringTransaction>;

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error(transparent)]
    Repo(#[from] CandidateRepoError),
    #[error("Recommendation took longer than {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<T> {
    pub target: T,
    pub confidence: f64,
    pub reason: String,
}

impl<T> Recommendation<T> {
    pub fn confidence_percentage(&self) -> u8 {
        self.confidence.round().clamp(0.0, 100.0) as u8
    }
}

impl<T: RecommendationTarget> Serialize for Recommendation<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Recommendation", 4)?;
        state.serialize_field("target_id", &self.target.target_id())?;
        state.serialize_field("target_display_name", self.target.display_name())?;
        state.serialize_field("confidence", &self.confidence)?;
        state.serialize_field("reason", &self.reason)?;
        state.end()
    }
}

/// The transaction recommendations are computed for. It may be stored already, or still a
/// draft (an imported line being previewed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationSubject {
    pub transaction_id: Option<i32>,
    pub user: Option<UserId>,
    pub label: Option<String>,
    pub amount: Decimal,
    pub tag_ids: HashSet<i32>,
    pub recurring_transaction_id: Option<i32>,
}

impl RecommendationSubject {
    pub fn from_transaction(user: &str, transaction: &Transaction) -> RecommendationSubject {
        RecommendationSubject {
            transaction_id: Some(transaction.id),
            user: Some(user.to_string()),
            label: Some(transaction.label.clone()),
            amount: transaction.amount,
            tag_ids: transaction.tags.clone(),
            recurring_transaction_id: transaction.recurring_transaction_id,
        }
    }

    pub fn from_draft(user: &str, draft: TransactionDraft) -> RecommendationSubject {
        RecommendationSubject {
            transaction_id: None,
            user: Some(user.to_string()),
            label: draft.label,
            amount: draft.amount,
            tag_ids: draft.tags,
            recurring_transaction_id: draft.recurring_transaction_id,
        }
    }

    /// The label, when there is one worth matching on.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|label| !label.trim().is_empty())
    }
}

pub struct Recommender<T> {
    repo: Arc<dyn CandidateRepo<T>>,
    config: RecommendationConfig,
}

impl<T: RecommendationTarget> Recommender<T> {
    pub fn new(repo: Arc<dyn CandidateRepo<T>>, config: RecommendationConfig) -> Recommender<T> {
        Recommender { repo, config }
    }

    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    /// At most `limit` recommendations, most confident first. Never recommends a target already
    /// assigned to the subject.
    #[instrument(skip(self, subject), fields(transaction_id = ?subject.transaction_id))]
    pub async fn recommend(
        &self,
        subject: &RecommendationSubject,
        limit: usize,
    ) -> Result<Vec<Recommendation<T>>, RecommendationError> {
        let Some(user) = subject.user.as_deref() else {
            debug!("No user, nothing to recommend");
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        match self.config.query_timeout() {
            Some(timeout) => actix_rt::time::timeout(timeout, self.run(user, subject, limit))
                .await
                .map_err(|_| RecommendationError::Timeout(timeout))?,
            None => self.run(user, subject, limit).await,
        }
    }

    /// The frequency fallback runs when fewer than `limit` distinct unassigned targets were found,
    /// as several candidates for one target count once.
    async fn run(
        &self,
        user: &str,
        subject: &RecommendationSubject,
        limit: usize,
    ) -> Result<Vec<Recommendation<T>>, RecommendationError> {
        let repo = self.repo.as_ref();
        let exclude_id = subject.transaction_id;
        let assigned = T::assigned_ids(subject);

        let mut candidates = Vec::new();
        if let Some(label) = subject.label() {
            candidates.extend(strategy::exact_label(repo, user, label, exclude_id).await?);
            candidates.extend(
                strategy::fuzzy_label(repo, user, label, exclude_id, self.config.fuzzy_window)
                    .await?,
            );
            let keyword_window = T::keyword_window(&self.config);
            candidates
                .extend(strategy::keyword(repo, user, label, exclude_id, keyword_window).await?);
        }
        if self.config.amount_patterns {
            let patterns = T::amount_patterns(subject.amount);
            candidates
                .extend(strategy::amount_pattern(repo, user, patterns, exclude_id).await?);
        }

        let found: HashSet<i32> = candidates
            .iter()
            .map(|candidate| candidate.target.target_id())
            .filter(|id| !assigned.contains(id))
            .collect();
        if found.len() < limit {
            let fallback_limit = limit.saturating_add(assigned.len());
            candidates.extend(strategy::frequency(repo, user, fallback_limit).await?);
        }
        debug!(
            candidates = candidates.len(),
            found = found.len(),
            "Merging candidates"
        );

        Ok(merge::merge(candidates, &assigned, limit))
    }
}
