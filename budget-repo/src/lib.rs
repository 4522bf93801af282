use std::sync::Arc;

pub mod candidate_repo;
pub mod recurring_transaction_repo;
pub mod tag_repo;
pub mod transaction_repo;
pub mod user_repo;

// implementation modules
pub mod mem_repo;
pub mod sqlx_repo;

use crate::candidate_repo::CandidateRepo;
use crate::recurring_transaction_repo::{RecurringTransaction, RecurringTransactionRepo};
use crate::tag_repo::{Tag, TagRepo};
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;

/// Handles to every repository, all backed by the same store.
#[derive(Clone)]
pub struct Repos {
    pub user_repo: Arc<dyn UserRepo>,
    pub transaction_repo: Arc<dyn TransactionRepo>,
    pub tag_repo: Arc<dyn TagRepo>,
    pub recurring_transaction_repo: Arc<dyn RecurringTransactionRepo>,
    pub tag_candidates: Arc<dyn CandidateRepo<Tag>>,
    pub recurring_candidates: Arc<dyn CandidateRepo<RecurringTransaction>>,
}

impl Repos {
    pub(crate) fn from_store<R>(store: Arc<R>) -> Repos
    where
        R: UserRepo
            + TransactionRepo
            + TagRepo
            + RecurringTransactionRepo
            + CandidateRepo<Tag>
            + CandidateRepo<RecurringTransaction>
            + 'static,
    {
        Repos {
            user_repo: store.clone(),
            transaction_repo: store.clone(),
            tag_repo: store.clone(),
            recurring_transaction_repo: store.clone(),
            tag_candidates: store.clone(),
            recurring_candidates: store,
        }
    }
}
