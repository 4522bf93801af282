use crate::candidate_repo::{
    AmountPattern, CandidateRepo, CandidateRepoError, ExactLabelMatches, LabelledTarget,
    TargetUsage,
};
use crate::mem_repo::{MemRepo, State};
use crate::recurring_transaction_repo::RecurringTransaction;
use crate::tag_repo::Tag;
use crate::transaction_repo::Transaction;
use async_trait::async_trait;
use std::collections::HashMap;

/// How a target kind is linked to transactions in the in-memory state.
trait MemTarget: Clone + Send + Sync + 'static {
    fn id(&self) -> i32;
    fn name(&self) -> &str;
    fn linked_ids(transaction: &Transaction) -> Vec<i32>;
    fn resolve(state: &State, user: &str, id: i32) -> Option<Self>;
}

impl MemTarget for Tag {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn linked_ids(transaction: &Transaction) -> Vec<i32> {
        let mut ids: Vec<i32> = transaction.tags.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn resolve(state: &State, user: &str, id: i32) -> Option<Self> {
        let owned = state.user_tags.get(user)?.contains(&id);
        owned.then(|| state.tags.get(&id).cloned()).flatten()
    }
}

impl MemTarget for RecurringTransaction {
    fn id(&self) -> i32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn linked_ids(transaction: &Transaction) -> Vec<i32> {
        transaction.recurring_transaction_id.into_iter().collect()
    }

    fn resolve(state: &State, user: &str, id: i32) -> Option<Self> {
        let owned = state.user_recurring_transactions.get(user)?.contains(&id);
        owned
            .then(|| state.recurring_transactions.get(&id).cloned())
            .flatten()
    }
}

impl State {
    fn targets_of<T: MemTarget>(&self, user: &str, transaction: &Transaction) -> Vec<T> {
        T::linked_ids(transaction)
            .into_iter()
            .filter_map(|id| T::resolve(self, user, id))
            .collect()
    }

    /// Counts target usage over the given transactions, most used first, ties by name.
    fn count_targets<'a, T: MemTarget>(
        &self,
        user: &str,
        transactions: impl Iterator<Item = &'a Transaction>,
    ) -> Vec<TargetUsage<T>> {
        let mut counts: HashMap<i32, TargetUsage<T>> = HashMap::new();
        for transaction in transactions {
            for target in self.targets_of::<T>(user, transaction) {
                counts
                    .entry(target.id())
                    .or_insert_with(|| TargetUsage::new(target, 0))
                    .count += 1;
            }
        }

        let mut usages: Vec<TargetUsage<T>> = counts.into_values().collect();
        usages.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.target.name().cmp(b.target.name()))
                .then_with(|| a.target.id().cmp(&b.target.id()))
        });
        usages
    }
}

fn not_excluded(exclude_id: Option<i32>) -> impl Fn(&&Transaction) -> bool {
    move |t| Some(t.id) != exclude_id
}

macro_rules! impl_candidate_repo {
    ($target:ty) => {
        #[async_trait]
        impl CandidateRepo<$target> for MemRepo {
            async fn exact_label_matches(
                &self,
                user: &str,
                label: &str,
                exclude_id: Option<i32>,
            ) -> Result<ExactLabelMatches<$target>, CandidateRepoError> {
                let read_guard = self.read_lock()?;

                let matching: Vec<&Transaction> = read_guard
                    .transactions_of(user)
                    .into_iter()
                    .filter(not_excluded(exclude_id))
                    .filter(|t| t.label == label)
                    .collect();

                Ok(ExactLabelMatches {
                    total: matching.len() as u64,
                    targets: read_guard.count_targets(user, matching.into_iter()),
                })
            }

            async fn labelled_targets(
                &self,
                user: &str,
                exclude_id: Option<i32>,
                window: usize,
            ) -> Result<Vec<LabelledTarget<$target>>, CandidateRepoError> {
                let read_guard = self.read_lock()?;

                let labelled = read_guard
                    .transactions_of(user)
                    .into_iter()
                    .filter(not_excluded(exclude_id))
                    .map(|t| (t, read_guard.targets_of::<$target>(user, t)))
                    .filter(|(_, targets)| !targets.is_empty())
                    .take(window)
                    .flat_map(|(t, targets)| {
                        targets.into_iter().map(move |target| LabelledTarget {
                            label: t.label.clone(),
                            target,
                        })
                    })
                    .collect();

                Ok(labelled)
            }

            async fn keyword_targets(
                &self,
                user: &str,
                keyword: &str,
                exclude_id: Option<i32>,
                window: usize,
            ) -> Result<Vec<$target>, CandidateRepoError> {
                let read_guard = self.read_lock()?;
                let keyword = keyword.to_uppercase();

                let mut targets: Vec<$target> = Vec::new();
                let matching = read_guard
                    .transactions_of(user)
                    .into_iter()
                    .filter(not_excluded(exclude_id))
                    .filter(|t| t.label.to_uppercase().contains(&keyword))
                    .map(|t| read_guard.targets_of::<$target>(user, t))
                    .filter(|targets| !targets.is_empty())
                    .take(window);
                for target in matching.flatten() {
                    if !targets.iter().any(|t| t.id() == target.id()) {
                        targets.push(target);
                    }
                }

                Ok(targets)
            }

            async fn most_used_targets(
                &self,
                user: &str,
                limit: usize,
            ) -> Result<Vec<TargetUsage<$target>>, CandidateRepoError> {
                let read_guard = self.read_lock()?;

                let transactions = read_guard.transactions_of(user);
                let mut usages = read_guard.count_targets(user, transactions.into_iter());
                usages.truncate(limit);

                Ok(usages)
            }

            async fn amount_targets(
                &self,
                user: &str,
                pattern: AmountPattern,
                exclude_id: Option<i32>,
                limit: usize,
            ) -> Result<Vec<TargetUsage<$target>>, CandidateRepoError> {
                let read_guard = self.read_lock()?;

                let matching = read_guard
                    .transactions_of(user)
                    .into_iter()
                    .filter(not_excluded(exclude_id))
                    .filter(|t| pattern.matches(t.amount));
                let mut usages = read_guard.count_targets(user, matching);
                usages.truncate(limit);

                Ok(usages)
            }
        }
    };
}

impl_candidate_repo!(Tag);
impl_candidate_repo!(RecurringTransaction);
