use crate::config::RecommendationConfig;
use crate::recommendation::confidence::ConfidenceProfile;
use crate::recommendation::RecommendationSubject;
use budget_repo::candidate_repo::AmountPattern;
use budget_repo::recurring_transaction_repo::RecurringTransaction;
use budget_repo::tag_repo::Tag;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// What the recommender needs to know about the kind of thing it recommends.
pub trait RecommendationTarget: Clone + Send + Sync + 'static {
    const PROFILE: ConfidenceProfile;

    fn target_id(&self) -> i32;

    fn display_name(&self) -> &str;

    /// Targets already assigned to the subject, never recommended again.
    fn assigned_ids(subject: &RecommendationSubject) -> HashSet<i32>;

    fn keyword_window(config: &RecommendationConfig) -> usize;

    fn frequency_reason(count: u64) -> String;

    fn amount_patterns(amount: Decimal) -> Vec<AmountPattern>;
}

impl RecommendationTarget for Tag {
    const PROFILE: ConfidenceProfile = ConfidenceProfile::TAG;

    fn target_id(&self) -> i32 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn assigned_ids(subject: &RecommendationSubject) -> HashSet<i32> {
        subject.tag_ids.clone()
    }

    fn keyword_window(config: &RecommendationConfig) -> usize {
        config.tag_keyword_window
    }

    fn frequency_reason(count: u64) -> String {
        format!("Tag fréquent ({} utilisations)", count)
    }

    /// Refunds and small purchases tend to share tags.
    fn amount_patterns(amount: Decimal) -> Vec<AmountPattern> {
        let mut patterns = Vec::new();
        if amount > Decimal::ZERO {
            patterns.push(AmountPattern::Positive);
        }
        let small = AmountPattern::AbsBelow(Decimal::TEN);
        if small.matches(amount) {
            patterns.push(small);
        }
        patterns
    }
}

impl RecommendationTarget for RecurringTransaction {
    const PROFILE: ConfidenceProfile = ConfidenceProfile::RECURRING_TRANSACTION;

    fn target_id(&self) -> i32 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn assigned_ids(subject: &RecommendationSubject) -> HashSet<i32> {
        subject.recurring_transaction_id.into_iter().collect()
    }

    fn keyword_window(config: &RecommendationConfig) -> usize {
        config.recurring_keyword_window
    }

    fn frequency_reason(count: u64) -> String {
        format!("Transaction fréquente ({} utilisations)", count)
    }

    /// Amounts within 10% of the subject's.
    fn amount_patterns(amount: Decimal) -> Vec<AmountPattern> {
        let tolerance = amount.abs() / Decimal::TEN;
        vec![AmountPattern::Between(amount - tolerance, amount + tolerance)]
    }
}
