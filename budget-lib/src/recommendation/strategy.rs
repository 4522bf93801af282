//! The independent ways of finding candidate targets for a subject.
//!
//! Each strategy queries the user's history through a [`CandidateRepo`] and scores what it
//! finds. None of them filters out targets already assigned to the subject; the merger does.

use crate::recommendation::confidence;
use crate::recommendation::keywords::extract_keywords;
use crate::recommendation::normalize::normalize_label;
use crate::recommendation::similarity::{similarity, SimilarityBand};
use crate::recommendation::target::RecommendationTarget;
use budget_repo::candidate_repo::{AmountPattern, CandidateRepo, CandidateRepoError};
use std::collections::HashMap;
use tracing::debug;

/// Number of targets kept per amount pattern.
pub const AMOUNT_PATTERN_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    ExactLabel,
    FuzzyLabel,
    Keyword,
    AmountPattern,
    Frequency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub target: T,
    pub strategy: Strategy,
    pub confidence: f64,
    pub reason: String,
}

impl<T> Candidate<T> {
    fn new(target: T, strategy: Strategy, confidence: f64, reason: String) -> Self {
        Candidate {
            target,
            strategy,
            confidence,
            reason,
        }
    }
}

/// Targets of transactions carrying exactly the same label.
pub async fn exact_label<T: RecommendationTarget>(
    repo: &dyn CandidateRepo<T>,
    user: &str,
    label: &str,
    exclude_id: Option<i32>,
) -> Result<Vec<Candidate<T>>, CandidateRepoError> {
    let matches = repo.exact_label_matches(user, label, exclude_id).await?;

    let candidates = matches
        .targets
        .into_iter()
        .map(|usage| {
            let confidence = confidence::exact_label(usage.count, matches.total);
            let reason = format!(
                "Label identique ({}/{} occurrences)",
                usage.count, matches.total
            );
            Candidate::new(usage.target, Strategy::ExactLabel, confidence, reason)
        })
        .collect();
    Ok(candidates)
}

/// Targets of recent transactions whose normalized label is close to the subject's.
pub async fn fuzzy_label<T: RecommendationTarget>(
    repo: &dyn CandidateRepo<T>,
    user: &str,
    label: &str,
    exclude_id: Option<i32>,
    window: usize,
) -> Result<Vec<Candidate<T>>, CandidateRepoError> {
    let subject_label = normalize_label(label);
    let labelled = repo.labelled_targets(user, exclude_id, window).await?;

    let mut best: Vec<(T, f64)> = Vec::new();
    let mut positions: HashMap<i32, usize> = HashMap::new();
    for labelled_target in labelled {
        // Banded after taking the best score, so an identical label rules the target out.
        let score = similarity(&subject_label, &normalize_label(&labelled_target.label));
        let target_id = labelled_target.target.target_id();
        match positions.get(&target_id) {
            Some(&position) => {
                let (_, best_score) = &mut best[position];
                if score > *best_score {
                    *best_score = score;
                }
            }
            None => {
                positions.insert(target_id, best.len());
                best.push((labelled_target.target, score));
            }
        }
    }

    let candidates = best
        .into_iter()
        .filter_map(|(target, score)| {
            let band = SimilarityBand::of(score)?;
            let reason = format!("Label similaire ({:.0}%)", score);
            Some(Candidate::new(
                target,
                Strategy::FuzzyLabel,
                T::PROFILE.fuzzy(band),
                reason,
            ))
        })
        .collect();
    Ok(candidates)
}

/// Targets of transactions whose label contains one of the subject's keywords. One candidate
/// per (keyword, target) pair.
pub async fn keyword<T: RecommendationTarget>(
    repo: &dyn CandidateRepo<T>,
    user: &str,
    label: &str,
    exclude_id: Option<i32>,
    window: usize,
) -> Result<Vec<Candidate<T>>, CandidateRepoError> {
    let keywords = extract_keywords(label);
    debug!(?keywords, "Extracted keywords");

    let mut candidates = Vec::new();
    for keyword in keywords {
        let targets = repo
            .keyword_targets(user, &keyword, exclude_id, window)
            .await?;
        for target in targets {
            let confidence = T::PROFILE.keyword(&keyword, target.display_name());
            let reason = format!("Mot-clé : \"{}\"", keyword);
            candidates.push(Candidate::new(target, Strategy::Keyword, confidence, reason));
        }
    }
    Ok(candidates)
}

/// Targets most used on transactions with an amount similar to the subject's.
pub async fn amount_pattern<T: RecommendationTarget>(
    repo: &dyn CandidateRepo<T>,
    user: &str,
    patterns: Vec<AmountPattern>,
    exclude_id: Option<i32>,
) -> Result<Vec<Candidate<T>>, CandidateRepoError> {
    let mut candidates = Vec::new();
    for pattern in patterns {
        let usages = repo
            .amount_targets(user, pattern, exclude_id, AMOUNT_PATTERN_LIMIT)
            .await?;
        for usage in usages {
            let reason = amount_reason(pattern, usage.count);
            candidates.push(Candidate::new(
                usage.target,
                Strategy::AmountPattern,
                confidence::AMOUNT_PATTERN,
                reason,
            ));
        }
    }
    Ok(candidates)
}

fn amount_reason(pattern: AmountPattern, count: u64) -> String {
    match pattern {
        AmountPattern::Positive => "Montant positif (remboursement)".to_string(),
        AmountPattern::AbsBelow(bound) => format!("Petit montant (<{}€)", bound),
        AmountPattern::Between(_, _) => format!("Montant similaire ({} occurrences)", count),
    }
}

/// The user's most used targets, regardless of the subject.
pub async fn frequency<T: RecommendationTarget>(
    repo: &dyn CandidateRepo<T>,
    user: &str,
    limit: usize,
) -> Result<Vec<Candidate<T>>, CandidateRepoError> {
    let usages = repo.most_used_targets(user, limit).await?;

    let candidates = usages
        .into_iter()
        .map(|usage| {
            let reason = T::frequency_reason(usage.count);
            Candidate::new(
                usage.target,
                Strategy::Frequency,
                confidence::FREQUENCY,
                reason,
            )
        })
        .collect();
    Ok(candidates)
}
