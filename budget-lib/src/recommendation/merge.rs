use crate::recommendation::confidence;
use crate::recommendation::strategy::{Candidate, Strategy};
use crate::recommendation::target::RecommendationTarget;
use crate::recommendation::Recommendation;
use std::collections::{HashMap, HashSet};

struct Group<T> {
    target: T,
    confidence: f64,
    strategies: HashSet<Strategy>,
    reasons: Vec<String>,
}

impl<T> Group<T> {
    fn new(target: T) -> Self {
        Group {
            target,
            confidence: 0.0,
            strategies: HashSet::new(),
            reasons: Vec::new(),
        }
    }

    fn add(&mut self, strategy: Strategy, confidence: f64, reason: String) {
        self.confidence = self.confidence.max(confidence);
        self.strategies.insert(strategy);
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }

    fn into_recommendation(self) -> Recommendation<T> {
        let confidence = confidence::clamp(self.confidence + source_bonus(self.strategies.len()));
        Recommendation {
            target: self.target,
            confidence,
            reason: combine_reasons(&self.reasons),
        }
    }
}

fn source_bonus(strategies: usize) -> f64 {
    match strategies {
        0 | 1 => 0.0,
        2 => 2.0,
        _ => 3.0,
    }
}

fn combine_reasons(reasons: &[String]) -> String {
    let combined = reasons
        .iter()
        .take(2)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" + ");
    match reasons.len() {
        0..=2 => combined,
        len => format!("{} (+{} autres)", combined, len - 2),
    }
}

/// Groups candidates per target, drops the targets already assigned to the subject, and keeps
/// the `limit` most confident.
pub fn merge<T: RecommendationTarget>(
    candidates: Vec<Candidate<T>>,
    assigned: &HashSet<i32>,
    limit: usize,
) -> Vec<Recommendation<T>> {
    let mut groups: Vec<Group<T>> = Vec::new();
    let mut positions: HashMap<i32, usize> = HashMap::new();
    for candidate in candidates {
        let target_id = candidate.target.target_id();
        if assigned.contains(&target_id) {
            continue;
        }

        let position = *positions.entry(target_id).or_insert_with(|| {
            groups.push(Group::new(candidate.target.clone()));
            groups.len() - 1
        });
        groups[position].add(candidate.strategy, candidate.confidence, candidate.reason);
    }

    let mut recommendations: Vec<Recommendation<T>> = groups
        .into_iter()
        .map(Group::into_recommendation)
        .collect();
    recommendations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    recommendations.truncate(limit);
    recommendations
}
