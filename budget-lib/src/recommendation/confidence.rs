//! Turns the evidence gathered by each strategy into a confidence between 0 and 100.
//!
//! Constants that differ between tags and recurring transactions live in a
//! [`ConfidenceProfile`]; the rest are shared.

use crate::recommendation::similarity::SimilarityBand;

pub const KEYWORD_MEDIUM: f64 = 70.0;
pub const KEYWORD_WEAK: f64 = 60.0;
pub const AMOUNT_PATTERN: f64 = 50.0;
pub const FREQUENCY: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceProfile {
    pub fuzzy_high: f64,
    pub fuzzy_medium: f64,
    pub fuzzy_low: f64,
    pub keyword_strong: f64,
}

impl ConfidenceProfile {
    pub const TAG: ConfidenceProfile = ConfidenceProfile {
        fuzzy_high: 90.0,
        fuzzy_medium: 85.0,
        fuzzy_low: 80.0,
        keyword_strong: 85.0,
    };

    pub const RECURRING_TRANSACTION: ConfidenceProfile = ConfidenceProfile {
        fuzzy_high: 85.0,
        fuzzy_medium: 80.0,
        fuzzy_low: 75.0,
        keyword_strong: 80.0,
    };

    pub fn fuzzy(&self, band: SimilarityBand) -> f64 {
        let confidence = match band {
            SimilarityBand::High => self.fuzzy_high,
            SimilarityBand::Medium => self.fuzzy_medium,
            SimilarityBand::Low => self.fuzzy_low,
        };
        clamp(confidence)
    }

    /// Strong when the keyword is the target's name, medium when one contains the other.
    pub fn keyword(&self, keyword: &str, target_name: &str) -> f64 {
        let keyword = keyword.to_uppercase();
        let target_name = target_name.to_uppercase();

        let confidence = if keyword == target_name {
            self.keyword_strong
        } else if target_name.contains(&keyword) || keyword.contains(&target_name) {
            KEYWORD_MEDIUM
        } else {
            KEYWORD_WEAK
        };
        clamp(confidence)
    }
}

/// Share of same-label transactions carrying a target, in percent.
pub fn label_probability(match_count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    match_count as f64 * 100.0 / total as f64
}

pub fn exact_label(match_count: u64, total: u64) -> f64 {
    let probability = label_probability(match_count, total);
    let confidence = if probability >= 90.0 {
        95.0
    } else if probability >= 75.0 {
        90.0
    } else if probability >= 50.0 {
        85.0
    } else if probability >= 25.0 {
        80.0
    } else {
        75.0
    };
    clamp(confidence)
}

pub fn clamp(confidence: f64) -> f64 {
    confidence.clamp(0.0, 100.0)
}
