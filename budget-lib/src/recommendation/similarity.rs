/// Similarity of two labels in percent, from their Levenshtein distance relative to the longer
/// label. Lengths are counted in characters. Two empty labels are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }

    let distance = strsim::levenshtein(a, b);
    ((1.0 - distance as f64 / max_len as f64) * 100.0).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityBand {
    High,
    Medium,
    Low,
}

impl SimilarityBand {
    pub const HIGH: f64 = 95.0;
    pub const MEDIUM: f64 = 90.0;
    pub const LOW: f64 = 85.0;

    /// Band of a fuzzy match. `None` when the labels are too different, or identical (exact
    /// matches are scored separately).
    pub fn of(similarity: f64) -> Option<SimilarityBand> {
        if similarity >= 100.0 {
            None
        } else if similarity >= Self::HIGH {
            Some(SimilarityBand::High)
        } else if similarity >= Self::MEDIUM {
            Some(SimilarityBand::Medium)
        } else if similarity >= Self::LOW {
            Some(SimilarityBand::Low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn one_character_out_of_seventeen() {
        let score = similarity("NETFLIX.COM PARIS", "NETFLIX COM PARIS");
        assert!((score - 94.117).abs() < 0.01, "similarity was {}", score);
        assert_eq!(SimilarityBand::of(score), Some(SimilarityBand::Medium));
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(similarity("ÉLECTRICITÉ", "ELECTRICITE"), (1.0 - 2.0 / 11.0) * 100.0);
    }

    #[rstest]
    #[case("", "", 100.0)]
    #[case("ABC", "ABC", 100.0)]
    #[case("ABC", "", 0.0)]
    #[case("ABC", "XYZ", 0.0)]
    #[case("ABCD", "ABCE", 75.0)]
    fn scores(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert_eq!(similarity(a, b), expected);
        assert_eq!(similarity(b, a), expected);
    }

    #[rstest]
    #[case(100.0, None)]
    #[case(99.9, Some(SimilarityBand::High))]
    #[case(95.0, Some(SimilarityBand::High))]
    #[case(94.9, Some(SimilarityBand::Medium))]
    #[case(90.0, Some(SimilarityBand::Medium))]
    #[case(85.0, Some(SimilarityBand::Low))]
    #[case(84.9, None)]
    #[case(0.0, None)]
    fn bands(#[case] similarity: f64, #[case] expected: Option<SimilarityBand>) {
        assert_eq!(SimilarityBand::of(similarity), expected);
    }
}
