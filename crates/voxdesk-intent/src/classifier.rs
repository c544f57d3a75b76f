use crate::category::Category;
use serde::Serialize;

/// Scores below this are reported as [`Category::Unknown`].
pub const CONFIDENCE_FLOOR: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Fraction of the winning category's keywords found in the text, in [0, 1].
    pub confidence: f32,
}

/// Keyword-overlap intent classifier. Stateless and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, raw: &str) -> ClassificationResult {
        let text = normalize(raw);

        let mut best = ClassificationResult {
            category: Category::Unknown,
            confidence: 0.0,
        };
        for category in Category::RANKED {
            let score = score(&text, category.keywords());
            if score > best.confidence {
                best = ClassificationResult {
                    category,
                    confidence: score,
                };
            }
        }

        if best.confidence < CONFIDENCE_FLOOR {
            best.category = Category::Unknown;
        }

        tracing::debug!(
            text = %raw,
            category = %best.category,
            confidence = best.confidence,
            "classified utterance"
        );
        best
    }
}

fn normalize(raw: &str) -> String {
    raw.to_lowercase()
}

/// Fraction of `keywords` occurring anywhere in `text`.
fn score(text: &str, keywords: &[&str]) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }
    let hits = keywords.iter().filter(|k| text.contains(**k)).count();
    hits as f32 / keywords.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> ClassificationResult {
        IntentClassifier::new().classify(text)
    }

    #[test]
    fn test_no_keywords_is_unknown_with_zero_confidence() {
        let result = classify("asdkjasd");
        assert_eq!(result.category, Category::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_empty_text_is_unknown() {
        let result = classify("");
        assert_eq!(result.category, Category::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_single_deadline_keyword() {
        let result = classify("what is the deadline");
        assert_eq!(result.category, Category::Deadline);
        assert!((result.confidence - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_keyword_set_scores_one() {
        let result = classify("Fee, cost, payment and charge?");
        assert_eq!(result.category, Category::Fee);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let result = classify("ELIGIBILITY CRITERIA");
        assert_eq!(result.category, Category::Requirements);
        assert!((result.confidence - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_tie_goes_to_earlier_category() {
        // "deadline" 1/3 and "hello" 1/3
        let result = classify("hello deadline");
        assert_eq!(result.category, Category::Deadline);
    }

    #[test]
    fn test_higher_score_beats_earlier_category() {
        // requirements 1/3, process 2/4
        let result = classify("eligibility to apply online");
        assert_eq!(result.category, Category::Process);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_substring_matches_count() {
        // "documents" contains "document" too
        let result = classify("Hello, what documents do I need?");
        assert_eq!(result.category, Category::Documents);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_score_one_hit_in_eight_is_below_floor() {
        let keywords = &["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8"];
        assert_eq!(score("a1 only", keywords), 0.125);
        assert!(0.125 < CONFIDENCE_FLOOR);
    }

    #[test]
    fn test_score_empty_keywords_is_zero() {
        assert_eq!(score("anything", &[]), 0.0);
    }

    #[test]
    fn test_punctuation_is_not_stripped() {
        // "last date" needs the space; a hyphen breaks the match
        let result = classify("last-date");
        assert_eq!(result.category, Category::Unknown);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = "How do I apply and what is the application fee?";
        assert_eq!(classify(text), classify(text));
    }
}
