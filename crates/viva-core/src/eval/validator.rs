//! Pre-flight answer quality screening
//!
//! Screens each transcript answer before it reaches a provider, so the
//! evaluation prompt can flag low-quality answers instead of letting the
//! model score pasted keyboard noise as a real attempt. Advisory only:
//! suggested caps ride into the prompt, scores are never overridden locally.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::warn;

lazy_static! {
    /// Fragments of keyboard/clipboard UI text that betray pasted system noise
    static ref GARBAGE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)clipboard").unwrap(),
        Regex::new(r"(?i)gboard").unwrap(),
        Regex::new(r"(?i)pin.*clip").unwrap(),
        Regex::new(r"(?i)touch.*hold").unwrap(),
        Regex::new(r"(?i)edit icon").unwrap(),
        Regex::new(r"(?i)copy.*save.*here").unwrap(),
        Regex::new(r"(?i)tap.*paste").unwrap(),
        Regex::new(r"(?i)welcome to").unwrap(),
        Regex::new(r"(?i)deleted after.*hour").unwrap(),
        Regex::new(r"(?i)use the.*icon").unwrap(),
    ];

    /// Whole-answer placeholders that carry no evaluable content
    static ref GENERIC_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)^(yes|no|maybe|ok|okay)$").unwrap(),
        Regex::new(r"(?i)^i (don't|dont) know$").unwrap(),
        Regex::new(r"(?i)^(correct|wrong|right)$").unwrap(),
        Regex::new(r"(?i)^selected:.*$").unwrap(),
    ];
}

/// Outcome of screening one answer
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: String,
    /// Advisory ceiling for the provider's score, 0-10
    pub suggested_score_cap: f64,
}

impl ValidationResult {
    fn invalid(reason: &str, cap: f64) -> Self {
        Self {
            is_valid: false,
            reason: reason.to_string(),
            suggested_score_cap: cap,
        }
    }

    fn valid() -> Self {
        Self {
            is_valid: true,
            reason: "Quality answer".to_string(),
            suggested_score_cap: 10.0,
        }
    }
}

/// Answer quality screen applied to each transcript exchange
pub struct AnswerValidator;

impl AnswerValidator {
    /// Screen one answer against its question. First matching rule wins.
    pub fn validate(question: &str, answer: &str) -> ValidationResult {
        let trimmed = answer.trim();

        if trimmed.is_empty() {
            return ValidationResult::invalid("Empty answer", 0.0);
        }

        // MCQ selections are legitimately short, everything else under
        // 20 words is not an evaluable attempt
        let word_count = trimmed.split_whitespace().count();
        if word_count < 20 && !trimmed.starts_with("Selected:") {
            return ValidationResult::invalid("Answer too short (< 20 words)", 2.0);
        }

        if GARBAGE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
            let preview: String = trimmed.chars().take(50).collect();
            warn!("Clipboard/system text detected in answer: {}", preview);
            return ValidationResult::invalid("Clipboard/system text detected", 0.0);
        }

        if GENERIC_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
            // A bare single-line selection gives nothing to evaluate beyond
            // the choice itself
            if trimmed.starts_with("Selected:") && !trimmed.contains('\n') {
                return ValidationResult::invalid("MCQ selection without explanation", 2.0);
            }
            return ValidationResult::invalid("Generic/placeholder answer", 1.0);
        }

        let similarity = jaccard_similarity(&question.to_lowercase(), &trimmed.to_lowercase());
        if similarity > 0.7 {
            return ValidationResult::invalid("Answer is copy of question", 0.0);
        }

        ValidationResult::valid()
    }
}

/// Word-set Jaccard similarity. Empty union yields 0.0.
fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const QUESTION: &str = "Explain how a hash map resolves collisions and what the cost of a single \
                            lookup becomes in the worst case when every key hashes to one bucket";

    #[test]
    fn test_empty_answer_rejected() {
        let result = AnswerValidator::validate(QUESTION, "");
        assert!(!result.is_valid);
        assert_eq!(result.reason, "Empty answer");
        assert_eq!(result.suggested_score_cap, 0.0);

        let result = AnswerValidator::validate(QUESTION, "   \n  ");
        assert_eq!(result.reason, "Empty answer");
    }

    #[test]
    fn test_short_answer_capped_at_two() {
        let result = AnswerValidator::validate(QUESTION, "It uses chaining I think");
        assert!(!result.is_valid);
        assert_eq!(result.reason, "Answer too short (< 20 words)");
        assert_eq!(result.suggested_score_cap, 2.0);
    }

    #[test]
    fn test_bare_mcq_selection_skips_length_check() {
        let result = AnswerValidator::validate(QUESTION, "Selected: Option B");
        assert!(!result.is_valid);
        assert_eq!(result.reason, "MCQ selection without explanation");
        assert_eq!(result.suggested_score_cap, 2.0);
    }

    #[test]
    fn test_mcq_selection_with_explanation_is_valid() {
        let answer = "Selected: Option B\nSeparate chaining stores colliding keys in a per-bucket \
                      list so lookups degrade to a linear scan of that bucket when many keys hash \
                      to the same slot";
        let result = AnswerValidator::validate(QUESTION, answer);
        assert!(result.is_valid);
        assert_eq!(result.reason, "Quality answer");
    }

    #[test]
    fn test_clipboard_noise_detected() {
        let answer = "Welcome to Gboard clipboard, any text you copy will be saved here. \
                      Touch and hold a clip to pin it. Unpinned clips will be deleted after one hour.";
        let result = AnswerValidator::validate(QUESTION, answer);
        assert!(!result.is_valid);
        assert_eq!(result.reason, "Clipboard/system text detected");
        assert_eq!(result.suggested_score_cap, 0.0);
    }

    #[test]
    fn test_answer_copying_question_rejected() {
        let result = AnswerValidator::validate(QUESTION, QUESTION);
        assert!(!result.is_valid);
        assert_eq!(result.reason, "Answer is copy of question");
        assert_eq!(result.suggested_score_cap, 0.0);
    }

    #[test]
    fn test_case_insensitive_question_copy() {
        let result = AnswerValidator::validate(QUESTION, &QUESTION.to_uppercase());
        assert_eq!(result.reason, "Answer is copy of question");
    }

    #[test]
    fn test_quality_answer_passes() {
        let answer = "A hash map resolves collisions with separate chaining or open addressing. \
                      Chaining keeps colliding entries in a bucket-local structure while probing \
                      walks alternative slots, and either way a degenerate distribution turns \
                      lookup into a linear scan over the colliding keys.";
        let result = AnswerValidator::validate(QUESTION, answer);
        assert!(result.is_valid);
        assert_eq!(result.reason, "Quality answer");
        assert_eq!(result.suggested_score_cap, 10.0);
    }

    #[test]
    fn test_jaccard_empty_union_is_zero() {
        assert_eq!(jaccard_similarity("", ""), 0.0);
        assert_eq!(jaccard_similarity("   ", ""), 0.0);
    }

    #[test]
    fn test_jaccard_disjoint_is_zero() {
        assert_eq!(jaccard_similarity("alpha beta", "gamma delta"), 0.0);
    }

    proptest! {
        #[test]
        fn jaccard_is_symmetric(a in "[a-z ]{0,60}", b in "[a-z ]{0,60}") {
            prop_assert_eq!(jaccard_similarity(&a, &b), jaccard_similarity(&b, &a));
        }

        #[test]
        fn jaccard_self_similarity_is_one(a in "[a-z]{1,8}( [a-z]{1,8}){0,8}") {
            prop_assert_eq!(jaccard_similarity(&a, &a), 1.0);
        }
    }
}
