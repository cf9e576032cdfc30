//! Deterministic cache key construction

use sha2::{Digest, Sha256};

use crate::eval::QAPair;

const SEPARATOR: &str = ":";

/// Key for the generated question set of a role/interview-type pair
pub fn ai_questions_key(job_role: &str, interview_type: &str) -> String {
    format!(
        "ai_questions{}{}{}{}",
        SEPARATOR, job_role, SEPARATOR, interview_type
    )
}

/// Key for the evaluation of one transcript. Derived from a digest of the
/// serialized exchanges so identical transcripts share an entry.
pub fn evaluation_key(qa_history: &[QAPair]) -> String {
    let serialized = serde_json::to_string(qa_history).unwrap_or_default();
    format!(
        "evaluation{}{}",
        SEPARATOR,
        &hash_content(&serialized)[..16]
    )
}

/// Pattern matching every cached question set, for bulk invalidation
pub fn questions_pattern() -> String {
    format!("ai_questions{}*", SEPARATOR)
}

/// Hex SHA-256 digest of arbitrary content
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
