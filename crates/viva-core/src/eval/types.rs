//! Value objects for interview evaluation
//!
//! All types serialize with camelCase wire names. The cache stores JSON
//! snapshots of these shapes, and the response parser projects provider
//! output into the same shapes, so serialize -> parse round-trips.

use serde::{Deserialize, Serialize};

/// One question/answer exchange from an interview transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QAPair {
    pub question: String,
    pub answer: String,
}

impl QAPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Provider-reported confidence in the overall evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Parse a provider-reported label; unknown labels fall back to Medium
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

/// Per-dimension score breakdown, 0-10 each
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    #[serde(default)]
    pub technical_knowledge: f64,
    #[serde(default)]
    pub problem_solving: f64,
    #[serde(default)]
    pub communication: f64,
    #[serde(default)]
    pub depth_of_understanding: f64,
}

/// Full per-interview evaluation reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveEvaluation {
    /// Overall score 0-10; absence marks an incomplete result
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
    #[serde(default)]
    pub score_breakdown: ScoreBreakdown,
    /// Ordered, one entry per transcript exchange
    #[serde(default)]
    pub question_analysis: Vec<QuestionAnalysis>,
    #[serde(default)]
    pub coach_feedback: String,
    #[serde(default)]
    pub top_strengths: Vec<String>,
    #[serde(default)]
    pub critical_gaps: Vec<String>,
}

/// Per-question scoring detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    /// 1-based position within the transcript
    pub question_number: i64,
    pub relevance_score: Option<f64>,
    pub correctness_score: Option<f64>,
    pub depth_score: Option<f64>,
    /// Provider-reported value, never recomputed from the sub-scores
    pub final_score: f64,
    #[serde(default)]
    pub what_you_answered: String,
    #[serde(default)]
    pub what_was_good: String,
    #[serde(default)]
    pub what_was_missing: String,
    #[serde(default)]
    pub ideal_answer: String,
    #[serde(default)]
    pub reasoning: String,
}

/// Personalized training plan accompanying an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    /// Readiness 0-100
    pub readiness_score: i64,
    pub target_score: i64,
    #[serde(default)]
    pub time_to_target: String,
    #[serde(default)]
    pub focus_areas: Vec<FocusArea>,
    #[serde(default)]
    pub weekly_plan: Vec<WeeklyPlan>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

/// One area the candidate should focus on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub area: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub current_level: i64,
    #[serde(default)]
    pub target_level: i64,
    #[serde(default)]
    pub estimated_hours: i64,
    #[serde(default)]
    pub key_topics: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// Study material reference attached to a focus area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub duration: String,
}

/// One week of the training schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    pub week: i64,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub study_time: String,
    #[serde(default)]
    pub practice_time: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub practice_problems: Vec<PracticeProblem>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub weekend_task: String,
}

/// Exercise assigned within a weekly plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeProblem {
    pub problem: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub focus_area: String,
}

/// Checkpoint marking measurable progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub week: i64,
    pub milestone: String,
    #[serde(default)]
    pub verification: String,
}

/// Evaluation plus training plan, the unit the orchestrator returns and caches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedResult {
    pub evaluation: ComprehensiveEvaluation,
    pub training_plan: TrainingPlan,
}

/// One generated interview question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// open_ended, mcq_proper or mcq_all_correct
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Index into options; -1 when not applicable
    #[serde(default = "default_correct_index")]
    pub correct_index: i64,
}

fn default_correct_index() -> i64 {
    -1
}
