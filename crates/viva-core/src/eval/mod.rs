//! Interview evaluation pipeline
//!
//! Provides the stages between a finished transcript and a usable result:
//! - Answer quality screening with score caps
//! - Prompt construction against a strict or legacy response schema
//! - Defensive parsing of provider output into typed results
//! - Provider fallback orchestration with result caching

mod orchestrator;
mod parser;
mod prompt;
mod types;
mod validator;

pub use orchestrator::{AttemptState, EvaluationOrchestrator};
pub use parser::{parse_combined_result, parse_questions, ParseError};
pub use prompt::{build_question_generation_prompt, SchemaStrategy};
pub use types::{
    CombinedResult, ComprehensiveEvaluation, ConfidenceLevel, FocusArea, Milestone,
    PracticeProblem, QAPair, Question, QuestionAnalysis, Resource, ScoreBreakdown, TrainingPlan,
    WeeklyPlan,
};
pub use validator::{AnswerValidator, ValidationResult};
