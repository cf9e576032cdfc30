//! Viva Core Library
//!
//! Core functionality for the viva AI interview evaluation pipeline.
//!
//! # Features
//! - Provider fallback across Groq and Gemini with a single aggregate error
//! - Answer quality screening with score caps before any provider call
//! - Strict JSON response contract with defensive parsing
//! - Cache-aside result and question caching keyed by content hashes
//! - Interview question generation per role and interview type

pub mod cache;
pub mod config;
pub mod error;
pub mod eval;
pub mod providers;

pub use cache::{CacheService, CacheValue, KeyValueStore, MemoryStore};
pub use config::{Config, EvaluationConfig, ProviderSettings};
pub use error::{Error, Result, VivaError};
pub use eval::{
    build_question_generation_prompt, parse_combined_result, parse_questions, AnswerValidator,
    AttemptState, CombinedResult, ComprehensiveEvaluation, ConfidenceLevel, EvaluationOrchestrator,
    FocusArea, Milestone, ParseError, PracticeProblem, QAPair, Question, QuestionAnalysis,
    Resource, SchemaStrategy, ScoreBreakdown, TrainingPlan, ValidationResult, WeeklyPlan,
};
pub use providers::{GeminiClient, GroqClient, ProviderClient, ProviderError};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "viva";
