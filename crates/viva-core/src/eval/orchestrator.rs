//! Provider fallback orchestration
//!
//! Runs the evaluation pipeline as a state machine over provider attempts:
//! primary first, secondary on any failure, one aggregate error when every
//! enabled provider has been exhausted. The prompt is built once and shared
//! verbatim across attempts so providers cannot drift apart.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{keys, CacheService};
use crate::config::{Config, EvaluationConfig};
use crate::error::{Result, VivaError};
use crate::providers::{GeminiClient, GroqClient, ProviderClient};

use super::parser::{self, ParseError};
use super::prompt::{build_question_generation_prompt, SchemaStrategy};
use super::types::{CombinedResult, QAPair, Question};
use super::validator::{AnswerValidator, ValidationResult};

/// Question sets are effectively static per role/type pair
const QUESTIONS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Identical transcripts re-serve the same evaluation within the hour
const EVALUATION_TTL: Duration = Duration::from_secs(60 * 60);

/// Progress of the fallback chain across provider attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    NotAttempted,
    AttemptingPrimary,
    AttemptingSecondary,
    Succeeded,
    AllFailed,
}

/// Drives validation, prompt construction, provider fallback, parsing and
/// result caching for one interview pipeline
#[derive(Clone)]
pub struct EvaluationOrchestrator {
    primary: Option<Arc<dyn ProviderClient>>,
    secondary: Option<Arc<dyn ProviderClient>>,
    strategy: SchemaStrategy,
    cache: CacheService,
    evaluation: EvaluationConfig,
}

impl EvaluationOrchestrator {
    /// Wire the orchestrator from explicit parts. Disabled providers are
    /// represented as `None` and skipped by the fallback chain.
    pub fn new(
        primary: Option<Arc<dyn ProviderClient>>,
        secondary: Option<Arc<dyn ProviderClient>>,
        cache: CacheService,
        evaluation: EvaluationConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            strategy: SchemaStrategy::default(),
            cache,
            evaluation,
        }
    }

    /// Build concrete Groq/Gemini clients from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let primary: Option<Arc<dyn ProviderClient>> = if config.groq.enabled {
            Some(Arc::new(GroqClient::new(config.groq.clone())?))
        } else {
            None
        };
        let secondary: Option<Arc<dyn ProviderClient>> = if config.gemini.enabled {
            Some(Arc::new(GeminiClient::new(config.gemini.clone())?))
        } else {
            None
        };

        Ok(Self::new(
            primary,
            secondary,
            CacheService::in_memory(),
            config.evaluation.clone(),
        ))
    }

    /// Select a prompt/schema strategy other than the default strict one
    pub fn with_strategy(mut self, strategy: SchemaStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Swap the cache service, keeping everything else
    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = cache;
        self
    }

    /// The configured wall-clock budget for one evaluation
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.evaluation.budget_secs)
    }

    /// Evaluate a transcript, serving identical transcripts from cache.
    ///
    /// On a miss the full chain runs: screen answers, build the prompt
    /// once, then primary -> secondary until one provider yields a complete
    /// result. Raises [`VivaError::AllProvidersFailed`] otherwise; a partial
    /// result is never returned.
    pub async fn evaluate_interview(&self, qa_history: &[QAPair]) -> Result<CombinedResult> {
        if qa_history.is_empty() {
            return Err(VivaError::InvalidInput(
                "empty interview transcript".to_string(),
            ));
        }

        let key = keys::evaluation_key(qa_history);
        self.cache
            .get_or_compute(&key, EVALUATION_TTL, || self.evaluate_uncached(qa_history))
            .await
    }

    /// Evaluate under a wall-clock budget.
    ///
    /// The pipeline runs as its own task; when the budget runs out the task
    /// is abandoned, not cancelled, and the caller gets
    /// [`VivaError::EvaluationTimeout`].
    pub async fn evaluate_interview_with_timeout(
        &self,
        qa_history: Vec<QAPair>,
        budget: Duration,
    ) -> Result<CombinedResult> {
        let orchestrator = self.clone();
        let handle =
            tokio::spawn(async move { orchestrator.evaluate_interview(&qa_history).await });

        match tokio::time::timeout(budget, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                Err(anyhow::anyhow!("evaluation task aborted: {}", join_err).into())
            }
            Err(_) => {
                warn!(
                    "Evaluation exceeded its {}s budget, abandoning the in-flight task",
                    budget.as_secs()
                );
                Err(VivaError::EvaluationTimeout(budget.as_secs()))
            }
        }
    }

    /// Generate the question set for a role/interview-type pair, cache-first
    /// under the canonical key with a long TTL
    pub async fn generate_questions(
        &self,
        job_role: &str,
        interview_type: &str,
    ) -> Result<Vec<Question>> {
        let key = keys::ai_questions_key(job_role, interview_type);
        self.cache
            .get_or_compute(&key, QUESTIONS_TTL, || {
                self.generate_questions_uncached(job_role, interview_type)
            })
            .await
    }

    async fn evaluate_uncached(&self, qa_history: &[QAPair]) -> Result<CombinedResult> {
        info!("Evaluating interview with {} exchanges", qa_history.len());

        // screening always runs on the untruncated text; the prompt builder
        // truncates only for token cost
        let validations: Vec<ValidationResult> = qa_history
            .iter()
            .map(|qa| AnswerValidator::validate(&qa.question, &qa.answer))
            .collect();

        let flagged = validations.iter().filter(|v| !v.is_valid).count();
        if flagged > 0 {
            info!(
                "{} of {} answers failed quality screening",
                flagged,
                qa_history.len()
            );
        }

        let prompt = self.strategy.evaluation_prompt(qa_history, &validations);

        self.invoke_with_fallback(
            &prompt,
            self.evaluation.max_tokens,
            parser::parse_combined_result,
            is_valid_result,
        )
        .await
    }

    async fn generate_questions_uncached(
        &self,
        job_role: &str,
        interview_type: &str,
    ) -> Result<Vec<Question>> {
        info!(
            "Generating questions for {} ({} interview)",
            job_role, interview_type
        );

        let prompt = build_question_generation_prompt(job_role, interview_type);

        self.invoke_with_fallback(
            &prompt,
            self.evaluation.question_max_tokens,
            parser::parse_questions,
            |questions: &Vec<Question>| !questions.is_empty(),
        )
        .await
    }

    /// The fallback state machine. The prompt passed in is shared verbatim
    /// by every attempt.
    async fn invoke_with_fallback<T, P, C>(
        &self,
        prompt: &str,
        max_tokens: u32,
        parse: P,
        is_complete: C,
    ) -> Result<T>
    where
        P: Fn(&str) -> std::result::Result<T, ParseError>,
        C: Fn(&T) -> bool,
    {
        let mut state = AttemptState::NotAttempted;
        let mut outcome = None;

        loop {
            state = match state {
                AttemptState::NotAttempted => {
                    if self.primary.is_some() {
                        AttemptState::AttemptingPrimary
                    } else if self.secondary.is_some() {
                        debug!("Primary provider disabled, starting with secondary");
                        AttemptState::AttemptingSecondary
                    } else {
                        warn!("No AI providers are enabled");
                        AttemptState::AllFailed
                    }
                }
                AttemptState::AttemptingPrimary => {
                    match self
                        .try_provider(
                            self.primary.as_deref(),
                            prompt,
                            max_tokens,
                            &parse,
                            &is_complete,
                        )
                        .await
                    {
                        Some(value) => {
                            outcome = Some(value);
                            AttemptState::Succeeded
                        }
                        None if self.secondary.is_some() => AttemptState::AttemptingSecondary,
                        None => AttemptState::AllFailed,
                    }
                }
                AttemptState::AttemptingSecondary => {
                    match self
                        .try_provider(
                            self.secondary.as_deref(),
                            prompt,
                            max_tokens,
                            &parse,
                            &is_complete,
                        )
                        .await
                    {
                        Some(value) => {
                            outcome = Some(value);
                            AttemptState::Succeeded
                        }
                        None => AttemptState::AllFailed,
                    }
                }
                AttemptState::Succeeded => break,
                AttemptState::AllFailed => return Err(VivaError::AllProvidersFailed),
            };
        }

        outcome.ok_or(VivaError::AllProvidersFailed)
    }

    /// One attempt: invoke, parse, completeness-check. Every failure mode is
    /// logged and reported as `None` so the chain can move on.
    async fn try_provider<T, P, C>(
        &self,
        provider: Option<&dyn ProviderClient>,
        prompt: &str,
        max_tokens: u32,
        parse: &P,
        is_complete: &C,
    ) -> Option<T>
    where
        P: Fn(&str) -> std::result::Result<T, ParseError>,
        C: Fn(&T) -> bool,
    {
        let provider = provider?;
        debug!("Attempting {}", provider.name());

        let raw = match provider.invoke(prompt, max_tokens).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{} invocation failed: {}", provider.name(), e);
                return None;
            }
        };

        let value = match parse(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("{} returned an unparseable response: {}", provider.name(), e);
                return None;
            }
        };

        if !is_complete(&value) {
            warn!(
                "{} returned an incomplete result, falling back",
                provider.name()
            );
            return None;
        }

        info!("{} produced a complete result", provider.name());
        Some(value)
    }
}

/// Completeness gate, independent of the JSON validity the parser enforces:
/// overall score reported, at least one analysed question, at least one
/// planned week. Incomplete results trigger fallback like hard failures.
fn is_valid_result(result: &CombinedResult) -> bool {
    result.evaluation.overall_score.is_some()
        && !result.evaluation.question_analysis.is_empty()
        && !result.training_plan.weekly_plan.is_empty()
}
