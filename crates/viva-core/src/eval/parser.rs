//! Defensive parsing of provider responses
//!
//! Providers are instructed to return pure JSON but routinely wrap it in
//! markdown fences or commentary, omit optional fields, or use the legacy
//! `score` key. Parsing therefore never decodes straight into the strict
//! structures: the raw text is cleaned, sliced to the outermost JSON object,
//! decoded into a loose [`serde_json::Value`] tree and projected field by
//! field.

use serde_json::Value;
use thiserror::Error;

use super::types::{
    CombinedResult, ComprehensiveEvaluation, ConfidenceLevel, FocusArea, Milestone,
    PracticeProblem, Question, QuestionAnalysis, Resource, ScoreBreakdown, TrainingPlan,
    WeeklyPlan,
};

/// Structural failures while turning provider text into typed results
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty response")]
    Empty,

    #[error("no JSON object found in response")]
    NoJson,

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required keys: {0}")]
    MissingKeys(String),

    #[error("incomplete structure: {0}")]
    Incomplete(String),
}

/// Parse a full evaluation response into a [`CombinedResult`].
///
/// Requires top-level `evaluation` and `trainingPlan` objects and the three
/// plan lists (`focusAreas`, `weeklyPlan`, `milestones`); everything else is
/// projected leniently with defaults.
pub fn parse_combined_result(raw: &str) -> Result<CombinedResult, ParseError> {
    let root = decode(raw)?;

    let evaluation = match root.get("evaluation") {
        Some(v) if v.is_object() => v,
        _ => return Err(ParseError::MissingKeys("evaluation".to_string())),
    };
    let training_plan = match root.get("trainingPlan") {
        Some(v) if v.is_object() => v,
        _ => return Err(ParseError::MissingKeys("trainingPlan".to_string())),
    };

    Ok(CombinedResult {
        evaluation: project_evaluation(evaluation),
        training_plan: project_training_plan(training_plan)?,
    })
}

/// Parse a question-generation response into a non-empty question list
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, ParseError> {
    let root = decode(raw)?;

    let items = root
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::MissingKeys("questions".to_string()))?;

    let questions: Vec<Question> = items.iter().filter_map(project_question).collect();
    if questions.is_empty() {
        return Err(ParseError::Incomplete("no questions in response".to_string()));
    }
    Ok(questions)
}

/// Clean markdown wrapping, slice the outermost JSON object, decode loosely
fn decode(raw: &str) -> Result<Value, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let cleaned = raw
        .replace("```json", "")
        .replace("```", "")
        .replace("**", "");

    let start = cleaned.find('{').ok_or(ParseError::NoJson)?;
    let end = cleaned.rfind('}').ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }

    Ok(serde_json::from_str(&cleaned[start..=end])?)
}

fn project_evaluation(value: &Value) -> ComprehensiveEvaluation {
    let confidence_level = value
        .get("confidenceLevel")
        .and_then(Value::as_str)
        .map(ConfidenceLevel::from_label)
        .unwrap_or_default();

    let score_breakdown = value
        .get("scoreBreakdown")
        .map(project_score_breakdown)
        .unwrap_or_default();

    let question_analysis = value
        .get("questionAnalysis")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| project_question_analysis(i, item))
                .collect()
        })
        .unwrap_or_default();

    ComprehensiveEvaluation {
        overall_score: f64_field(value, "overallScore"),
        confidence_level,
        score_breakdown,
        question_analysis,
        coach_feedback: str_field(value, "coachFeedback"),
        top_strengths: str_list(value, "topStrengths"),
        critical_gaps: str_list(value, "criticalGaps"),
    }
}

fn project_score_breakdown(value: &Value) -> ScoreBreakdown {
    ScoreBreakdown {
        technical_knowledge: f64_field(value, "technicalKnowledge").unwrap_or(0.0),
        problem_solving: f64_field(value, "problemSolving").unwrap_or(0.0),
        communication: f64_field(value, "communication").unwrap_or(0.0),
        depth_of_understanding: f64_field(value, "depthOfUnderstanding").unwrap_or(0.0),
    }
}

fn project_question_analysis(index: usize, value: &Value) -> Option<QuestionAnalysis> {
    if !value.is_object() {
        return None;
    }

    // Providers scored under the old contract report `score` instead of
    // `finalScore`
    let final_score = f64_field(value, "finalScore")
        .or_else(|| f64_field(value, "score"))
        .unwrap_or(0.0);

    Some(QuestionAnalysis {
        question_number: i64_field(value, "questionNumber", (index + 1) as i64),
        relevance_score: f64_field(value, "relevanceScore"),
        correctness_score: f64_field(value, "correctnessScore"),
        depth_score: f64_field(value, "depthScore"),
        final_score,
        what_you_answered: str_field(value, "whatYouAnswered"),
        what_was_good: str_field(value, "whatWasGood"),
        what_was_missing: str_field(value, "whatWasMissing"),
        ideal_answer: str_field(value, "idealAnswer"),
        reasoning: str_field(value, "reasoning"),
    })
}

fn project_training_plan(value: &Value) -> Result<TrainingPlan, ParseError> {
    let focus_areas = required_array(value, "focusAreas")?;
    let weekly_plan = required_array(value, "weeklyPlan")?;
    let milestones = required_array(value, "milestones")?;

    Ok(TrainingPlan {
        readiness_score: i64_field(value, "readinessScore", 0),
        target_score: i64_field(value, "targetScore", 0),
        time_to_target: str_field(value, "timeToTarget"),
        focus_areas: focus_areas.iter().filter_map(project_focus_area).collect(),
        weekly_plan: weekly_plan
            .iter()
            .enumerate()
            .filter_map(|(i, item)| project_weekly_plan(i, item))
            .collect(),
        milestones: milestones.iter().filter_map(project_milestone).collect(),
    })
}

fn project_focus_area(value: &Value) -> Option<FocusArea> {
    let area = value.get("area").and_then(Value::as_str)?;

    let resources = value
        .get("resources")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(project_resource).collect())
        .unwrap_or_default();

    Some(FocusArea {
        area: area.to_string(),
        priority: str_field(value, "priority"),
        current_level: i64_field(value, "currentLevel", 0),
        target_level: i64_field(value, "targetLevel", 0),
        estimated_hours: i64_field(value, "estimatedHours", 0),
        key_topics: str_list(value, "keyTopics"),
        resources,
    })
}

fn project_resource(value: &Value) -> Option<Resource> {
    let title = value.get("title").and_then(Value::as_str)?;
    Some(Resource {
        kind: str_field(value, "type"),
        title: title.to_string(),
        link: str_field(value, "link"),
        duration: str_field(value, "duration"),
    })
}

fn project_weekly_plan(index: usize, value: &Value) -> Option<WeeklyPlan> {
    if !value.is_object() {
        return None;
    }

    let practice_problems = value
        .get("practiceProblems")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(project_practice_problem).collect())
        .unwrap_or_default();

    Some(WeeklyPlan {
        week: i64_field(value, "week", (index + 1) as i64),
        theme: str_field(value, "theme"),
        study_time: str_field(value, "studyTime"),
        practice_time: str_field(value, "practiceTime"),
        topics: str_list(value, "topics"),
        practice_problems,
        projects: str_list(value, "projects"),
        weekend_task: str_field(value, "weekendTask"),
    })
}

fn project_practice_problem(value: &Value) -> Option<PracticeProblem> {
    let problem = value.get("problem").and_then(Value::as_str)?;
    Some(PracticeProblem {
        problem: problem.to_string(),
        difficulty: str_field(value, "difficulty"),
        focus_area: str_field(value, "focusArea"),
    })
}

fn project_milestone(value: &Value) -> Option<Milestone> {
    let milestone = value.get("milestone").and_then(Value::as_str)?;
    Some(Milestone {
        week: i64_field(value, "week", 0),
        milestone: milestone.to_string(),
        verification: str_field(value, "verification"),
    })
}

fn project_question(value: &Value) -> Option<Question> {
    let question = value.get("question").and_then(Value::as_str)?;
    Some(Question {
        kind: str_field(value, "type"),
        question: question.to_string(),
        options: str_list(value, "options"),
        correct_index: i64_field(value, "correctIndex", -1),
    })
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn f64_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn i64_field(value: &Value, key: &str, default: i64) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(default)
}

fn str_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn required_array<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, ParseError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ParseError::MissingKeys(format!("trainingPlan.{}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> String {
        r#"{
            "evaluation": {
                "overallScore": 8.0,
                "confidenceLevel": "High",
                "scoreBreakdown": {
                    "technicalKnowledge": 8.0,
                    "problemSolving": 7.5,
                    "communication": 8.5,
                    "depthOfUnderstanding": 8.0
                },
                "questionAnalysis": [
                    {
                        "questionNumber": 1,
                        "relevanceScore": 9.0,
                        "correctnessScore": 8.0,
                        "depthScore": 7.0,
                        "finalScore": 8.0,
                        "whatYouAnswered": "Hash map mechanics",
                        "whatWasGood": "Covered collision handling",
                        "whatWasMissing": "Resize amortization",
                        "idealAnswer": "Buckets plus chaining or probing",
                        "reasoning": "Accurate and reasonably deep"
                    }
                ],
                "coachFeedback": "Solid fundamentals",
                "topStrengths": ["data structures"],
                "criticalGaps": ["amortized analysis"]
            },
            "trainingPlan": {
                "readinessScore": 72,
                "targetScore": 85,
                "timeToTarget": "3 weeks",
                "focusAreas": [
                    {
                        "area": "Complexity analysis",
                        "priority": "high",
                        "currentLevel": 5,
                        "targetLevel": 8,
                        "estimatedHours": 10,
                        "keyTopics": ["amortized cost"],
                        "resources": [
                            {"type": "article", "title": "Amortized analysis primer", "link": "https://example.com", "duration": "30m"}
                        ]
                    }
                ],
                "weeklyPlan": [
                    {
                        "week": 1,
                        "theme": "Hashing internals",
                        "studyTime": "5h",
                        "practiceTime": "3h",
                        "topics": ["open addressing"],
                        "practiceProblems": [
                            {"problem": "Design a hash set", "difficulty": "medium", "focusArea": "Complexity analysis"}
                        ],
                        "projects": ["toy hash map"],
                        "weekendTask": "benchmark both strategies"
                    }
                ],
                "milestones": [
                    {"week": 1, "milestone": "Explain resize policy", "verification": "mock interview"}
                ]
            }
        }"#
        .to_string()
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(matches!(parse_combined_result(""), Err(ParseError::Empty)));
        assert!(matches!(parse_combined_result("  \n "), Err(ParseError::Empty)));
    }

    #[test]
    fn test_parse_no_json() {
        let err = parse_combined_result("I cannot evaluate this interview.").unwrap_err();
        assert!(matches!(err, ParseError::NoJson));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse_combined_result("{\"evaluation\": ").unwrap_err();
        assert!(matches!(err, ParseError::NoJson | ParseError::Json(_)));
    }

    #[test]
    fn test_parse_missing_top_level_keys() {
        let err = parse_combined_result(r#"{"evaluation": {}}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingKeys(k) if k == "trainingPlan"));

        let err = parse_combined_result(r#"{"trainingPlan": {}}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingKeys(k) if k == "evaluation"));
    }

    #[test]
    fn test_null_evaluation_counts_as_missing() {
        let err = parse_combined_result(r#"{"evaluation": null, "trainingPlan": {}}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingKeys(k) if k == "evaluation"));
    }

    #[test]
    fn test_fenced_response_parses_like_bare_json() {
        let bare = parse_combined_result(&sample_payload()).unwrap();
        let fenced = format!(
            "Here is the evaluation you asked for:\n```json\n{}\n```\nLet me know if you need anything else.",
            sample_payload()
        );
        let wrapped = parse_combined_result(&fenced).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_bold_markers_are_stripped() {
        let decorated = format!("**Result:**\n{}", sample_payload());
        let parsed = parse_combined_result(&decorated).unwrap();
        assert_eq!(parsed.evaluation.overall_score, Some(8.0));
    }

    #[test]
    fn test_projects_full_payload() {
        let result = parse_combined_result(&sample_payload()).unwrap();

        assert_eq!(result.evaluation.overall_score, Some(8.0));
        assert_eq!(result.evaluation.confidence_level, ConfidenceLevel::High);
        assert_eq!(result.evaluation.score_breakdown.problem_solving, 7.5);
        assert_eq!(result.evaluation.question_analysis.len(), 1);
        assert_eq!(result.evaluation.question_analysis[0].question_number, 1);
        assert_eq!(result.evaluation.question_analysis[0].final_score, 8.0);
        assert_eq!(result.training_plan.readiness_score, 72);
        assert_eq!(result.training_plan.focus_areas[0].resources[0].kind, "article");
        assert_eq!(result.training_plan.weekly_plan[0].practice_problems.len(), 1);
        assert_eq!(result.training_plan.milestones[0].week, 1);
    }

    #[test]
    fn test_legacy_score_key_fallback() {
        let raw = r#"{
            "evaluation": {
                "overallScore": 6.0,
                "questionAnalysis": [
                    {"questionNumber": 1, "score": 6.5, "whatYouAnswered": "x"}
                ]
            },
            "trainingPlan": {"focusAreas": [], "weeklyPlan": [], "milestones": []}
        }"#;
        let result = parse_combined_result(raw).unwrap();
        assert_eq!(result.evaluation.question_analysis[0].final_score, 6.5);
    }

    #[test]
    fn test_final_score_preferred_over_legacy_key() {
        let raw = r#"{
            "evaluation": {
                "overallScore": 6.0,
                "questionAnalysis": [
                    {"questionNumber": 1, "finalScore": 7.0, "score": 3.0}
                ]
            },
            "trainingPlan": {"focusAreas": [], "weeklyPlan": [], "milestones": []}
        }"#;
        let result = parse_combined_result(raw).unwrap();
        assert_eq!(result.evaluation.question_analysis[0].final_score, 7.0);
    }

    #[test]
    fn test_confidence_level_defaults_to_medium() {
        let raw = r#"{
            "evaluation": {"overallScore": 5.0},
            "trainingPlan": {"focusAreas": [], "weeklyPlan": [], "milestones": []}
        }"#;
        let result = parse_combined_result(raw).unwrap();
        assert_eq!(result.evaluation.confidence_level, ConfidenceLevel::Medium);

        let raw = raw.replace(
            r#""overallScore": 5.0"#,
            r#""overallScore": 5.0, "confidenceLevel": "certain""#,
        );
        let result = parse_combined_result(&raw).unwrap();
        assert_eq!(result.evaluation.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_optional_subscores_may_be_absent() {
        let raw = r#"{
            "evaluation": {
                "overallScore": 5.0,
                "questionAnalysis": [{"questionNumber": 2, "finalScore": 5.0}]
            },
            "trainingPlan": {"focusAreas": [], "weeklyPlan": [], "milestones": []}
        }"#;
        let analysis = &parse_combined_result(raw).unwrap().evaluation.question_analysis[0];
        assert_eq!(analysis.relevance_score, None);
        assert_eq!(analysis.depth_score, None);
        assert_eq!(analysis.question_number, 2);
    }

    #[test]
    fn test_missing_plan_lists_are_hard_failures() {
        let raw = r#"{
            "evaluation": {"overallScore": 5.0},
            "trainingPlan": {"focusAreas": [], "weeklyPlan": []}
        }"#;
        let err = parse_combined_result(raw).unwrap_err();
        assert!(matches!(err, ParseError::MissingKeys(k) if k == "trainingPlan.milestones"));
    }

    #[test]
    fn test_nested_leaf_lists_default_to_empty() {
        let raw = r#"{
            "evaluation": {"overallScore": 5.0},
            "trainingPlan": {
                "focusAreas": [{"area": "SQL", "priority": "low"}],
                "weeklyPlan": [{"theme": "joins"}],
                "milestones": []
            }
        }"#;
        let plan = parse_combined_result(raw).unwrap().training_plan;
        assert!(plan.focus_areas[0].resources.is_empty());
        assert!(plan.focus_areas[0].key_topics.is_empty());
        assert!(plan.weekly_plan[0].topics.is_empty());
        assert!(plan.weekly_plan[0].practice_problems.is_empty());
        // week falls back to 1-based position when absent
        assert_eq!(plan.weekly_plan[0].week, 1);
    }

    #[test]
    fn test_serialize_then_parse_round_trips() {
        let original = parse_combined_result(&sample_payload()).unwrap();
        let serialized = serde_json::to_string(&original).unwrap();
        let reparsed = parse_combined_result(&serialized).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_parse_questions_happy_path() {
        let raw = r#"```json
        {
            "questions": [
                {"type": "open_ended", "question": "Explain ownership in Rust"},
                {"type": "mcq_proper", "question": "Which collection is ordered?",
                 "options": ["HashMap", "BTreeMap", "HashSet"], "correctIndex": 1}
            ]
        }
        ```"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].kind, "open_ended");
        assert_eq!(questions[0].correct_index, -1);
        assert_eq!(questions[1].options.len(), 3);
        assert_eq!(questions[1].correct_index, 1);
    }

    #[test]
    fn test_parse_questions_missing_key() {
        let err = parse_questions(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingKeys(k) if k == "questions"));
    }

    #[test]
    fn test_parse_questions_empty_list_is_incomplete() {
        let err = parse_questions(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, ParseError::Incomplete(_)));
    }

    #[test]
    fn test_parse_questions_skips_entries_without_text() {
        let raw = r#"{"questions": [{"type": "open_ended"}, {"type": "open_ended", "question": "Why async?"}]}"#;
        let questions = parse_questions(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Why async?");
    }
}
