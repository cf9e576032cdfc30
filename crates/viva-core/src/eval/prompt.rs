//! Prompt construction for evaluation and question generation
//!
//! One builder parameterized by [`SchemaStrategy`] replaces the two
//! near-duplicate prompt paths that existed historically. The embedded
//! output schema is part of the provider contract: the parser is written
//! against exactly what these prompts request.

use super::types::QAPair;
use super::validator::ValidationResult;

/// Which output contract the provider is instructed to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaStrategy {
    /// Older, looser instruction and schema sketch
    Legacy,
    /// Full rubric, per-answer quality flags and the complete result schema
    #[default]
    Strict,
}

/// The literal JSON shape a provider must reproduce for an evaluation.
/// Generated identically regardless of provider.
const COMBINED_RESULT_SCHEMA: &str = r#"{
  "evaluation": {
    "overallScore": 7.5,
    "confidenceLevel": "Medium",
    "scoreBreakdown": {
      "technicalKnowledge": 7.0,
      "problemSolving": 7.5,
      "communication": 8.0,
      "depthOfUnderstanding": 7.0
    },
    "questionAnalysis": [
      {
        "questionNumber": 1,
        "relevanceScore": 8.0,
        "correctnessScore": 7.0,
        "depthScore": 6.0,
        "finalScore": 7.0,
        "whatYouAnswered": "one-line summary of the answer",
        "whatWasGood": "specific strengths",
        "whatWasMissing": "specific gaps",
        "idealAnswer": "concise model answer",
        "reasoning": "why these scores were given"
      }
    ],
    "coachFeedback": "overall coaching summary",
    "topStrengths": ["strength 1", "strength 2"],
    "criticalGaps": ["gap 1", "gap 2"]
  },
  "trainingPlan": {
    "readinessScore": 65,
    "targetScore": 85,
    "timeToTarget": "4 weeks",
    "focusAreas": [
      {
        "area": "area name",
        "priority": "high",
        "currentLevel": 4,
        "targetLevel": 8,
        "estimatedHours": 12,
        "keyTopics": ["topic 1", "topic 2"],
        "resources": [
          {"type": "video", "title": "resource title", "link": "https://example.com", "duration": "45m"}
        ]
      }
    ],
    "weeklyPlan": [
      {
        "week": 1,
        "theme": "week theme",
        "studyTime": "6h",
        "practiceTime": "4h",
        "topics": ["topic 1", "topic 2"],
        "practiceProblems": [
          {"problem": "problem statement", "difficulty": "medium", "focusArea": "area name"}
        ],
        "projects": ["project 1"],
        "weekendTask": "task description"
      }
    ],
    "milestones": [
      {"week": 1, "milestone": "milestone description", "verification": "how to verify it"}
    ]
  }
}"#;

impl SchemaStrategy {
    /// Build the evaluation prompt for a transcript.
    ///
    /// `validations` must line up positionally with `qa_history` and must
    /// have been computed on the untruncated text; truncation here only
    /// bounds token cost.
    pub fn evaluation_prompt(
        &self,
        qa_history: &[QAPair],
        validations: &[ValidationResult],
    ) -> String {
        match self {
            Self::Strict => strict_evaluation_prompt(qa_history, validations),
            Self::Legacy => legacy_evaluation_prompt(qa_history),
        }
    }
}

fn strict_evaluation_prompt(qa_history: &[QAPair], validations: &[ValidationResult]) -> String {
    let transcript = render_transcript(qa_history, Some(validations));

    format!(
        r#"You are an expert technical interviewer. Evaluate this interview transcript.

SCORING RUBRIC:
- For each question, score relevance, correctness and depth from 0-10.
- finalScore for a question is the mean of its relevance, correctness and depth scores.
- overallScore is the mean of all finalScore values.
- A [QUALITY FLAG ...] line means the answer failed a quality screen; score that answer at or below its suggested cap.

TRANSCRIPT:
{}
Return ONLY valid JSON with these exact fields:
{}

Rules:
- Include one questionAnalysis entry per question, numbered from 1 in transcript order.
- Populate every week of weeklyPlan and every milestone. Do not elide entries.
- No text outside the JSON object."#,
        transcript, COMBINED_RESULT_SCHEMA
    )
}

fn legacy_evaluation_prompt(qa_history: &[QAPair]) -> String {
    let transcript = render_transcript(qa_history, None);

    format!(
        r#"You are an expert technical interviewer. Evaluate this interview:

{}
Provide evaluation in this JSON format:
{{
  "evaluation": {{
    "overallScore": 7.5,
    "scoreBreakdown": {{...}},
    "coachFeedback": "...",
    "questionAnalysis": [...]
  }},
  "trainingPlan": {{
    "readinessScore": 65,
    "weeklyPlan": [...]
  }}
}}"#,
        transcript
    )
}

/// Build the question-generation prompt for a role and interview type
pub fn build_question_generation_prompt(job_role: &str, interview_type: &str) -> String {
    format!(
        r#"Generate 10 interview questions for a {} position ({} interview).

Return ONLY valid JSON:
{{
  "questions": [
    {{
      "type": "open_ended",
      "question": "Your question here"
    }}
  ]
}}

Mix of question types: open_ended, mcq_proper, mcq_all_correct."#,
        job_role, interview_type
    )
}

fn render_transcript(qa_history: &[QAPair], validations: Option<&[ValidationResult]>) -> String {
    let mut out = String::new();
    for (i, qa) in qa_history.iter().enumerate() {
        let number = i + 1;
        out.push_str(&format!(
            "Q{}: {}\n",
            number,
            truncate_chars(&qa.question, 200)
        ));
        out.push_str(&format!("A{}: {}\n", number, truncate_chars(&qa.answer, 400)));
        if let Some(validations) = validations {
            if let Some(v) = validations.get(i) {
                if !v.is_valid {
                    out.push_str(&format!(
                        "[QUALITY FLAG Q{}: {} - suggested score cap {:.1}]\n",
                        number, v.reason, v.suggested_score_cap
                    ));
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Truncate to at most `max` characters, appending "..." only when cut
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
