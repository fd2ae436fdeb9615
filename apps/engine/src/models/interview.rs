//! Interview domain model — questions, answers, evaluations, and session state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coding;

/// Ordinal question difficulty. `easy < medium < hard`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// One level up, clamped at `Hard`.
    pub fn promote(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One level down, clamped at `Easy`.
    pub fn demote(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

/// A generated interview question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub difficulty: Difficulty,
    pub topic: String,
    pub domain: String,
    pub time_limit_secs: u32,
    pub is_coding: bool,
    pub test_cases: Option<Vec<String>>,
}

/// Raw interaction timing data captured by the client while answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionTelemetry {
    pub time_spent_secs: f64,
    pub edit_count: u32,
    pub typing_duration_secs: f64,
    pub auto_submitted: bool,
}

/// Evaluation returned by the oracle for one answer, discriminated by `kind`.
/// The variant must agree with the answer's coding flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationResult {
    Theoretical {
        /// 0–10 overall score.
        score: f64,
        technical_accuracy: f64,
        clarity: f64,
        depth: f64,
        strengths: Vec<String>,
        weaknesses: Vec<String>,
        improvements: Vec<String>,
    },
    Coding {
        logic_score: f64,
        readability_score: f64,
        edge_case_handling: String,
        time_complexity: String,
        space_complexity: String,
        improvement_suggestions: Vec<String>,
    },
}

impl EvaluationResult {
    pub fn is_coding(&self) -> bool {
        matches!(self, EvaluationResult::Coding { .. })
    }

    /// Collapses either variant to one 0–10 scalar. Coding results go through
    /// the normalizer's weighted blend.
    pub fn overall_score(&self) -> f64 {
        match self {
            EvaluationResult::Theoretical { score, .. } => *score,
            EvaluationResult::Coding {
                logic_score,
                readability_score,
                edge_case_handling,
                ..
            } => coding::calculate_overall_coding_score(
                *logic_score,
                *readability_score,
                Some(edge_case_handling),
            ),
        }
    }
}

/// A submitted answer together with its evaluation.
/// `question_text` is the join key back to the asked question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_text: String,
    pub response: String,
    pub is_coding: bool,
    pub language: Option<String>,
    pub evaluation: EvaluationResult,
    pub submitted_at: DateTime<Utc>,
    pub telemetry: Option<InteractionTelemetry>,
}

impl Answer {
    /// Invariant check: the evaluation variant must match the coding flag.
    pub fn variant_matches_flag(&self) -> bool {
        self.evaluation.is_coding() == self.is_coding
    }
}

/// Latest observed score for one topic within a single session, plus the
/// timestamps of every attempt. Cross-session history is reconstructed
/// elsewhere; this deliberately holds last-observed only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillPerformanceEntry {
    pub topic: String,
    pub last_score: f64,
    pub attempts: Vec<DateTime<Utc>>,
}

/// Mutable state of one in-progress interview session.
///
/// Owned exclusively by that session; mutated only by the adaptive
/// controller, one submitted answer at a time. The calling layer serializes
/// writes per session — there is no internal locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub difficulty: Difficulty,
    pub skill_map: HashMap<String, SkillPerformanceEntry>,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}

impl SessionState {
    /// Fresh session: medium difficulty, empty topic map.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            difficulty: Difficulty::Medium,
            skill_map: HashMap::new(),
            questions: Vec::new(),
            answers: Vec::new(),
        }
    }

    /// Topic of an answer, resolved through the asked-question list.
    pub fn topic_for_answer(&self, answer: &Answer) -> Option<&str> {
        self.questions
            .iter()
            .find(|q| q.text == answer.question_text)
            .map(|q| q.topic.as_str())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable record of a finished session, the unit of cross-session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSession {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub skill_snapshots: HashMap<String, SkillPerformanceEntry>,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}

impl CompletedSession {
    pub fn from_state(state: SessionState, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: state.id,
            completed_at,
            skill_snapshots: state.skill_map,
            questions: state.questions,
            answers: state.answers,
        }
    }

    /// Mean overall score across this session's answers. 0.0 when empty.
    pub fn average_score(&self) -> f64 {
        if self.answers.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.answers.iter().map(|a| a.evaluation.overall_score()).sum();
        sum / self.answers.len() as f64
    }

    pub fn topic_for_answer(&self, answer: &Answer) -> Option<&str> {
        self.questions
            .iter()
            .find(|q| q.text == answer.question_text)
            .map(|q| q.topic.as_str())
    }
}
