//! Behavioral Telemetry Analyzer — engagement and confidence signals derived
//! from raw interaction timing attached to each answer.

use serde::{Deserialize, Serialize};

use super::{Recommendation, Severity};
use crate::models::interview::{Answer, Question};

/// Idle time beyond this share of total time flags a pause.
const IDLE_PAUSE_SHARE: f64 = 0.3;
/// Sessions with this many timeouts classify very-low regardless of else.
const VERY_LOW_TIMEOUTS: u32 = 3;
/// Average seconds per question under which a no-edit session reads rushed.
const RUSHED_UNDER_SECS: f64 = 30.0;
const MODERATE_UNDER_SECS: f64 = 90.0;
const HIGH_UNDER_SECS: f64 = 240.0;
/// Half-vs-half average delta beyond this counts as a trend.
const TREND_DELTA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevisionIntensity {
    NoRevision,
    Minimal,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseType {
    Empty,
    Minimal,
    BriefFirstAttempt,
    DetailedFirstAttempt,
    Refined,
    HeavilyRevised,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngagementLevel {
    VeryLow,
    Low,
    Rushed,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTrend {
    Improving,
    Declining,
    Stable,
}

/// Per-answer behavioral metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerBehaviorMetrics {
    pub time_utilization_pct: f64,
    pub edits_per_minute: f64,
    pub revision_intensity: RevisionIntensity,
    pub response_type: ResponseType,
    pub idle_pause: bool,
    /// Heuristic confidence, clamped to 1–10.
    pub confidence: u8,
}

/// Session-wide behavioral metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBehaviorMetrics {
    pub avg_time_per_question_secs: f64,
    pub total_edits: u32,
    pub timeout_count: u32,
    pub engagement: EngagementLevel,
    pub score_trend: ScoreTrend,
}

/// Derives per-answer metrics. Missing telemetry reads as zero time and zero
/// edits rather than an error.
pub fn calculate_answer_behavior_metrics(
    answer: &Answer,
    question: &Question,
) -> AnswerBehaviorMetrics {
    let (time_spent, edits, typing, auto_submitted) = match &answer.telemetry {
        Some(t) => (
            t.time_spent_secs,
            t.edit_count,
            t.typing_duration_secs,
            t.auto_submitted,
        ),
        None => (0.0, 0, 0.0, false),
    };

    let time_utilization_pct = if question.time_limit_secs > 0 {
        time_spent / question.time_limit_secs as f64 * 100.0
    } else {
        0.0
    };

    let edits_per_minute = if time_spent > 0.0 {
        edits as f64 / (time_spent / 60.0)
    } else {
        0.0
    };

    let idle_pause = time_spent > 0.0 && (time_spent - typing) > IDLE_PAUSE_SHARE * time_spent;

    AnswerBehaviorMetrics {
        time_utilization_pct,
        edits_per_minute,
        revision_intensity: classify_revision_intensity(edits),
        response_type: classify_response_type(&answer.response, edits),
        idle_pause,
        confidence: confidence_score(
            answer.response.chars().count(),
            edits,
            auto_submitted,
            answer.evaluation.overall_score(),
        ),
    }
}

fn classify_revision_intensity(edits: u32) -> RevisionIntensity {
    match edits {
        0 => RevisionIntensity::NoRevision,
        1..=3 => RevisionIntensity::Minimal,
        4..=7 => RevisionIntensity::Moderate,
        8..=15 => RevisionIntensity::High,
        _ => RevisionIntensity::VeryHigh,
    }
}

fn classify_response_type(response: &str, edits: u32) -> ResponseType {
    let len = response.trim().chars().count();
    if len == 0 {
        ResponseType::Empty
    } else if len < 50 {
        ResponseType::Minimal
    } else if edits == 0 && len < 300 {
        ResponseType::BriefFirstAttempt
    } else if edits == 0 {
        ResponseType::DetailedFirstAttempt
    } else if edits <= 10 {
        ResponseType::Refined
    } else {
        ResponseType::HeavilyRevised
    }
}

/// Base 5; length, edit, auto-submit, and evaluation adjustments; clamped 1–10.
fn confidence_score(response_len: usize, edits: u32, auto_submitted: bool, score: f64) -> u8 {
    let mut confidence: i32 = 5;
    if response_len > 300 {
        confidence += 1;
    }
    if response_len > 500 {
        confidence += 1;
    }
    if edits == 0 {
        confidence += 1;
    }
    if edits > 10 {
        confidence -= 2;
    }
    if auto_submitted {
        confidence -= 1;
    }
    if score > 7.0 {
        confidence += 1;
    }
    if score < 4.0 {
        confidence -= 1;
    }
    confidence.clamp(1, 10) as u8
}

/// Derives session-level metrics from the ordered answer list. An empty
/// session yields a neutral moderate/stable reading.
pub fn calculate_session_behavior_metrics(answers: &[Answer]) -> SessionBehaviorMetrics {
    if answers.is_empty() {
        return SessionBehaviorMetrics {
            avg_time_per_question_secs: 0.0,
            total_edits: 0,
            timeout_count: 0,
            engagement: EngagementLevel::Moderate,
            score_trend: ScoreTrend::Stable,
        };
    }

    let mut total_time = 0.0;
    let mut total_edits = 0u32;
    let mut timeout_count = 0u32;
    let mut telemetry_count = 0u32;
    for answer in answers {
        if let Some(t) = &answer.telemetry {
            telemetry_count += 1;
            total_time += t.time_spent_secs;
            total_edits += t.edit_count;
            if t.auto_submitted {
                timeout_count += 1;
            }
        }
    }

    let scores: Vec<f64> = answers.iter().map(|a| a.evaluation.overall_score()).collect();

    // Telemetry absence is absent data, not a fast session: without any
    // timing signal the engagement reading stays neutral.
    if telemetry_count == 0 {
        return SessionBehaviorMetrics {
            avg_time_per_question_secs: 0.0,
            total_edits: 0,
            timeout_count: 0,
            engagement: EngagementLevel::Moderate,
            score_trend: score_trend(&scores),
        };
    }

    let avg_time = total_time / telemetry_count as f64;

    SessionBehaviorMetrics {
        avg_time_per_question_secs: avg_time,
        total_edits,
        timeout_count,
        engagement: classify_engagement(avg_time, total_edits, timeout_count),
        score_trend: score_trend(&scores),
    }
}

/// Priority-ordered engagement classification. Heavy timeouts override
/// everything; any timeout reads low; fast-with-no-edits reads rushed;
/// otherwise bucketed by average time per question.
fn classify_engagement(avg_time: f64, total_edits: u32, timeouts: u32) -> EngagementLevel {
    if timeouts >= VERY_LOW_TIMEOUTS {
        EngagementLevel::VeryLow
    } else if timeouts > 0 {
        EngagementLevel::Low
    } else if avg_time < RUSHED_UNDER_SECS && total_edits == 0 {
        EngagementLevel::Rushed
    } else if avg_time < MODERATE_UNDER_SECS {
        EngagementLevel::Moderate
    } else if avg_time < HIGH_UNDER_SECS {
        EngagementLevel::High
    } else {
        EngagementLevel::VeryHigh
    }
}

/// First-half vs second-half average comparison.
fn score_trend(scores: &[f64]) -> ScoreTrend {
    if scores.len() < 2 {
        return ScoreTrend::Stable;
    }
    let mid = scores.len() / 2;
    let first: f64 = scores[..mid].iter().sum::<f64>() / mid as f64;
    let second: f64 = scores[mid..].iter().sum::<f64>() / (scores.len() - mid) as f64;
    let delta = second - first;
    if delta > TREND_DELTA {
        ScoreTrend::Improving
    } else if delta < -TREND_DELTA {
        ScoreTrend::Declining
    } else {
        ScoreTrend::Stable
    }
}

/// Behavioral follow-ups from the session classification and score trend.
pub fn generate_behavior_recommendations(
    metrics: &SessionBehaviorMetrics,
    avg_score: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    match metrics.engagement {
        EngagementLevel::VeryLow => recommendations.push(Recommendation::new(
            Severity::Critical,
            format!(
                "{} questions timed out — practice answering within the limit before the next session.",
                metrics.timeout_count
            ),
        )),
        EngagementLevel::Low => recommendations.push(Recommendation::new(
            Severity::Warning,
            "At least one question timed out; budget time per question and submit early drafts.",
        )),
        EngagementLevel::Rushed => recommendations.push(Recommendation::new(
            Severity::Warning,
            "Answers were submitted quickly with no revisions — slow down and re-read before submitting.",
        )),
        EngagementLevel::VeryHigh => recommendations.push(Recommendation::new(
            Severity::Suggestion,
            "You use most of the available time; keep an eye on pacing under stricter limits.",
        )),
        EngagementLevel::Moderate | EngagementLevel::High => {}
    }

    match metrics.score_trend {
        ScoreTrend::Declining => recommendations.push(Recommendation::new(
            Severity::Warning,
            "Scores dropped in the second half of the session — fatigue may be a factor; consider shorter sessions.",
        )),
        ScoreTrend::Improving => recommendations.push(Recommendation::new(
            Severity::Suggestion,
            "Scores improved as the session went on; a short warm-up question may help you start stronger.",
        )),
        ScoreTrend::Stable => {}
    }

    if avg_score < 4.0 {
        recommendations.push(Recommendation::new(
            Severity::Warning,
            "Session average is below 4/10; revisit fundamentals on the weak topics before advancing difficulty.",
        ));
    }

    recommendations
}
