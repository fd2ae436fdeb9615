//! Adaptive Difficulty Controller — the difficulty state machine and topic
//! targeting policy. This module is the only writer of `SessionState`; the
//! calling layer serializes submissions per session.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::interview::{
    Answer, CompletedSession, Difficulty, Question, SessionState, SkillPerformanceEntry,
};

pub mod metrics;

/// Scores above this promote one difficulty level.
const PROMOTE_ABOVE: f64 = 8.0;
/// Scores below this demote one level.
const DEMOTE_BELOW: f64 = 4.0;
/// A topic whose latest score is below this is a weak topic.
const WEAK_TOPIC_BELOW: f64 = 5.0;
/// Default lookback for the in-session topic repetition guard.
pub const REPETITION_WINDOW: usize = 3;

/// Difficulty transition rule. Promote if the last score beats 8, demote if
/// it falls under 4, otherwise hold. Always clamped to {easy, medium, hard}.
pub fn next_difficulty(current: Difficulty, last_score: f64) -> Difficulty {
    if last_score > PROMOTE_ABOVE {
        current.promote()
    } else if last_score < DEMOTE_BELOW {
        current.demote()
    } else {
        current
    }
}

/// Appends a question to the session's asked list.
pub fn record_question(state: &mut SessionState, question: Question) {
    state.questions.push(question);
}

/// Applies one submitted answer: stores it, upserts the topic's latest score
/// and attempt timestamp, then steps the difficulty state machine. The sole
/// mutation path for in-progress session state.
pub fn apply_answer(state: &mut SessionState, question: &Question, answer: Answer) {
    // A mismatched evaluation variant is a caller defect, not an
    // operational state.
    debug_assert!(
        answer.variant_matches_flag(),
        "evaluation variant does not match the answer's coding flag"
    );

    let score = answer.evaluation.overall_score();
    let submitted_at = answer.submitted_at;

    let entry = state
        .skill_map
        .entry(question.topic.clone())
        .or_insert_with(|| SkillPerformanceEntry {
            topic: question.topic.clone(),
            last_score: score,
            attempts: Vec::new(),
        });
    entry.last_score = score;
    entry.attempts.push(submitted_at);

    state.answers.push(answer);
    state.difficulty = next_difficulty(state.difficulty, score);
}

/// Recommends up to `count` weak topics for the next session: latest score
/// below 5, ranked ascending by score with most-recent-attempt-first on
/// ties, excluding topics touched in either of the last two completed
/// sessions (diversity guard).
pub fn recommend_next_topics(
    skill_map: &HashMap<String, SkillPerformanceEntry>,
    history: &[CompletedSession],
    count: usize,
) -> Vec<String> {
    let recent_topics: Vec<&str> = history
        .iter()
        .rev()
        .take(2)
        .flat_map(|s| s.skill_snapshots.keys().map(String::as_str))
        .collect();

    let mut weak: Vec<(&SkillPerformanceEntry, Option<DateTime<Utc>>)> = skill_map
        .values()
        .filter(|e| e.last_score < WEAK_TOPIC_BELOW)
        .filter(|e| !recent_topics.contains(&e.topic.as_str()))
        .map(|e| (e, e.attempts.iter().max().copied()))
        .collect();

    weak.sort_by(|(a, a_recent), (b, b_recent)| {
        a.last_score
            .partial_cmp(&b.last_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b_recent.cmp(a_recent))
    });

    weak.into_iter()
        .take(count)
        .map(|(e, _)| e.topic.clone())
        .collect()
}

/// In-session repetition guard: rejects a candidate topic that appeared
/// among the last `window` questions asked.
pub fn violates_repetition_guard(state: &SessionState, topic: &str, window: usize) -> bool {
    state
        .questions
        .iter()
        .rev()
        .take(window)
        .any(|q| q.topic == topic)
}
