//! Per-session running metrics: overall and per-kind averages, attempt
//! counts per difficulty, and strong/weak topic lists for the session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::interview::{Difficulty, SessionState};

/// Session-topic averages at or above this are strong, below are weak.
const STRONG_TOPIC_AT: f64 = 7.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub overall_avg: f64,
    pub coding_avg: f64,
    pub theoretical_avg: f64,
    pub difficulty_counts: BTreeMap<Difficulty, u32>,
    pub strong_topics: Vec<String>,
    pub weak_topics: Vec<String>,
}

/// Computes running metrics for an in-progress or completed session.
/// An empty session yields zeroed metrics, never an error.
pub fn calculate_session_metrics(state: &SessionState) -> SessionMetrics {
    let mut overall = Mean::default();
    let mut coding = Mean::default();
    let mut theoretical = Mean::default();
    let mut difficulty_counts: BTreeMap<Difficulty, u32> = BTreeMap::new();
    let mut topic_means: BTreeMap<&str, Mean> = BTreeMap::new();

    for answer in &state.answers {
        let score = answer.evaluation.overall_score();
        overall.push(score);
        if answer.is_coding {
            coding.push(score);
        } else {
            theoretical.push(score);
        }

        if let Some(q) = state.questions.iter().find(|q| q.text == answer.question_text) {
            *difficulty_counts.entry(q.difficulty).or_insert(0) += 1;
            topic_means.entry(q.topic.as_str()).or_default().push(score);
        }
    }

    let mut strong_topics = Vec::new();
    let mut weak_topics = Vec::new();
    for (topic, mean) in &topic_means {
        if mean.value() >= STRONG_TOPIC_AT {
            strong_topics.push(topic.to_string());
        } else {
            weak_topics.push(topic.to_string());
        }
    }

    SessionMetrics {
        overall_avg: overall.value(),
        coding_avg: coding.value(),
        theoretical_avg: theoretical.value(),
        difficulty_counts,
        strong_topics,
        weak_topics,
    }
}

/// Running mean that reads 0.0 when empty.
#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}
