//! Skill Performance Aggregator — longitudinal per-topic trajectories and
//! cross-session statistics.
//!
//! Intra-session state keeps only the latest per-topic score; this module
//! owns the other half of that split: it reconstructs the complete ordered
//! history by joining skill snapshots across completed sessions
//! (case-sensitive topic name).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::interview::{CompletedSession, Difficulty};

/// Rolling-average window.
const ROLLING_WINDOW: usize = 5;
/// Slope magnitude below which a trajectory is considered stable.
const TREND_EPSILON: f64 = 0.1;
/// Range of the last three scores under which a plateau is flagged.
const PLATEAU_RANGE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasteryLevel {
    Novice,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Upward,
    Declining,
    Stable,
}

/// Derived per-topic trajectory. Recomputed from full history on demand,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub topic: String,
    pub mastery: MasteryLevel,
    pub growth_rate: f64,
    pub plateau_detected: bool,
    pub trend: Trend,
    pub rolling_average: f64,
}

/// Cross-session aggregate statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossSessionStats {
    pub overall_avg: f64,
    pub theoretical_avg: f64,
    pub coding_avg: f64,
    /// (last session average − first session average) / (sessions − 1).
    pub learning_velocity: f64,
    /// max(0, 10 − population σ of session averages).
    pub consistency: f64,
}

/// Attempt counts and score spread for one difficulty bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyStats {
    pub attempted: u32,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-topic ordered (oldest→newest) score history across sessions. Each
/// session contributes its latest-observed snapshot score for the topic.
pub fn topic_score_history(sessions: &[CompletedSession]) -> BTreeMap<String, Vec<f64>> {
    let mut history: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for session in sessions {
        for (topic, entry) in &session.skill_snapshots {
            history.entry(topic.clone()).or_default().push(entry.last_score);
        }
    }
    history
}

/// Builds the trajectory for one topic from its full ordered score history.
pub fn build_topic_trajectory(topic: &str, scores: &[f64]) -> Trajectory {
    let rolling_average = rolling_mean(scores, ROLLING_WINDOW);
    let growth_rate = ols_slope(scores);

    let trend = if growth_rate > TREND_EPSILON {
        Trend::Upward
    } else if growth_rate < -TREND_EPSILON {
        Trend::Declining
    } else {
        Trend::Stable
    };

    let plateau_detected = scores.len() >= 3 && {
        let recent = &scores[scores.len() - 3..];
        let max = recent.iter().cloned().fold(f64::MIN, f64::max);
        let min = recent.iter().cloned().fold(f64::MAX, f64::min);
        max - min < PLATEAU_RANGE
    };

    Trajectory {
        topic: topic.to_string(),
        mastery: classify_mastery(rolling_average),
        growth_rate,
        plateau_detected,
        trend,
        rolling_average,
    }
}

/// Trajectories for every topic seen across the given history, topic-sorted.
pub fn build_for_history(sessions: &[CompletedSession]) -> Vec<Trajectory> {
    topic_score_history(sessions)
        .iter()
        .map(|(topic, scores)| build_topic_trajectory(topic, scores))
        .collect()
}

/// Mastery thresholds on the rolling average.
pub fn classify_mastery(rolling_average: f64) -> MasteryLevel {
    if rolling_average >= 8.5 {
        MasteryLevel::Expert
    } else if rolling_average >= 7.0 {
        MasteryLevel::Advanced
    } else if rolling_average >= 5.5 {
        MasteryLevel::Intermediate
    } else if rolling_average >= 4.0 {
        MasteryLevel::Beginner
    } else {
        MasteryLevel::Novice
    }
}

/// Cross-session averages, learning velocity, and consistency.
/// Empty history yields zeroed stats.
pub fn cross_session_stats(sessions: &[CompletedSession]) -> CrossSessionStats {
    if sessions.is_empty() {
        return CrossSessionStats::default();
    }

    let mut all = Vec::new();
    let mut theoretical = Vec::new();
    let mut coding = Vec::new();
    for session in sessions {
        for answer in &session.answers {
            let score = answer.evaluation.overall_score();
            all.push(score);
            if answer.is_coding {
                coding.push(score);
            } else {
                theoretical.push(score);
            }
        }
    }

    let session_avgs: Vec<f64> = sessions.iter().map(|s| s.average_score()).collect();
    let learning_velocity = if session_avgs.len() >= 2 {
        (session_avgs[session_avgs.len() - 1] - session_avgs[0]) / (session_avgs.len() - 1) as f64
    } else {
        0.0
    };
    let consistency = (10.0 - population_std_dev(&session_avgs)).max(0.0);

    CrossSessionStats {
        overall_avg: mean(&all),
        theoretical_avg: mean(&theoretical),
        coding_avg: mean(&coding),
        learning_velocity,
        consistency,
    }
}

/// Per-difficulty attempt counts and score spread, joining answers to their
/// questions by question text — the only reliable join key at this layer.
pub fn difficulty_breakdown(
    sessions: &[CompletedSession],
) -> BTreeMap<Difficulty, DifficultyStats> {
    let mut buckets: BTreeMap<Difficulty, Vec<f64>> = BTreeMap::new();
    for session in sessions {
        for answer in &session.answers {
            let difficulty = session
                .questions
                .iter()
                .find(|q| q.text == answer.question_text)
                .map(|q| q.difficulty);
            if let Some(difficulty) = difficulty {
                buckets
                    .entry(difficulty)
                    .or_default()
                    .push(answer.evaluation.overall_score());
            }
        }
    }

    buckets
        .into_iter()
        .map(|(difficulty, scores)| {
            let stats = DifficultyStats {
                attempted: scores.len() as u32,
                avg: mean(&scores),
                min: scores.iter().cloned().fold(f64::MAX, f64::min),
                max: scores.iter().cloned().fold(f64::MIN, f64::max),
            };
            (difficulty, stats)
        })
        .collect()
}

/// Mean of the last `window` observations, or all of them if fewer.
fn rolling_mean(scores: &[f64], window: usize) -> f64 {
    let start = scores.len().saturating_sub(window);
    mean(&scores[start..])
}

/// Ordinary-least-squares slope of score against sequential index over the
/// full history. Histories shorter than two points have no slope.
fn ols_slope(scores: &[f64]) -> f64 {
    let n = scores.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(scores);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in scores.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }
    numerator / denominator
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::{
        Answer, EvaluationResult, Question, SessionState, SkillPerformanceEntry,
    };
    use chrono::Utc;

    fn session_with_topics(topic_scores: &[(&str, f64)]) -> CompletedSession {
        let mut state = SessionState::new();
        for (topic, score) in topic_scores {
            state.skill_map.insert(
                topic.to_string(),
                SkillPerformanceEntry {
                    topic: topic.to_string(),
                    last_score: *score,
                    attempts: vec![Utc::now()],
                },
            );
        }
        CompletedSession::from_state(state, Utc::now())
    }

    fn session_with_answers(scores: &[(f64, bool, Difficulty)]) -> CompletedSession {
        let mut state = SessionState::new();
        for (i, (score, coding, difficulty)) in scores.iter().enumerate() {
            let text = format!("q{i}");
            state.questions.push(Question {
                text: text.clone(),
                difficulty: *difficulty,
                topic: "general".to_string(),
                domain: "backend".to_string(),
                time_limit_secs: 300,
                is_coding: *coding,
                test_cases: None,
            });
            let evaluation = if *coding {
                EvaluationResult::Coding {
                    logic_score: *score,
                    readability_score: *score,
                    edge_case_handling: "partial".to_string(),
                    time_complexity: "O(n)".to_string(),
                    space_complexity: "O(1)".to_string(),
                    improvement_suggestions: vec![],
                }
            } else {
                EvaluationResult::Theoretical {
                    score: *score,
                    technical_accuracy: *score,
                    clarity: *score,
                    depth: *score,
                    strengths: vec![],
                    weaknesses: vec![],
                    improvements: vec![],
                }
            };
            state.answers.push(Answer {
                question_text: text,
                response: "r".to_string(),
                is_coding: *coding,
                language: None,
                evaluation,
                submitted_at: Utc::now(),
                telemetry: None,
            });
        }
        CompletedSession::from_state(state, Utc::now())
    }

    #[test]
    fn test_history_joins_snapshots_in_session_order() {
        let sessions = vec![
            session_with_topics(&[("sql", 4.0)]),
            session_with_topics(&[("sql", 6.0), ("rust", 7.0)]),
            session_with_topics(&[("sql", 8.0)]),
        ];
        let history = topic_score_history(&sessions);
        assert_eq!(history["sql"], vec![4.0, 6.0, 8.0]);
        assert_eq!(history["rust"], vec![7.0]);
    }

    #[test]
    fn test_history_topic_join_is_case_sensitive() {
        let sessions = vec![
            session_with_topics(&[("SQL", 4.0)]),
            session_with_topics(&[("sql", 6.0)]),
        ];
        let history = topic_score_history(&sessions);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_plateau_detected_on_flat_recent_scores() {
        let trajectory = build_topic_trajectory("sql", &[6.0, 6.2, 5.9]);
        assert!(trajectory.plateau_detected);
        assert_eq!(trajectory.trend, Trend::Stable);
    }

    #[test]
    fn test_upward_trend_is_not_a_plateau() {
        let trajectory = build_topic_trajectory("sql", &[3.0, 5.0, 7.0]);
        assert!(!trajectory.plateau_detected);
        assert_eq!(trajectory.trend, Trend::Upward);
        assert!((trajectory.growth_rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_plateau_needs_three_points() {
        let trajectory = build_topic_trajectory("sql", &[6.0, 6.1]);
        assert!(!trajectory.plateau_detected);
    }

    #[test]
    fn test_declining_trend() {
        let trajectory = build_topic_trajectory("sql", &[8.0, 6.0, 4.0]);
        assert_eq!(trajectory.trend, Trend::Declining);
    }

    #[test]
    fn test_rolling_average_uses_last_five() {
        let trajectory = build_topic_trajectory("sql", &[1.0, 1.0, 8.0, 8.0, 8.0, 8.0, 8.0]);
        assert!((trajectory.rolling_average - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_mastery_thresholds() {
        assert_eq!(classify_mastery(9.0), MasteryLevel::Expert);
        assert_eq!(classify_mastery(8.5), MasteryLevel::Expert);
        assert_eq!(classify_mastery(7.0), MasteryLevel::Advanced);
        assert_eq!(classify_mastery(5.5), MasteryLevel::Intermediate);
        assert_eq!(classify_mastery(4.0), MasteryLevel::Beginner);
        assert_eq!(classify_mastery(3.9), MasteryLevel::Novice);
    }

    #[test]
    fn test_single_point_history_has_zero_slope() {
        let trajectory = build_topic_trajectory("sql", &[7.0]);
        assert_eq!(trajectory.growth_rate, 0.0);
        assert_eq!(trajectory.trend, Trend::Stable);
    }

    #[test]
    fn test_build_for_history_covers_all_topics() {
        let sessions = vec![session_with_topics(&[("sql", 4.0), ("rust", 9.0)])];
        let trajectories = build_for_history(&sessions);
        assert_eq!(trajectories.len(), 2);
        // BTreeMap ordering: rust before sql
        assert_eq!(trajectories[0].topic, "rust");
    }

    #[test]
    fn test_cross_session_stats_empty_history() {
        let stats = cross_session_stats(&[]);
        assert_eq!(stats.overall_avg, 0.0);
        assert_eq!(stats.learning_velocity, 0.0);
        assert_eq!(stats.consistency, 0.0);
    }

    #[test]
    fn test_learning_velocity_spans_first_to_last() {
        let sessions = vec![
            session_with_answers(&[(4.0, false, Difficulty::Medium)]),
            session_with_answers(&[(6.0, false, Difficulty::Medium)]),
            session_with_answers(&[(8.0, false, Difficulty::Medium)]),
        ];
        let stats = cross_session_stats(&sessions);
        // (8 − 4) / 2
        assert!((stats.learning_velocity - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_is_ten_for_identical_sessions() {
        let sessions = vec![
            session_with_answers(&[(6.0, false, Difficulty::Medium)]),
            session_with_answers(&[(6.0, false, Difficulty::Medium)]),
        ];
        let stats = cross_session_stats(&sessions);
        assert!((stats.consistency - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_never_negative() {
        // Averages 0 and 10 → σ = 5 → consistency 5; extreme spread still ≥ 0.
        let sessions = vec![
            session_with_answers(&[(0.0, false, Difficulty::Medium)]),
            session_with_answers(&[(10.0, false, Difficulty::Medium)]),
        ];
        let stats = cross_session_stats(&sessions);
        assert!(stats.consistency >= 0.0);
    }

    #[test]
    fn test_difficulty_breakdown_spread() {
        let sessions = vec![session_with_answers(&[
            (4.0, false, Difficulty::Easy),
            (8.0, false, Difficulty::Easy),
            (6.0, false, Difficulty::Hard),
        ])];
        let breakdown = difficulty_breakdown(&sessions);
        let easy = &breakdown[&Difficulty::Easy];
        assert_eq!(easy.attempted, 2);
        assert!((easy.avg - 6.0).abs() < 1e-9);
        assert_eq!(easy.min, 4.0);
        assert_eq!(easy.max, 8.0);
        assert_eq!(breakdown[&Difficulty::Hard].attempted, 1);
        assert!(!breakdown.contains_key(&Difficulty::Medium));
    }
}
