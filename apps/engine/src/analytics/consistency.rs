//! Resume Consistency Analyzer — cross-references claimed resume skills
//! against demonstrated per-topic interview averages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Recommendation, Severity};
use crate::analytics::trajectory::topic_score_history;
use crate::models::interview::CompletedSession;
use crate::models::resume::ResumeProfile;

const INFLATED_BELOW: f64 = 5.0;
const VERIFIED_AT: f64 = 7.5;
const LOW_CONSISTENCY_BELOW: u32 = 50;

const INFLATED_PENALTY: i64 = 15;
const WEAK_PENALTY: i64 = 8;
const VERIFIED_BONUS: i64 = 10;
const HIDDEN_BONUS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    Untested,
    Inflated,
    WeakArea,
    VerifiedStrength,
}

/// One row of the per-skill comparison table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillComparison {
    pub skill: String,
    pub matched_topic: Option<String>,
    pub average_score: Option<f64>,
    pub status: SkillStatus,
}

/// Derived resume-vs-performance report. Score is clamped to [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub score: u32,
    pub inflated: Vec<String>,
    pub weak_areas: Vec<String>,
    pub verified: Vec<String>,
    pub hidden_strengths: Vec<String>,
    pub untested: Vec<String>,
    pub comparisons: Vec<SkillComparison>,
}

/// Case-insensitive exact-or-substring match between a claimed skill and a
/// tested topic.
fn skill_matches_topic(skill: &str, topic: &str) -> bool {
    let skill = skill.to_lowercase();
    let topic = topic.to_lowercase();
    skill == topic || topic.contains(&skill) || skill.contains(&topic)
}

/// Analyzes the resume's claimed skills against cross-session topic
/// averages. Empty history marks every claim untested and leaves the score
/// at the neutral baseline.
pub fn analyze_consistency(
    resume: &ResumeProfile,
    sessions: &[CompletedSession],
) -> ConsistencyReport {
    let topic_averages: Vec<(String, f64)> = topic_score_history(sessions)
        .into_iter()
        .map(|(topic, scores)| {
            let avg = scores.iter().sum::<f64>() / scores.len() as f64;
            (topic, avg)
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut comparisons = Vec::new();
    let mut inflated = Vec::new();
    let mut weak_areas = Vec::new();
    let mut verified = Vec::new();
    let mut untested = Vec::new();

    for skill in resume.claimed_skills() {
        if !seen.insert(skill.to_lowercase()) {
            continue; // skills and technologies often overlap
        }

        let matched = topic_averages
            .iter()
            .find(|(topic, _)| skill_matches_topic(skill, topic));

        let (matched_topic, average_score, status) = match matched {
            None => (None, None, SkillStatus::Untested),
            Some((topic, avg)) => {
                let status = if *avg < INFLATED_BELOW {
                    SkillStatus::Inflated
                } else if *avg < VERIFIED_AT {
                    SkillStatus::WeakArea
                } else {
                    SkillStatus::VerifiedStrength
                };
                (Some(topic.clone()), Some(*avg), status)
            }
        };

        match status {
            SkillStatus::Untested => untested.push(skill.to_string()),
            SkillStatus::Inflated => inflated.push(skill.to_string()),
            SkillStatus::WeakArea => weak_areas.push(skill.to_string()),
            SkillStatus::VerifiedStrength => verified.push(skill.to_string()),
        }

        comparisons.push(SkillComparison {
            skill: skill.to_string(),
            matched_topic,
            average_score,
            status,
        });
    }

    // Strong topics the resume never mentioned.
    let hidden_strengths: Vec<String> = topic_averages
        .iter()
        .filter(|(_, avg)| *avg >= VERIFIED_AT)
        .filter(|(topic, _)| {
            !resume
                .claimed_skills()
                .any(|skill| skill_matches_topic(skill, topic))
        })
        .map(|(topic, _)| topic.clone())
        .collect();

    let raw_score = 100_i64 - INFLATED_PENALTY * inflated.len() as i64
        - WEAK_PENALTY * weak_areas.len() as i64
        + VERIFIED_BONUS * verified.len() as i64
        + HIDDEN_BONUS * hidden_strengths.len() as i64;

    ConsistencyReport {
        score: raw_score.clamp(0, 100) as u32,
        inflated,
        weak_areas,
        verified,
        hidden_strengths,
        untested,
        comparisons,
    }
}

/// Severity-tagged follow-ups for a consistency report.
pub fn generate_recommendations(report: &ConsistencyReport) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for skill in &report.inflated {
        recommendations.push(Recommendation::new(
            Severity::Critical,
            format!(
                "Resume claims '{skill}' but interview performance averages below 5/10 — \
                 revise the claim or invest targeted practice."
            ),
        ));
    }

    if report.score < LOW_CONSISTENCY_BELOW {
        recommendations.push(Recommendation::new(
            Severity::Critical,
            format!(
                "Overall resume consistency is low ({}/100); interviewers are likely to \
                 probe claimed skills that did not hold up.",
                report.score
            ),
        ));
    }

    for skill in &report.weak_areas {
        recommendations.push(Recommendation::new(
            Severity::Warning,
            format!("'{skill}' is claimed but scores in the 5–7.5 band; shore it up before relying on it."),
        ));
    }

    for topic in &report.hidden_strengths {
        recommendations.push(Recommendation::new(
            Severity::Suggestion,
            format!("'{topic}' scores 7.5+ but is missing from the resume — consider adding it."),
        ));
    }

    recommendations
}
