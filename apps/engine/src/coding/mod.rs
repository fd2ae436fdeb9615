//! Coding Evaluation Normalizer — collapses heterogeneous coding-feedback
//! sub-scores and free-text assessments into a single 0–10 scalar and a
//! qualitative complexity rating, plus cross-submission aggregation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::interview::{Answer, EvaluationResult};

const LOGIC_WEIGHT: f64 = 0.5;
const READABILITY_WEIGHT: f64 = 0.3;
const EDGE_CASE_WEIGHT: f64 = 0.2;

/// Keyword table for qualitative edge-case descriptions, highest tier first.
/// The first tier with a matching keyword wins.
const EDGE_CASE_TIERS: &[(&[&str], f64)] = &[
    (&["comprehensive", "excellent"], 9.0),
    (&["good", "handles major"], 7.0),
    (&["partial", "some"], 5.0),
    (&["minimal", "few"], 3.0),
    (&["none", "missing"], 1.0),
];

/// Maps a free-text edge-case assessment to a 0–10 score via keyword
/// matching. Unrecognized or absent text defaults to 5 (neutral).
pub fn score_edge_case_handling(text: Option<&str>) -> f64 {
    let text = match text {
        Some(t) => t.to_lowercase(),
        None => return 5.0,
    };
    for (keywords, score) in EDGE_CASE_TIERS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return *score;
        }
    }
    5.0
}

/// Overall coding score: 0.5×logic + 0.3×readability + 0.2×edge-case score.
pub fn calculate_overall_coding_score(
    logic_score: f64,
    readability_score: f64,
    edge_case_text: Option<&str>,
) -> f64 {
    LOGIC_WEIGHT * logic_score
        + READABILITY_WEIGHT * readability_score
        + EDGE_CASE_WEIGHT * score_edge_case_handling(edge_case_text)
}

/// Big-O bucket for a parsed complexity expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityBand {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    ExponentialOrFactorial,
    /// Expression could not be parsed — explicit verdict, never a guess.
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityRating {
    pub band: ComplexityBand,
    pub feedback: String,
}

/// Parses a free-text Big-O expression and buckets it. Matching runs from
/// the most specific pattern down, so `n log n` is caught before `log n`
/// and `log n` before plain `n`.
pub fn rate_complexity(text: &str) -> ComplexityRating {
    let normalized: String = text
        .to_lowercase()
        .replace('²', "^2")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let (band, feedback) = if normalized.contains("n!") || normalized.contains("factorial") {
        (
            ComplexityBand::ExponentialOrFactorial,
            "Factorial time — only viable for very small inputs.",
        )
    } else if normalized.contains("2^n")
        || normalized.contains("^n")
        || normalized.contains("exponential")
    {
        (
            ComplexityBand::ExponentialOrFactorial,
            "Exponential time — look for a polynomial approach.",
        )
    } else if normalized.contains("n^2")
        || normalized.contains("n*n")
        || normalized.contains("quadratic")
    {
        (
            ComplexityBand::Quadratic,
            "Quadratic time — acceptable for small inputs, consider reducing nested iteration.",
        )
    } else if normalized.contains("nlogn") || normalized.contains("linearithmic") {
        (
            ComplexityBand::Linearithmic,
            "Linearithmic time — typical of efficient sort-based solutions.",
        )
    } else if normalized.contains("log") {
        (
            ComplexityBand::Logarithmic,
            "Logarithmic time — excellent scalability.",
        )
    } else if normalized.contains("o(n)") || normalized.contains("linear") {
        (
            ComplexityBand::Linear,
            "Linear time — solid for single-pass problems.",
        )
    } else if normalized.contains("o(1)") || normalized.contains("constant") {
        (
            ComplexityBand::Constant,
            "Constant time — optimal.",
        )
    } else {
        (
            ComplexityBand::Unknown,
            "Could not determine complexity from the assessment.",
        )
    };

    ComplexityRating {
        band,
        feedback: feedback.to_string(),
    }
}

/// Per-language attempt statistics across many submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageStats {
    pub attempts: u32,
    pub average_score: f64,
}

/// Cross-submission view of coding performance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodingAggregate {
    pub by_language: BTreeMap<String, LanguageStats>,
    /// Most frequent improvement suggestions, (text, count), top 5.
    pub recurring_improvements: Vec<(String, u32)>,
}

/// Aggregates coding answers: per-language counts and averages, plus the
/// top-5 recurring improvement suggestions by frequency.
pub fn aggregate_submissions(answers: &[Answer]) -> CodingAggregate {
    let mut sums: BTreeMap<String, (u32, f64)> = BTreeMap::new();
    let mut suggestion_counts: HashMap<&str, u32> = HashMap::new();

    for answer in answers {
        let suggestions = match &answer.evaluation {
            EvaluationResult::Coding {
                improvement_suggestions,
                ..
            } => improvement_suggestions,
            EvaluationResult::Theoretical { .. } => continue,
        };

        let language = answer.language.as_deref().unwrap_or("unknown").to_string();
        let entry = sums.entry(language).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += answer.evaluation.overall_score();

        for suggestion in suggestions {
            *suggestion_counts.entry(suggestion.as_str()).or_insert(0) += 1;
        }
    }

    let by_language = sums
        .into_iter()
        .map(|(lang, (attempts, total))| {
            (
                lang,
                LanguageStats {
                    attempts,
                    average_score: total / attempts as f64,
                },
            )
        })
        .collect();

    let mut ranked: Vec<(String, u32)> = suggestion_counts
        .into_iter()
        .map(|(s, n)| (s.to_string(), n))
        .collect();
    // Frequency descending, lexicographic on ties for determinism.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(5);

    CodingAggregate {
        by_language,
        recurring_improvements: ranked,
    }
}
