//! Output shape of the external resume-skill extractor. The extraction
//! pipeline itself (upload, text extraction) lives outside this core.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeProfile {
    pub skills: Vec<String>,
    pub technologies: Vec<String>,
    pub experience_years: f64,
    pub education: Vec<String>,
    pub primary_domain: String,
}

impl ResumeProfile {
    /// All claimed skills: explicit skills plus listed technologies.
    pub fn claimed_skills(&self) -> impl Iterator<Item = &str> {
        self.skills
            .iter()
            .chain(self.technologies.iter())
            .map(String::as_str)
    }
}
