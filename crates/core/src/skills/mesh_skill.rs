//! # MeSH Skill
//!
//! Maps common medical terms to their official MeSH (Medical Subject
//! Headings) vocabulary equivalents for precise PubMed searches. Pure table
//! lookup; never fails.

use crate::skills::StepOutcome;
use crate::vocab::MESH_TERM_MAPPINGS;

const STOPWORDS: &[&str] = &["with", "from", "that", "this", "have"];

/// MeSH term mapper
pub struct MeshSkill;

impl MeshSkill {
    /// Map the terms in the input to MeSH vocabulary
    pub fn run(terms: &str) -> StepOutcome {
        tracing::info!("mapping terms to MeSH vocabulary");
        StepOutcome::text(map_terms(terms))
    }
}

fn map_terms(terms: &str) -> String {
    let terms_lower = terms.to_lowercase();

    // Substring match catches multi-word headings like "type 2 diabetes"
    let mapped: Vec<String> = MESH_TERM_MAPPINGS
        .iter()
        .filter(|(common, _)| terms_lower.contains(common))
        .map(|(common, mesh)| format!("{common} -> {mesh}[MeSH]"))
        .collect();

    // Significant words with no mapping go to a Title/Abstract search hint
    let unmapped: Vec<&str> = terms_lower
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| t.len() > 3 && !STOPWORDS.contains(t))
        .filter(|t| !mapped.iter().any(|m| m.to_lowercase().contains(t)))
        .collect();

    let mut result = String::from("MeSH Term Mappings:\n");
    if mapped.is_empty() {
        result.push_str("  No direct mappings found.");
    } else {
        result.push_str(
            &mapped
                .iter()
                .map(|m| format!("  - {m}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    if !unmapped.is_empty() {
        result.push_str("\n\nTerms without direct mapping (search in Title/Abstract):\n");
        result.push_str(&unmapped.join(", "));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_known_terms() {
        let outcome = MeshSkill::run("heart attack outcomes after stroke");
        assert!(outcome
            .content
            .contains("heart attack -> Myocardial Infarction[MeSH]"));
        assert!(outcome.content.contains("stroke -> Stroke[MeSH]"));
    }

    #[test]
    fn test_multiword_terms_matched_by_substring() {
        let outcome = MeshSkill::run("patients with type 2 diabetes");
        assert!(outcome
            .content
            .contains("type 2 diabetes -> Diabetes Mellitus, Type 2[MeSH]"));
        // the shorter key also matches inside the longer phrase
        assert!(outcome.content.contains("diabetes -> Diabetes Mellitus[MeSH]"));
    }

    #[test]
    fn test_no_mappings_found() {
        let outcome = MeshSkill::run("zzz qqq");
        assert!(outcome.content.contains("No direct mappings found."));
    }

    #[test]
    fn test_unmapped_terms_listed() {
        let outcome = MeshSkill::run("rivaroxaban for stroke");
        assert!(outcome.content.contains("Terms without direct mapping"));
        assert!(outcome.content.contains("rivaroxaban"));
    }
}
