//! # Evidence Skill
//!
//! Classifies the evidence level of studies mentioned in the accumulated
//! research context. Marker-based keyword classification runs first; when
//! no marker matches, the handler falls back to a generation call, whose
//! failure propagates to the step.

use std::collections::HashMap;

use crate::models::LanguageModel;
use crate::skills::{prompts, StepOutcome};
use crate::vocab::{level_rank, EVIDENCE_LEVEL_MARKERS};

/// Evidence level classifier
pub struct EvidenceSkill;

impl EvidenceSkill {
    /// Classify the evidence present in the accumulated context.
    ///
    /// This is the one handler invoked with context alone; the original
    /// query plays no part in classification.
    pub async fn run(llm: &dyn LanguageModel, context: &str) -> anyhow::Result<StepOutcome> {
        tracing::info!("classifying evidence level");

        let classifications = detect_markers(context);
        if classifications.is_empty() {
            let content = llm.generate(&prompts::evidence_prompt(context)).await?;
            return Ok(StepOutcome::text(content));
        }

        let mut evidence_levels = HashMap::new();
        for (level, marker) in &classifications {
            evidence_levels
                .entry(level.to_string())
                .or_insert_with(|| marker.to_string());
        }

        Ok(StepOutcome {
            content: render(&classifications),
            sources: Vec::new(),
            evidence_levels,
        })
    }
}

/// All (level, marker) pairs whose marker appears in the text, best level first
fn detect_markers(text: &str) -> Vec<(&'static str, &'static str)> {
    let text_lower = text.to_lowercase();
    let mut found: Vec<(&'static str, &'static str)> = Vec::new();

    for (level, markers) in EVIDENCE_LEVEL_MARKERS {
        for marker in *markers {
            if text_lower.contains(marker) {
                found.push((level, marker));
            }
        }
    }

    found.sort_by_key(|(level, _)| level_rank(level));
    found
}

fn render(classifications: &[(&str, &str)]) -> String {
    let (best_level, best_marker) = classifications[0];

    let mut result = format!(
        "Evidence Classification: {best_level}\n\
         Detected marker: '{best_marker}'\n\
         \n\
         Evidence Hierarchy:\n\
         \x20 Level I: Systematic reviews, meta-analyses\n\
         \x20 Level II: Randomized controlled trials\n\
         \x20 Level III: Cohort studies\n\
         \x20 Level IV: Case-control studies\n\
         \x20 Level V: Case reports, expert opinion\n"
    );

    if classifications.len() > 1 {
        let others: Vec<&str> = classifications[1..].iter().map(|(_, m)| *m).collect();
        result.push_str(&format!("\nOther markers found: {}", others.join(", ")));
    }

    result
}
