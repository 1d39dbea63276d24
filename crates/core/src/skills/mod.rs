//! # Medresearch Skills
//!
//! Step handlers for the research pipeline. Each skill services one action
//! tag and degrades gracefully: a specialized capability is attempted first,
//! then a generic generation fallback, so every step produces some content
//! even when an optional capability is absent or errors.
//!
//! ## Skill Catalog
//!
//! - `PicoSkill` - Structure a question with the PICO framework
//! - `MeshSkill` - Map common terms to MeSH vocabulary (pure lookup)
//! - `PubmedSkill` - Search the literature via a `SearchProvider`
//! - `EvidenceSkill` - Place findings on the evidence hierarchy
//! - `SynthesisSkill` - Synthesize accumulated findings
//! - `citation_skill` - Vancouver-style citation formatting

pub mod prompts;

pub mod citation_skill;
pub mod evidence_skill;
pub mod mesh_skill;
pub mod pico_skill;
pub mod pubmed_skill;
pub mod synthesis_skill;

use std::collections::HashMap;

use crate::models::SearchRecord;

// Re-exports for convenience
pub use citation_skill::format_citation;
pub use evidence_skill::EvidenceSkill;
pub use mesh_skill::MeshSkill;
pub use pico_skill::PicoSkill;
pub use pubmed_skill::PubmedSkill;
pub use synthesis_skill::SynthesisSkill;

/// Result of servicing one planning step
#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    /// Textual content the step contributes to the accumulated context
    pub content: String,
    /// Literature records backing the content
    pub sources: Vec<SearchRecord>,
    /// Evidence level -> detected marker, when classification ran
    pub evidence_levels: HashMap<String, String>,
}

impl StepOutcome {
    /// Outcome carrying only text
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}
