//! # Medresearch Core
//!
//! The "Brain" of the Medical Deep Research system - contains the research
//! pipeline, hierarchical progress tracking, and evidence-based medicine skills.
//!
//! ## Architecture
//!
//! - `skills/` - Research step handlers (PicoSkill, MeshSkill, PubmedSkill, etc.)
//! - `models` - Capability seams (LanguageModel, SearchProvider) and LLM configuration
//! - `progress/` - Hierarchical progress state and the tracker that emits snapshots
//! - `pipeline/` - Plan parsing, step orchestration, and report formatting
//! - `tools/` - HTTP clients backing the capability seams (chat completions, PubMed)
//! - `vocab` - MeSH term mappings and evidence level markers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medresearch_core::pipeline::Coordinator;
//!
//! let mut coordinator = Coordinator::new("research-1", llm, Some(search));
//! let report = coordinator.run("Do SGLT2 inhibitors reduce heart failure?").await?;
//! ```

pub mod models;
pub mod pipeline;
pub mod progress;
pub mod skills;
pub mod tools;
pub mod vocab;
