//! # Research Pipeline
//!
//! Orchestrates the research flow for Medical Deep Research.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Query → Plan Parser → Step Orchestrator → Synthesis → Report Formatter
//!                ╲            │
//!                 ╲       ProgressTracker ──► observer snapshots
//! ```

pub mod coordinator;
pub mod plan;
pub mod report;

pub use coordinator::{Action, Coordinator, Finding};
pub use plan::{default_plan, parse_plan};
pub use report::{format_report, ResearchReport};
