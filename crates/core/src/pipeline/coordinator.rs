//! # Pipeline Coordinator
//!
//! Drives one research session end to end: plan → execute → synthesize →
//! format. Steps run strictly sequentially because later steps depend on
//! the textual context accumulated by earlier ones. A single step's failure
//! is recorded and the pipeline moves on; a synthesis or formatting failure
//! is fatal and surfaces a final error snapshot before returning.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{LanguageModel, SearchProvider, SearchRecord};
use crate::progress::{
    Phase, PlanningStep, ProgressObserver, ProgressTracker, StepStatus, ToolStatus,
};
use crate::skills::{
    prompts, EvidenceSkill, MeshSkill, PicoSkill, PubmedSkill, StepOutcome, SynthesisSkill,
};

use super::plan;
use super::report::{self, ResearchReport};

/// The handler a step's action tag resolves to.
///
/// The alias table is the complete action vocabulary; anything else routes
/// to the search handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PicoQuery,
    MeshMapping,
    PubmedSearch,
    EvidenceClassification,
    Synthesis,
}

impl Action {
    /// Resolve a normalized action tag, defaulting unknown tags to search
    pub fn resolve(tag: &str) -> Action {
        match tag {
            "pico_query" | "pico" => Action::PicoQuery,
            "mesh_mapping" | "mesh" => Action::MeshMapping,
            "pubmed_search" | "search" | "pubmed" => Action::PubmedSearch,
            "evidence_classification" | "evidence" | "classify" => Action::EvidenceClassification,
            "synthesis" | "synthesize" => Action::Synthesis,
            _ => Action::PubmedSearch,
        }
    }
}

/// The recorded output of one executed step
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub step_id: String,
    pub step_name: String,
    pub action: String,
    pub content: String,
    pub sources: Vec<SearchRecord>,
    pub evidence_levels: HashMap<String, String>,
    pub error: Option<String>,
}

/// The pipeline coordinator for one research session
pub struct Coordinator {
    llm: Arc<dyn LanguageModel>,
    search: Option<Arc<dyn SearchProvider>>,
    tracker: ProgressTracker,
    all_sources: Vec<SearchRecord>,
}

impl Coordinator {
    /// Create a coordinator owning a fresh tracker for the session
    pub fn new(
        research_id: impl Into<String>,
        llm: Arc<dyn LanguageModel>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        Self {
            llm,
            search,
            tracker: ProgressTracker::new(research_id),
            all_sources: Vec::new(),
        }
    }

    /// Register the observer that receives every progress snapshot
    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.tracker.set_observer(observer);
        self
    }

    /// Read access to the session's tracker
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Run the full pipeline for a query.
    ///
    /// Partial results stay visible through the emitted snapshots even when
    /// a later stage fails.
    #[tracing::instrument(skip(self), fields(query_preview = %query.chars().take(50).collect::<String>()))]
    pub async fn run(&mut self, query: &str) -> Result<ResearchReport> {
        match self.run_pipeline(query).await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.tracker
                    .update_phase(Phase::Error, &format!("Research failed: {e}"), None);
                Err(e)
            }
        }
    }

    async fn run_pipeline(&mut self, query: &str) -> Result<ResearchReport> {
        self.tracker
            .update_progress(5, Some("Initializing deep research pipeline"));

        // Phase 1: Planning
        self.tracker
            .update_phase(Phase::Planning, "Creating research plan", Some(10));
        let steps = self.create_plan(query).await;

        // Phase 2: Execute plan
        self.tracker
            .update_phase(Phase::Execution, "Executing research plan", Some(20));
        let findings = self.execute_plan(query, &steps).await;

        // Phase 3: Synthesize
        self.tracker
            .update_phase(Phase::Synthesis, "Synthesizing findings", Some(80));
        let synthesis = self
            .synthesize(query, &findings)
            .await
            .context("synthesis failed")?;

        // Phase 4: Format output
        self.tracker
            .update_phase(Phase::Formatting, "Formatting results", Some(95));
        let formatted = report::format_report(query, &findings, &synthesis, &self.all_sources);

        self.tracker
            .update_phase(Phase::Complete, "Research completed successfully", Some(100));

        Ok(ResearchReport {
            query: query.to_string(),
            findings,
            formatted,
            synthesis,
            sources: self.all_sources.clone(),
        })
    }

    /// Ask the model for a plan and register the parsed steps.
    ///
    /// A generation failure is recovered locally with the default plan and
    /// never surfaces to the caller.
    async fn create_plan(&mut self, query: &str) -> Vec<PlanningStep> {
        let steps = match self
            .llm
            .generate_with_system(prompts::MEDICAL_RESEARCHER, &prompts::planning_prompt(query))
            .await
        {
            Ok(plan_text) => plan::parse_plan(&plan_text),
            Err(e) => {
                tracing::warn!("plan generation failed: {e:#}, using default plan");
                plan::default_plan()
            }
        };

        for step in &steps {
            self.tracker.add_planning_step(step.clone());
        }

        tracing::info!(steps = steps.len(), "created research plan");
        steps
    }

    /// Execute the plan step by step, isolating per-step failures
    async fn execute_plan(&mut self, query: &str, steps: &[PlanningStep]) -> Vec<Finding> {
        let mut findings = Vec::with_capacity(steps.len());
        let mut context = format!("Original Query: {query}\n\n");
        let total = steps.len();

        for (i, step) in steps.iter().enumerate() {
            // execution occupies the 20-80% band of the pipeline
            let step_progress = 20 + (i * 60 / total) as i32;

            self.tracker
                .update_step_status(&step.id, StepStatus::InProgress, None, None);
            self.tracker
                .update_progress(step_progress, Some(&format!("Executing: {}", step.name)));

            match self.execute_step(step, query, &context).await {
                Ok(outcome) => {
                    context.push_str(&format!("\n## {}\n{}\n", step.name, outcome.content));
                    self.all_sources.extend(outcome.sources.iter().cloned());

                    findings.push(Finding {
                        step_id: step.id.clone(),
                        step_name: step.name.clone(),
                        action: step.action.clone(),
                        content: outcome.content,
                        sources: outcome.sources,
                        evidence_levels: outcome.evidence_levels,
                        error: None,
                    });
                    self.tracker
                        .update_step_status(&step.id, StepStatus::Completed, None, None);
                }
                Err(e) => {
                    tracing::error!(step = %step.name, "step execution failed: {e:#}");
                    self.tracker.update_step_status(
                        &step.id,
                        StepStatus::Failed,
                        None,
                        Some(&e.to_string()),
                    );
                    findings.push(Finding {
                        step_id: step.id.clone(),
                        step_name: step.name.clone(),
                        action: step.action.clone(),
                        content: format!("Error: {e}"),
                        sources: Vec::new(),
                        evidence_levels: HashMap::new(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        findings
    }

    /// Dispatch one step to its handler with tool-execution tracking
    async fn execute_step(
        &mut self,
        step: &PlanningStep,
        query: &str,
        context: &str,
    ) -> Result<StepOutcome> {
        let action = Action::resolve(&step.action);
        let exec_id = self.tracker.add_tool_execution(&step.action, query);

        let llm = Arc::clone(&self.llm);
        let search = self.search.clone();

        let result = match action {
            Action::PicoQuery => PicoSkill::run(llm.as_ref(), query).await,
            Action::MeshMapping => Ok(MeshSkill::run(query)),
            Action::PubmedSearch => PubmedSkill::run(search.as_deref(), query).await,
            // evidence classification works on accumulated context alone
            Action::EvidenceClassification => EvidenceSkill::run(llm.as_ref(), context).await,
            Action::Synthesis => SynthesisSkill::run(llm.as_ref(), query, context).await,
        };

        match result {
            Ok(outcome) => {
                self.tracker.update_tool_execution(
                    exec_id,
                    ToolStatus::Completed,
                    Some(&outcome.content),
                    None,
                );
                Ok(outcome)
            }
            Err(e) => {
                self.tracker.update_tool_execution(
                    exec_id,
                    ToolStatus::Failed,
                    None,
                    Some(&e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// Create the final synthesis from all findings
    async fn synthesize(&mut self, query: &str, findings: &[Finding]) -> Result<String> {
        let combined: Vec<String> = findings
            .iter()
            .filter(|f| !f.content.is_empty())
            .map(|f| format!("## {}\n{}", f.step_name, f.content))
            .collect();

        let outcome = SynthesisSkill::run(self.llm.as_ref(), query, &combined.join("\n\n")).await?;
        Ok(outcome.content)
    }
}
