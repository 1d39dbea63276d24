//! # Plan Parser
//!
//! Converts freeform plan text into an ordered list of planning steps.
//! Parsing is pure and total: any input, including empty or garbage text,
//! yields a non-empty step list.

use crate::progress::PlanningStep;

/// Parse freeform plan text into planning steps.
///
/// Recognized structure is `STEP <n>: <name>` lines, each closed by an
/// `ACTION: <tag>` line whose remainder becomes the step's normalized
/// (lower-cased, trimmed) action tag. A step still open at end of input is
/// appended with action "unknown".
///
/// Empty input yields the fixed [`default_plan`]; non-empty input with no
/// recognizable STEP lines yields a single search step.
pub fn parse_plan(plan_text: &str) -> Vec<PlanningStep> {
    if plan_text.trim().is_empty() {
        return default_plan();
    }

    let mut steps: Vec<PlanningStep> = Vec::new();
    let mut current: Option<PlanningStep> = None;
    let mut step_id = 0u32;

    for line in plan_text.lines() {
        let line = line.trim();
        if line.starts_with("STEP") {
            step_id += 1;
            let name = match line.split_once(':') {
                Some((_, rest)) if !rest.trim().is_empty() => rest.trim().to_string(),
                _ => format!("Step {step_id}"),
            };
            // an unclosed previous step is replaced, keeping its consumed id
            current = Some(PlanningStep::new(step_id.to_string(), name, "unknown"));
        } else if let Some(rest) = line.strip_prefix("ACTION:") {
            if let Some(mut step) = current.take() {
                step.action = rest.trim().to_lowercase();
                steps.push(step);
            }
        }
    }

    // Handle any remaining step
    if let Some(step) = current {
        steps.push(step);
    }

    if steps.is_empty() {
        return vec![PlanningStep::new("1", "Analyze query", "search")];
    }
    steps
}

/// The fixed fallback plan used when no plan can be derived
pub fn default_plan() -> Vec<PlanningStep> {
    vec![
        PlanningStep::new("1", "Build PICO query", "pico_query"),
        PlanningStep::new("2", "Search PubMed", "pubmed_search"),
        PlanningStep::new("3", "Classify evidence", "evidence_classification"),
        PlanningStep::new("4", "Synthesize findings", "synthesis"),
    ]
}
