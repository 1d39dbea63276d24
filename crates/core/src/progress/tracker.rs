//! # Progress Tracker
//!
//! Single-writer owner of a session's [`ProgressState`]. Every mutation
//! refreshes the last-update timestamp and synchronously hands the full
//! snapshot to the registered observer; observer failures are logged and
//! never abort the mutation that triggered them.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;

use super::state::{
    preview, AgentState, AgentStatus, Phase, PlanningStep, ProgressState, StepStatus,
    ToolExecution, ToolStatus,
};

/// Name of the permanent root agent, created at session start
pub const MAIN_AGENT: &str = "main";

/// Query and result previews are cut at this many chars
const PREVIEW_CHARS: usize = 100;

/// Receives the full state snapshot after every tracker mutation.
///
/// Implementations must be fast and non-blocking: the tracker calls
/// `on_update` on the same call stack as the mutation.
pub trait ProgressObserver: Send + Sync {
    fn on_update(&self, snapshot: &ProgressState) -> anyhow::Result<()>;
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressState) -> anyhow::Result<()> + Send + Sync,
{
    fn on_update(&self, snapshot: &ProgressState) -> anyhow::Result<()> {
        self(snapshot)
    }
}

/// Manages hierarchical progress tracking for a deep research session.
///
/// Tracks planning steps, agent status, and tool executions, providing
/// real-time snapshots via the observer for UI display.
pub struct ProgressTracker {
    state: ProgressState,
    observer: Option<Box<dyn ProgressObserver>>,
    step_started: HashMap<String, Instant>,
    tool_started: HashMap<u64, Instant>,
    next_tool_id: u64,
}

impl ProgressTracker {
    /// Initialize the tracker for a research session and seed the main agent
    pub fn new(research_id: impl Into<String>) -> Self {
        let mut state = ProgressState::new(research_id);
        state.active_agents.push(AgentStatus::new(MAIN_AGENT));

        tracing::info!(research_id = %state.research_id, "initialized progress tracker");

        Self {
            state,
            observer: None,
            step_started: HashMap::new(),
            tool_started: HashMap::new(),
            next_tool_id: 1,
        }
    }

    /// Register the observer that receives every snapshot
    pub fn set_observer(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observer = Some(observer);
    }

    fn emit(&mut self) {
        self.state.updated_at = Utc::now();

        if let Some(observer) = &self.observer {
            if let Err(e) = observer.on_update(&self.state) {
                tracing::warn!("error in progress observer: {e:#}");
            }
        }
    }

    // === Phase Management ===

    /// Update the current phase, optionally moving overall progress.
    ///
    /// Phase transitions also drive the main agent: planning puts it in the
    /// planning state, execution/synthesis mark it running, and complete
    /// completes it.
    pub fn update_phase(&mut self, phase: Phase, message: &str, progress: Option<i32>) {
        self.state.phase = phase.clone();
        self.state.message = message.to_string();
        if let Some(p) = progress {
            self.state.overall_progress = p.clamp(0, 100);
        }

        if let Some(main) = self.main_agent_mut() {
            main.message = Some(message.to_string());
            match phase {
                Phase::Planning => main.status = AgentState::Planning,
                Phase::Execution | Phase::Synthesis => main.status = AgentState::Running,
                Phase::Complete => main.status = AgentState::Completed,
                _ => {}
            }
        }

        tracing::info!(phase = %self.state.phase, "phase updated: {message}");
        self.emit();
    }

    /// Update overall progress (clamped to 0-100)
    pub fn update_progress(&mut self, progress: i32, message: Option<&str>) {
        self.state.overall_progress = progress.clamp(0, 100);
        if let Some(m) = message {
            self.state.message = m.to_string();
        }
        self.emit();
    }

    // === Planning Step Management ===

    /// Register a planning step
    pub fn add_planning_step(&mut self, step: PlanningStep) {
        tracing::debug!(step = %step.name, "added planning step");
        self.state.planning_steps.push(step);
        self.emit();
    }

    /// Update a planning step's status by id.
    ///
    /// Moving to `in_progress` records the start time; reaching a terminal
    /// status stamps the completion time and derives the duration from the
    /// recorded start, when one exists. Unknown ids are ignored.
    pub fn update_step_status(
        &mut self,
        step_id: &str,
        status: StepStatus,
        details: Option<&str>,
        error: Option<&str>,
    ) {
        let started = &mut self.step_started;
        let Some(step) = self
            .state
            .planning_steps
            .iter_mut()
            .find(|s| s.id == step_id)
        else {
            return;
        };

        step.status = status;

        match status {
            StepStatus::InProgress => {
                step.started_at = Some(Utc::now());
                started.insert(step_id.to_string(), Instant::now());
            }
            StepStatus::Completed | StepStatus::Failed | StepStatus::Skipped => {
                step.completed_at = Some(Utc::now());
                if let Some(start) = started.get(step_id) {
                    step.duration_ms = Some(start.elapsed().as_millis() as u64);
                }
            }
            StepStatus::Pending => {}
        }

        if let Some(d) = details {
            step.details = Some(d.to_string());
        }
        if let Some(e) = error {
            step.error = Some(e.to_string());
        }

        tracing::debug!(step_id, status = ?status, "step status updated");
        self.emit();
    }

    /// Get a planning step by id
    pub fn get_step(&self, step_id: &str) -> Option<&PlanningStep> {
        self.state.planning_steps.iter().find(|s| s.id == step_id)
    }

    /// All steps that reached `completed`
    pub fn completed_steps(&self) -> Vec<&PlanningStep> {
        self.state
            .planning_steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .collect()
    }

    /// All steps still pending
    pub fn pending_steps(&self) -> Vec<&PlanningStep> {
        self.state
            .planning_steps
            .iter()
            .filter(|s| s.status == StepStatus::Pending)
            .collect()
    }

    // === Agent Management ===

    fn main_agent_mut(&mut self) -> Option<&mut AgentStatus> {
        self.state
            .active_agents
            .iter_mut()
            .find(|a| a.name == MAIN_AGENT)
    }

    /// Update an agent's status, creating the agent if it does not exist
    pub fn update_agent_status(
        &mut self,
        agent_name: &str,
        status: AgentState,
        current_tool: Option<&str>,
        current_step: Option<&str>,
        message: Option<&str>,
    ) {
        if !self
            .state
            .active_agents
            .iter()
            .any(|a| a.name == agent_name)
        {
            self.state.active_agents.push(AgentStatus::new(agent_name));
        }

        if let Some(agent) = self
            .state
            .active_agents
            .iter_mut()
            .find(|a| a.name == agent_name)
        {
            agent.status = status;
            if let Some(tool) = current_tool {
                agent.current_tool = Some(tool.to_string());
            }
            if let Some(step) = current_step {
                agent.current_step = Some(step.to_string());
            }
            if let Some(m) = message {
                agent.message = Some(m.to_string());
            }
        }

        tracing::debug!(agent = agent_name, status = ?status, "agent status updated");
        self.emit();
    }

    /// Add a sub-agent under a parent
    pub fn add_sub_agent(&mut self, name: &str, parent: &str) {
        let mut agent = AgentStatus::new(name);
        agent.parent_agent = Some(parent.to_string());
        self.state.active_agents.push(agent);
        tracing::debug!(agent = name, parent, "added sub-agent");
        self.emit();
    }

    /// Remove a sub-agent. The main agent is permanent and is never removed.
    pub fn remove_sub_agent(&mut self, name: &str) {
        if name == MAIN_AGENT {
            return;
        }
        self.state.active_agents.retain(|a| a.name != name);
        self.emit();
    }

    // === Tool Execution Management ===

    /// Register a tool execution and return its assigned id.
    ///
    /// The id is the handle for [`Self::update_tool_execution`]; two tools
    /// with the same name never collide. The main agent's current tool is
    /// set to the registered tool.
    pub fn add_tool_execution(&mut self, tool: &str, query: &str) -> u64 {
        let id = self.next_tool_id;
        self.next_tool_id += 1;

        self.state.tool_executions.push(ToolExecution {
            id,
            tool: tool.to_string(),
            status: ToolStatus::Running,
            query: Some(preview(query, PREVIEW_CHARS)),
            started_at: Utc::now(),
            completed_at: None,
            duration_ms: None,
            result_preview: None,
            error: None,
        });
        self.tool_started.insert(id, Instant::now());

        if let Some(main) = self.main_agent_mut() {
            main.current_tool = Some(tool.to_string());
        }

        tracing::debug!(tool, id, "tool execution started");
        self.emit();
        id
    }

    /// Update a registered tool execution by id.
    ///
    /// Leaving `running` stamps the completion time and duration, and clears
    /// the main agent's current tool when it still points at this tool.
    pub fn update_tool_execution(
        &mut self,
        id: u64,
        status: ToolStatus,
        result_preview: Option<&str>,
        error: Option<&str>,
    ) {
        let started = &self.tool_started;
        let Some(exec) = self.state.tool_executions.iter_mut().find(|e| e.id == id) else {
            return;
        };

        exec.status = status;
        if status != ToolStatus::Running {
            exec.completed_at = Some(Utc::now());
            if let Some(start) = started.get(&id) {
                exec.duration_ms = Some(start.elapsed().as_millis() as u64);
            }
        }
        if let Some(r) = result_preview {
            exec.result_preview = Some(preview(r, PREVIEW_CHARS));
        }
        if let Some(e) = error {
            exec.error = Some(e.to_string());
        }
        let tool = exec.tool.clone();

        if status != ToolStatus::Running {
            if let Some(main) = self.main_agent_mut() {
                if main.current_tool.as_deref() == Some(tool.as_str()) {
                    main.current_tool = None;
                }
            }
        }

        tracing::debug!(tool = %tool, id, status = ?status, "tool execution updated");
        self.emit();
    }

    /// Tool executions, optionally filtered by tool name
    pub fn tool_executions(&self, tool: Option<&str>) -> Vec<&ToolExecution> {
        self.state
            .tool_executions
            .iter()
            .filter(|e| tool.map_or(true, |t| e.tool == t))
            .collect()
    }

    /// The most recent tool executions
    pub fn recent_tool_executions(&self, limit: usize) -> Vec<&ToolExecution> {
        let skip = self.state.tool_executions.len().saturating_sub(limit);
        self.state.tool_executions.iter().skip(skip).collect()
    }

    // === Progress Calculation ===

    /// Derive overall progress from the step statuses.
    ///
    /// Completed and skipped steps count fully, in-progress steps count
    /// half. This is independent of the phase-driven overall progress the
    /// orchestrator sets; the two are not reconciled.
    pub fn calculate_overall_progress(&self) -> i32 {
        let total = self.state.planning_steps.len();
        if total == 0 {
            return self.state.overall_progress;
        }

        let done = self
            .state
            .planning_steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Completed | StepStatus::Skipped))
            .count();
        let in_progress = self
            .state
            .planning_steps
            .iter()
            .filter(|s| s.status == StepStatus::InProgress)
            .count();

        let progress = (done as f64 + 0.5 * in_progress as f64) / total as f64 * 100.0;
        (progress as i32).min(100)
    }

    // === State Export ===

    /// Clone of the complete current state
    pub fn snapshot(&self) -> ProgressState {
        self.state.clone()
    }

    /// Borrow the current state
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// One-line text summary of current progress
    pub fn summary(&self) -> String {
        let completed = self.completed_steps().len();
        let total = self.state.planning_steps.len();

        let mut summary = format!(
            "Progress: {}% | Steps: {}/{} | Phase: {}",
            self.state.overall_progress, completed, total, self.state.phase
        );

        let recent = self.recent_tool_executions(3);
        if !recent.is_empty() {
            let tools: Vec<&str> = recent.iter().map(|t| t.tool.as_str()).collect();
            summary.push_str(&format!(" | Recent tools: {}", tools.join(", ")));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn tracker() -> ProgressTracker {
        ProgressTracker::new("test-research")
    }

    /// Observer that records every snapshot it receives
    fn recording_observer() -> (Box<dyn ProgressObserver>, Arc<Mutex<Vec<ProgressState>>>) {
        let seen: Arc<Mutex<Vec<ProgressState>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let observer = move |snapshot: &ProgressState| -> anyhow::Result<()> {
            sink.lock().unwrap().push(snapshot.clone());
            Ok(())
        };
        (Box::new(observer), seen)
    }

    #[test]
    fn test_main_agent_exists_after_construction() {
        let t = tracker();
        assert!(t.state().active_agents.iter().any(|a| a.name == MAIN_AGENT));
    }

    #[test]
    fn test_main_agent_never_removed() {
        let mut t = tracker();
        t.add_sub_agent("pubmed_worker", MAIN_AGENT);
        t.remove_sub_agent("pubmed_worker");
        t.remove_sub_agent(MAIN_AGENT);

        assert!(t.state().active_agents.iter().any(|a| a.name == MAIN_AGENT));
        assert!(!t
            .state()
            .active_agents
            .iter()
            .any(|a| a.name == "pubmed_worker"));
    }

    #[test]
    fn test_progress_clamping() {
        let mut t = tracker();
        for (input, expected) in [(-5, 0), (0, 0), (100, 100), (150, 100)] {
            t.update_progress(input, None);
            assert_eq!(t.state().overall_progress, expected, "input {input}");
        }
    }

    #[test]
    fn test_step_status_transitions_set_timing() {
        let mut t = tracker();
        t.add_planning_step(PlanningStep::new("1", "Search PubMed", "pubmed_search"));

        assert!(t.get_step("1").unwrap().duration_ms.is_none());

        t.update_step_status("1", StepStatus::InProgress, None, None);
        let step = t.get_step("1").unwrap();
        assert!(step.started_at.is_some());
        assert!(step.duration_ms.is_none());

        t.update_step_status("1", StepStatus::Completed, Some("12 records"), None);
        let step = t.get_step("1").unwrap();
        assert_eq!(step.status, StepStatus::Completed);
        assert!(step.completed_at.is_some());
        assert!(step.duration_ms.is_some());
        assert_eq!(step.details.as_deref(), Some("12 records"));
    }

    #[test]
    fn test_failed_step_records_error() {
        let mut t = tracker();
        t.add_planning_step(PlanningStep::new("1", "Classify evidence", "evidence"));
        t.update_step_status("1", StepStatus::InProgress, None, None);
        t.update_step_status("1", StepStatus::Failed, None, Some("model unavailable"));

        let step = t.get_step("1").unwrap();
        assert_eq!(step.status, StepStatus::Failed);
        assert_eq!(step.error.as_deref(), Some("model unavailable"));
        assert!(step.duration_ms.is_some());
    }

    #[test]
    fn test_unknown_step_id_is_ignored() {
        let mut t = tracker();
        t.update_step_status("42", StepStatus::Completed, None, None);
        assert!(t.state().planning_steps.is_empty());
    }

    #[test]
    fn test_tool_execution_ids_are_unique() {
        let mut t = tracker();
        let a = t.add_tool_execution("pubmed_search", "metformin");
        let b = t.add_tool_execution("pubmed_search", "metformin");
        assert_ne!(a, b);
        assert_eq!(t.state().tool_executions.len(), 2);
    }

    #[test]
    fn test_tool_execution_duration_on_completion() {
        let mut t = tracker();
        let id = t.add_tool_execution("pico_query", "statins in elderly patients");
        assert!(t.state().tool_executions[0].duration_ms.is_none());

        t.update_tool_execution(id, ToolStatus::Completed, Some("P: elderly..."), None);
        let exec = &t.state().tool_executions[0];
        assert_eq!(exec.status, ToolStatus::Completed);
        assert!(exec.completed_at.is_some());
        assert!(exec.duration_ms.is_some());
    }

    #[test]
    fn test_query_preview_truncated() {
        let mut t = tracker();
        let long_query = "q".repeat(250);
        t.add_tool_execution("pubmed_search", &long_query);

        let query = t.state().tool_executions[0].query.clone().unwrap();
        assert_eq!(query.chars().count(), 103);
        assert!(query.ends_with("..."));
    }

    #[test]
    fn test_failed_tool_clears_main_agent_current_tool() {
        let mut t = tracker();
        let id = t.add_tool_execution("mesh_mapping", "diabetes");

        let main = t.state().active_agents.iter().find(|a| a.name == MAIN_AGENT);
        assert_eq!(
            main.unwrap().current_tool.as_deref(),
            Some("mesh_mapping")
        );

        t.update_tool_execution(id, ToolStatus::Failed, None, Some("boom"));
        let main = t.state().active_agents.iter().find(|a| a.name == MAIN_AGENT);
        assert!(main.unwrap().current_tool.is_none());
    }

    #[test]
    fn test_agent_upsert_creates_missing_agent() {
        let mut t = tracker();
        t.update_agent_status("classifier", AgentState::Running, None, Some("3"), None);

        let agent = t
            .state()
            .active_agents
            .iter()
            .find(|a| a.name == "classifier")
            .unwrap();
        assert_eq!(agent.status, AgentState::Running);
        assert_eq!(agent.current_step.as_deref(), Some("3"));
    }

    #[test]
    fn test_phase_drives_main_agent_state() {
        let mut t = tracker();

        t.update_phase(Phase::Planning, "Creating research plan", Some(10));
        let main = t.state().active_agents[0].clone();
        assert_eq!(main.status, AgentState::Planning);

        t.update_phase(Phase::Execution, "Executing research plan", Some(20));
        assert_eq!(t.state().active_agents[0].status, AgentState::Running);

        t.update_phase(Phase::Complete, "Done", Some(100));
        assert_eq!(t.state().active_agents[0].status, AgentState::Completed);
    }

    #[test]
    fn test_calculate_overall_progress() {
        let mut t = tracker();
        assert_eq!(t.calculate_overall_progress(), 0);

        for i in 1..=4 {
            t.add_planning_step(PlanningStep::new(i.to_string(), format!("Step {i}"), "search"));
        }
        t.update_step_status("1", StepStatus::InProgress, None, None);
        t.update_step_status("1", StepStatus::Completed, None, None);
        t.update_step_status("2", StepStatus::Skipped, None, None);
        t.update_step_status("3", StepStatus::InProgress, None, None);

        // (2 + 0.5) / 4 * 100 = 62.5, floored
        assert_eq!(t.calculate_overall_progress(), 62);
    }

    #[test]
    fn test_observer_receives_every_mutation() {
        let mut t = tracker();
        let (observer, seen) = recording_observer();
        t.set_observer(observer);

        t.update_phase(Phase::Planning, "Creating research plan", Some(10));
        t.add_planning_step(PlanningStep::new("1", "Search", "search"));
        t.update_step_status("1", StepStatus::InProgress, None, None);

        let snapshots = seen.lock().unwrap();
        assert_eq!(snapshots.len(), 3);
        // snapshots are full state, not diffs
        assert_eq!(snapshots[2].planning_steps.len(), 1);
        assert_eq!(snapshots[2].phase, Phase::Planning);
    }

    #[test]
    fn test_observer_error_does_not_abort_mutation() {
        let mut t = tracker();
        t.set_observer(Box::new(|_: &ProgressState| -> anyhow::Result<()> {
            anyhow::bail!("observer exploded")
        }));

        t.update_progress(40, Some("still fine"));
        assert_eq!(t.state().overall_progress, 40);
    }

    #[test]
    fn test_updated_at_non_decreasing() {
        let mut t = tracker();
        let first = t.state().updated_at;
        t.update_progress(10, None);
        let second = t.state().updated_at;
        t.update_progress(20, None);
        let third = t.state().updated_at;
        assert!(second >= first);
        assert!(third >= second);
    }

    #[test]
    fn test_recent_tool_executions_limit() {
        let mut t = tracker();
        for i in 0..5 {
            t.add_tool_execution("search", &format!("query {i}"));
        }
        let recent = t.recent_tool_executions(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].query.as_deref(), Some("query 2"));
    }

    #[test]
    fn test_summary_format() {
        let mut t = tracker();
        t.add_planning_step(PlanningStep::new("1", "Search", "search"));
        t.update_step_status("1", StepStatus::InProgress, None, None);
        t.update_step_status("1", StepStatus::Completed, None, None);
        t.update_progress(50, None);

        let summary = t.summary();
        assert!(summary.contains("Progress: 50%"));
        assert!(summary.contains("Steps: 1/1"));
    }
}
