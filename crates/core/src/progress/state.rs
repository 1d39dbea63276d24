//! # Progress State
//!
//! The data aggregate behind a research session: phase, overall progress,
//! planning steps, active agents, and tool executions. These types are the
//! wire shape of every snapshot the tracker emits.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status of a planning step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

/// State of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Idle,
    Planning,
    Running,
    Waiting,
    Completed,
    Failed,
}

/// Status of a tool execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Running,
    Completed,
    Failed,
}

/// Pipeline phase tag
///
/// Phases are free-form strings on the wire; values outside the known set
/// are kept verbatim in `Other` rather than aliased to a valid phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Init,
    Planning,
    Execution,
    Synthesis,
    Formatting,
    Complete,
    Error,
    Other(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Init => "init",
            Phase::Planning => "planning",
            Phase::Execution => "execution",
            Phase::Synthesis => "synthesis",
            Phase::Formatting => "formatting",
            Phase::Complete => "complete",
            Phase::Error => "error",
            Phase::Other(tag) => tag,
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag {
            "init" => Phase::Init,
            "planning" => Phase::Planning,
            "execution" => Phase::Execution,
            "synthesis" => Phase::Synthesis,
            "formatting" => Phase::Formatting,
            "complete" => Phase::Complete,
            "error" => Phase::Error,
            other => Phase::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Phase::parse(&tag))
    }
}

/// Represents a step in the research plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningStep {
    /// Unique within a session
    pub id: String,
    pub name: String,
    /// Normalized action tag selecting the handler
    pub action: String,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set once, when the step reaches a terminal status
    pub duration_ms: Option<u64>,
    pub details: Option<String>,
    pub error: Option<String>,
}

impl PlanningStep {
    /// Create a pending step
    pub fn new(id: impl Into<String>, name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            action: action.into(),
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            details: None,
            error: None,
        }
    }
}

/// Represents the status of an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Unique within the active-agent collection
    pub name: String,
    pub status: AgentState,
    pub current_tool: Option<String>,
    pub current_step: Option<String>,
    /// Parent name; the tree is rooted at the permanent "main" agent
    pub parent_agent: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl AgentStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: AgentState::Idle,
            current_tool: None,
            current_step: None,
            parent_agent: None,
            started_at: Some(Utc::now()),
            message: None,
        }
    }
}

/// A timed record of one handler invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecution {
    /// Monotonically assigned at registration; the handle callers use on update
    pub id: u64,
    pub tool: String,
    pub status: ToolStatus,
    /// Truncated query preview, at most 100 chars plus ellipsis
    pub query: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set only when the status leaves `running`
    pub duration_ms: Option<u64>,
    pub result_preview: Option<String>,
    pub error: Option<String>,
}

/// Complete progress state for a research session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressState {
    pub research_id: String,
    pub phase: Phase,
    pub message: String,
    /// Clamped to [0, 100]
    pub overall_progress: i32,
    pub planning_steps: Vec<PlanningStep>,
    pub active_agents: Vec<AgentStatus>,
    pub tool_executions: Vec<ToolExecution>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressState {
    pub fn new(research_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            research_id: research_id.into(),
            phase: Phase::Init,
            message: "Initializing...".to_string(),
            overall_progress: 0,
            planning_steps: Vec::new(),
            active_agents: Vec::new(),
            tool_executions: Vec::new(),
            started_at: now,
            updated_at: now,
        }
    }
}

/// Truncate text to `max` chars with an ellipsis suffix
pub(crate) fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_step_is_pending() {
        let step = PlanningStep::new("1", "Build PICO query", "pico_query");
        assert_eq!(step.status, StepStatus::Pending);
        assert!(step.started_at.is_none());
        assert!(step.duration_ms.is_none());
    }

    #[test]
    fn test_phase_roundtrip() {
        assert_eq!(Phase::parse("synthesis"), Phase::Synthesis);
        assert_eq!(Phase::parse("warmup"), Phase::Other("warmup".to_string()));
        assert_eq!(Phase::Other("warmup".to_string()).as_str(), "warmup");

        let json = serde_json::to_string(&Phase::Execution).unwrap();
        assert_eq!(json, "\"execution\"");
        let back: Phase = serde_json::from_str("\"warmup\"").unwrap();
        assert_eq!(back, Phase::Other("warmup".to_string()));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&StepStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&AgentState::Running).unwrap(),
            "\"running\""
        );
    }

    #[test]
    fn test_state_serializes_iso8601() {
        let state = ProgressState::new("r-1");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["research_id"], "r-1");
        assert_eq!(json["phase"], "init");
        // chrono serializes DateTime<Utc> as RFC 3339 / ISO-8601
        assert!(json["started_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_preview_truncation() {
        let long = "x".repeat(150);
        let p = preview(&long, 100);
        assert_eq!(p.chars().count(), 103);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short", 100), "short");
    }
}
