//! # Hierarchical Progress
//!
//! Structured progress tracking for deep research runs: planning steps,
//! agent status, and tool executions, with a full snapshot emitted to a
//! registered observer after every mutation.
//!
//! ## Flow
//!
//! ```text
//! Coordinator ──mutates──► ProgressTracker ──snapshot──► ProgressObserver
//! ```

pub mod state;
pub mod tracker;

pub use state::{
    AgentState, AgentStatus, Phase, PlanningStep, ProgressState, StepStatus, ToolExecution,
    ToolStatus,
};
pub use tracker::{ProgressObserver, ProgressTracker, MAIN_AGENT};
