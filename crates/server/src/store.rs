//! # Research Job Store
//!
//! In-memory registry of research jobs keyed by research id. The store is
//! an explicit interface injected into the API layer so handlers and tests
//! never reach for ambient global state.
//!
//! Locking is synchronous (`std::sync::RwLock`) because the progress
//! observer writes snapshots inline on the pipeline's call stack; every
//! critical section is a short copy.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use medresearch_core::progress::{
    AgentStatus, Phase, PlanningStep, ProgressObserver, ProgressState, ToolExecution,
};

/// Lifecycle status of a research job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// One research job as exposed over the API
#[derive(Debug, Clone, Serialize)]
pub struct ResearchJob {
    pub id: String,
    pub query: String,
    pub status: JobStatus,
    pub progress: i32,
    pub phase: Phase,
    pub planning_steps: Vec<PlanningStep>,
    pub active_agents: Vec<AgentStatus>,
    pub tool_executions: Vec<ToolExecution>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ResearchJob {
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            status: JobStatus::Pending,
            progress: 0,
            phase: Phase::Other("queued".to_string()),
            planning_steps: Vec::new(),
            active_agents: Vec::new(),
            tool_executions: Vec::new(),
            result: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Store interface for research jobs.
///
/// Implementations must be cheap to call from the synchronous progress
/// observer path.
pub trait JobStore: Send + Sync {
    /// Insert a job, replacing any existing entry with the same id
    fn create(&self, job: ResearchJob);

    /// Fetch a job by id
    fn get(&self, id: &str) -> Option<ResearchJob>;

    /// All jobs, newest first
    fn list(&self) -> Vec<ResearchJob>;

    /// Apply a mutation to a job; returns false when the id is unknown
    fn update(&self, id: &str, mutate: &mut dyn FnMut(&mut ResearchJob)) -> bool;

    /// Remove a job; returns false when the id is unknown
    fn delete(&self, id: &str) -> bool;

    /// Copy a progress snapshot into the job record
    fn apply_snapshot(&self, id: &str, snapshot: &ProgressState) -> bool {
        self.update(id, &mut |job| {
            job.progress = snapshot.overall_progress;
            job.phase = snapshot.phase.clone();
            job.planning_steps = snapshot.planning_steps.clone();
            job.active_agents = snapshot.active_agents.clone();
            job.tool_executions = snapshot.tool_executions.clone();
        })
    }

    fn mark_running(&self, id: &str) -> bool {
        self.update(id, &mut |job| {
            job.status = JobStatus::Running;
            job.phase = Phase::Init;
        })
    }

    fn mark_completed(&self, id: &str, result: &str) -> bool {
        self.update(id, &mut |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.phase = Phase::Complete;
            job.result = Some(result.to_string());
            job.completed_at = Some(Utc::now());
        })
    }

    fn mark_failed(&self, id: &str, error: &str) -> bool {
        self.update(id, &mut |job| {
            job.status = JobStatus::Failed;
            job.phase = Phase::Error;
            job.error = Some(error.to_string());
            job.completed_at = Some(Utc::now());
        })
    }

    /// Advisory only: flips the status, a running pipeline is unaffected
    fn mark_cancelled(&self, id: &str) -> bool {
        self.update(id, &mut |job| {
            job.status = JobStatus::Cancelled;
            job.phase = Phase::Other("cancelled".to_string());
        })
    }
}

/// In-memory job store
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, ResearchJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemoryJobStore {
    fn create(&self, job: ResearchJob) {
        if let Ok(mut jobs) = self.jobs.write() {
            jobs.insert(job.id.clone(), job);
        }
    }

    fn get(&self, id: &str) -> Option<ResearchJob> {
        self.jobs.read().ok()?.get(id).cloned()
    }

    fn list(&self) -> Vec<ResearchJob> {
        let Ok(jobs) = self.jobs.read() else {
            return Vec::new();
        };
        let mut all: Vec<ResearchJob> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    fn update(&self, id: &str, mutate: &mut dyn FnMut(&mut ResearchJob)) -> bool {
        let Ok(mut jobs) = self.jobs.write() else {
            return false;
        };
        match jobs.get_mut(id) {
            Some(job) => {
                mutate(job);
                true
            }
            None => false,
        }
    }

    fn delete(&self, id: &str) -> bool {
        self.jobs
            .write()
            .map(|mut jobs| jobs.remove(id).is_some())
            .unwrap_or(false)
    }
}

/// Observer that copies every pipeline snapshot into the job record
pub struct StoreObserver {
    store: std::sync::Arc<dyn JobStore>,
    research_id: String,
}

impl StoreObserver {
    pub fn new(store: std::sync::Arc<dyn JobStore>, research_id: impl Into<String>) -> Self {
        Self {
            store,
            research_id: research_id.into(),
        }
    }
}

impl ProgressObserver for StoreObserver {
    fn on_update(&self, snapshot: &ProgressState) -> anyhow::Result<()> {
        if !self.store.apply_snapshot(&self.research_id, snapshot) {
            anyhow::bail!("research job {} is gone from the store", self.research_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_delete() {
        let store = MemoryJobStore::new();
        store.create(ResearchJob::new("r-1", "metformin"));

        let job = store.get("r-1").unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.query, "metformin");

        assert!(store.delete("r-1"));
        assert!(store.get("r-1").is_none());
        assert!(!store.delete("r-1"));
    }

    #[test]
    fn test_update_unknown_id() {
        let store = MemoryJobStore::new();
        assert!(!store.mark_running("missing"));
    }

    #[test]
    fn test_lifecycle_marks() {
        let store = MemoryJobStore::new();
        store.create(ResearchJob::new("r-1", "q"));

        store.mark_running("r-1");
        assert_eq!(store.get("r-1").unwrap().status, JobStatus::Running);

        store.mark_completed("r-1", "# Report");
        let job = store.get("r-1").unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(job.result.as_deref(), Some("# Report"));
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_cancel_is_advisory() {
        let store = MemoryJobStore::new();
        store.create(ResearchJob::new("r-1", "q"));
        store.mark_cancelled("r-1");

        let job = store.get("r-1").unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
        assert_eq!(job.phase.as_str(), "cancelled");
    }

    #[test]
    fn test_snapshot_applied_to_job() {
        let store = std::sync::Arc::new(MemoryJobStore::new());
        store.create(ResearchJob::new("r-1", "q"));

        let mut snapshot = ProgressState::new("r-1");
        snapshot.overall_progress = 42;
        snapshot.phase = Phase::Execution;
        snapshot
            .planning_steps
            .push(PlanningStep::new("1", "Search", "search"));

        let observer = StoreObserver::new(store.clone(), "r-1");
        observer.on_update(&snapshot).unwrap();

        let job = store.get("r-1").unwrap();
        assert_eq!(job.progress, 42);
        assert_eq!(job.phase, Phase::Execution);
        assert_eq!(job.planning_steps.len(), 1);
    }

    #[test]
    fn test_list_newest_first() {
        let store = MemoryJobStore::new();
        let mut older = ResearchJob::new("r-1", "a");
        older.created_at = Utc::now() - chrono::Duration::seconds(60);
        store.create(older);
        store.create(ResearchJob::new("r-2", "b"));

        let jobs = store.list();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, "r-2");
    }
}
