//! Task execution capability used by the distributed run mode.
//!
//! The orchestrator only submits a unit of work and awaits its terminal
//! state; where and how the unit runs belongs to the runner.

use crate::error::{Result, ScraperError};
use crate::shared_types::PairReport;
use futures::future::BoxFuture;
use futures::FutureExt;

/// One (currency, side) scrape. Resolves to `None` when the pair produced no result.
pub type TaskUnit = BoxFuture<'static, Option<PairReport>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Completed(Option<PairReport>),
    Failed(String),
}

impl TaskState {
    /// Completed tasks without a result count as failures too.
    pub fn into_report(self, name: &str) -> Result<PairReport> {
        match self {
            TaskState::Completed(Some(report)) => Ok(report),
            TaskState::Completed(None) => Err(ScraperError::Task {
                name: name.to_string(),
                reason: "no result".to_string(),
            }),
            TaskState::Failed(reason) => Err(ScraperError::Task {
                name: name.to_string(),
                reason,
            }),
        }
    }
}

pub struct TaskHandle {
    name: String,
    state: BoxFuture<'static, TaskState>,
}

impl TaskHandle {
    pub fn new(name: impl Into<String>, state: BoxFuture<'static, TaskState>) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blocks until the task reaches a terminal state.
    pub async fn wait(self) -> TaskState {
        self.state.await
    }
}

pub trait TaskRunner: Send + Sync {
    fn submit(&self, name: &str, unit: TaskUnit) -> TaskHandle;
}

/// Runs each unit on the tokio runtime. Panics surface as `TaskState::Failed`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTaskRunner;

impl TaskRunner for TokioTaskRunner {
    fn submit(&self, name: &str, unit: TaskUnit) -> TaskHandle {
        let join = tokio::spawn(unit);
        let state = async move {
            match join.await {
                Ok(result) => TaskState::Completed(result),
                Err(e) => TaskState::Failed(e.to_string()),
            }
        }
        .boxed();
        TaskHandle::new(name, state)
    }
}
