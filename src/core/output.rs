use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The result of one successfully completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: Uuid,
    pub description: String,
    pub summary: String,
    /// Role of the worker that produced this output.
    pub agent: String,
    pub raw: String,
    /// Number of invocations it took, rate-limited ones included.
    pub attempts: u32,
    pub completed_at: DateTime<Utc>,
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Everything a crew run produced, one [`TaskOutput`] per task in task order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    pub tasks_output: Vec<TaskOutput>,
}

impl CrewOutput {
    /// The last task's output, i.e. the crew's final artifact.
    pub fn final_output(&self) -> Option<&TaskOutput> {
        self.tasks_output.last()
    }

    /// Raw text of the final output.
    pub fn raw(&self) -> Option<&str> {
        self.final_output().map(|o| o.raw.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks_output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks_output.is_empty()
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw().unwrap_or_default())
    }
}
