use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::TemplateError;
use crate::core::template::{interpolate, Inputs};
use crate::core::worker::Worker;

/// One step of a crew's pipeline.
///
/// A task is immutable once built. [`Task::interpolate`] returns a new task
/// (with the same id) instead of editing this one.
#[derive(Clone)]
pub struct Task {
    id: Uuid,
    description: String,
    expected_output: String,
    agent: Arc<dyn Worker>,
}

impl Task {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<dyn Worker>,
    ) -> Self {
        Task {
            id: Uuid::new_v4(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    /// The worker bound to this task.
    pub fn agent(&self) -> &Arc<dyn Worker> {
        &self.agent
    }

    /// The first ten words of the description, followed by an ellipsis.
    pub fn summary(&self) -> String {
        let words: Vec<&str> = self.description.split_whitespace().take(10).collect();
        format!("{}...", words.join(" "))
    }

    /// Substitutes `inputs` into the description, the expected output and the
    /// bound worker's prompt text.
    pub fn interpolate(&self, inputs: &Inputs) -> Result<Task, TemplateError> {
        Ok(Task {
            id: self.id,
            description: interpolate(&self.description, inputs)?,
            expected_output: interpolate(&self.expected_output, inputs)?,
            agent: self.agent.interpolate(inputs)?,
        })
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("expected_output", &self.expected_output)
            .field("agent", &self.agent.role())
            .finish()
    }
}
