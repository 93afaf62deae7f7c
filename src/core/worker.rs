use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::{TemplateError, WorkerError};
use crate::core::output::TaskOutput;
use crate::core::task::Task;
use crate::core::template::Inputs;

/// Defines how an agent role carries out a task.
///
/// A worker is stateless across tasks: the only thing it is given is the task
/// itself and, for every task but the first, the output of the task that ran
/// right before it.
///
/// See [`LlmAgent`](crate::llm::agent::LlmAgent) for the LLM-backed implementation.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// The role name this worker plays in the crew, e.g. "Content Planner".
    fn role(&self) -> &str;

    /// Execute `task`, optionally seeded with the previous task's output.
    ///
    /// # Returns
    /// * `Ok(text)` - the task's raw result
    /// * `Err(WorkerError::RateLimited { .. })` - the provider throttled the call; the
    ///   runner will retry with the same task and context
    /// * `Err(WorkerError::Failed(_))` - anything else; the run is aborted
    async fn execute_task(
        &self,
        task: &Task,
        context: Option<&TaskOutput>,
    ) -> Result<String, WorkerError>;

    /// Produce a copy of this worker with `{placeholders}` in its prompt text
    /// substituted from `inputs`.
    fn interpolate(&self, inputs: &Inputs) -> Result<Arc<dyn Worker>, TemplateError>;
}
