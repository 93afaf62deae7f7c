use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::{TemplateError, WorkerError};
use crate::core::output::TaskOutput;
use crate::core::task::Task;
use crate::core::template::{interpolate, Inputs};
use crate::core::worker::Worker;
use crate::llm::Client;

/// A role-configured worker backed by the shared LLM [`Client`].
#[derive(Clone, Debug)]
pub struct LlmAgent {
    role: String,
    goal: String,
    backstory: String,
    client: Client,
}

impl LlmAgent {
    pub fn new(
        client: Client,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            client,
        }
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }

    pub fn task_prompt(task: &Task, context: Option<&TaskOutput>) -> String {
        let mut prompt = format!(
            "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            task.description(),
            task.expected_output()
        );
        if let Some(context) = context {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(&context.raw);
        }
        prompt.push_str("\n\nBegin! This is VERY important to you, give your best Final Answer.");
        prompt
    }
}

#[async_trait]
impl Worker for LlmAgent {
    fn role(&self) -> &str {
        &self.role
    }

    async fn execute_task(
        &self,
        task: &Task,
        context: Option<&TaskOutput>,
    ) -> Result<String, WorkerError> {
        let answer = self
            .client
            .complete()
            .system(self.system_prompt())
            .user(Self::task_prompt(task, context))
            .await?;
        Ok(answer)
    }

    fn interpolate(&self, inputs: &Inputs) -> Result<Arc<dyn Worker>, TemplateError> {
        Ok(Arc::new(LlmAgent {
            role: interpolate(&self.role, inputs)?,
            goal: interpolate(&self.goal, inputs)?,
            backstory: interpolate(&self.backstory, inputs)?,
            client: self.client.clone(),
        }))
    }
}
