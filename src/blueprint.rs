//! Serializable crew definitions.
//!
//! A blueprint names the agents (by role) and lists the tasks in pipeline
//! order, each bound to one of those roles. The content-writing crew that the
//! `crewline` binary runs by default is embedded as [`Blueprint::content_crew`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONTENT_CREW: &str = include_str!("../crews/content.json");

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("failed to parse blueprint: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read blueprint: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid blueprint: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
    /// Role of the agent this task is bound to.
    pub agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub agents: Vec<AgentSpec>,
    pub tasks: Vec<TaskSpec>,
}

impl Blueprint {
    /// Parses and validates a JSON blueprint.
    pub fn from_json(json: &str) -> Result<Self, BlueprintError> {
        let blueprint: Blueprint = serde_json::from_str(json)?;
        blueprint.validate()?;
        Ok(blueprint)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BlueprintError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Planner, writer and editor, run in that order.
    pub fn content_crew() -> Result<Self, BlueprintError> {
        Self::from_json(CONTENT_CREW)
    }

    pub fn agent(&self, role: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.role == role)
    }

    pub fn validate(&self) -> Result<(), BlueprintError> {
        if self.tasks.is_empty() {
            return Err(BlueprintError::Invalid("no tasks defined".to_string()));
        }

        let mut roles = HashSet::new();
        for agent in &self.agents {
            if !roles.insert(agent.role.as_str()) {
                return Err(BlueprintError::Invalid(format!(
                    "duplicate agent role '{}'",
                    agent.role
                )));
            }
        }

        for (i, task) in self.tasks.iter().enumerate() {
            if !roles.contains(task.agent.as_str()) {
                return Err(BlueprintError::Invalid(format!(
                    "task {} is bound to unknown agent '{}'",
                    i + 1,
                    task.agent
                )));
            }
        }

        Ok(())
    }
}

#[cfg(feature = "llm")]
mod build {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::{Blueprint, BlueprintError};
    use crate::core::crew::Crew;
    use crate::core::task::Task;
    use crate::core::worker::Worker;
    use crate::llm::{Client, LlmAgent};

    impl Blueprint {
        /// Builds one [`LlmAgent`] per role, all sharing `client`, and binds the
        /// tasks to them in order.
        pub fn into_crew(self, client: &Client) -> Result<Crew, BlueprintError> {
            self.validate()?;

            let agents: HashMap<String, Arc<dyn Worker>> = self
                .agents
                .into_iter()
                .map(|spec| {
                    let agent: Arc<dyn Worker> = Arc::new(LlmAgent::new(
                        client.clone(),
                        spec.role.clone(),
                        spec.goal,
                        spec.backstory,
                    ));
                    (spec.role, agent)
                })
                .collect();

            let tasks = self
                .tasks
                .into_iter()
                .map(|spec| {
                    let agent = agents.get(&spec.agent).cloned().ok_or_else(|| {
                        BlueprintError::Invalid(format!("unknown agent '{}'", spec.agent))
                    })?;
                    Ok(Task::new(spec.description, spec.expected_output, agent))
                })
                .collect::<Result<Vec<Task>, BlueprintError>>()?;

            Ok(Crew::new(tasks))
        }
    }
}
