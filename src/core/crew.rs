use std::sync::Arc;
use std::time::Duration;

use crate::core::clock::Clock;
use crate::core::error::CrewError;
use crate::core::output::CrewOutput;
use crate::core::retry::RetryPolicy;
use crate::core::runner::SequentialRunner;
use crate::core::task::Task;
use crate::core::telemetry::Telemetry;
use crate::core::template::Inputs;

/// An ordered pipeline of tasks plus the runner that drives them.
///
/// Order is significant: each task receives the previous task's output as
/// context.
#[derive(Clone)]
pub struct Crew {
    tasks: Vec<Task>,
    runner: SequentialRunner,
}

impl Crew {
    pub fn new(tasks: Vec<Task>) -> Self {
        Crew {
            tasks,
            runner: SequentialRunner::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Distinct agent roles in the order they first appear.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = Vec::new();
        for task in &self.tasks {
            let role = task.agent().role();
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        roles
    }

    pub fn runner(&self) -> &SequentialRunner {
        &self.runner
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.runner = self.runner.with_policy(policy);
        self
    }

    pub fn with_task_delay(mut self, delay: Duration) -> Self {
        self.runner = self.runner.with_task_delay(delay);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.runner = self.runner.with_clock(clock);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.runner = self.runner.with_telemetry(telemetry);
        self
    }

    /// A copy of this crew with `inputs` substituted into every task and its
    /// agent. The runner configuration is shared.
    pub fn interpolate(&self, inputs: &Inputs) -> Result<Crew, CrewError> {
        let tasks = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                task.interpolate(inputs)
                    .map_err(|source| CrewError::Template { index, source })
            })
            .collect::<Result<Vec<Task>, CrewError>>()?;

        Ok(Crew {
            tasks,
            runner: self.runner.clone(),
        })
    }

    /// Interpolates `inputs` into every task and its agent, then runs the pipeline.
    ///
    /// All interpolation happens up front, so a missing input fails the run
    /// before any worker is invoked.
    pub async fn kickoff(&self, inputs: &Inputs) -> Result<CrewOutput, CrewError> {
        let crew = self.interpolate(inputs)?;

        log::info!(
            "Crew kickoff: {} task(s), agents [{}]",
            crew.tasks.len(),
            crew.roles().join(", ")
        );

        crew.runner.run(&crew.tasks).await
    }
}

impl std::fmt::Debug for Crew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crew").field("tasks", &self.tasks).finish()
    }
}
