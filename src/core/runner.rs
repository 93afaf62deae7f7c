//! Sequential execution of a crew's tasks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::core::clock::{Clock, TokioClock};
use crate::core::error::{CrewError, WorkerError};
use crate::core::output::{CrewOutput, TaskOutput};
use crate::core::retry::RetryPolicy;
use crate::core::task::Task;
use crate::core::telemetry::{Telemetry, TraceEntry};

/// Characters of a task description shown in progress lines.
const DESCRIPTION_PREVIEW: usize = 50;

/// Runs tasks one after another, passing each task's output to the next.
///
/// A rate-limited invocation is retried with the same task and context
/// according to the [`RetryPolicy`]. Any other worker error aborts the run.
/// After every successful task except the last the runner pauses for
/// `task_delay` before starting the next one.
#[derive(Clone)]
pub struct SequentialRunner {
    policy: RetryPolicy,
    task_delay: Duration,
    clock: Arc<dyn Clock>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl Default for SequentialRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialRunner {
    pub fn new() -> Self {
        SequentialRunner {
            policy: RetryPolicy::default(),
            task_delay: Duration::from_secs(5),
            clock: Arc::new(TokioClock),
            telemetry: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_task_delay(mut self, delay: Duration) -> Self {
        self.task_delay = delay;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn task_delay(&self) -> Duration {
        self.task_delay
    }

    /// Executes `tasks` in order and returns one output per task.
    pub async fn run(&self, tasks: &[Task]) -> Result<CrewOutput, CrewError> {
        let total = tasks.len();
        let mut results: Vec<TaskOutput> = Vec::with_capacity(total);

        for (index, task) in tasks.iter().enumerate() {
            let output = self.run_task(index, total, task, results.last()).await?;
            results.push(output);

            if index + 1 < total {
                self.clock.sleep(self.task_delay).await;
            }
        }

        if let Some(telemetry) = &self.telemetry {
            telemetry.flush();
        }

        Ok(CrewOutput {
            tasks_output: results,
        })
    }

    async fn run_task(
        &self,
        index: usize,
        total: usize,
        task: &Task,
        context: Option<&TaskOutput>,
    ) -> Result<TaskOutput, CrewError> {
        let started = Instant::now();
        let max_attempts = self.policy.attempts();
        let mut waited = Duration::ZERO;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            log::info!(
                "Running task {}/{}: {}...",
                index + 1,
                total,
                preview(task.description())
            );

            match task.agent().execute_task(task, context).await {
                Ok(raw) => {
                    log::info!(
                        "Task {}/{} completed by '{}' after {} attempt(s)",
                        index + 1,
                        total,
                        task.agent().role(),
                        attempt
                    );
                    let output = TaskOutput {
                        task_id: task.id(),
                        description: task.description().to_string(),
                        summary: task.summary(),
                        agent: task.agent().role().to_string(),
                        raw,
                        attempts: attempt,
                        completed_at: Utc::now(),
                    };
                    self.record(index, &output, waited, started.elapsed());
                    return Ok(output);
                }
                Err(WorkerError::RateLimited {
                    message,
                    retry_after,
                }) => {
                    if attempt >= max_attempts {
                        log::error!(
                            "Rate limit hit on task {} and no attempts left ({}/{}): {}",
                            index + 1,
                            attempt,
                            max_attempts,
                            message
                        );
                        return Err(CrewError::ExhaustedRetries {
                            index,
                            attempts: attempt,
                            last: message,
                        });
                    }

                    let wait = self.policy.delay_for(attempt - 1, retry_after);
                    log::warn!(
                        "Rate limit hit on task {}: {}. Waiting {}s... (attempt {}/{})",
                        index + 1,
                        message,
                        wait.as_secs_f64(),
                        attempt,
                        max_attempts
                    );
                    self.clock.sleep(wait).await;
                    waited += wait;
                }
                Err(source) => {
                    log::error!("Task {} failed: {}", index + 1, source);
                    return Err(CrewError::Task { index, source });
                }
            }
        }
    }

    fn record(&self, index: usize, output: &TaskOutput, waited: Duration, elapsed: Duration) {
        let Some(telemetry) = &self.telemetry else {
            return;
        };

        telemetry.record(TraceEntry {
            timestamp: output.completed_at.timestamp().max(0) as u64,
            task_index: index,
            task_id: output.task_id.to_string(),
            agent: output.agent.clone(),
            attempts: output.attempts,
            waited_ms: waited.as_millis() as u64,
            elapsed_ms: elapsed.as_millis() as u64,
            output_chars: output.raw.chars().count(),
            metadata: HashMap::new(),
        });
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(DESCRIPTION_PREVIEW) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
