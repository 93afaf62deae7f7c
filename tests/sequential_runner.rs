//! End-to-end behaviour of the sequential runner with scripted workers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crewline::prelude::*;
use crewline::{MemoryTelemetry, RecordingClock, TemplateError};

#[derive(Clone, Debug)]
enum Step {
    Answer(&'static str),
    RateLimit,
    RateLimitAfter(Duration),
    Fail(&'static str),
}

/// (task description, context raw text) for every invocation.
type CallLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

#[derive(Clone)]
struct ScriptedWorker {
    role: String,
    script: Arc<Mutex<VecDeque<Step>>>,
    calls: CallLog,
}

impl ScriptedWorker {
    fn new(role: &str, steps: Vec<Step>, calls: CallLog) -> Arc<dyn Worker> {
        Arc::new(ScriptedWorker {
            role: role.to_string(),
            script: Arc::new(Mutex::new(steps.into())),
            calls,
        })
    }
}

#[async_trait]
impl Worker for ScriptedWorker {
    fn role(&self) -> &str {
        &self.role
    }

    async fn execute_task(
        &self,
        task: &Task,
        context: Option<&TaskOutput>,
    ) -> Result<String, WorkerError> {
        self.calls.lock().unwrap().push((
            task.description().to_string(),
            context.map(|c| c.raw.clone()),
        ));
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("worker invoked more often than scripted");
        match step {
            Step::Answer(text) => Ok(text.to_string()),
            Step::RateLimit => Err(WorkerError::rate_limited("429 Too Many Requests")),
            Step::RateLimitAfter(delay) => Err(WorkerError::RateLimited {
                message: "slow down".to_string(),
                retry_after: Some(delay),
            }),
            Step::Fail(msg) => Err(WorkerError::failed(msg)),
        }
    }

    fn interpolate(&self, _inputs: &Inputs) -> Result<Arc<dyn Worker>, TemplateError> {
        Ok(Arc::new(self.clone()))
    }
}

fn crew_with_clock(tasks: Vec<Task>, clock: &RecordingClock) -> Crew {
    Crew::new(tasks)
        .with_policy(RetryPolicy::fixed(Duration::from_secs(10), 6))
        .with_clock(Arc::new(clock.clone()))
}

#[tokio::test]
async fn test_context_flows_from_task_to_task() {
    let calls = CallLog::default();
    let planner = ScriptedWorker::new("Planner", vec![Step::Answer("outline")], calls.clone());
    let writer = ScriptedWorker::new("Writer", vec![Step::Answer("draft")], calls.clone());
    let clock = RecordingClock::new();

    let crew = crew_with_clock(
        vec![
            Task::new("Task A", "an outline", planner),
            Task::new("Task B", "a draft", writer),
        ],
        &clock,
    );

    let output = crew.kickoff(&Inputs::new()).await.unwrap();

    let raws: Vec<&str> = output.tasks_output.iter().map(|o| o.raw.as_str()).collect();
    assert_eq!(raws, vec!["outline", "draft"]);
    assert_eq!(output.raw(), Some("draft"));

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0], ("Task A".to_string(), None));
    assert_eq!(calls[1], ("Task B".to_string(), Some("outline".to_string())));

    // One pause between the two tasks, none after the last.
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
}

#[tokio::test]
async fn test_n_tasks_yield_n_results_in_order() {
    let calls = CallLog::default();
    let answers = ["one", "two", "three", "four"];
    let tasks: Vec<Task> = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            let worker = ScriptedWorker::new("Worker", vec![Step::Answer(*answer)], calls.clone());
            Task::new(format!("step {i}"), "text", worker)
        })
        .collect();
    let ids: Vec<_> = tasks.iter().map(|t| t.id()).collect();
    let clock = RecordingClock::new();

    let output = crew_with_clock(tasks, &clock)
        .kickoff(&Inputs::new())
        .await
        .unwrap();

    assert_eq!(output.len(), 4);
    for (i, result) in output.tasks_output.iter().enumerate() {
        assert_eq!(result.raw, answers[i]);
        assert_eq!(result.task_id, ids[i]);
        assert_eq!(result.attempts, 1);
    }
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 3]);

    let contexts: Vec<Option<String>> = calls.lock().unwrap().iter().map(|c| c.1.clone()).collect();
    assert_eq!(
        contexts,
        vec![
            None,
            Some("one".to_string()),
            Some("two".to_string()),
            Some("three".to_string())
        ]
    );
}

#[tokio::test]
async fn test_rate_limit_is_retried_with_same_task_and_context() {
    let calls = CallLog::default();
    let planner = ScriptedWorker::new("Planner", vec![Step::Answer("outline")], calls.clone());
    let writer = ScriptedWorker::new(
        "Writer",
        vec![Step::RateLimit, Step::RateLimit, Step::Answer("ok")],
        calls.clone(),
    );
    let clock = RecordingClock::new();

    let output = crew_with_clock(
        vec![
            Task::new("plan", "outline", planner),
            Task::new("write", "draft", writer),
        ],
        &clock,
    )
    .kickoff(&Inputs::new())
    .await
    .unwrap();

    assert_eq!(output.len(), 2);
    assert_eq!(output.tasks_output[1].raw, "ok");
    assert_eq!(output.tasks_output[1].attempts, 3);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 4);
    for call in &calls[1..] {
        assert_eq!(call, &("write".to_string(), Some("outline".to_string())));
    }

    // Inter-task pause, then two backoff waits; no pause after the last task.
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(10)
        ]
    );
}

#[tokio::test]
async fn test_single_task_rate_limited_twice() {
    let calls = CallLog::default();
    let worker = ScriptedWorker::new(
        "Planner",
        vec![Step::RateLimit, Step::RateLimit, Step::Answer("ok")],
        calls.clone(),
    );
    let clock = RecordingClock::new();

    let output = crew_with_clock(vec![Task::new("Task A", "x", worker)], &clock)
        .kickoff(&Inputs::new())
        .await
        .unwrap();

    assert_eq!(output.len(), 1);
    assert_eq!(output.raw(), Some("ok"));
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(10); 2]);
    assert_eq!(calls.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_default_crew_retries_at_a_fixed_interval() {
    let worker = ScriptedWorker::new(
        "Planner",
        vec![Step::RateLimit, Step::RateLimit, Step::Answer("ok")],
        CallLog::default(),
    );
    let clock = RecordingClock::new();

    let output = Crew::new(vec![Task::new("Task A", "x", worker)])
        .with_clock(Arc::new(clock.clone()))
        .kickoff(&Inputs::new())
        .await
        .unwrap();

    assert_eq!(output.raw(), Some("ok"));
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(10); 2]);
}

#[tokio::test]
async fn test_exponential_backoff_grows() {
    let calls = CallLog::default();
    let worker = ScriptedWorker::new(
        "Planner",
        vec![
            Step::RateLimit,
            Step::RateLimit,
            Step::RateLimit,
            Step::Answer("ok"),
        ],
        calls,
    );
    let clock = RecordingClock::new();

    Crew::new(vec![Task::new("Task A", "x", worker)])
        .with_policy(RetryPolicy::exponential(Duration::from_secs(10), 6))
        .with_clock(Arc::new(clock.clone()))
        .kickoff(&Inputs::new())
        .await
        .unwrap();

    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(10),
            Duration::from_secs(20),
            Duration::from_secs(40)
        ]
    );
}

#[tokio::test]
async fn test_retry_after_hint_is_honoured() {
    let worker = ScriptedWorker::new(
        "Planner",
        vec![Step::RateLimitAfter(Duration::from_secs(3)), Step::Answer("ok")],
        CallLog::default(),
    );
    let clock = RecordingClock::new();

    crew_with_clock(vec![Task::new("Task A", "x", worker)], &clock)
        .kickoff(&Inputs::new())
        .await
        .unwrap();

    assert_eq!(clock.sleeps(), vec![Duration::from_secs(3)]);
}

#[tokio::test]
async fn test_exhausted_retries() {
    let calls = CallLog::default();
    let worker = ScriptedWorker::new("Planner", vec![Step::RateLimit; 3], calls.clone());
    let never = ScriptedWorker::new("Editor", vec![], calls.clone());
    let clock = RecordingClock::new();

    let err = Crew::new(vec![
        Task::new("Task A", "x", worker),
        Task::new("Task B", "y", never),
    ])
    .with_policy(RetryPolicy::fixed(Duration::from_secs(10), 3))
    .with_clock(Arc::new(clock.clone()))
    .kickoff(&Inputs::new())
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExhaustedRetries);
    assert_eq!(err.task_index(), 0);
    match err {
        CrewError::ExhaustedRetries { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("Expected exhausted retries, got {other:?}"),
    }
    // Three invocations, two waits in between, nothing for Task B.
    assert_eq!(calls.lock().unwrap().len(), 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(10); 2]);
}

#[tokio::test]
async fn test_other_errors_abort_without_result() {
    let calls = CallLog::default();
    let planner = ScriptedWorker::new("Planner", vec![Step::Answer("outline")], calls.clone());
    let writer = ScriptedWorker::new("Writer", vec![Step::Fail("connection reset")], calls.clone());
    let editor = ScriptedWorker::new("Editor", vec![], calls.clone());
    let clock = RecordingClock::new();

    let err = crew_with_clock(
        vec![
            Task::new("plan", "outline", planner),
            Task::new("write", "draft", writer),
            Task::new("edit", "post", editor),
        ],
        &clock,
    )
    .kickoff(&Inputs::new())
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TaskFailed);
    assert_eq!(err.task_index(), 1);
    match &err {
        CrewError::Task { source, .. } => assert_eq!(source.to_string(), "connection reset"),
        other => panic!("Expected task failure, got {other:?}"),
    }
    // No retry and the editor is never reached.
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
}

#[tokio::test]
async fn test_inputs_are_interpolated_before_running() {
    let calls = CallLog::default();
    let worker = ScriptedWorker::new("Planner", vec![Step::Answer("plan")], calls.clone());
    let clock = RecordingClock::new();
    let crew = crew_with_clock(vec![Task::new("Plan a post on {topic}", "x", worker)], &clock);

    let mut inputs = Inputs::new();
    inputs.insert("topic".to_string(), "Large language models".to_string());
    crew.kickoff(&inputs).await.unwrap();

    assert_eq!(
        calls.lock().unwrap()[0].0,
        "Plan a post on Large language models"
    );
    // The crew's own tasks are left untouched.
    assert_eq!(crew.tasks()[0].description(), "Plan a post on {topic}");
}

#[tokio::test]
async fn test_missing_input_fails_before_any_call() {
    let calls = CallLog::default();
    let planner = ScriptedWorker::new("Planner", vec![Step::Answer("plan")], calls.clone());
    let writer = ScriptedWorker::new("Writer", vec![], calls.clone());
    let clock = RecordingClock::new();

    let err = crew_with_clock(
        vec![
            Task::new("plan", "x", planner),
            Task::new("write about {topic}", "y", writer),
        ],
        &clock,
    )
    .kickoff(&Inputs::new())
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Template);
    assert_eq!(err.task_index(), 1);
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_pipeline() {
    let clock = RecordingClock::new();
    let output = crew_with_clock(vec![], &clock)
        .kickoff(&Inputs::new())
        .await
        .unwrap();
    assert!(output.is_empty());
    assert_eq!(output.raw(), None);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_telemetry_records_each_task() {
    let worker = ScriptedWorker::new(
        "Planner",
        vec![Step::RateLimit, Step::Answer("outline"), Step::Answer("draft")],
        CallLog::default(),
    );
    let telemetry = Arc::new(MemoryTelemetry::new());
    let clock = RecordingClock::new();

    crew_with_clock(
        vec![
            Task::new("plan", "x", worker.clone()),
            Task::new("write", "y", worker),
        ],
        &clock,
    )
    .with_telemetry(telemetry.clone())
    .kickoff(&Inputs::new())
    .await
    .unwrap();

    let traces = telemetry.get_traces();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0].task_index, 0);
    assert_eq!(traces[0].attempts, 2);
    assert_eq!(traces[0].waited_ms, 10_000);
    assert_eq!(traces[0].output_chars, "outline".len());
    assert_eq!(traces[1].attempts, 1);
    assert_eq!(traces[1].agent, "Planner");
}
