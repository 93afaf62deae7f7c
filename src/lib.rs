//! # crewline
//!
//! Sequential LLM agent crews: a fixed pipeline of role-configured agents
//! (planner, writer, editor, ...) where each task's output becomes the next
//! task's context.
//!
//! ## Features
//!
//! - **Ordered Pipelines**: Tasks run strictly in order; task *i* sees task *i-1*'s output
//! - **Rate-Limit Aware**: Throttled calls are retried at a fixed interval (or exponential backoff), up to a bound
//! - **Mockable Time**: Every wait goes through a [`Clock`], so pacing is testable
//! - **Optional LLM Integration**: OpenAI-compatible chat client (feature `llm`, on by default)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crewline::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(LlmConfig::groq("gsk_..."));
//! let crew = Blueprint::content_crew()?.into_crew(&client)?;
//!
//! let mut inputs = Inputs::new();
//! inputs.insert("topic".to_string(), "Large language models".to_string());
//!
//! let output = crew.kickoff(&inputs).await?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`core`](crate::core): tasks, workers, the sequential runner and its retry policy
//! - [`llm`]: the chat completion client and the LLM-backed agent
//! - [`blueprint`]: JSON crew definitions
//! - [`prelude`]: Commonly used types and traits (import with `use crewline::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

pub mod blueprint;
pub mod core;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use blueprint::{AgentSpec, Blueprint, BlueprintError, TaskSpec};
pub use crate::core::clock::{Clock, RecordingClock, TokioClock};
pub use crate::core::crew::Crew;
pub use crate::core::error::{CrewError, ErrorKind, TemplateError, WorkerError};
pub use crate::core::output::{CrewOutput, TaskOutput};
pub use crate::core::retry::RetryPolicy;
pub use crate::core::runner::SequentialRunner;
pub use crate::core::task::Task;
pub use crate::core::telemetry::{MemoryTelemetry, Telemetry, TraceEntry};
pub use crate::core::template::{interpolate, Inputs};
pub use crate::core::worker::Worker;

// ============================================================================
// Prelude
// ============================================================================

/// Imports everything needed to define and run a crew.
///
/// # Example
/// ```rust
/// use crewline::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        Blueprint, Clock, Crew, CrewError, CrewOutput, ErrorKind, Inputs, RetryPolicy,
        SequentialRunner, Task, TaskOutput, Worker, WorkerError,
    };

    #[cfg(feature = "llm")]
    pub use super::{Client, LlmAgent, LlmConfig};
}

// ============================================================================
// LLM Feature
// ============================================================================

#[cfg(feature = "llm")]
pub mod llm;

#[cfg(feature = "llm")]
pub use llm::{Client, LLMError, LlmAgent, LlmConfig};

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
