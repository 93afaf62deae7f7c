pub mod clock;
pub mod crew;
pub mod error;
pub mod output;
pub mod retry;
pub mod runner;
pub mod task;
pub mod telemetry;
pub mod template;
pub mod worker;
