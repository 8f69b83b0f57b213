//! Core provisioning model.
//!
//! Configuration, the step abstraction, the fail-fast pipeline that
//! drives steps in order, and the error type that maps failures to
//! process exit codes.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod step;

pub use config::{global_config_path, load_config, Config, ConfigError, Overrides};
pub use error::ProvisionError;
pub use pipeline::{Pipeline, PlanEntry};
pub use step::{Step, StepAction, StepContext, StepOutcome};
