//! Hostforge - provisioning for Debian native-image build hosts
//!
//! This crate provides the core library functionality for hostforge:
//! the ordered, idempotent, fail-fast pipeline that takes a minimal
//! Debian install to a ready native-image build machine, plus the
//! cleanup engine and readiness report around it.

pub mod core;
pub mod ops;
pub mod util;

/// Test doubles for hostforge unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides scripted steps, a fixed-answer privilege
/// guard, and quiet step contexts.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    config::{load_config, Config, Overrides},
    error::ProvisionError,
    pipeline::{Pipeline, PlanEntry},
    step::{Step, StepContext, StepOutcome},
};

pub use crate::util::privilege::{EuidGuard, PrivilegeGuard};
pub use crate::util::shell::Shell;
