//! High-level operations.
//!
//! This module contains the implementation of hostforge commands: the
//! provisioning steps themselves, the pipeline controller that runs
//! them, and the read-only status report.

pub mod apt;
pub mod cleanup;
pub mod fetch;
pub mod packer;
pub mod provision;
pub mod sdkman;
pub mod sources;
pub mod status;
pub mod toolchain;
pub mod tools;

pub use cleanup::{CleanupOptions, CleanupReport};
pub use provision::{
    format_plan, plan, provision, step_list, ProvisionOptions, ProvisionReport,
};
pub use status::{format_report, gather, ComponentStatus, StatusReport};
