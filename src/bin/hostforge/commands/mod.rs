//! Command implementations

pub mod cleanup;
pub mod completions;
pub mod provision;
pub mod status;
