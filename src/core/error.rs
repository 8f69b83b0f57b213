//! Top-level run errors and their process exit codes.

use thiserror::Error;

use crate::util::process::ExecError;

/// Reasons a provisioning or cleanup run stops.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The tool was started without root privileges. Nothing ran.
    #[error("must run as root (current euid {euid})")]
    NotElevated { euid: u32 },

    /// A step failed; all later steps were abandoned.
    #[error("step `{step}` failed: {cause:#}")]
    StepFailed {
        step: String,
        cause: anyhow::Error,
    },

    /// Cleanup after an otherwise successful run failed.
    #[error("cleanup failed: {cause:#}")]
    CleanupFailed { cause: anyhow::Error },
}

impl ProvisionError {
    /// Exit code for the process.
    ///
    /// A step that died because of a failing child command surfaces that
    /// child's exit code; everything else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::NotElevated { .. } => 1,
            ProvisionError::StepFailed { cause, .. } => cause
                .downcast_ref::<ExecError>()
                .and_then(ExecError::exit_code)
                .unwrap_or(1),
            ProvisionError::CleanupFailed { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    #[test]
    fn test_not_elevated_exit_code() {
        let err = ProvisionError::NotElevated { euid: 1000 };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("euid 1000"));
    }

    #[test]
    fn test_step_failed_surfaces_child_exit_code() {
        // Raw wait status 512 is exit code 2.
        let exec = ExecError::Failed {
            command: "apt-get update".to_string(),
            status: ExitStatus::from_raw(512),
            stderr: String::new(),
        };
        let err = ProvisionError::StepFailed {
            step: "configure-sources".to_string(),
            cause: anyhow::Error::new(exec),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_step_failed_without_exec_error_is_one() {
        let err = ProvisionError::StepFailed {
            step: "version-manager".to_string(),
            cause: anyhow::anyhow!("bootstrap script missing"),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("version-manager"));
    }

    #[test]
    fn test_cleanup_failed_exit_code() {
        let err = ProvisionError::CleanupFailed {
            cause: anyhow::anyhow!("disk gone"),
        };
        assert_eq!(err.exit_code(), 1);
    }
}
