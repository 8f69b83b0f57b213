//! Package-set steps backed by the system package manager.

use anyhow::Result;

use crate::core::step::{Step, StepContext};
use crate::ops::apt;

/// Installs the base utilities later steps depend on (curl, git,
/// archive tools, CA certificates).
pub struct CommonToolsStep;

impl Step for CommonToolsStep {
    fn name(&self) -> &'static str {
        "common-tools"
    }

    fn is_installed(&self, _ctx: &StepContext) -> Result<bool> {
        // The package manager already skips present packages, so the
        // probe stays trivial instead of re-implementing dpkg queries.
        Ok(false)
    }

    fn install(&self, ctx: &StepContext) -> Result<()> {
        let packages = ctx.config.packages.common_tools.clone();
        ctx.with_proxy(|| apt::install(&packages))
    }
}

/// Installs the compiler and development packages the native toolchain
/// build needs.
pub struct NativePrereqsStep;

impl Step for NativePrereqsStep {
    fn name(&self) -> &'static str {
        "native-prereqs"
    }

    fn is_installed(&self, _ctx: &StepContext) -> Result<bool> {
        Ok(false)
    }

    fn install(&self, ctx: &StepContext) -> Result<()> {
        let packages = ctx.config.packages.native_prereqs.clone();
        ctx.with_proxy(|| apt::install(&packages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;

    #[test]
    fn test_package_steps_never_skip() {
        let ctx = test_context();
        assert!(!CommonToolsStep.is_installed(&ctx).unwrap());
        assert!(!NativePrereqsStep.is_installed(&ctx).unwrap());
    }

    #[test]
    fn test_step_names() {
        assert_eq!(CommonToolsStep.name(), "common-tools");
        assert_eq!(NativePrereqsStep.name(), "native-prereqs");
    }
}
