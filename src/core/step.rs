//! The step abstraction every installable component implements.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::core::config::Config;
use crate::util::proxy;
use crate::util::shell::Shell;

/// Shared state handed to every step.
#[derive(Clone)]
pub struct StepContext {
    pub config: Config,
    pub shell: Arc<Shell>,
}

impl StepContext {
    pub fn new(config: Config, shell: Arc<Shell>) -> Self {
        StepContext { config, shell }
    }

    /// Run `body` inside the configured proxy scope.
    ///
    /// The proxy environment variables are set before `body` starts and
    /// cleared when it returns, whether it succeeded or not. A disabled
    /// proxy makes this a plain call.
    pub fn with_proxy<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T> {
        proxy::with_proxy(&self.config.proxy, body)
    }
}

/// One installable component.
///
/// `install` must be safe to run when the component is already present;
/// the pipeline consults `is_installed` first and skips satisfied steps,
/// but a stale probe must not corrupt the host.
pub trait Step {
    /// Stable step name used in status lines and error messages.
    fn name(&self) -> &'static str;

    /// Probe whether the component is already present.
    fn is_installed(&self, ctx: &StepContext) -> Result<bool>;

    /// Install the component.
    fn install(&self, ctx: &StepContext) -> Result<()>;
}

/// What the pipeline did with a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Installed,
    Skipped,
}

/// Record of one executed step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub name: &'static str,
    pub action: StepAction,
    pub duration: Duration,
}
