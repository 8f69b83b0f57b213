//! Test doubles shared across unit tests.
//!
//! The pipeline and controller tests need steps whose outcomes are
//! scripted and a privilege guard that answers without looking at the
//! real euid. Everything here records its calls in a shared event log
//! so ordering assertions stay cheap.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::core::config::Config;
use crate::core::step::{Step, StepContext};
use crate::util::privilege::PrivilegeGuard;
use crate::util::shell::{ColorChoice, Shell, Verbosity};

/// Shared, ordered record of what the mocks were asked to do.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Context with default configuration and a quiet shell.
pub fn test_context() -> StepContext {
    test_context_with(Config::default())
}

/// Context with the given configuration and a quiet shell.
pub fn test_context_with(config: Config) -> StepContext {
    let shell = Arc::new(Shell::new(Verbosity::Quiet, ColorChoice::Never));
    StepContext::new(config, shell)
}

/// Privilege guard with a fixed answer.
pub struct FixedGuard {
    elevated: bool,
    euid: u32,
}

impl FixedGuard {
    pub fn root() -> Self {
        FixedGuard {
            elevated: true,
            euid: 0,
        }
    }

    pub fn user() -> Self {
        FixedGuard {
            elevated: false,
            euid: 1000,
        }
    }
}

impl PrivilegeGuard for FixedGuard {
    fn is_elevated(&self) -> bool {
        self.elevated
    }

    fn euid(&self) -> u32 {
        self.euid
    }
}

/// Step with scripted probe and install results.
pub struct ScriptedStep {
    name: &'static str,
    installed: bool,
    install_error: Option<String>,
    probe_error: Option<String>,
    log: EventLog,
}

impl ScriptedStep {
    pub fn new(name: &'static str, log: &EventLog) -> Self {
        ScriptedStep {
            name,
            installed: false,
            install_error: None,
            probe_error: None,
            log: Arc::clone(log),
        }
    }

    /// Script the probe to report the component present.
    pub fn installed(mut self, installed: bool) -> Self {
        self.installed = installed;
        self
    }

    /// Script the install to fail with the given message.
    pub fn fails(mut self, message: &str) -> Self {
        self.install_error = Some(message.to_string());
        self
    }

    /// Script the probe itself to fail.
    pub fn probe_fails(mut self, message: &str) -> Self {
        self.probe_error = Some(message.to_string());
        self
    }
}

impl Step for ScriptedStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_installed(&self, _ctx: &StepContext) -> Result<bool> {
        self.log
            .lock()
            .unwrap()
            .push(format!("check {}", self.name));
        if let Some(ref message) = self.probe_error {
            bail!("{message}");
        }
        Ok(self.installed)
    }

    fn install(&self, _ctx: &StepContext) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("install {}", self.name));
        if let Some(ref message) = self.install_error {
            bail!("{message}");
        }
        Ok(())
    }
}
