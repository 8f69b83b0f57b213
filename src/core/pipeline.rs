//! Ordered, fail-fast execution of provisioning steps.

use std::time::Instant;

use anyhow::{Context, Result};

use crate::core::error::ProvisionError;
use crate::core::step::{Step, StepAction, StepContext, StepOutcome};
use crate::util::shell::{format_duration, Status};

/// An ordered list of steps, run strictly in sequence.
pub struct Pipeline {
    steps: Vec<Box<dyn Step>>,
}

/// One row of a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub name: &'static str,
    pub installed: bool,
}

impl Pipeline {
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Pipeline { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Probe every step without installing anything.
    pub fn plan(&self, ctx: &StepContext) -> Result<Vec<PlanEntry>> {
        self.steps
            .iter()
            .map(|step| {
                let installed = step
                    .is_installed(ctx)
                    .with_context(|| format!("failed to probe step `{}`", step.name()))?;
                Ok(PlanEntry {
                    name: step.name(),
                    installed,
                })
            })
            .collect()
    }

    /// Run all steps in order.
    ///
    /// Steps whose probe reports the component present are skipped. The
    /// first failure stops the run; later steps are not probed or run.
    pub fn run(&self, ctx: &StepContext) -> Result<Vec<StepOutcome>, ProvisionError> {
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let name = step.name();
            let started = Instant::now();

            let installed = step.is_installed(ctx).map_err(|cause| {
                ProvisionError::StepFailed {
                    step: name.to_string(),
                    cause,
                }
            })?;

            if installed {
                ctx.shell
                    .status(Status::Skipped, format!("{name} (already installed)"));
                outcomes.push(StepOutcome {
                    name,
                    action: StepAction::Skipped,
                    duration: started.elapsed(),
                });
                continue;
            }

            ctx.shell.status(Status::Installing, name);
            step.install(ctx).map_err(|cause| ProvisionError::StepFailed {
                step: name.to_string(),
                cause,
            })?;

            let duration = started.elapsed();
            ctx.shell.status(
                Status::Finished,
                format!("{name} in {}", format_duration(duration)),
            );
            outcomes.push(StepOutcome {
                name,
                action: StepAction::Installed,
                duration,
            });
        }

        Ok(outcomes)
    }
}
