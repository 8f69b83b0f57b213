//! Package index configuration.
//!
//! Rewrites the sources list from the configured mirror and refreshes
//! the package index. The file is regenerated on every run, never
//! merged, so a host with hand-edited or drifted entries converges back
//! to the configured mirror.

use anyhow::Result;

use crate::core::config::Mirror;
use crate::core::step::{Step, StepContext};
use crate::ops::apt;
use crate::util::fs;
use crate::util::shell::Status;

/// Render the sources list for a mirror, one entry per kind and suite.
pub fn render(mirror: &Mirror) -> String {
    let mut out = String::from("# managed by hostforge; local edits will be overwritten\n");

    for kind in &mirror.kinds {
        for suite in &mirror.suites {
            out.push_str(&format!(
                "{} [signed-by={}] {} {} {}\n",
                kind,
                mirror.signed_by.display(),
                mirror.uri,
                suite,
                mirror.components.join(" ")
            ));
        }
    }

    out
}

/// Rewrites the sources list, then updates and upgrades the package set.
pub struct SourcesStep;

impl Step for SourcesStep {
    fn name(&self) -> &'static str {
        "configure-sources"
    }

    fn is_installed(&self, _ctx: &StepContext) -> Result<bool> {
        // Always rewritten; the render is deterministic and update is
        // cheap compared to a wrong mirror going unnoticed.
        Ok(false)
    }

    fn install(&self, ctx: &StepContext) -> Result<()> {
        let rendered = render(&ctx.config.mirror);
        fs::write_string(&ctx.config.paths.sources_list, &rendered)?;
        ctx.shell.status(
            Status::Updated,
            ctx.config.paths.sources_list.display().to_string(),
        );

        ctx.with_proxy(|| {
            apt::update()?;
            apt::upgrade()
        })
    }
}
