//! Version manager bootstrap and managed-runtime installation.
//!
//! The version manager is a shell-function toolkit, not a binary, so
//! every `sdk` invocation goes through `bash -c` with its init script
//! sourced first.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::core::config::Config;
use crate::core::step::{Step, StepContext};
use crate::util::detect;
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;

/// Path of the init script the installer drops into the install root.
pub fn init_script(config: &Config) -> PathBuf {
    config.paths.sdkman_root.join("bin").join("sdkman-init.sh")
}

/// Build an `sdk <args>` invocation with the init script sourced.
///
/// `sdkman_auto_answer` suppresses the installer's interactive
/// default-version prompts.
pub fn sdk_command(config: &Config, sdk_args: &str) -> ProcessBuilder {
    ProcessBuilder::new("bash")
        .arg("-c")
        .arg(format!(
            "source '{}' && sdk {}",
            init_script(config).display(),
            sdk_args
        ))
        .env("SDKMAN_DIR", config.paths.sdkman_root.display().to_string())
        .env("sdkman_auto_answer", "true")
}

/// Bootstraps the version manager from its install script.
pub struct VersionManagerStep;

impl Step for VersionManagerStep {
    fn name(&self) -> &'static str {
        "version-manager"
    }

    fn is_installed(&self, ctx: &StepContext) -> Result<bool> {
        Ok(init_script(&ctx.config).is_file() || detect::binary_on_path("sdk").is_some())
    }

    fn install(&self, ctx: &StepContext) -> Result<()> {
        let url = ctx.config.urls.sdkman_bootstrap.clone();
        let sdkman_root = ctx.config.paths.sdkman_root.clone();

        ctx.with_proxy(|| {
            ProcessBuilder::new("bash")
                .arg("-c")
                .arg(format!("curl -fsSL {url} | bash"))
                .env("SDKMAN_DIR", sdkman_root.display().to_string())
                .run()
                .with_context(|| format!("failed to bootstrap version manager from {url}"))
        })?;

        let script = init_script(&ctx.config);
        if !script.is_file() {
            bail!(
                "version manager install finished but {} is missing",
                script.display()
            );
        }

        Ok(())
    }
}

/// Installs the pinned runtime and build tool through the version
/// manager.
pub struct RuntimeStep;

impl Step for RuntimeStep {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn is_installed(&self, _ctx: &StepContext) -> Result<bool> {
        // No existence probe: `sdk install` of an already-present
        // version is safe, and the pinned version may differ from
        // whatever the host currently has as its default.
        Ok(false)
    }

    fn install(&self, ctx: &StepContext) -> Result<()> {
        let config = ctx.config.clone();

        ctx.with_proxy(|| {
            for (candidate, version) in [
                ("java", &config.versions.java),
                ("maven", &config.versions.maven),
            ] {
                ctx.shell
                    .status(Status::Installing, format!("{candidate} {version}"));
                sdk_command(&config, &format!("install {candidate} {version}"))
                    .run()
                    .with_context(|| format!("sdk install {candidate} {version} failed"))?;
            }
            Ok(())
        })
    }
}
