//! Binary-packing utility installed from a release archive.

use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;

use anyhow::{Context, Result};

use crate::core::config::Config;
use crate::core::step::{Step, StepContext};
use crate::ops::fetch;
use crate::util::shell::Status;
use crate::util::{detect, fs};

/// Archive stem of a release, also the directory name inside it.
pub fn release_name(version: &str) -> String {
    format!("upx-{version}-amd64_linux")
}

pub fn release_url(config: &Config) -> String {
    format!(
        "{}/v{}/{}.tar.xz",
        config.urls.upx_base.trim_end_matches('/'),
        config.versions.upx,
        release_name(&config.versions.upx)
    )
}

/// Installs the packer binary into its fixed system path.
pub struct PackerStep;

impl Step for PackerStep {
    fn name(&self) -> &'static str {
        "binary-packer"
    }

    fn is_installed(&self, ctx: &StepContext) -> Result<bool> {
        Ok(detect::executable_at(&ctx.config.paths.upx_bin))
    }

    fn install(&self, ctx: &StepContext) -> Result<()> {
        let config = &ctx.config;
        let build_dir = &config.paths.build_dir;
        fs::ensure_dir(build_dir)?;

        let name = release_name(&config.versions.upx);
        let url = release_url(config);
        let archive = build_dir.join(format!("{name}.tar.xz"));
        ctx.with_proxy(|| {
            fetch::download_verified(ctx, &url, &archive, config.checksums.upx.as_deref())
        })?;
        fetch::extract(&archive, build_dir)?;

        let extracted = build_dir.join(&name).join("upx");
        let dest = &config.paths.upx_bin;
        if let Some(parent) = dest.parent() {
            fs::ensure_dir(parent)?;
        }
        std::fs::copy(&extracted, dest).with_context(|| {
            format!(
                "failed to install {} to {}",
                extracted.display(),
                dest.display()
            )
        })?;
        std::fs::set_permissions(dest, Permissions::from_mode(0o755))
            .with_context(|| format!("failed to mark {} executable", dest.display()))?;

        ctx.shell
            .status(Status::Installed, dest.display().to_string());
        Ok(())
    }
}
