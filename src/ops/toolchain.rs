//! Static C toolchain built from source.
//!
//! Builds musl into its install root, aliases the wrapper compiler
//! under the target triple name, then builds zlib against the fresh
//! musl so native images have a static compression library to link.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::config::Config;
use crate::core::step::{Step, StepContext};
use crate::ops::fetch;
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;
use crate::util::{detect, fs};

/// The wrapper compiler the musl build installs.
pub fn musl_gcc(config: &Config) -> PathBuf {
    config.paths.musl_root.join("bin").join("musl-gcc")
}

/// Target-triple alias for build systems that look for a cross
/// compiler by name.
pub fn musl_gcc_alias(config: &Config) -> PathBuf {
    config
        .paths
        .musl_root
        .join("bin")
        .join("x86_64-linux-musl-gcc")
}

pub fn musl_source_url(config: &Config) -> String {
    format!(
        "{}/musl-{}.tar.gz",
        config.urls.musl_base.trim_end_matches('/'),
        config.versions.musl
    )
}

pub fn zlib_source_url(config: &Config) -> String {
    format!(
        "{}/zlib-{}.tar.gz",
        config.urls.zlib_base.trim_end_matches('/'),
        config.versions.zlib
    )
}

fn make_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builds musl and a musl-linked zlib from source.
pub struct StaticToolchainStep;

impl Step for StaticToolchainStep {
    fn name(&self) -> &'static str {
        "static-toolchain"
    }

    fn is_installed(&self, ctx: &StepContext) -> Result<bool> {
        Ok(detect::executable_at(&musl_gcc(&ctx.config)))
    }

    fn install(&self, ctx: &StepContext) -> Result<()> {
        build_musl(ctx)?;
        build_zlib(ctx)
    }
}

fn build_musl(ctx: &StepContext) -> Result<()> {
    let config = &ctx.config;
    let build_dir = &config.paths.build_dir;
    fs::ensure_dir(build_dir)?;

    let url = musl_source_url(config);
    let archive = build_dir.join(format!("musl-{}.tar.gz", config.versions.musl));
    ctx.with_proxy(|| {
        fetch::download_verified(ctx, &url, &archive, config.checksums.musl.as_deref())
    })?;
    fetch::extract(&archive, build_dir)?;

    let src = build_dir.join(format!("musl-{}", config.versions.musl));
    ctx.shell
        .status(Status::Building, format!("musl {}", config.versions.musl));

    ProcessBuilder::new(src.join("configure"))
        .cwd(&src)
        .arg("--disable-shared")
        .arg(format!("--prefix={}", config.paths.musl_root.display()))
        .run()
        .context("musl configure failed")?;
    ProcessBuilder::new("make")
        .cwd(&src)
        .arg(format!("-j{}", make_jobs()))
        .run()
        .context("musl build failed")?;
    ProcessBuilder::new("make")
        .cwd(&src)
        .arg("install")
        .run()
        .context("musl install failed")?;

    let alias = musl_gcc_alias(config);
    if !alias.exists() {
        fs::symlink(Path::new("musl-gcc"), &alias)
            .with_context(|| format!("failed to create alias {}", alias.display()))?;
    }

    Ok(())
}

fn build_zlib(ctx: &StepContext) -> Result<()> {
    let config = &ctx.config;
    let build_dir = &config.paths.build_dir;
    fs::ensure_dir(build_dir)?;

    let url = zlib_source_url(config);
    let archive = build_dir.join(format!("zlib-{}.tar.gz", config.versions.zlib));
    ctx.with_proxy(|| {
        fetch::download_verified(ctx, &url, &archive, config.checksums.zlib.as_deref())
    })?;
    fetch::extract(&archive, build_dir)?;

    let src = build_dir.join(format!("zlib-{}", config.versions.zlib));
    let cc = musl_gcc(config).display().to_string();
    ctx.shell.status(
        Status::Building,
        format!("zlib {} (CC=musl-gcc)", config.versions.zlib),
    );

    ProcessBuilder::new(src.join("configure"))
        .cwd(&src)
        .env("CC", &cc)
        .arg("--static")
        .arg(format!("--prefix={}", config.paths.musl_root.display()))
        .run()
        .context("zlib configure failed")?;
    ProcessBuilder::new("make")
        .cwd(&src)
        .env("CC", &cc)
        .arg(format!("-j{}", make_jobs()))
        .run()
        .context("zlib build failed")?;
    ProcessBuilder::new("make")
        .cwd(&src)
        .env("CC", &cc)
        .arg("install")
        .run()
        .context("zlib install failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context_with;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_default_source_urls() {
        let config = Config::default();
        assert_eq!(
            musl_source_url(&config),
            "https://musl.libc.org/releases/musl-1.2.5.tar.gz"
        );
        assert_eq!(zlib_source_url(&config), "https://zlib.net/zlib-1.3.1.tar.gz");
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let mut config = Config::default();
        config.urls.musl_base = "https://mirror.example.org/musl/".to_string();
        assert_eq!(
            musl_source_url(&config),
            "https://mirror.example.org/musl/musl-1.2.5.tar.gz"
        );
    }

    #[test]
    fn test_probe_requires_executable_compiler() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.musl_root = tmp.path().to_path_buf();

        let ctx = test_context_with(config.clone());
        assert!(!StaticToolchainStep.is_installed(&ctx).unwrap());

        let bin = musl_gcc(&config);
        std::fs::create_dir_all(bin.parent().unwrap()).unwrap();
        std::fs::write(&bin, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(StaticToolchainStep.is_installed(&ctx).unwrap());
    }

    #[test]
    fn test_alias_lives_next_to_compiler() {
        let config = Config::default();
        assert_eq!(
            musl_gcc_alias(&config),
            PathBuf::from("/usr/local/musl/bin/x86_64-linux-musl-gcc")
        );
    }
}
