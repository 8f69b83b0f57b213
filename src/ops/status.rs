//! Host readiness report.
//!
//! Reuses the steps' idempotency signals to answer "what is already on
//! this machine" without touching anything, so it runs fine without
//! root. Components gated off by a feature flag are reported as
//! optional rather than hidden.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::config::Config;
use crate::ops::{sdkman, toolchain};
use crate::util::detect;

/// Probe result for a single component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    /// Component name
    pub name: &'static str,

    /// Whether the component is present
    pub installed: bool,

    /// Whether a provision run would need it
    pub required: bool,

    /// Where it was found (if anywhere)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Human-readable detail line
    pub detail: String,
}

impl ComponentStatus {
    fn present(name: &'static str, detail: impl Into<String>) -> Self {
        ComponentStatus {
            name,
            installed: true,
            required: true,
            path: None,
            detail: detail.into(),
        }
    }

    fn missing(name: &'static str, detail: impl Into<String>) -> Self {
        ComponentStatus {
            name,
            installed: false,
            required: true,
            path: None,
            detail: detail.into(),
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// Full readiness report.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub components: Vec<ComponentStatus>,
}

impl StatusReport {
    /// Whether every component a provision run needs is present.
    pub fn all_required_installed(&self) -> bool {
        self.components
            .iter()
            .filter(|c| c.required)
            .all(|c| c.installed)
    }

    pub fn installed_count(&self) -> usize {
        self.components.iter().filter(|c| c.installed).count()
    }

    pub fn missing_count(&self) -> usize {
        self.components.iter().filter(|c| !c.installed).count()
    }

    pub fn required_missing_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| c.required && !c.installed)
            .count()
    }
}

/// Probe every component.
pub fn gather(config: &Config) -> StatusReport {
    let runtime = config.features.install_runtime;
    let native = config.features.install_native_toolchain;

    StatusReport {
        components: vec![
            check_common_tools(config),
            check_version_manager(config),
            gate(check_candidate(config, "java", "java", &config.versions.java), runtime),
            gate(check_candidate(config, "maven", "mvn", &config.versions.maven), runtime),
            gate(check_static_toolchain(config), native),
            gate(check_static_zlib(config), native),
            gate(check_packer(config), native),
        ],
    }
}

fn gate(status: ComponentStatus, required: bool) -> ComponentStatus {
    if required {
        status
    } else {
        status.optional()
    }
}

/// Binary to probe for a package, where the two differ.
fn probe_binary(package: &str) -> Option<&str> {
    match package {
        "xz-utils" => Some("xz"),
        "ca-certificates" => None,
        _ => Some(package),
    }
}

fn check_common_tools(config: &Config) -> ComponentStatus {
    let mut missing = Vec::new();
    let mut probed = 0usize;

    for package in &config.packages.common_tools {
        let Some(binary) = probe_binary(package) else {
            continue;
        };
        probed += 1;
        if detect::binary_on_path(binary).is_none() {
            missing.push(package.as_str());
        }
    }

    if missing.is_empty() {
        ComponentStatus::present("common-tools", format!("{probed} tools on PATH"))
    } else {
        ComponentStatus::missing("common-tools", format!("missing: {}", missing.join(", ")))
    }
}

fn check_version_manager(config: &Config) -> ComponentStatus {
    let script = sdkman::init_script(config);
    if script.is_file() {
        return ComponentStatus::present("version-manager", "init script present")
            .with_path(script);
    }
    if let Some(path) = detect::binary_on_path("sdk") {
        return ComponentStatus::present("version-manager", "sdk on PATH").with_path(path);
    }
    ComponentStatus::missing("version-manager", "not installed")
}

fn check_candidate(
    config: &Config,
    name: &'static str,
    binary: &str,
    version: &str,
) -> ComponentStatus {
    let managed = config
        .paths
        .sdkman_root
        .join("candidates")
        .join(name)
        .join("current")
        .join("bin")
        .join(binary);

    if detect::executable_at(&managed) {
        return ComponentStatus::present(name, format!("managed (pinned {version})"))
            .with_path(managed);
    }
    if let Some(path) = detect::binary_on_path(binary) {
        return ComponentStatus::present(name, "on PATH, not managed").with_path(path);
    }
    ComponentStatus::missing(name, format!("not installed (pinned {version})"))
}

fn check_static_toolchain(config: &Config) -> ComponentStatus {
    let compiler = toolchain::musl_gcc(config);
    if !detect::executable_at(&compiler) {
        return ComponentStatus::missing("static-toolchain", "musl-gcc not installed");
    }

    let detail = if toolchain::musl_gcc_alias(config).exists() {
        "musl-gcc present, alias present"
    } else {
        "musl-gcc present, alias missing"
    };
    ComponentStatus::present("static-toolchain", detail).with_path(compiler)
}

fn check_static_zlib(config: &Config) -> ComponentStatus {
    let lib = config.paths.musl_root.join("lib").join("libz.a");
    if lib.exists() {
        ComponentStatus::present("static-zlib", "libz.a present").with_path(lib)
    } else {
        ComponentStatus::missing("static-zlib", "libz.a missing")
    }
}

fn check_packer(config: &Config) -> ComponentStatus {
    let bin = config.paths.upx_bin.clone();
    if detect::executable_at(&bin) {
        ComponentStatus::present("binary-packer", bin.display().to_string()).with_path(bin)
    } else {
        ComponentStatus::missing(
            "binary-packer",
            format!("not installed at {}", bin.display()),
        )
    }
}

/// Format the report for display.
pub fn format_report(report: &StatusReport) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    writeln!(output, "Host Status").unwrap();
    writeln!(output, "===========\n").unwrap();

    for component in &report.components {
        let marker = if component.installed { "[OK]" } else { "[--]" };
        let optional = if component.required { "" } else { " (optional)" };
        writeln!(
            output,
            "  {} {:<18} {}{}",
            marker, component.name, component.detail, optional
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "Summary: {} installed, {} missing ({} required)",
        report.installed_count(),
        report.missing_count(),
        report.required_missing_count()
    )
    .unwrap();

    output
}
