//! Run configuration.
//!
//! Defaults cover a stock Debian bookworm host. A TOML file can override
//! any field; CLI flags override the file. All of it is read once at
//! startup and never mutated during a run.
//!
//! File locations:
//! - Global: `~/.hostforge/config.toml`
//! - Explicit: `--config <path>` (replaces the global file entirely)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::util::proxy::ProxySettings;

/// Hostforge configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Proxy scope settings
    pub proxy: ProxySettings,

    /// Feature-flag gates
    pub features: Features,

    /// Package index mirror
    pub mirror: Mirror,

    /// Pinned component versions
    pub versions: Versions,

    /// Filesystem layout
    pub paths: Paths,

    /// Package sets handed to the system package manager
    pub packages: Packages,

    /// Download locations
    pub urls: Urls,

    /// Optional SHA256 digests for downloaded archives
    pub checksums: Checksums,
}

/// Boolean gates for the optional step groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Install the managed runtime and build tool.
    pub install_runtime: bool,

    /// Install the native-image toolchain (static libc, zlib, packer).
    pub install_native_toolchain: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            install_runtime: true,
            install_native_toolchain: true,
        }
    }
}

/// Mirror descriptor rendered into the package index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mirror {
    /// Index kinds, one index line per kind and suite.
    pub kinds: Vec<String>,

    /// Mirror base URI.
    pub uri: String,

    /// Distribution suites.
    pub suites: Vec<String>,

    /// Repository components.
    pub components: Vec<String>,

    /// Keyring the index entries are signed with.
    pub signed_by: PathBuf,
}

impl Default for Mirror {
    fn default() -> Self {
        Mirror {
            kinds: vec!["deb".to_string()],
            uri: "https://deb.debian.org/debian".to_string(),
            suites: vec!["bookworm".to_string(), "bookworm-updates".to_string()],
            components: vec![
                "main".to_string(),
                "contrib".to_string(),
                "non-free-firmware".to_string(),
            ],
            signed_by: PathBuf::from("/usr/share/keyrings/debian-archive-keyring.gpg"),
        }
    }
}

/// Fixed component versions for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Versions {
    pub java: String,
    pub maven: String,
    pub musl: String,
    pub zlib: String,
    pub upx: String,
}

impl Default for Versions {
    fn default() -> Self {
        Versions {
            java: "21.0.2-graalce".to_string(),
            maven: "3.9.6".to_string(),
            musl: "1.2.5".to_string(),
            zlib: "1.3.1".to_string(),
            upx: "4.2.4".to_string(),
        }
    }
}

/// Filesystem layout for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Package index file, fully rewritten by the sources step.
    pub sources_list: PathBuf,

    /// Working directory for downloads and source builds.
    pub build_dir: PathBuf,

    /// Version manager install root.
    pub sdkman_root: PathBuf,

    /// Static toolchain install prefix.
    pub musl_root: PathBuf,

    /// Install location of the binary packer.
    pub upx_bin: PathBuf,

    /// Scratch space emptied at cleanup, directory preserved.
    pub scratch_dir: PathBuf,

    /// Directory whose `*.log` files are truncated at cleanup.
    pub log_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        let home = directories::BaseDirs::new()
            .map(|b| b.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("/root"));

        Paths {
            sources_list: PathBuf::from("/etc/apt/sources.list"),
            build_dir: PathBuf::from("/var/tmp/hostforge-build"),
            sdkman_root: home.join(".sdkman"),
            musl_root: PathBuf::from("/usr/local/musl"),
            upx_bin: PathBuf::from("/usr/local/bin/upx"),
            scratch_dir: PathBuf::from("/tmp"),
            log_dir: PathBuf::from("/var/log"),
        }
    }
}

/// Package sets installed through the system package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Packages {
    /// Base utilities every later step may rely on.
    pub common_tools: Vec<String>,

    /// Compiler and development packages for the native toolchain.
    pub native_prereqs: Vec<String>,
}

impl Default for Packages {
    fn default() -> Self {
        Packages {
            common_tools: [
                "curl",
                "wget",
                "zip",
                "unzip",
                "git",
                "vim",
                "ca-certificates",
                "xz-utils",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            native_prereqs: ["build-essential", "zlib1g-dev"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Download locations for components not served by the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Urls {
    /// Version manager bootstrap installer, piped to bash.
    pub sdkman_bootstrap: String,

    /// Base URL for musl source releases.
    pub musl_base: String,

    /// Base URL for zlib source releases.
    pub zlib_base: String,

    /// Base URL for upx binary releases.
    pub upx_base: String,
}

impl Default for Urls {
    fn default() -> Self {
        Urls {
            sdkman_bootstrap: "https://get.sdkman.io".to_string(),
            musl_base: "https://musl.libc.org/releases".to_string(),
            zlib_base: "https://zlib.net".to_string(),
            upx_base: "https://github.com/upx/upx/releases/download".to_string(),
        }
    }
}

/// Optional expected digests; downloads are verified when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checksums {
    pub musl: Option<String>,
    pub zlib: Option<String>,
    pub upx: Option<String>,
}

/// Configuration the operator got wrong, reported before anything runs.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("proxy enabled but no {side} proxy url configured")]
    #[diagnostic(
        code(hostforge::config::proxy_missing),
        help("pass --proxy-http/--proxy-https or set [proxy] urls in the config file")
    )]
    MissingProxyUrl { side: &'static str },

    #[error("invalid {side} proxy url `{url}`")]
    #[diagnostic(
        code(hostforge::config::proxy_url),
        help("expected an absolute url such as http://proxy.example.com:3128")
    )]
    InvalidProxyUrl {
        side: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("proxy url `{url}` has unsupported scheme `{scheme}`")]
    #[diagnostic(code(hostforge::config::proxy_scheme), help("use http or https"))]
    ProxyScheme { url: String, scheme: String },

    #[error("invalid url for {name}: `{url}`")]
    #[diagnostic(code(hostforge::config::url))]
    InvalidUrl {
        name: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("version for {name} must not be empty")]
    #[diagnostic(code(hostforge::config::version))]
    EmptyVersion { name: &'static str },
}

/// Flag-level overrides applied on top of the loaded file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub proxy: Option<bool>,
    pub proxy_http: Option<String>,
    pub proxy_https: Option<String>,
    pub install_runtime: Option<bool>,
    pub install_native_toolchain: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is
    /// missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Apply CLI overrides. Flags the operator did not pass leave the
    /// loaded values alone.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(enabled) = overrides.proxy {
            self.proxy.enabled = enabled;
        }
        if let Some(ref url) = overrides.proxy_http {
            self.proxy.http_url = url.clone();
        }
        if let Some(ref url) = overrides.proxy_https {
            self.proxy.https_url = url.clone();
        }
        if let Some(value) = overrides.install_runtime {
            self.features.install_runtime = value;
        }
        if let Some(value) = overrides.install_native_toolchain {
            self.features.install_native_toolchain = value;
        }
    }

    /// Validate the assembled configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proxy.enabled {
            validate_proxy_url("http", &self.proxy.http_url)?;
            validate_proxy_url("https", &self.proxy.https_url)?;
        }

        for (name, url) in [
            ("sdkman_bootstrap", &self.urls.sdkman_bootstrap),
            ("musl_base", &self.urls.musl_base),
            ("zlib_base", &self.urls.zlib_base),
            ("upx_base", &self.urls.upx_base),
        ] {
            Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                name,
                url: url.clone(),
                source,
            })?;
        }

        for (name, version) in [
            ("java", &self.versions.java),
            ("maven", &self.versions.maven),
            ("musl", &self.versions.musl),
            ("zlib", &self.versions.zlib),
            ("upx", &self.versions.upx),
        ] {
            if version.trim().is_empty() {
                return Err(ConfigError::EmptyVersion { name });
            }
        }

        Ok(())
    }
}

fn validate_proxy_url(side: &'static str, raw: &str) -> Result<(), ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::MissingProxyUrl { side });
    }

    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidProxyUrl {
        side,
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::ProxyScheme {
            url: raw.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

/// Get the global config file path (`~/.hostforge/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".hostforge").join("config.toml"))
}

/// Load configuration for a run.
///
/// An explicit path must load cleanly; the global file falls back to
/// defaults when broken so a stale config never bricks the tool.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => match global_config_path() {
            Some(path) if path.exists() => Ok(Config::load_or_default(&path)),
            _ => Ok(Config::default()),
        },
    }
}
