use crate::describe::filename_from_url;
use crate::CoreError;
use boardpack_schema::ToolDependency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_UPSTREAM_URL: &str =
    "https://raw.githubusercontent.com/openwch/board_manager_files/main/package_ch32v_index.json";
pub const DEFAULT_MAINTAINER: &str = "verylowfreq";
pub const DEFAULT_UPSTREAM_FILE: &str = "upstream_package_ch32v_index.json";
pub const DEFAULT_OUTPUT_FILE: &str = "package_ch32v_index_sz.json";

const CORE_VERSION: &str = "1.0.4";
const CORE_VERSION_APPENDIX: &str = "+sz4";
const CORE_ARCHIVE_URL: &str = "https://github.com/verylowfreq/arduino_core_ch32_sz/releases/download/1.0.4-sz4/arduino_core_ch32_sz-1.0.4+sz4.zip";
const CORE_NAME: &str = "CH32V Boards by M.S.";

const WCHISP_VERSION: &str = "0.2.3+sz1";
const WCHISP_RELEASE_URL: &str = "https://github.com/ch32-rs/wchisp/releases/download/v0.2.3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeToml(#[from] toml::ser::Error),
}

/// Everything one generation run needs.
///
/// Every field has a built-in default, so a config file only has to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Vendor-published index the output is derived from.
    pub upstream_url: String,
    pub maintainer: String,
    /// Local copy of the upstream index, relative to the work directory.
    pub upstream_file: String,
    /// Generated index, relative to the work directory.
    pub output_file: String,
    pub platform: PlatformConfig,
    pub tool: ToolConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    pub name: String,
    pub architecture: String,
    pub version: String,
    /// Appended verbatim to `version` (e.g. `+sz4`).
    pub version_appendix: String,
    pub category: String,
    pub url: String,
    pub boards: Vec<String>,
    pub tools_dependencies: Vec<ToolDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub name: String,
    pub version: String,
    pub systems: Vec<SystemConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    pub host: String,
    pub url: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_owned(),
            maintainer: DEFAULT_MAINTAINER.to_owned(),
            upstream_file: DEFAULT_UPSTREAM_FILE.to_owned(),
            output_file: DEFAULT_OUTPUT_FILE.to_owned(),
            platform: PlatformConfig::default(),
            tool: ToolConfig::default(),
        }
    }
}

fn wch_dependency(name: &str, version: &str) -> ToolDependency {
    ToolDependency {
        packager: "WCH".to_owned(),
        name: name.to_owned(),
        version: version.to_owned(),
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: CORE_NAME.to_owned(),
            architecture: "ch32v".to_owned(),
            version: CORE_VERSION.to_owned(),
            version_appendix: CORE_VERSION_APPENDIX.to_owned(),
            category: "Contributed".to_owned(),
            url: CORE_ARCHIVE_URL.to_owned(),
            boards: vec![CORE_NAME.to_owned()],
            tools_dependencies: vec![
                wch_dependency("riscv-none-embed-gcc", "8.2.0"),
                wch_dependency("openocd", "1.0.0"),
                wch_dependency("beforeinstall", "1.0.0"),
                wch_dependency("wchisp", WCHISP_VERSION),
            ],
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        let system = |host: &str, asset: &str| SystemConfig {
            host: host.to_owned(),
            url: format!("{WCHISP_RELEASE_URL}/{asset}"),
        };
        Self {
            name: "wchisp".to_owned(),
            version: WCHISP_VERSION.to_owned(),
            systems: vec![
                system("x86_64-linux-gnu", "wchisp-v0.2.3-linux-x64.tar.gz"),
                system("i686-mingw32", "wchisp-v0.2.3-win-x64.zip"),
                system("x86_64-apple-darwin", "wchisp-v0.2.3-macos-x64.zip"),
            ],
        }
    }
}

impl PlatformConfig {
    pub fn full_version(&self) -> String {
        format!("{}{}", self.version, self.version_appendix)
    }
}

impl BuildConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check everything that can be checked without the network: output
    /// names are set, every archive URL yields a filename, the tool has at
    /// least one system.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.upstream_file.is_empty() || self.output_file.is_empty() {
            return Err(CoreError::Config(
                "upstream_file and output_file must not be empty".to_owned(),
            ));
        }
        if self.upstream_file == self.output_file {
            return Err(CoreError::Config(format!(
                "upstream_file and output_file are both '{}'",
                self.output_file
            )));
        }
        if self.tool.systems.is_empty() {
            return Err(CoreError::Config(format!(
                "tool '{}' has no systems",
                self.tool.name
            )));
        }
        filename_from_url(&self.platform.url)?;
        for system in &self.tool.systems {
            filename_from_url(&system.url)?;
        }
        Ok(())
    }
}
