//! Platform and tool records in their two stages: templates, which name an
//! archive URL but carry no archive facts yet, and described entries, which
//! always carry an [`ArchiveDescriptor`].

use serde::{Deserialize, Serialize};

/// Filename, checksum and size of one downloaded archive.
///
/// Serialized inline into its owning entry as `archiveFileName`, `checksum`
/// and `size`, with `size` written as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDescriptor {
    #[serde(rename = "archiveFileName")]
    pub filename: String,
    pub checksum: String,
    #[serde(with = "decimal_string")]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDependency {
    pub packager: String,
    pub name: String,
    pub version: String,
}

/// A core package definition whose archive has not been described yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTemplate {
    pub name: String,
    pub architecture: String,
    pub version: String,
    pub category: String,
    pub url: String,
    pub boards: Vec<BoardRef>,
    pub tools_dependencies: Vec<ToolDependency>,
}

impl PlatformTemplate {
    /// Describe the archive at `self.url` and produce the finished entry.
    pub fn describe_with<E>(
        self,
        describe: impl FnOnce(&str) -> Result<ArchiveDescriptor, E>,
    ) -> Result<PlatformEntry, E> {
        let archive = describe(&self.url)?;
        Ok(PlatformEntry {
            name: self.name,
            architecture: self.architecture,
            version: self.version,
            category: self.category,
            url: self.url,
            archive,
            boards: self.boards,
            tools_dependencies: self.tools_dependencies,
        })
    }
}

/// A described core package, as written into `packages[0].platforms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEntry {
    pub name: String,
    pub architecture: String,
    pub version: String,
    pub category: String,
    pub url: String,
    #[serde(flatten)]
    pub archive: ArchiveDescriptor,
    pub boards: Vec<BoardRef>,
    pub tools_dependencies: Vec<ToolDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTemplate {
    pub host: String,
    pub url: String,
}

/// A tool definition whose per-host archives have not been described yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolTemplate {
    pub name: String,
    pub version: String,
    pub systems: Vec<SystemTemplate>,
}

impl ToolTemplate {
    /// Describe every system variant in order. Stops at the first failure.
    pub fn describe_with<E>(
        self,
        mut describe: impl FnMut(&str) -> Result<ArchiveDescriptor, E>,
    ) -> Result<ToolEntry, E> {
        let mut systems = Vec::with_capacity(self.systems.len());
        for system in self.systems {
            let archive = describe(&system.url)?;
            systems.push(SystemVariant {
                host: system.host,
                url: system.url,
                archive,
            });
        }
        Ok(ToolEntry {
            name: self.name,
            version: self.version,
            systems,
        })
    }
}

/// One host-specific download of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemVariant {
    pub host: String,
    pub url: String,
    #[serde(flatten)]
    pub archive: ArchiveDescriptor,
}

/// A described tool, as appended to `packages[0].tools`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub version: String,
    pub systems: Vec<SystemVariant>,
}

mod decimal_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| D::Error::custom(format!("size must be a decimal string, got '{raw}'")))
    }
}
