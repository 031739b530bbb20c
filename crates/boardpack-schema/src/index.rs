use crate::entry::{PlatformEntry, ToolEntry};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read package index: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid package index: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("package index has no entries in 'packages'")]
    NoPackages,
    #[error("invalid package index: {0}")]
    Shape(String),
    #[error("failed to serialize package index: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A board-manager package index (`package_*_index.json`).
///
/// Only `packages` is modelled. Every other top-level key is kept as-is and
/// written back at its upstream position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PackageIndex {
    pub packages: Vec<Package>,
    extra: Map<String, Value>,
    packages_at: usize,
}

/// One vendor package inside the index, kept as an ordered JSON object.
///
/// `platforms` and `tools` are guaranteed to be arrays. Upstream platform and
/// tool objects stay raw JSON: platforms are discarded wholesale and tools
/// are passed through untouched. Overwritten keys keep their position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Package {
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for PackageIndex {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut packages = None;
        let mut packages_at = 0;
        let mut extra = Map::new();
        for (key, value) in fields {
            if key == "packages" {
                packages_at = extra.len();
                packages = Some(value);
            } else {
                extra.insert(key, value);
            }
        }
        let packages = packages.ok_or("missing field `packages`")?;
        let packages = serde_json::from_value(packages).map_err(|e| e.to_string())?;
        Ok(Self {
            packages,
            extra,
            packages_at,
        })
    }
}

impl Serialize for PackageIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        for (i, (key, value)) in self.extra.iter().enumerate() {
            if i == self.packages_at {
                map.serialize_entry("packages", &self.packages)?;
            }
            map.serialize_entry(key, value)?;
        }
        if self.packages_at >= self.extra.len() {
            map.serialize_entry("packages", &self.packages)?;
        }
        map.end()
    }
}

impl TryFrom<Map<String, Value>> for Package {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        for key in ["platforms", "tools"] {
            match fields.get(key) {
                Some(Value::Array(_)) => {}
                Some(_) => return Err(format!("invalid type for `{key}`, expected an array")),
                None => return Err(format!("missing field `{key}`")),
            }
        }
        Ok(Self { fields })
    }
}

impl Serialize for Package {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl PackageIndex {
    /// The first package, which is the only one this tool touches.
    pub fn first_package(&self) -> Result<&Package, IndexError> {
        self.packages.first().ok_or(IndexError::NoPackages)
    }

    pub fn first_package_mut(&mut self) -> Result<&mut Package, IndexError> {
        self.packages.first_mut().ok_or(IndexError::NoPackages)
    }

    /// A top-level key other than `packages`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl Package {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn platforms(&self) -> &[Value] {
        self.array("platforms")
    }

    pub fn tools(&self) -> &[Value] {
        self.array("tools")
    }

    /// Replace the maintainer and clear the contact fields.
    pub fn set_maintainer(&mut self, maintainer: &str) {
        self.fields
            .insert("maintainer".to_owned(), Value::String(maintainer.to_owned()));
        self.fields
            .insert("email".to_owned(), Value::String(String::new()));
        self.fields
            .insert("help".to_owned(), Value::Object(Map::new()));
    }

    /// Drop every upstream platform and install `platform` as the only one.
    pub fn replace_platforms(&mut self, platform: &PlatformEntry) -> Result<(), IndexError> {
        let value = serde_json::to_value(platform).map_err(IndexError::Serialize)?;
        self.fields
            .insert("platforms".to_owned(), Value::Array(vec![value]));
        Ok(())
    }

    /// Append `tool` after the upstream tools.
    pub fn push_tool(&mut self, tool: &ToolEntry) -> Result<(), IndexError> {
        let value = serde_json::to_value(tool).map_err(IndexError::Serialize)?;
        match self.fields.get_mut("tools") {
            Some(Value::Array(tools)) => {
                tools.push(value);
                Ok(())
            }
            _ => Err(IndexError::Shape("`tools` is not an array".to_owned())),
        }
    }

    fn array(&self, key: &str) -> &[Value] {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
    }
}

pub fn parse_index_slice(input: &[u8]) -> Result<PackageIndex, IndexError> {
    let index: PackageIndex = serde_json::from_slice(input).map_err(IndexError::Parse)?;
    index.first_package()?;
    Ok(index)
}

pub fn parse_index_file(path: impl AsRef<Path>) -> Result<PackageIndex, IndexError> {
    let content = fs::read(path)?;
    parse_index_slice(&content)
}
