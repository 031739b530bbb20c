//! Builders for the custom platform and tool records.

use crate::config::{PlatformConfig, ToolConfig};
use boardpack_schema::{BoardRef, PlatformTemplate, SystemTemplate, ToolTemplate};

pub fn platform_template(cfg: &PlatformConfig) -> PlatformTemplate {
    PlatformTemplate {
        name: cfg.name.clone(),
        architecture: cfg.architecture.clone(),
        version: cfg.full_version(),
        category: cfg.category.clone(),
        url: cfg.url.clone(),
        boards: cfg
            .boards
            .iter()
            .map(|name| BoardRef { name: name.clone() })
            .collect(),
        tools_dependencies: cfg.tools_dependencies.clone(),
    }
}

pub fn tool_template(cfg: &ToolConfig) -> ToolTemplate {
    ToolTemplate {
        name: cfg.name.clone(),
        version: cfg.version.clone(),
        systems: cfg
            .systems
            .iter()
            .map(|s| SystemTemplate {
                host: s.host.clone(),
                url: s.url.clone(),
            })
            .collect(),
    }
}
