pub mod config;
pub mod describe;
pub mod generate;

use boardpack_core::{BuildConfig, CoreError};
use boardpack_schema::ArchiveDescriptor;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_NETWORK_ERROR: u8 = 3;
pub const EXIT_INDEX_ERROR: u8 = 4;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Built-in defaults, or the file at `path` layered over them.
pub fn load_config(path: Option<&Path>) -> Result<BuildConfig, String> {
    match path {
        Some(p) => BuildConfig::load(p).map_err(|e| CoreError::from(e).to_string()),
        None => Ok(BuildConfig::default()),
    }
}

pub fn ensure_work_dir(dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("failed to create work directory {}: {e}", dir.display()))
}

pub fn descriptor_json(url: &str, desc: &ArchiveDescriptor) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "filename": desc.filename,
        "checksum": desc.checksum,
        "size": desc.size,
    })
}

/// Map an error message to an exit code by the prefix its error type uses.
pub fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("configuration error:") || msg.starts_with("config file error:") {
        EXIT_CONFIG_ERROR
    } else if msg.starts_with("fetch error:") {
        EXIT_NETWORK_ERROR
    } else if msg.starts_with("index error:") {
        EXIT_INDEX_ERROR
    } else {
        EXIT_FAILURE
    }
}
