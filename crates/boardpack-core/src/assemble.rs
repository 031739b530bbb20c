use crate::config::BuildConfig;
use crate::describe::ArchiveDescriber;
use crate::template::{platform_template, tool_template};
use crate::CoreError;
use boardpack_remote::Fetcher;
use boardpack_schema::{
    parse_index_file, to_index_json, PackageIndex, PlatformEntry, ToolEntry,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The merged index together with the entries that were described into it.
#[derive(Debug)]
pub struct AssembleReport {
    pub index: PackageIndex,
    pub platform: PlatformEntry,
    pub tool: ToolEntry,
    /// Platforms the upstream index listed before they were replaced.
    pub upstream_platforms: usize,
    /// Tools the upstream index listed; the custom tool follows them.
    pub upstream_tools: usize,
}

#[derive(Debug)]
pub struct GenerateResult {
    pub report: AssembleReport,
    pub output_path: PathBuf,
}

/// Build the custom index in memory.
///
/// Fetches the upstream index into `work_dir`, describes the platform
/// archive, rewrites the first package's maintainer fields, replaces its
/// platforms, describes every tool system and appends the tool. Stops at the
/// first error; nothing is retried.
pub fn assemble(
    cfg: &BuildConfig,
    fetcher: &dyn Fetcher,
    work_dir: &Path,
) -> Result<AssembleReport, CoreError> {
    cfg.validate()?;

    info!("fetching upstream index {}", cfg.upstream_url);
    let upstream_path = work_dir.join(&cfg.upstream_file);
    fetcher.fetch_to_file(&cfg.upstream_url, &upstream_path)?;
    let mut index = parse_index_file(&upstream_path)?;

    let describer = ArchiveDescriber::new(fetcher, work_dir);

    info!("describing core archive");
    let platform = platform_template(&cfg.platform).describe_with(|url| describer.describe(url))?;

    let package = index.first_package_mut()?;
    package.set_maintainer(&cfg.maintainer);
    let upstream_platforms = package.platforms().len();
    package.replace_platforms(&platform)?;
    debug!("replaced {upstream_platforms} upstream platform(s)");

    info!("describing tool '{}'", cfg.tool.name);
    let tool = tool_template(&cfg.tool).describe_with(|url| describer.describe(url))?;
    let upstream_tools = package.tools().len();
    package.push_tool(&tool)?;
    debug!("appended tool after {upstream_tools} upstream tool(s)");

    Ok(AssembleReport {
        index,
        platform,
        tool,
        upstream_platforms,
        upstream_tools,
    })
}

/// Write `index` to `path`, replacing any existing file.
pub fn write_index(index: &PackageIndex, path: &Path) -> Result<(), CoreError> {
    let bytes = to_index_json(index)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Assemble and write `work_dir/<output_file>`.
pub fn generate(
    cfg: &BuildConfig,
    fetcher: &dyn Fetcher,
    work_dir: &Path,
) -> Result<GenerateResult, CoreError> {
    let report = assemble(cfg, fetcher, work_dir)?;
    let output_path = work_dir.join(&cfg.output_file);
    write_index(&report.index, &output_path)?;
    info!("wrote {}", output_path.display());
    Ok(GenerateResult {
        report,
        output_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::sha256_checksum;
    use boardpack_remote::MemoryFetcher;
    use serde_json::{json, Value};

    const UPSTREAM: &[u8] = br#"{"packages":[{"name":"WCH","maintainer":"X","email":"x@x","help":{"a":1},"platforms":[{"name":"old"},{"name":"older"}],"tools":[{"name":"openocd"},{"name":"gcc"}]}]}"#;

    fn fetcher_for(cfg: &BuildConfig, upstream: &[u8], archive: &[u8]) -> MemoryFetcher {
        let mut fetcher = MemoryFetcher::new().with(&cfg.upstream_url, upstream);
        fetcher.insert(&cfg.platform.url, archive);
        for system in &cfg.tool.systems {
            fetcher.insert(&system.url, archive);
        }
        fetcher
    }

    #[test]
    fn assemble_replaces_platforms_and_appends_tool() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let fetcher = fetcher_for(&cfg, UPSTREAM, b"hello");

        let report = assemble(&cfg, &fetcher, dir.path()).unwrap();
        assert_eq!(report.upstream_platforms, 2);
        assert_eq!(report.upstream_tools, 2);

        let pkg = report.index.first_package().unwrap();
        assert_eq!(pkg.platforms().len(), 1);
        assert_eq!(pkg.platforms()[0], serde_json::to_value(&report.platform).unwrap());
        assert_eq!(pkg.tools().len(), 3);
        assert_eq!(pkg.tools()[0]["name"], "openocd");
        assert_eq!(pkg.tools()[2], serde_json::to_value(&report.tool).unwrap());
        assert_eq!(pkg.get("maintainer"), Some(&json!("verylowfreq")));
        assert_eq!(pkg.get("email"), Some(&json!("")));
        assert_eq!(pkg.get("help"), Some(&json!({})));
        assert_eq!(pkg.name.as_deref(), Some("WCH"));
    }

    #[test]
    fn assemble_describes_every_archive_once_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let fetcher = fetcher_for(&cfg, UPSTREAM, b"hello");
        assemble(&cfg, &fetcher, dir.path()).unwrap();

        let mut expected = vec![cfg.upstream_url.clone(), cfg.platform.url.clone()];
        expected.extend(cfg.tool.systems.iter().map(|s| s.url.clone()));
        assert_eq!(fetcher.requests(), expected);
    }

    #[test]
    fn assemble_populates_every_variant() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let fetcher = fetcher_for(&cfg, UPSTREAM, b"hello");
        let report = assemble(&cfg, &fetcher, dir.path()).unwrap();

        assert_eq!(report.platform.archive.filename, "arduino_core_ch32_sz-1.0.4+sz4.zip");
        assert_eq!(report.tool.systems.len(), 3);
        for variant in &report.tool.systems {
            assert!(!variant.archive.filename.is_empty());
            assert_eq!(variant.archive.checksum, sha256_checksum(b"hello"));
            assert_eq!(variant.archive.size, 5);
            assert!(dir.path().join(&variant.archive.filename).exists());
        }
        assert!(dir.path().join(&cfg.upstream_file).exists());
    }

    #[test]
    fn invalid_config_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = BuildConfig::default();
        cfg.platform.url = "https://example.com/releases/".to_owned();
        let fetcher = fetcher_for(&cfg, UPSTREAM, b"hello");

        let err = assemble(&cfg, &fetcher, dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)), "{err}");
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn malformed_upstream_names_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let fetcher = fetcher_for(&cfg, br#"{"packages":[{"tools":[]}]}"#, b"hello");

        let err = assemble(&cfg, &fetcher, dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Index(_)), "{err}");
        assert!(err.to_string().contains("platforms"), "{err}");
        assert_eq!(fetcher.requests(), [cfg.upstream_url.clone()]);
    }

    #[test]
    fn missing_archive_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let mut fetcher = MemoryFetcher::new().with(&cfg.upstream_url, UPSTREAM);
        fetcher.insert(&cfg.platform.url, b"hello");

        let err = generate(&cfg, &fetcher, dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Fetch(_)), "{err}");
        assert!(!dir.path().join(&cfg.output_file).exists());
    }

    #[test]
    fn generate_writes_index_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let fetcher = fetcher_for(&cfg, UPSTREAM, b"hello");

        let result = generate(&cfg, &fetcher, dir.path()).unwrap();
        assert_eq!(result.output_path, dir.path().join("package_ch32v_index_sz.json"));

        let text = std::fs::read_to_string(&result.output_path).unwrap();
        assert!(text.starts_with("{\n    \"packages\": [\n        {\n"));
        assert!(text.contains("\"help\": {},"));
        assert!(!text.ends_with('\n'));

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["packages"][0]["platforms"][0]["version"], "1.0.4+sz4");
        assert_eq!(value["packages"][0]["tools"][2]["systems"][0]["size"], "5");
    }

    #[test]
    fn generate_passes_untouched_fields_through_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let upstream = br#"{"version":1,"packages":[{"platforms":[],"tools":[],"websiteURL":null,"help":"https://x","maintainer":"X"}]}"#;
        let fetcher = fetcher_for(&cfg, upstream, b"hello");

        let result = generate(&cfg, &fetcher, dir.path()).unwrap();
        let text = std::fs::read_to_string(&result.output_path).unwrap();
        assert!(text.starts_with("{\n    \"version\": 1,\n    \"packages\": ["), "{text}");
        assert!(text.contains("\"websiteURL\": null,"), "{text}");

        let value: Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&str> = value["packages"][0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            ["platforms", "tools", "websiteURL", "help", "maintainer", "email"]
        );
        assert_eq!(value["packages"][0]["help"], json!({}));
    }

    #[test]
    fn generate_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        std::fs::write(dir.path().join(&cfg.output_file), vec![b'x'; 100_000]).unwrap();
        let fetcher = fetcher_for(&cfg, UPSTREAM, b"hello");

        let result = generate(&cfg, &fetcher, dir.path()).unwrap();
        let value: Value =
            serde_json::from_slice(&std::fs::read(&result.output_path).unwrap()).unwrap();
        assert_eq!(value["packages"][0]["maintainer"], json!("verylowfreq"));
    }

    #[test]
    fn two_runs_give_identical_output_and_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = BuildConfig::default();
        let fetcher = fetcher_for(&cfg, UPSTREAM, b"hello");

        let first = generate(&cfg, &fetcher, dir.path()).unwrap();
        let first_bytes = std::fs::read(&first.output_path).unwrap();
        let second = generate(&cfg, &fetcher, dir.path()).unwrap();
        let second_bytes = std::fs::read(&second.output_path).unwrap();

        assert_eq!(first.report.platform, second.report.platform);
        assert_eq!(first.report.tool, second.report.tool);
        assert_eq!(first_bytes, second_bytes);
        assert_eq!(fetcher.request_count(&cfg.platform.url), 2);
        assert_eq!(fetcher.request_count(&cfg.upstream_url), 2);
    }
}
