use super::{
    descriptor_json, ensure_work_dir, json_pretty, load_config, spin_fail, spin_ok, spinner,
    EXIT_SUCCESS,
};
use boardpack_core::generate;
use boardpack_remote::HttpFetcher;
use std::path::Path;

pub fn run(
    config_path: Option<&Path>,
    work_dir: &Path,
    output: Option<&str>,
    upstream: Option<&str>,
    json: bool,
) -> Result<u8, String> {
    let mut cfg = load_config(config_path)?;
    if let Some(o) = output {
        cfg.output_file = o.to_owned();
    }
    if let Some(u) = upstream {
        cfg.upstream_url = u.to_owned();
    }
    ensure_work_dir(work_dir)?;

    let pb = if json {
        None
    } else {
        Some(spinner("generating package index…"))
    };
    let result = match generate(&cfg, &HttpFetcher::new(), work_dir) {
        Ok(r) => {
            if let Some(ref pb) = pb {
                spin_ok(pb, "package index generated");
            }
            r
        }
        Err(e) => {
            if let Some(ref pb) = pb {
                spin_fail(pb, "generation failed");
            }
            return Err(e.to_string());
        }
    };

    let report = &result.report;
    if json {
        let mut archives = vec![descriptor_json(
            &report.platform.url,
            &report.platform.archive,
        )];
        archives.extend(
            report
                .tool
                .systems
                .iter()
                .map(|s| descriptor_json(&s.url, &s.archive)),
        );
        let payload = serde_json::json!({
            "output": result.output_path.display().to_string(),
            "platform": report.platform.name,
            "platform_version": report.platform.version,
            "tool": report.tool.name,
            "tool_version": report.tool.version,
            "upstream_platforms_replaced": report.upstream_platforms,
            "tools": report.upstream_tools + 1,
            "archives": archives,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "platform {} {}: {} ({} bytes)",
            report.platform.name,
            report.platform.version,
            report.platform.archive.filename,
            report.platform.archive.size
        );
        for system in &report.tool.systems {
            println!(
                "tool {} {} [{}]: {} ({} bytes)",
                report.tool.name,
                report.tool.version,
                system.host,
                system.archive.filename,
                system.archive.size
            );
        }
        println!("wrote {}", result.output_path.display());
    }
    Ok(EXIT_SUCCESS)
}
