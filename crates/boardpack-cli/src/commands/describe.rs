use super::{
    descriptor_json, ensure_work_dir, json_pretty, spin_fail, spin_ok, spinner, EXIT_SUCCESS,
};
use boardpack_core::ArchiveDescriber;
use boardpack_remote::HttpFetcher;
use std::path::Path;

pub fn run(url: &str, work_dir: &Path, json: bool) -> Result<u8, String> {
    ensure_work_dir(work_dir)?;
    let fetcher = HttpFetcher::new();
    let describer = ArchiveDescriber::new(&fetcher, work_dir);

    let pb = if json {
        None
    } else {
        Some(spinner(&format!("downloading {url}…")))
    };
    let desc = describer.describe(url).map_err(|e| {
        if let Some(ref pb) = pb {
            spin_fail(pb, "download failed");
        }
        e.to_string()
    })?;
    if let Some(ref pb) = pb {
        spin_ok(pb, "archive described");
    }

    if json {
        println!("{}", json_pretty(&descriptor_json(url, &desc))?);
    } else {
        println!("archiveFileName: {}", desc.filename);
        println!("checksum: {}", desc.checksum);
        println!("size: {}", desc.size);
    }
    Ok(EXIT_SUCCESS)
}
