use super::{json_pretty, load_config, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use boardpack_core::CoreError;
use std::path::Path;

/// Print the effective configuration. With `check`, also validate it and
/// exit non-zero if it would fail before any download.
pub fn run(config_path: Option<&Path>, check: bool, json: bool) -> Result<u8, String> {
    let cfg = load_config(config_path)?;

    if json {
        println!("{}", json_pretty(&cfg)?);
    } else {
        let text = cfg
            .to_toml_string()
            .map_err(|e| CoreError::from(e).to_string())?;
        print!("{text}");
    }

    if check {
        if let Err(e) = cfg.validate() {
            eprintln!("error: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }
    }
    Ok(EXIT_SUCCESS)
}
