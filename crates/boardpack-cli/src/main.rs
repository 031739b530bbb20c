mod commands;

use clap::{Parser, Subcommand};
use commands::exit_code_for;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "boardpack",
    version,
    about = "Generate a board-manager package index for custom-hosted archives"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    // `generate` with built-in defaults when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the upstream index, describe every archive and write the merged index.
    Generate {
        /// TOML file overriding the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory for the upstream copy, downloaded archives and output.
        #[arg(long, default_value = ".")]
        work_dir: PathBuf,
        /// Output file name inside the work directory.
        #[arg(long)]
        output: Option<String>,
        /// Upstream index URL (overrides config).
        #[arg(long)]
        upstream: Option<String>,
    },
    /// Download one archive and print its filename, checksum and size.
    Describe {
        /// Archive URL; the last path segment becomes the local file name.
        url: String,
        /// Directory the archive is downloaded into.
        #[arg(long, default_value = ".")]
        work_dir: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config {
        /// TOML file overriding the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Validate the configuration and exit non-zero if it is unusable.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("BOARDPACK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        None => commands::generate::run(None, Path::new("."), None, None, json_output),
        Some(Commands::Generate {
            config,
            work_dir,
            output,
            upstream,
        }) => commands::generate::run(
            config.as_deref(),
            &work_dir,
            output.as_deref(),
            upstream.as_deref(),
            json_output,
        ),
        Some(Commands::Describe { url, work_dir }) => {
            commands::describe::run(&url, &work_dir, json_output)
        }
        Some(Commands::Config { config, check }) => {
            commands::config::run(config.as_deref(), check, json_output)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}
