pub mod call;
pub mod config;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tm_domain::config::Config;
use tm_rpc::ParamValues;

/// typemodeler — drive a parametric CAD backend from the command line.
#[derive(Debug, Parser)]
#[command(name = "typemodeler", version, about)]
pub struct Cli {
    /// Backend root URL, overriding `backend.base_url` from the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether the backend answers its config endpoint.
    Probe,
    /// Turn a natural-language request into script code.
    Chat {
        /// What to build or change.
        message: String,
        /// Script to start from ("-" reads stdin).
        #[arg(long)]
        code: Option<PathBuf>,
        /// JSON file holding the transcript returned by a previous chat.
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Run a script and produce a mesh.
    Generate {
        /// Script file ("-" reads stdin).
        script: PathBuf,
        /// Parameter values as a JSON object.
        #[arg(long)]
        params: Option<String>,
    },
    /// Extract a script's parameter block.
    Params {
        script: PathBuf,
    },
    /// Check a script for errors and warnings.
    Validate {
        script: PathBuf,
    },
    /// Ask the backend to repair a script.
    Fix {
        script: PathBuf,
        /// Overwrite the script file with the fixed code.
        #[arg(long)]
        write: bool,
    },
    /// Export a script as STL and save the file.
    Export {
        script: PathBuf,
        #[arg(long)]
        params: Option<String>,
        /// Directory to save into (defaults to `downloads.dir`).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Fetch the script template for a library component.
    Template {
        component_id: String,
        #[arg(long)]
        params: Option<String>,
    },
    /// Save a backend file URL to disk.
    Download {
        url: String,
        /// Directory to save into (defaults to `downloads.dir`).
        #[arg(long)]
        out: Option<PathBuf>,
        /// File name to save as (defaults to the URL's last segment).
        #[arg(long)]
        filename: Option<String>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `TM_CONFIG` (or
/// `typemodeler.toml` by default).  A missing file yields the defaults.
/// Returns the parsed [`Config`] and the path that was used.
pub fn load_config(base_url: Option<&str>) -> anyhow::Result<(Config, String)> {
    let config_path =
        std::env::var("TM_CONFIG").unwrap_or_else(|_| "typemodeler.toml".into());

    let mut config = read_config(Path::new(&config_path))?;
    if let Some(url) = base_url {
        config.backend.base_url = url.to_owned();
    }
    Ok((config, config_path))
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Read a script from a file, or from stdin when the path is `-`.
pub fn read_script(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("reading script from stdin")?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Parse `--params`; absent means no parameters.
pub fn parse_params(raw: Option<&str>) -> anyhow::Result<ParamValues> {
    match raw {
        None => Ok(ParamValues::new()),
        Some(raw) => serde_json::from_str(raw).context("--params must be a JSON object"),
    }
}
