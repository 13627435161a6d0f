//! Capability subcommands.  Each prints the call's JSON envelope to stdout
//! and reports whether it succeeded.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::{json, Value};
use tm_domain::config::Config;
use tm_rpc::{Downloader, Envelope, ModelerApi, RpcClient};
use tm_workbench::export_file;

use super::{parse_params, read_script, Command};

pub async fn run(config: &Config, command: Command) -> anyhow::Result<bool> {
    let client = RpcClient::new(&config.backend).context("building backend client")?;

    match command {
        Command::Probe => probe(&client).await,
        Command::Chat {
            message,
            code,
            history,
        } => {
            let code = match code {
                Some(path) => read_script(&path)?,
                None => String::new(),
            };
            let history = match history {
                Some(path) => read_history(&path)?,
                None => Vec::new(),
            };
            print(&client.chat_to_code(&message, &history, &code).await)
        }
        Command::Generate { script, params } => {
            let code = read_script(&script)?;
            let params = parse_params(params.as_deref())?;
            print(&client.generate_mesh(&code, &params).await)
        }
        Command::Params { script } => {
            print(&client.parse_parameters(&read_script(&script)?).await)
        }
        Command::Validate { script } => {
            print(&client.validate_code(&read_script(&script)?).await)
        }
        Command::Fix { script, write } => {
            let fix = client.auto_fix_code(&read_script(&script)?).await;
            if let Some(data) = fix.data.as_ref().filter(|_| write && fix.success) {
                if script != Path::new("-") && !data.fixed_code.is_empty() {
                    std::fs::write(&script, &data.fixed_code)
                        .with_context(|| format!("writing {}", script.display()))?;
                    tracing::info!(path = %script.display(), "script rewritten");
                }
            }
            print(&fix)
        }
        Command::Export {
            script,
            params,
            out,
        } => {
            let code = read_script(&script)?;
            let params = parse_params(params.as_deref())?;
            let dest = dest_dir(config, out);
            print(&export_file(&client, &client, &code, &params, &dest).await)
        }
        Command::Template {
            component_id,
            params,
        } => {
            let params = parse_params(params.as_deref())?;
            print(&client.get_component_template(&component_id, &params).await)
        }
        Command::Download { url, out, filename } => {
            let dest = dest_dir(config, out);
            let saved: Envelope<Value> = client
                .download(&url, &dest, filename.as_deref())
                .await
                .map(|path| json!({ "path": path }))
                .into();
            print(&saved)
        }
        Command::Config(_) | Command::Version => {
            anyhow::bail!("not a backend command")
        }
    }
}

async fn probe(client: &RpcClient) -> anyhow::Result<bool> {
    let connected = client.probe_connection().await;
    let mut report = json!({
        "connected": connected,
        "baseUrl": client.base_url(),
    });
    if connected {
        report["apiPrefix"] = Value::from(client.ensure_initialized().await);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(connected)
}

fn print<T: Serialize>(envelope: &Envelope<T>) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(envelope.success)
}

fn read_history(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} must hold a JSON array", path.display()))
}

fn dest_dir(config: &Config, out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| config.downloads.dir.clone())
}
