use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tm_cli::cli::{self, Cli, Command, ConfigCommand};
use tm_domain::config::ObservabilityConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let (config, config_path) = cli::load_config(args.base_url.as_deref())?;
    init_tracing(&config.observability, args.json_logs);

    let ok = match args.command {
        Command::Config(ConfigCommand::Validate) => cli::config::validate(&config, &config_path),
        Command::Config(ConfigCommand::Show) => {
            cli::config::show(&config)?;
            true
        }
        Command::Version => {
            println!("typemodeler {}", env!("CARGO_PKG_VERSION"));
            true
        }
        command => cli::call::run(&config, command).await?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Logs go to stderr so stdout stays a clean JSON envelope.
fn init_tracing(obs: &ObservabilityConfig, force_json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&obs.filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if obs.json_logs || force_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
