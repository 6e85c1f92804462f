use std::path::PathBuf;

use anyhow::Context;
use bookshelf_app::Application;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about = "Bookshelf service tooling")]
struct Cli {
    /// Directory holding base.toml and <env>.toml (defaults to BOOKSHELF_CONFIG_DIR or ./config)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load: local, staging or production
    #[arg(long, global = true, env = "BOOKSHELF_ENV", default_value = "local")]
    env: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Create the tables every module needs, then exit
    InitDb,
    /// Print the effective configuration as JSON
    Config,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        match &self.config_dir {
            Some(dir) => Settings::from_dir(dir, &self.env),
            None => Settings::load_for(&self.env),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli
        .settings()
        .with_context(|| "failed to load Bookshelf settings")?;

    match cli.command {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(
                environment = ?settings.environment,
                address = %settings.server.bind_address(),
                "starting bookshelf server"
            );
            Application::bootstrap(settings).await?.serve().await
        }
        Command::InitDb => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(environment = ?settings.environment, "initializing database schema");
            bookshelf_app::init_db(&settings).await?;
            tracing::info!("database schema ready");
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
