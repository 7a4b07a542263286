use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use janasampark::config::{Config, LoggingConfig};
use janasampark::models::Session;
use janasampark::{AppState, build_assistant, build_router, repl};

#[derive(Parser)]
#[command(name = "janasampark", version, about = "Maratha reservation help desk")]
struct Cli {
    /// Path to config.toml (default: conf/config.toml or ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Chat in the terminal
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Command::Serve { host: None, port: None });
    let console = matches!(command, Command::Serve { .. });
    let _guard = init_logging(&config.logging, console)?;

    let assistant = build_assistant(&config).context("Failed to initialize assistant")?;

    match command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let state = Arc::new(AppState::new(assistant, config.defaults.clone()));
            let app = build_router(state);

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("🚀 Janasampark listening on http://{}", addr);
            tracing::info!("📚 API docs at http://{}/api-docs", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        },
        Command::Chat => {
            let mut session = Session::new(config.defaults.clone());
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run(&assistant, &mut session, stdin, tokio::io::stdout()).await?;
        },
    }

    Ok(())
}

/// Console output goes to stderr; in chat mode only the log file is written
/// so that replies are not interleaved with log lines.
fn init_logging(cfg: &LoggingConfig, console: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = console.then(|| fmt::layer().with_writer(std::io::stderr));

    let (file_layer, guard) = match &cfg.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("janasampark.log");

            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
