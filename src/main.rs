//! Keysentry — keystroke capture analysis server

use anyhow::Result;
use clap::{Parser, Subcommand};
use keysentry::analysis::{AnalysisBackend, AnalysisEngine, GeminiBackend};
use keysentry::audit::AuditLog;
use keysentry::config::KeysentryConfig;
use keysentry::server::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "keysentry")]
#[command(version)]
#[command(about = "Keystroke capture analysis server with LLM-backed sensitive information detection")]
struct Cli {
    /// Configuration file path (.yaml)
    #[arg(short, long, env = "KEYSENTRY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the capture analysis server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Disable the reasoning backend (fallback-only analysis)
        #[arg(long)]
        no_backend: bool,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("keysentry={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = KeysentryConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            no_backend,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config, no_backend).await?;
        }
        Commands::Config { default } => {
            let shown = if default {
                KeysentryConfig::default()
            } else {
                config
            };
            println!("{}", serde_yaml::to_string(&shown)?);
        }
    }

    Ok(())
}

async fn run_server(config: KeysentryConfig, no_backend: bool) -> Result<()> {
    let backend = build_backend(&config, no_backend)?;
    let backend_id = backend
        .as_ref()
        .map(|b| b.identifier().to_string())
        .unwrap_or_else(|| "fallback-only".to_string());

    print_banner(&config, &backend_id);

    let audit = Arc::new(AuditLog::new(
        config.audit_log.path.clone(),
        backend_id.clone(),
    ));

    // Startup-only; runs before the listener accepts submissions.
    match audit.initialize().await {
        Ok(()) => println!("\u{2713} Log file initialized: {}", audit.path().display()),
        Err(e) => println!("\u{2717} Error initializing log file: {}", e),
    }

    // Connectivity self-test for the reasoning backend.
    if let Some(gemini) = backend.as_ref() {
        match gemini.probe().await {
            Ok(reply) => println!("\u{2713} Backend API test successful: {}", reply.trim()),
            Err(e) => {
                println!("\u{2717} Backend API test failed: {}", e);
                println!("Will use fallback analysis for sensitive data detection");
            }
        }
    } else {
        println!("Reasoning backend disabled, using fallback analysis only");
    }

    println!(
        "All keylog analysis will be saved to: {}",
        audit.path().display()
    );
    println!("Starting server...\n");

    let engine = Arc::new(AnalysisEngine::new(
        backend.map(|b| b as Arc<dyn AnalysisBackend>),
    ));
    let state = AppState {
        engine,
        audit,
        backend_id,
    };

    keysentry::server::serve(&config, state).await?;
    Ok(())
}

/// Build the Gemini backend unless disabled or unconfigured.
fn build_backend(config: &KeysentryConfig, no_backend: bool) -> Result<Option<Arc<GeminiBackend>>> {
    if no_backend || config.backend.api_key.is_empty() {
        return Ok(None);
    }
    let backend = GeminiBackend::new(config.backend.api_key.as_str(), config.backend.model.clone())
        .with_base_url(config.backend.base_url.clone())
        .with_timeout(Duration::from_secs(config.backend.timeout_secs))?;
    Ok(Some(Arc::new(backend)))
}

fn print_banner(config: &KeysentryConfig, backend_id: &str) {
    println!("\nKeysentry capture analysis server");
    println!("{}", "=".repeat(50));
    println!(
        "Server running at: http://{}:{}",
        config.server.host, config.server.port
    );
    println!("Log file: {}", config.audit_log.path.display());
    println!("Analyzing keystrokes for sensitive information...");
    println!("Using model: {}", backend_id);
    println!("{}\n", "=".repeat(50));
}
