use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use api_ingress::{ApiIngress, ApiIngressConfig};
use attendance_log::{config::AttendanceLogConfig, AttendanceLog};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// RFID Attendance Server - records card scans into an append-only log
#[derive(Parser)]
#[command(name = "attendance-server")]
#[command(about = "RFID Attendance Server - records card scans into an append-only log")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // defaults -> YAML -> APP__* -> PORT -> CLI
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_port_env(std::env::var(runtime::config::PORT_ENV).ok().as_deref())?;
    config.apply_cli_overrides(&args);

    let base_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &base_dir);
    tracing::info!("Attendance server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

struct Modules {
    ingress: ApiIngress,
    attendance: AttendanceLog,
}

fn build_modules(config: &AppConfig) -> Result<Modules> {
    let ingress_cfg: ApiIngressConfig = config.module_config(ApiIngress::NAME)?;
    let attendance_cfg: AttendanceLogConfig = config.module_config(AttendanceLog::NAME)?;

    let ingress = ApiIngress::new(ingress_cfg)
        .with_request_timeout(Duration::from_secs(config.server.timeout_sec));
    let attendance = AttendanceLog::init(&attendance_cfg)?;

    Ok(Modules {
        ingress,
        attendance,
    })
}

async fn run_server(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");
    let Modules {
        ingress,
        attendance,
    } = build_modules(&config)?;

    let router = attendance.register_rest(ingress.base_router());
    let router = ingress.finalize(router);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match runtime::shutdown::wait_for_shutdown().await {
                Ok(()) => tracing::info!("shutdown: signal received"),
                Err(e) => tracing::warn!(error = %e, "shutdown: signal handler failed"),
            }
            cancel.cancel();
        });
    }

    ingress.serve(router, addr, cancel).await?;
    tracing::info!("Attendance server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    build_modules(&config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
