//! SRD Admin Console - command-line host
//!
//! Hosts the admin page outside a browser: builds the page from configuration,
//! runs one console workflow and prints the resulting view state.

use clap::{Arg, ArgMatches, Command};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use srd_console::{
    config::ConsoleConfig,
    console::{Console, ConsoleSnapshot},
    error::Result,
    widgets::Indicator,
    ConsoleDialog, ReqwestTransport, SYSTEM_NAME, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // Load configuration, then apply command line overrides
    let mut config = ConsoleConfig::load(matches.get_one::<String>("config").map(String::as_str))?;
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.backend.base_url = base_url.clone();
    }
    if let Some(token) = matches.get_one::<String>("csrf-token") {
        config.page.csrf_token = Some(token.clone());
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    init_logging(&config.logging.level)?;
    config.validate()?;

    info!(
        version = VERSION,
        backend = %config.backend.base_url,
        "Starting SRD admin console"
    );

    let transport = Arc::new(ReqwestTransport::new(
        &config.backend.base_url,
        &config.backend.user_agent,
    )?);
    let console = Console::initialize(
        config.to_layout()?,
        transport,
        config.polling.clone(),
        Arc::new(ConsoleDialog),
    )?;

    let json = matches.get_flag("json");
    match matches.subcommand() {
        Some(("status", _)) => {
            console.refresh_status().await?;
            print_status(&console.snapshot().await, json)?;
        }
        Some(("watch", _)) => watch(&console, config.status_interval(), json).await?,
        Some(("provision", _)) => {
            console.provision().await?;
            print_provision(&console.snapshot().await, json)?;
        }
        Some(("alerts", sub)) => run_alerts(&console, sub, json).await?,
        Some(("info", _)) => {
            console.fetch_info().await?;
            let snapshot = console.snapshot().await;
            if json {
                print_json(&snapshot)?;
            } else if let Some(panel) = &snapshot.info {
                println!("{}", panel.text);
            }
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn build_cli() -> Command {
    Command::new(SYSTEM_NAME)
        .version(VERSION)
        .about("SRD Admin Console - Prometheus/Grafana monitoring stack administration")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .global(true),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Backend base URL")
                .global(true),
        )
        .arg(
            Arg::new("csrf-token")
                .long("csrf-token")
                .value_name("TOKEN")
                .help("CSRF token sent as X-CSRFToken")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the console snapshot as JSON")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("status").about("Check Prometheus and Grafana health once"))
        .subcommand(Command::new("watch").about("Poll service health until interrupted"))
        .subcommand(Command::new("provision").about("Provision the Grafana datasource, folder and dashboard"))
        .subcommand(
            Command::new("alerts")
                .about("Update alert thresholds")
                .arg(Arg::new("cpu").long("cpu").value_name("PERCENT").help("CPU threshold"))
                .arg(Arg::new("memory").long("memory").value_name("PERCENT").help("Memory threshold"))
                .arg(Arg::new("disk").long("disk").value_name("PERCENT").help("Disk threshold"))
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .value_name("FILE")
                        .help("Post a JSON rules file verbatim instead of the form")
                        .conflicts_with_all(["cpu", "memory", "disk"]),
                ),
        )
        .subcommand(Command::new("info").about("Fetch Grafana diagnostics"))
}

/// Initialize logging with the specified level
fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid log level: {}. Using 'info'", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("srd_console={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

/// Poll until Ctrl-C, printing the indicators once per interval
async fn watch(console: &Console, period: Duration, json: bool) -> Result<()> {
    let Some(poller) = console.start() else {
        error!("Nothing to watch: status polling is unavailable");
        return Ok(());
    };

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    let shutdown = setup_shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => print_status(&console.snapshot().await, json)?,
            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping status polling...");
                break;
            }
        }
    }

    poller.abort();
    Ok(())
}

async fn run_alerts(console: &Console, sub: &ArgMatches, json: bool) -> Result<()> {
    if let Some(path) = sub.get_one::<String>("rules") {
        let rules: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        console.update_alert_rules(&rules).await;
        if json {
            print_json(&console.snapshot().await)?;
        }
        return Ok(());
    }

    console
        .set_alert_inputs(
            sub.get_one::<String>("cpu").cloned(),
            sub.get_one::<String>("memory").cloned(),
            sub.get_one::<String>("disk").cloned(),
        )
        .await?;
    console.save_thresholds().await?;

    let snapshot = console.snapshot().await;
    if json {
        print_json(&snapshot)?;
    } else if let Some(form) = &snapshot.alerts {
        println!("{}", form.output.text);
    }
    Ok(())
}

fn print_status(snapshot: &ConsoleSnapshot, json: bool) -> Result<()> {
    if json {
        return print_json(snapshot);
    }
    if let Some(board) = &snapshot.status {
        println!(
            "prometheus: {}  grafana: {}",
            indicator_line(&board.prometheus),
            indicator_line(&board.grafana)
        );
    }
    Ok(())
}

fn indicator_line(indicator: &Indicator) -> String {
    match indicator.style() {
        Some(style) => format!("{} [{}]", indicator.text(), style.class_name()),
        None => indicator.text().to_string(),
    }
}

fn print_provision(snapshot: &ConsoleSnapshot, json: bool) -> Result<()> {
    if json {
        return print_json(snapshot);
    }
    if let Some(view) = &snapshot.provision {
        println!("button: {}", view.button.label);
        if let Some(toast) = view.toast.as_ref().filter(|t| t.visible) {
            println!("toast: {}", toast.html);
        }
        if let Some(result) = view.result.as_ref().filter(|r| r.visible) {
            println!("{}", result.text);
        }
    }
    Ok(())
}

fn print_json(snapshot: &ConsoleSnapshot) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

/// Set up graceful shutdown signal handling
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
