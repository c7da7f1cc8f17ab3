//! Entry point router command line.
//!
//! # Architecture Overview
//!
//! ```text
//!     router.toml ──▶ config (load + validate) ──▶ lifecycle::startup
//!                          │                              │
//!                          │ notify watcher               ▼
//!                          └──────▶ lifecycle::reload ──▶ RouteTable ◀── match / watch
//! ```
//!
//! Handlers are placeholders named after the config, so every command is a
//! dry run of the routing decisions an embedding server would make.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use entrypoint_router::config::watcher::ConfigWatcher;
use entrypoint_router::config::{load_config, RouterConfig};
use entrypoint_router::lifecycle::reload::run_reload_loop;
use entrypoint_router::lifecycle::signals::shutdown_signal;
use entrypoint_router::lifecycle::startup::{build_route_table, build_router};
use entrypoint_router::observability::logging;
use entrypoint_router::routing::{EntryPoint, EntryPointMatch, HandlerRegistry, RouteTable};
use entrypoint_router::Shutdown;

#[derive(Parser)]
#[command(name = "entrypoint-router")]
#[command(about = "Inspect and exercise an entry point route table", long_about = None)]
struct Cli {
    /// Router configuration file.
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and print the registered routes
    Check,
    /// Match one request path
    Match {
        path: String,
        #[arg(long, default_value = "")]
        script_name: String,
        #[arg(long)]
        match_after_slash: bool,
    },
    /// Live-reload the config and match paths read from stdin
    Watch {
        #[arg(long, default_value = "")]
        script_name: String,
        #[arg(long)]
        match_after_slash: bool,
    },
}

#[derive(Serialize)]
struct RouteReport<'a> {
    path: &'a str,
    kind: String,
    handler: &'a str,
    favicon: Option<&'a str>,
    removable: bool,
    depth: usize,
}

impl<'a> From<&'a EntryPoint> for RouteReport<'a> {
    fn from(ep: &'a EntryPoint) -> Self {
        Self {
            path: ep.path(),
            kind: ep.kind().to_string(),
            handler: ep.handler().name(),
            favicon: ep.favicon(),
            removable: ep.is_removable(),
            depth: ep.depth(),
        }
    }
}

#[derive(Serialize)]
struct MatchReport<'a> {
    entry_point: &'a str,
    kind: String,
    handler: &'a str,
    url_params: &'a [(String, String)],
    extra_start_index: usize,
    extra_path: &'a str,
    depth: usize,
}

impl<'a> MatchReport<'a> {
    fn new(result: &'a EntryPointMatch, path: &'a str) -> Option<Self> {
        let ep = result.entry_point.as_deref()?;
        Some(Self {
            entry_point: ep.path(),
            kind: ep.kind().to_string(),
            handler: ep.handler().name(),
            url_params: &result.url_params,
            extra_start_index: result.extra_start_index,
            extra_path: result.extra_path(path),
            depth: ep.depth(),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.observability.log_level);

    match run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: RouterConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let table = build_route_table(&config, &HandlerRegistry::placeholders(&config))?;

    match cli.command {
        Commands::Check => {
            let router = table.snapshot();
            let routes: Vec<RouteReport<'_>> = router
                .entry_points()
                .iter()
                .map(|ep| RouteReport::from(ep.as_ref()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&routes)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Match {
            path,
            script_name,
            match_after_slash,
        } => {
            let result = table.match_entry_point(&script_name, &path, match_after_slash);
            println!("{}", serde_json::to_string(&MatchReport::new(&result, &path))?);
            Ok(if result.is_match() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Watch {
            script_name,
            match_after_slash,
        } => {
            watch(cli.config, table, script_name, match_after_slash).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn watch(
    config_path: PathBuf,
    table: Arc<RouteTable>,
    script_name: String,
    match_after_slash: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();

    let (watcher, updates) = ConfigWatcher::new(&config_path);
    // Dropping the watcher stops file notifications.
    let _watcher = watcher.run()?;

    let reload = tokio::spawn(run_reload_loop(
        table.clone(),
        |config: &RouterConfig| build_router(config, &HandlerRegistry::placeholders(config)),
        updates,
        shutdown.subscribe(),
    ));

    tracing::info!(path = ?config_path, "Watching config, reading paths from stdin");

    let ctrl_c = shutdown_signal();
    tokio::pin!(ctrl_c);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(path) = line? else { break };
                let path = path.trim();
                if path.is_empty() {
                    continue;
                }
                let result = table.match_entry_point(&script_name, path, match_after_slash);
                println!("{}", serde_json::to_string(&MatchReport::new(&result, path))?);
            }
            _ = &mut ctrl_c => break,
        }
    }

    shutdown.trigger();
    let _ = reload.await;
    tracing::info!("Shutdown complete");
    Ok(())
}
