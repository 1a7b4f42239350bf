//! basic-mcp-server: a minimal MCP server over stdio
//!
//! Serves a small set of tools, resources and prompts to an MCP client.
//! Protocol messages use stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info, Level};
use tracing_subscriber::EnvFilter;

use basic_mcp_server::catalog::builtin_registry;
use basic_mcp_server::config;
use basic_mcp_server::mcp::{Dispatcher, McpServer, StdioTransport};

/// A minimal Model Context Protocol server.
///
/// Reads newline-delimited JSON-RPC requests on stdin and writes responses
/// on stdout.
#[derive(Parser, Debug)]
#[command(name = "basic-mcp-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the basic-mcp-server binary.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting basic-mcp-server"
    );

    let registry = match builtin_registry() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!(error = %e, "Failed to build capability registry");
            return ExitCode::FAILURE;
        }
    };

    let transport =
        StdioTransport::stdio().with_max_message_bytes(cfg.transport.max_message_bytes);
    let dispatcher = Dispatcher::with_settings(registry, cfg.server);
    let mut server = McpServer::new(transport, dispatcher);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    // The one line a default start writes to stderr
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "MCP server ready, waiting for client connection..."
    );

    match runtime.block_on(server.run()) {
        Ok(()) => {
            debug!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
