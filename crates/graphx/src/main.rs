use clap::{Parser, Subcommand};
use colored::Colorize;
use graph_client::HttpMethod;
use std::process;
use tracing_subscriber::EnvFilter;

mod commands;

/// Standardized exit codes for CLI.
/// 0 = OK, 2 = input error, 4 = OAuth failure, 1 = other.
const EXIT_OTHER: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_AUTH: i32 = 4;

#[derive(Parser)]
#[command(name = "graphx", version, about = "Graph CLI — call the Graph API as a hosted request")]
struct Cli {
    /// Access token (overrides the session cookie)
    #[arg(long, env = "FACEBOOK_ACCESS_TOKEN")]
    token: Option<String>,

    /// Application id; names the auth cookie
    #[arg(long)]
    app_id: Option<String>,

    /// Treat the request as arriving over https
    #[arg(long)]
    secure: bool,

    /// Referer URL of the simulated request
    #[arg(long)]
    referrer: Option<String>,

    /// Raw Cookie header of the simulated request
    #[arg(long)]
    cookie: Option<String>,

    /// Use the beta Graph endpoint
    #[arg(long)]
    beta: bool,

    /// Dispatch asynchronously and route the result through completion hooks
    #[arg(long = "async")]
    run_async: bool,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a Graph path
    Get {
        path: String,
        /// Parameters as key=value
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
    /// POST to a Graph path
    Post {
        path: String,
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
    /// DELETE a Graph path
    Delete {
        path: String,
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
}

fn exit_code_for(err: &str) -> i32 {
    if err.starts_with("oauth:") {
        EXIT_AUTH
    } else if err.starts_with("parse ") {
        EXIT_INPUT
    } else {
        EXIT_OTHER
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let opts = commands::RequestOpts {
        app_id: cli.app_id,
        token: cli.token,
        secure: cli.secure,
        referrer: cli.referrer,
        cookie: cli.cookie,
        beta: cli.beta,
        timeout_ms: cli.timeout_ms,
    };

    let (method, path, params) = match cli.command {
        Commands::Get { path, params } => (HttpMethod::Get, path, params),
        Commands::Post { path, params } => (HttpMethod::Post, path, params),
        Commands::Delete { path, params } => (HttpMethod::Delete, path, params),
    };

    if let Err(e) = commands::call(&opts, method, &path, &params, cli.run_async) {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}
