mod cmd;
mod output;
mod settings;

use clap::{Parser, Subcommand};
use dispatch_core::Credential;
use settings::Flags;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dispatch",
    about = "Discover a line and machine on a Dispatch site and exercise labor, counter, dispatch and production calls against it",
    version,
    propagate_version = true
)]
struct Cli {
    /// Server hostname, or a full http(s):// base URL
    #[arg(long, global = true, env = "DISPATCH_SERVER")]
    server: Option<String>,

    /// Site id to operate against
    #[arg(long, global = true, env = "DISPATCH_SITE")]
    site: Option<String>,

    /// Username for the labor clock-in/clock-out calls
    #[arg(long, global = true, env = "DISPATCH_USER")]
    user: Option<String>,

    /// API key (prefer the environment variable over the flag)
    #[arg(long, global = true, env = "DISPATCH_API_KEY", hide_env_values = true)]
    apikey: Option<String>,

    /// YAML config file with defaults for server, site, user and run values
    #[arg(long, global = true, env = "DISPATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log every request and raw response body
    #[arg(long, global = true)]
    dbg: bool,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full workflow: resolve, clock in/out, counters, dispatches, production
    Run,

    /// Only resolve the site, area, line, machine and dispatch type
    Resolve,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run => tracing::Level::INFO,
        Commands::Resolve => tracing::Level::WARN,
    };

    let mut filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into());
    if cli.dbg {
        if let Ok(directive) = "dispatch_core=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let flags = Flags {
        server: cli.server,
        site: cli.site,
        user: cli.user,
        apikey: cli.apikey.map(Credential::new),
        config: cli.config,
    };

    let result = settings::resolve(&flags).and_then(|settings| match cli.command {
        Commands::Run => cmd::run::run(&settings, cli.json),
        Commands::Resolve => cmd::resolve::run(&settings, cli.json),
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
