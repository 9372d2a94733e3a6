mod client;
mod cmd;
mod output;
mod poller;
mod root;

use clap::{Parser, Subcommand};
use cmd::{camera::CameraSubcommand, schedule::ScheduleSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "castctl",
    about = "Remote control for a scheduled broadcast appliance",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .castctl/)
    #[arg(long, global = true, env = "CASTCTL_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the config and create the status directory
    Init {
        /// Station name (default: directory name)
        #[arg(long)]
        station: Option<String>,
    },

    /// Serve the control endpoint over HTTP
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
        /// Open the status page in a browser
        #[arg(long)]
        open: bool,
    },

    /// Show the current broadcast status
    Status {
        /// Ask a running server instead of reading the status files
        #[arg(long)]
        url: Option<String>,
    },

    /// Send a control action (pause, resume, extend, bandwidth1500, ...)
    Action {
        action: String,
        /// Send to a running server instead of writing the status files
        #[arg(long)]
        url: Option<String>,
    },

    /// Poll a server and render the panel; type commands to control it
    Watch {
        /// Server base URL (default: http://localhost:<server.port>)
        #[arg(long)]
        url: Option<String>,
        /// Poll interval in milliseconds (default: poll.interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Keep the camera preview streaming while watching
        #[arg(long)]
        preview: bool,
    },

    /// Manage the broadcast schedule
    Schedule {
        #[command(subcommand)]
        subcommand: ScheduleSubcommand,
    },

    /// Send camera commands
    Camera {
        #[command(subcommand)]
        subcommand: CameraSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } | Commands::Watch { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { station } => cmd::init::run(&root, station.as_deref()),
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
        Commands::Status { url } => cmd::status::run(&root, url.as_deref(), cli.json),
        Commands::Action { action, url } => {
            cmd::action::run(&root, &action, url.as_deref(), cli.json)
        }
        Commands::Watch {
            url,
            interval_ms,
            preview,
        } => cmd::watch::run(&root, url.as_deref(), interval_ms, preview, cli.json),
        Commands::Schedule { subcommand } => cmd::schedule::run(&root, subcommand, cli.json),
        Commands::Camera { subcommand } => cmd::camera::run(&root, subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
