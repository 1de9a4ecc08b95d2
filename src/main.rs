use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seminar_digest::cli::commands::inspect::InspectOptions;
use seminar_digest::cli::commands::run::RunOptions;
use seminar_digest::cli::{self, commands};

#[derive(Parser)]
#[command(name = "seminar-digest")]
#[command(
    version,
    about = "Summarize weekly seminar pages per presenter and post threaded digests to Slack"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Read configuration from this file only")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a seminar page and post every presenter digest
    Run {
        #[arg(help = "Page title (default: this week's page)")]
        page: Option<String>,
        #[arg(long, help = "Comma-separated presenters to include (overrides SELECT_AUTHORS)")]
        authors: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Show how a page segments and routes, without calling the model or Slack
    Inspect {
        #[arg(help = "Page title (default: this week's page)")]
        page: Option<String>,
        #[arg(long, help = "Show G1..G6 group buckets instead of segments")]
        groups: bool,
        #[arg(long, help = "Read a page export (JSON) instead of the Scrapbox API")]
        file: Option<PathBuf>,
        #[arg(long, help = "Comma-separated presenters to include")]
        authors: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Start the HTTP server (summarize trigger + Slack interactivity)
    Serve {
        #[arg(long, help = "Bind address override, e.g. 0.0.0.0:3000")]
        bind: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources, secrets omitted)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a starter configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mseminar-digest encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Run {
            page,
            authors,
            format,
        } => {
            let config = cli::load_config(cli.config.as_deref())?;
            let report = commands::run::run(
                &config,
                RunOptions {
                    page,
                    authors,
                    format,
                },
            )?;
            if report.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Inspect {
            page,
            groups,
            file,
            authors,
            format,
        } => {
            let config = cli::load_config(cli.config.as_deref())?;
            commands::inspect::run(
                &config,
                InspectOptions {
                    page,
                    file,
                    groups,
                    authors,
                    format,
                },
            )?;
        }
        Commands::Serve { bind } => {
            let config = cli::load_config(cli.config.as_deref())?;
            commands::serve::run(config, bind)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(&format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
