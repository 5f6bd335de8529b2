//! Build order calculator - command line tools

use std::path::PathBuf;
use std::process::ExitCode;

use build_core::config::EconomyRules;
use build_tools::render::{render, Format};
use build_tools::{load, validate, ToolResult};
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "build-tools")]
#[command(about = "Schedules build orders and checks catalog data")]
struct Cli {
    /// Log scheduling decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a build order and print the report
    Calc {
        /// Path to the catalog file
        #[arg(long, default_value = "assets/data/catalog.ron")]
        catalog: PathBuf,
        /// Path to the build order file
        #[arg(long)]
        build: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Validate a catalog file
    Validate {
        /// Path to the catalog file
        #[arg(long, default_value = "assets/data/catalog.ron")]
        catalog: PathBuf,
    },
}

fn run(command: Commands) -> ToolResult<()> {
    match command {
        Commands::Calc { catalog, build, format } => {
            let catalog = load::load_catalog(&catalog)?;
            let order = load::load_build_order(&build, &catalog)?;
            let report = order.run(&catalog, EconomyRules::default())?;
            println!("{}", render(&report, format)?);
        }
        Commands::Validate { catalog } => {
            tracing::info!("Validating catalog: {}", catalog.display());
            let objects = validate::validate_catalog_file(&catalog)?;
            println!("{}: {objects} objects, no problems", catalog.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(description) = e.long_description() {
                eprintln!("{description}");
            }
            ExitCode::FAILURE
        }
    }
}
