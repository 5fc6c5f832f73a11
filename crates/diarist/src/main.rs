//! diarist CLI - landing page generator for hand-written HTML diaries.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "diarist")]
#[command(about = "Landing page generator for hand-written HTML diaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to diarist.toml config file
    #[arg(short, long, default_value = "diarist.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a template, config and sample post in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Regenerate the index page
    Build {
        /// Output file (defaults to config or "index.html")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Posts directory (defaults to config or "posts")
        #[arg(long)]
        posts: Option<PathBuf>,

        /// Index template (defaults to config or "build/index_template.html")
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Rebuild on change and serve with live reload
    Dev {
        /// Port to listen on (defaults to config or 5510)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Serve the site without rebuilding
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print the metadata extracted from post files as JSON
    Inspect {
        /// Post files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(yes)?;
        }
        Commands::Build {
            output,
            posts,
            template,
        } => {
            commands::build::run(&cli.config, output, posts, template)?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&cli.config, port, !no_open).await?;
        }
        Commands::Serve { port, dir } => {
            commands::serve::run(port, dir).await?;
        }
        Commands::Inspect { files } => {
            commands::inspect::run(&cli.config, &files)?;
        }
    }

    Ok(())
}
