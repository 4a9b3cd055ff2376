//! dbmd binary - render and preview markdown documents with SQL results

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod server;
mod watch;

use commands::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "dbmd")]
#[command(version)]
#[command(about = "Markdown documents with live SQL results", long_about = None)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one transformation and write the result
    Render {
        /// Markdown document to render
        file: PathBuf,

        /// Write output to FILE (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Default database type for documents without `dbType`
        #[arg(long, value_name = "TYPE")]
        db_type: Option<String>,

        /// Settings file (defaults to dbmd.toml beside the document)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Render fences one at a time through the inline hook
        #[arg(long)]
        inline: bool,

        /// Output format
        #[arg(short = 't', long, value_enum, default_value = "html")]
        to: OutputFormat,
    },

    /// Serve a live preview of a document, refreshed as it changes
    Preview {
        /// Markdown document to preview
        file: PathBuf,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short = 'P', long, default_value = "3000")]
        port: u16,

        /// Quiet window for coalescing refreshes, in milliseconds
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,

        /// Default database type for documents without `dbType`
        #[arg(long, value_name = "TYPE")]
        db_type: Option<String>,

        /// Settings file (defaults to dbmd.toml beside the document)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "dbmd=warn,dbmd_core=warn"
    } else {
        "dbmd=info,dbmd_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Render {
            file,
            output,
            db_type,
            config,
            inline,
            to,
        } => {
            commands::render::execute(commands::render::RenderArgs {
                file,
                output,
                db_type,
                config,
                inline,
                to,
            })
            .await
        }
        Commands::Preview {
            file,
            host,
            port,
            debounce_ms,
            db_type,
            config,
        } => {
            commands::preview::execute(commands::preview::PreviewArgs {
                file,
                host,
                port,
                debounce_ms,
                db_type,
                config,
            })
            .await
        }
    }
}
