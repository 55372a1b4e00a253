use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use compat_core::{AssetClient, Router, ServerContext};
use gateway::{logging, serve, upload};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(version)]
#[command(about = "Serve the compatibility router over HTTP", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the router
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,
    },

    /// Upload every file in a directory as an asset
    Upload {
        /// Directory to read
        dir: PathBuf,

        /// Base URL of a running gateway
        #[arg(long, env = "GATEWAY_URL", default_value = "http://127.0.0.1:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match cli.command {
        Commands::Serve { host, port } => {
            let addr = format!("{host}:{port}");
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            info!(%addr, "gateway listening");
            let router = Arc::new(Router::new(ServerContext::with_sample_cats()));
            serve::run(listener, router).await?;
        }
        Commands::Upload { dir, url } => {
            let reports = upload::upload_dir(AssetClient::new(&url), &dir).await?;
            let failed = reports.iter().filter(|r| r.result.is_err()).count();
            if failed > 0 {
                bail!("{failed} of {} uploads failed", reports.len());
            }
            info!(count = reports.len(), "all assets uploaded");
        }
    }
    Ok(())
}
