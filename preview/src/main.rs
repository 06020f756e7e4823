//! hostpanel preview server
//!
//! Serves the preview API, or renders one campaign file to stdout.
//!
//! Usage:
//!   hostpanel-preview --port 4100
//!   hostpanel-preview --render campaign.json > campaign.html

use std::{fs, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use hostpanel_campaign::{render_html, Campaign};
use hostpanel_preview::{build_router, PreviewState};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hostpanel-preview")]
#[command(about = "hostpanel content preview server")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "4100")]
    port: u16,

    /// Render a campaign JSON file to HTML on stdout and exit
    #[arg(short, long)]
    render: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Some(path) = args.render {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let campaign = Campaign::from_json(&json)
            .with_context(|| format!("parsing campaign {}", path.display()))?;
        print!("{}", render_html(&campaign));
        return Ok(());
    }

    let app = build_router(Arc::new(PreviewState::default()));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("binding port {}", args.port))?;
    info!("Preview API listening on port {}", args.port);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
