//! Git Activity Spiral
//!
//! Serves daily commit counts over HTTP, or renders a repository's activity spiral
//! to an image file.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use gitspiral::analysis::{GitSource, HistoryQueryService};
use gitspiral::config::Config;
use gitspiral::plotting::{
    export_png, export_svg, ChartConfig, ChartOptions, ChartStyle, ChartTheme, SpiralLayoutEngine,
    Variant,
};
use gitspiral::types::RepoQuery;

#[derive(Parser)]
#[command(name = "gitspiral", version, about = "Commit activity along a spiral")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the daily commit series over HTTP
    Serve {
        /// Listen port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Render a repository's activity spiral to a PNG or SVG file
    Render {
        repo: PathBuf,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        /// Include every branch
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        chart: ChartArgs,
        /// Output file; the extension picks the format
        #[arg(long, short, default_value = "activity.png")]
        output: PathBuf,
    },
}

/// Chart settings; anything left out takes its default
#[derive(Args, Debug)]
struct ChartArgs {
    /// bar, heatbar, circle or heatcircle
    #[arg(long)]
    variant: Option<Variant>,
    #[arg(long)]
    starting_radius: Option<f64>,
    #[arg(long)]
    spacing: Option<f64>,
    #[arg(long)]
    bar_width: Option<f64>,
    /// Values above this are drawn at full size
    #[arg(long)]
    limit: Option<f64>,
}

impl ChartArgs {
    fn resolve(&self) -> ChartConfig {
        ChartOptions {
            variant: self.variant,
            starting_radius: self.starting_radius,
            spacing: self.spacing,
            bar_width: self.bar_width,
            value_limit: self.limit,
            ..Default::default()
        }
        .resolve()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("error loading config")?;
    env_logger::Builder::new()
        .parse_filters(&config.rust_log)
        .init();

    match cli.command {
        Command::Serve { port } => serve(config, port).await,
        Command::Render {
            repo,
            folder,
            branch,
            all,
            chart,
            output,
        } => {
            let mut query = RepoQuery::new(repo.to_string_lossy()).all_branches(all);
            if let Some(folder) = folder {
                query = query.with_folder(folder);
            }
            if let Some(branch) = branch {
                query = query.with_branch(branch);
            }
            let chart_config = chart.resolve();
            tokio::task::spawn_blocking(move || render(query, chart_config, output)).await?
        }
    }
}

async fn serve(config: Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.port);
    let service = Arc::new(HistoryQueryService::new(Arc::new(GitSource::new())));
    let app = gitspiral::api::routes(service, Arc::new(config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("gitspiral v{} listening on {}", gitspiral::api::VERSION, addr);

    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for interrupt signal: {}", e);
            futures::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for terminate signal: {}", e);
                futures::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    futures::pin_mut!(interrupt, terminate);
    futures::future::select(interrupt, terminate).await;
    log::info!("Received shutdown signal");
}

fn render(query: RepoQuery, config: ChartConfig, output: PathBuf) -> Result<()> {
    let service = HistoryQueryService::new(Arc::new(GitSource::new()));
    let series = service.query(&query)?;

    let layout = SpiralLayoutEngine::new(config).layout(&series);

    let theme = ChartTheme::default();
    let style = ChartStyle::default();
    let is_svg = output
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("svg"));
    let bytes = if is_svg {
        export_svg(&layout, &theme, &style).map(String::into_bytes)
    } else {
        export_png(&layout, &theme, &style)
    }
    .map_err(|e| anyhow!("failed to render chart: {}", e))?;

    std::fs::write(&output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {} days ({} commits) to {}",
        series.len(),
        series.total(),
        output.display()
    );
    Ok(())
}
