use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sitewx_config::AppConfig;
use sitewx_ingest::{load_export, Encoding};
use sitewx_rollup::{Pipeline, PipelineOptions};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "sitewx", version, about = "Weather station export roll-ups")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the upload and report API over HTTP
    Serve {
        /// Overrides `[http] bind`
        #[arg(long, env = "SITEWX_BIND")]
        bind: Option<String>,
    },
    /// Roll up one export file and print the result
    Report {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Overrides `[ingest] encoding` (utf-16le, utf-8, auto)
        #[arg(long)]
        encoding: Option<Encoding>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load().context("loading configuration")?;

    match cli.command {
        Command::Serve { bind } => {
            sitewx_obs::init("sitewx");
            serve(&cfg, bind.unwrap_or_else(|| cfg.http_bind())).await
        }
        Command::Report {
            file,
            format,
            encoding,
        } => report(&cfg, file, format, encoding),
    }
}

async fn serve(cfg: &AppConfig, bind: String) -> anyhow::Result<()> {
    let (app, state) = sitewx_cli::build_app_with(cfg);

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid HTTP bind address {bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    // Mark ready just before serving
    sitewx_cli::set_ready(&state, true);

    tracing::info!(%addr, station = cfg.station_name(), "HTTP server listening");
    axum::serve(listener, app).await.context("server error")
}

fn report(
    cfg: &AppConfig,
    file: PathBuf,
    format: Format,
    encoding: Option<Encoding>,
) -> anyhow::Result<()> {
    let encoding = encoding.unwrap_or_else(|| cfg.encoding());
    let text = load_export(&file, encoding)
        .with_context(|| format!("reading export {}", file.display()))?;

    let pipeline = Pipeline::new(PipelineOptions {
        week_start: cfg.week_start(),
    });
    let report = pipeline.run(&text);

    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&report).context("serializing report")?;
            println!("{json}");
        }
        Format::Text => print!("{}", sitewx_cli::render::render_text(cfg.station_name(), &report)),
    }
    Ok(())
}
