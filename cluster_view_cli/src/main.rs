use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use cluster_view::{
    ChartLifecycleManager, ClientConfig, HttpTransport, MemorySurface, ResultsRenderer,
    SelectedFile, SubmitOutcome, UploadOrchestrator, UploadResponse,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod plot;
mod report;

use plot::{ImageFormat, PlotBackend};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/upload";

#[derive(Parser, Debug)]
#[command(author, version, about = "Clustering service client", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a CSV dataset and render the clustering result
    Upload(UploadArgs),
    /// Render a previously saved JSON response
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct OutputArgs {
    /// Directory for report.html and chart images
    #[arg(long, default_value = "cluster_report", value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    /// Chart image format
    #[arg(long, value_enum, default_value_t = FormatOpt::Png)]
    format: FormatOpt,

    /// Skip chart images
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot: bool,
}

#[derive(Parser, Debug)]
struct UploadArgs {
    /// CSV file to submit
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Upload endpoint URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Echo the raw response JSON to stdout
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Saved response JSON
    #[arg(value_hint = ValueHint::FilePath)]
    response: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatOpt {
    Png,
    Svg,
}

impl From<FormatOpt> for ImageFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Png => ImageFormat::Png,
            FormatOpt::Svg => ImageFormat::Svg,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Upload(args) => handle_upload(args).await,
        Command::Render(args) => handle_render(args),
    }
}

fn plot_backend(output: &OutputArgs) -> Result<PlotBackend> {
    fs::create_dir_all(&output.out_dir)
        .with_context(|| format!("failed to create {}", output.out_dir.display()))?;
    Ok(if output.no_plot {
        PlotBackend::disabled()
    } else {
        PlotBackend::new(&output.out_dir, output.format.into())
    })
}

fn read_selection(path: &Path) -> Result<SelectedFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;
    let media_type = name.ends_with(".csv").then(|| "text/csv".to_string());
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(SelectedFile::new(name, media_type, bytes))
}

async fn handle_upload(args: UploadArgs) -> Result<()> {
    let backend = plot_backend(&args.output)?;
    let transport = HttpTransport::new(ClientConfig {
        endpoint: args.endpoint.clone(),
        user_agent: Some(format!("cluster-view/{}", env!("CARGO_PKG_VERSION"))),
    })?;
    let controller = UploadOrchestrator::new(transport, MemorySurface::new(), backend);

    let file = read_selection(&args.input)?;
    controller.select_file(Some(file))?;

    let response = match controller.submit().await {
        SubmitOutcome::Rendered(response) => response,
        SubmitOutcome::Failed(err) => return Err(anyhow::Error::new(err).context("upload failed")),
        SubmitOutcome::Busy => return Err(anyhow!("an upload is already in progress")),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    }
    let charts = controller.with_charts(|charts| charts.backend().written());
    finish(&controller.surface().snapshot(), &charts, &args.output)
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let raw = fs::read(&args.response)
        .with_context(|| format!("failed to read {}", args.response.display()))?;
    let response: UploadResponse = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", args.response.display()))?;

    let surface = MemorySurface::new();
    let mut charts = ChartLifecycleManager::new(plot_backend(&args.output)?);
    ResultsRenderer::render(&surface, &mut charts, &response)?;
    finish(&surface.snapshot(), &charts.backend().written(), &args.output)
}

fn finish(
    state: &cluster_view::SurfaceState,
    charts: &[plot::WrittenChart],
    output: &OutputArgs,
) -> Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    report::write_summary(state, &mut lock)?;
    lock.flush()?;

    let html_path = output.out_dir.join("report.html");
    report::write_html(state, charts, &html_path)?;
    info!("Report written to {}", html_path.display());
    Ok(())
}
