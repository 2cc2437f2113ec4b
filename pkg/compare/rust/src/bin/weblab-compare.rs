// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! CLI over the comparison library.
//!
//! # Usage
//!
//! ```bash
//! weblab-compare compare /compare/experiment/12/34/ --base-url http://localhost:8080
//! weblab-compare compare https://weblab.example.org/compare/model/1/2/ --render
//! weblab-compare plot outputs-trace.csv --all-points
//! RUST_LOG=debug weblab-compare --log-json compare ...
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};
use weblab_compare::compare::ComparisonSession;
use weblab_compare::csv_table::parse_csv;
use weblab_compare::downsample::{LineStyle, PlotData, PlotSeries};
use weblab_compare::envelope::Notifications;
use weblab_compare::route::split_origin;
use weblab_compare::{Comparator, CompareRoute, load_config};

#[derive(Parser, Debug)]
#[command(name = "weblab-compare")]
#[command(about = "Compare Web Lab entity versions and their result files")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "WEBLAB_COMPARE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a comparison and print its summary
    Compare(CompareArgs),
    /// Parse a local CSV file and print its plot series
    Plot(PlotArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Comparison URL, or a path such as /compare/model/1/2/
    target: String,

    /// Server root; overrides the config file and the URL's own origin
    #[arg(long, env = "WEBLAB_URL")]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Plugin used for the default plot
    #[arg(long)]
    default_plugin: Option<String>,

    /// Also render the selected (or default) file
    #[arg(long)]
    render: bool,
}

#[derive(Args, Debug)]
struct PlotArgs {
    file: PathBuf,

    /// Print every point instead of the downsampled series
    #[arg(long)]
    all_points: bool,
}

#[derive(Serialize)]
struct FileSummary<'a> {
    name: &'a str,
    signature: &'a str,
    entities: Vec<&'a str>,
}

#[derive(Serialize)]
struct SessionSummary<'a> {
    title: &'a str,
    labels: Vec<&'a str>,
    files: Vec<FileSummary<'a>>,
    default_visualization: Option<String>,
    redirect: Option<String>,
    notifications: &'a Notifications,
}

impl<'a> SessionSummary<'a> {
    fn new(session: &'a ComparisonSession) -> Self {
        Self {
            title: &session.title,
            labels: session.entities.iter().map(|e| e.label.as_str()).collect(),
            files: session
                .files
                .iter()
                .map(|f| FileSummary {
                    name: &f.name,
                    signature: f.signature.as_str(),
                    entities: f
                        .entries
                        .iter()
                        .map(|e| session.entities[e.entity].label.as_str())
                        .collect(),
                })
                .collect(),
            default_visualization: session
                .default_visualization
                .as_ref()
                .map(|d| format!("{}/{}", d.file_name, d.plugin)),
            redirect: session.redirect.as_ref().map(CompareRoute::to_path),
            notifications: &session.notifications,
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn run_compare(config_path: Option<PathBuf>, args: CompareArgs) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    let (origin, path) = split_origin(&args.target)?;
    if let Some(base_url) = args.base_url.or(origin) {
        config.base_url = base_url;
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout_secs = secs;
    }
    if let Some(plugin) = args.default_plugin {
        config.default_plot_plugin = plugin;
    }

    let route: CompareRoute = path
        .parse()
        .with_context(|| format!("Not a comparison route: {}", args.target))?;
    info!(base_url = %config.base_url, route = %route, "Loading comparison");

    let comparator = Comparator::new(config).context("Failed to build HTTP client")?;
    let session = comparator
        .load(&route)
        .await
        .context("Failed to load comparison")?;
    let notifications = &session.notifications;
    if !notifications.is_empty() {
        for message in &notifications.errors {
            error!(message = %message, "Server error notification");
        }
        for note in &notifications.notes {
            warn!(note = %note, "Server note");
        }
    }
    print_json(&SessionSummary::new(&session))?;

    if args.render {
        match comparator.render_selection(&session).await? {
            Some(visualization) => print_json(&visualization)?,
            None => warn!("Nothing to render: no file selected and no default plot"),
        }
    }
    Ok(())
}

fn run_plot(args: PlotArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let table = parse_csv(&text);
    let plot = PlotData::from_table(&table);
    let style = if args.all_points {
        LineStyle::Points
    } else {
        LineStyle::Lines
    };
    let series: &[PlotSeries] = plot.series_for(style);
    info!(
        file = %args.file.display(),
        rows = table.rows.len(),
        series = series.len(),
        all_points = args.all_points,
        "Parsed plot data"
    );

    #[derive(Serialize)]
    struct PlotOutput<'a> {
        x_label: Option<&'a str>,
        series: &'a [PlotSeries],
    }
    print_json(&PlotOutput {
        x_label: plot.x_label.as_deref(),
        series,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Command::Compare(args) => run_compare(cli.config, args).await,
        Command::Plot(args) => run_plot(args),
    }
}
