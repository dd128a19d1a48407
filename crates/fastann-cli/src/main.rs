#![allow(clippy::doc_markdown)]
//! `fastann` CLI - nearest-neighbor experiments over `.fvecs` / `.ivecs` files
//!
//! Usage:
//!   `fastann info ./sift_base.fvecs`
//!   `fastann ground-truth --base base.fvecs --queries query.fvecs -k 100 --output gt.ivecs`
//!   `fastann bench --base base.fvecs --queries query.fvecs --ground-truth gt.ivecs --algorithm hnsw`

mod experiment;
mod xvecs;


use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use experiment::{ExperimentConfig, ExperimentReport};
use fastann_core::{DistanceMetric, FastAnnConfig, IndexKind, LoggingConfig};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fastann")]
#[command(
    author,
    version,
    about = "fastann CLI - exact and approximate nearest-neighbor search experiments"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(short, long, global = true, default_value = "fastann.toml")]
    config: PathBuf,

    /// Hide progress bars
    #[arg(long, global = true)]
    quiet: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(short = 'l', long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Report output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimension and record count of a vector file
    Info {
        /// Path to an .fvecs or .ivecs file
        file: PathBuf,
    },

    /// Compute exact nearest neighbors with a brute-force scan
    GroundTruth {
        /// Base vectors (.fvecs)
        #[arg(long)]
        base: PathBuf,

        /// Query vectors (.fvecs)
        #[arg(long)]
        queries: PathBuf,

        /// Neighbors per query (defaults to search.k)
        #[arg(short)]
        k: Option<usize>,

        /// Output file (.ivecs)
        #[arg(short, long)]
        output: PathBuf,

        /// Distance metric (defaults to index.metric)
        #[arg(long)]
        metric: Option<DistanceMetric>,
    },

    /// Build an index, run all queries and report latency and recall
    Bench {
        /// Base vectors (.fvecs)
        #[arg(long)]
        base: PathBuf,

        /// Query vectors (.fvecs)
        #[arg(long)]
        queries: PathBuf,

        /// Ground truth (.ivecs); computed by brute force when omitted
        #[arg(long)]
        ground_truth: Option<PathBuf>,

        /// Index algorithm: brute_force, vp_tree, hnsw
        #[arg(short, long)]
        algorithm: Option<IndexKind>,

        /// Neighbors per query
        #[arg(short)]
        k: Option<usize>,

        /// Distance metric
        #[arg(long)]
        metric: Option<DistanceMetric>,

        /// HNSW max connections per node
        #[arg(long)]
        m: Option<usize>,

        /// HNSW candidate list size during construction
        #[arg(long)]
        ef_construction: Option<usize>,

        /// HNSW candidate list size during search
        #[arg(long)]
        ef_search: Option<usize>,

        /// Seed for index construction
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = FastAnnConfig::load_from_path(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if cli.log_file.is_some() {
        config.logging.file = cli.log_file;
    }
    init_logging(&config.logging)?;
    let show_progress = !cli.quiet;

    match cli.command {
        Commands::Info { file } => {
            let (dimension, records) = if has_extension(&file, "ivecs") {
                let data = xvecs::read_ivecs(&file)?;
                (data.dimension, data.len())
            } else {
                let data = xvecs::read_fvecs(&file)?;
                (data.dimension, data.len())
            };
            println!("File:      {}", file.display());
            println!("Dimension: {dimension}");
            println!("Records:   {records}");
        }
        Commands::GroundTruth {
            base,
            queries,
            k,
            output,
            metric,
        } => {
            if let Some(k) = k {
                config.search.k = k;
            }
            if let Some(metric) = metric {
                config.index.metric = metric;
            }
            config.validate()?;

            let store = load_store(&base)?;
            let queries = load_queries(&queries, store.dimension())?;
            let rows = experiment::compute_ground_truth(
                store,
                &queries,
                config.index.metric,
                config.search.k,
                show_progress,
            )?;
            xvecs::write_ivecs(&output, &rows)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!(
                "{} {} rows of {} neighbors ({}) to {}",
                "Wrote".green().bold(),
                rows.len(),
                config.search.k,
                config.index.metric,
                output.display()
            );
        }
        Commands::Bench {
            base,
            queries,
            ground_truth,
            algorithm,
            k,
            metric,
            m,
            ef_construction,
            ef_search,
            seed,
            format,
        } => {
            if let Some(algorithm) = algorithm {
                config.index.algorithm = algorithm;
            }
            if let Some(k) = k {
                config.search.k = k;
            }
            if let Some(metric) = metric {
                config.index.metric = metric;
            }
            if let Some(m) = m {
                config.hnsw.m = m;
            }
            if let Some(ef) = ef_construction {
                config.hnsw.ef_construction = ef;
            }
            if let Some(ef) = ef_search {
                config.hnsw.ef_search = ef;
            }
            if seed.is_some() {
                config.hnsw.seed = seed;
                config.vptree.seed = seed;
            }
            config.validate()?;

            let store = load_store(&base)?;
            let queries = load_queries(&queries, store.dimension())?;
            let ground_truth = ground_truth
                .map(|path| {
                    xvecs::read_ivecs(&path)
                        .map(|data| data.rows)
                        .with_context(|| format!("Failed to read {}", path.display()))
                })
                .transpose()?;

            let experiment = ExperimentConfig::from_config(&config, show_progress);
            let report = experiment::run(store, &queries, ground_truth, &config, &experiment)?;

            match format {
                OutputFormat::Table => print_report(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
    }

    Ok(())
}

/// Installs the global subscriber; `RUST_LOG` overrides the configured level.
///
/// Output goes to the configured log file (appended, no ANSI colors) or to
/// stderr when none is set.
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let json = config.format == "json";

    let result = if let Some(path) = &config.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        }
    } else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        }
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn load_store(path: &Path) -> Result<fastann_core::VectorStore> {
    let data =
        xvecs::read_fvecs(path).with_context(|| format!("Failed to read {}", path.display()))?;
    tracing::debug!(records = data.len(), dimension = data.dimension, "Loaded base vectors");
    experiment::store_from_rows(data.dimension, data.rows)
}

fn load_queries(path: &Path, dimension: usize) -> Result<Vec<Vec<f32>>> {
    let data =
        xvecs::read_fvecs(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !data.is_empty() && data.dimension != dimension {
        anyhow::bail!(
            "Query dimension {} does not match base dimension {}",
            data.dimension,
            dimension
        );
    }
    Ok(data.rows)
}

fn print_report(report: &ExperimentReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("metric").fg(Color::Cyan),
            Cell::new("value").fg(Color::Cyan),
        ]);

    let recall_label = format!("recall@{}", report.k);
    let rows = [
        ("algorithm", report.algorithm.to_string()),
        ("distance", report.metric.to_string()),
        ("points", report.points.to_string()),
        ("dimension", report.dimension.to_string()),
        ("queries", report.queries.to_string()),
        ("k", report.k.to_string()),
        ("build time", format!("{:.1} ms", report.build_ms)),
        ("latency mean", format!("{:.1} us", report.latency.mean_us)),
        ("latency p50", format!("{:.1} us", report.latency.p50_us)),
        ("latency p95", format!("{:.1} us", report.latency.p95_us)),
        ("latency p99", format!("{:.1} us", report.latency.p99_us)),
        ("throughput", format!("{:.0} qps", report.queries_per_sec)),
        (recall_label.as_str(), format!("{:.4}", report.recall)),
        ("precision", format!("{:.4}", report.precision)),
        ("mrr", format!("{:.4}", report.mrr)),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    println!("\n{}", "Benchmark Summary".green().bold());
    println!("{table}");
}
