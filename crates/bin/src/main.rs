//! Vintage CLI binary.
//!
//! Builds cohort x maturity ratio matrices and exposure breakdowns from a
//! loan fact table.

mod integration;

use clap::{Parser, Subcommand, ValueEnum};
use integration::pipeline::{
    MatrixRequest, dataset_path, dimension_filters, load_config, load_dataset, matrix_builder,
    title,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use vintage::VintageConfig;
use vintage_data::DatasetCache;
use vintage_matrix::{Alignment, Dimension, GroupFilter, MatrixOutcome, exposure_by_dimension};
use vintage_output::{
    ExportFormat, Exporter, ReportBuilder, outcome_message, render_ascii, render_exposure,
    render_markdown,
};

#[derive(Parser)]
#[command(name = "vintage")]
#[command(about = "Vintage: cohort x maturity ratio matrices", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and render a vintage matrix
    Matrix {
        /// Fact table (.csv or .parquet)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Business unit profile
        #[arg(long)]
        unit: Option<String>,

        /// Numerator column prefix
        #[arg(long)]
        numerator: Option<String>,

        /// Denominator column prefix
        #[arg(long)]
        denominator: Option<String>,

        /// Highest maturity offset
        #[arg(long)]
        max_offset: Option<u32>,

        /// Column alignment: relative, calendar or triangular
        #[arg(long, default_value = "relative")]
        alignment: Alignment,

        /// Keep only cohorts from the last N months
        #[arg(long)]
        window: Option<u32>,

        /// Branch filter (repeatable)
        #[arg(long)]
        branch: Vec<String>,

        /// Product group filter (repeatable)
        #[arg(long)]
        product: Vec<String>,

        /// Origination channel filter (repeatable)
        #[arg(long)]
        channel: Vec<String>,

        /// Close month for triangular alignment, YYYY-MM (repeatable)
        #[arg(long)]
        close_month: Vec<String>,

        /// Append mean/max/min rows
        #[arg(long)]
        summary: bool,

        /// Also aggregate initial volume in summary rows
        #[arg(long)]
        summarize_volume: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Exposure totals per cohort and dimension value
    Exposure {
        /// Fact table (.csv or .parquet)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Business unit to restrict to
        #[arg(long)]
        unit: Option<String>,

        /// Dimension to break down by
        #[arg(long, default_value = "channel_origin")]
        dimension: Dimension,

        /// Value column to sum
        #[arg(long)]
        value_column: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List business unit profiles
    Profiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Markdown,
    Csv,
    Json,
    PrettyJson,
    Report,
}

impl OutputFormat {
    const fn export_format(self) -> Option<ExportFormat> {
        match self {
            Self::Csv => Some(ExportFormat::Csv),
            Self::Json => Some(ExportFormat::Json),
            Self::PrettyJson => Some(ExportFormat::PrettyJson),
            Self::Table | Self::Markdown | Self::Report => None,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Matrix {
            data,
            unit,
            numerator,
            denominator,
            max_offset,
            alignment,
            window,
            branch,
            product,
            channel,
            close_month,
            summary,
            summarize_volume,
            format,
            output,
        } => {
            let request = MatrixRequest {
                unit,
                numerator,
                denominator,
                max_offset,
                alignment,
                window,
                filters: dimension_filters(branch, product, channel),
                summary,
                summarize_volume,
                close_months: close_month,
            };
            run_matrix(&config, data, &request, format, output.as_deref())?;
        }
        Commands::Exposure {
            data,
            unit,
            dimension,
            value_column,
            format,
            output,
        } => {
            run_exposure(
                &config,
                data,
                unit,
                dimension,
                value_column,
                format,
                output.as_deref(),
            )?;
        }
        Commands::Profiles => list_profiles(&config),
    }

    Ok(())
}

fn run_matrix(
    config: &VintageConfig,
    data: Option<PathBuf>,
    request: &MatrixRequest,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = dataset_path(data, config)?;
    let mut cache = DatasetCache::new(config.cache_ttl());
    let facts = load_dataset(&mut cache, &path)?;

    let outcome = matrix_builder(request, config)?.build(&facts)?;
    let title = title(request);

    if format == OutputFormat::Report {
        let report = ReportBuilder::new()
            .title(&title)
            .parameters(json!({
                "dataset": path.display().to_string(),
                "unit": request.unit,
                "numerator": request.numerator,
                "denominator": request.denominator,
                "max_offset": request.max_offset,
                "alignment": request.alignment.as_str(),
                "window": request.window,
                "summary": request.summary,
            }))
            .build(&outcome)?;
        return emit(&report.to_json()?, output);
    }

    let matrix = match outcome {
        MatrixOutcome::Ready(matrix) => matrix,
        other => {
            if let Some(message) = outcome_message(&other) {
                eprintln!("{message}");
            }
            return Ok(());
        }
    };

    match (format, format.export_format()) {
        (_, Some(export)) => match output {
            Some(path) => matrix.export_to_file(path, export)?,
            None => println!("{}", matrix.export_to_string(export)?),
        },
        (OutputFormat::Markdown, None) => emit(&render_markdown(&matrix, &title), output)?,
        _ => emit(&render_ascii(&matrix, &title), output)?,
    }
    Ok(())
}

fn run_exposure(
    config: &VintageConfig,
    data: Option<PathBuf>,
    unit: Option<String>,
    dimension: Dimension,
    value_column: Option<String>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = dataset_path(data, config)?;
    let mut cache = DatasetCache::new(config.cache_ttl());
    let facts = load_dataset(&mut cache, &path)?;

    let filters: Vec<GroupFilter> = unit
        .into_iter()
        .map(|u| GroupFilter::equals(Dimension::BusinessUnit, u))
        .collect();
    let value_column = value_column.unwrap_or_else(|| config.exposure_column.clone());

    let bars = exposure_by_dimension(&facts, &config.schema, dimension, &value_column, &filters)?;
    if bars.is_empty() {
        log::warn!("no exposure data for the current filters");
    }

    match format.export_format() {
        Some(export) => match output {
            Some(path) => bars.export_to_file(path, export)?,
            None => println!("{}", bars.export_to_string(export)?),
        },
        None => {
            let title = format!("Exposure by {dimension} ({value_column})");
            emit(&render_exposure(&bars, &title), output)?;
        }
    }
    Ok(())
}

fn list_profiles(config: &VintageConfig) {
    println!(
        "{:<12} {:<28} {:<28} {:>10}",
        "Unit", "Numerator", "Denominator", "Max offset"
    );
    println!("{}", "-".repeat(81));
    for profile in &config.profiles {
        println!(
            "{:<12} {:<28} {:<28} {:>10}",
            profile.name,
            profile.numerator_prefix,
            profile.denominator_prefix,
            profile.max_offset.unwrap_or(config.default_max_offset)
        );
    }
}

fn emit(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
