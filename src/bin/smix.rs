//! smix - source unmixing and MDS for categorical count tables
//!
//! Command-line interface for Monte Carlo source unmixing and metric MDS.

use clap::{Args, Parser, Subcommand, ValueEnum};
use sourcemix::data::CategoryOrder;
use sourcemix::error::Result;
use sourcemix::metric::{metric_matrices, metric_matrix, Metric};
use sourcemix::pipeline::{Analysis, AnalysisConfig, AnalysisSteps};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON document
    Json,
    /// Tab-separated table
    Tsv,
}

/// Source unmixing and ordination of categorical count distributions
#[derive(Parser)]
#[command(name = "smix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a count table.
#[derive(Args, Debug)]
struct InputArgs {
    /// Count table (TSV, or CSV by extension): rows are samples, columns are categories
    #[arg(short = 'c', long)]
    counts: PathBuf,

    /// Analysis configuration YAML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Categories to drop before normalization (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Sort categories alphabetically instead of using column order
    #[arg(long)]
    alphabetical: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile a count table
    Info {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write normalized (or cumulative) distributions as TSV
    Dist {
        #[command(flatten)]
        input: InputArgs,

        /// Write cumulative proportions
        #[arg(long)]
        cumulative: bool,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Estimate source contributions to a sink sample
    Unmix {
        #[command(flatten)]
        input: InputArgs,

        /// Sink sample name
        #[arg(long)]
        sink: String,

        /// Source sample names (comma-separated, at least two)
        #[arg(long, value_delimiter = ',', required = true)]
        sources: Vec<String>,

        /// Metric: r2, similarity, likeness, ks, kuiper, chi_squared
        #[arg(short, long, default_value = "r2")]
        metric: String,

        /// Number of Monte Carlo trials
        #[arg(long)]
        trials: Option<usize>,

        /// Fraction of best trials retained
        #[arg(long)]
        retain: Option<f64>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lay out all samples with metric MDS
    Mds {
        #[command(flatten)]
        input: InputArgs,

        /// Metric: r2, similarity, likeness, ks, kuiper, chi_squared
        #[arg(short, long, default_value = "r2")]
        metric: String,

        /// Embedding dimensions
        #[arg(short, long)]
        dimensions: Option<usize>,

        /// Maximum SMACOF iterations
        #[arg(long)]
        max_iterations: Option<usize>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pairwise metric matrices between all samples
    Metrics {
        #[command(flatten)]
        input: InputArgs,

        /// Single metric (all metrics if omitted)
        #[arg(short, long)]
        metric: Option<String>,

        /// Directory for one TSV per metric (JSON to stdout if omitted)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Run distributions, MDS and metric matrices in one pass
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Run every step
        #[arg(long)]
        all: bool,

        /// Write normalized and cumulative distribution tables
        #[arg(long)]
        distributions: bool,

        /// Lay out all samples with MDS
        #[arg(long)]
        mds: bool,

        /// Write pairwise matrices for every metric
        #[arg(long)]
        metrics: bool,

        /// Metric for the MDS step
        #[arg(short = 'm', long, default_value = "similarity")]
        mds_metric: String,
    },

    /// Write an example analysis configuration
    ExampleConfig {
        /// Output path for the YAML file
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Info { input, format } => cmd_info(&input, format),
        Commands::Dist {
            input,
            cumulative,
            output,
        } => cmd_dist(&input, cumulative, output.as_deref()),
        Commands::Unmix {
            input,
            sink,
            sources,
            metric,
            trials,
            retain,
            seed,
            format,
            output,
        } => cmd_unmix(
            &input,
            &sink,
            &sources,
            &metric,
            trials,
            retain,
            seed,
            format,
            output.as_deref(),
        ),
        Commands::Mds {
            input,
            metric,
            dimensions,
            max_iterations,
            format,
            output,
        } => cmd_mds(&input, &metric, dimensions, max_iterations, format, output.as_deref()),
        Commands::Metrics {
            input,
            metric,
            output_dir,
        } => cmd_metrics(&input, metric.as_deref(), output_dir.as_deref()),
        Commands::Analyze {
            input,
            output,
            all,
            distributions,
            mds,
            metrics,
            mds_metric,
        } => {
            let steps = AnalysisSteps {
                distributions: all || distributions,
                mds: all || mds,
                metrics: all || metrics,
                ..AnalysisSteps::none()
            };
            cmd_analyze(&input, &output, steps, &mds_metric)
        }
        Commands::ExampleConfig { output } => cmd_example_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sourcemix={},smix={}", level, level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Configuration from `--config`, with the shared flag overrides applied.
fn build_config(input: &InputArgs) -> Result<AnalysisConfig> {
    let mut config = match &input.config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(exclude) = &input.exclude {
        config.normalize.exclude = exclude.clone();
    }
    if input.alphabetical {
        config.normalize.category_order = CategoryOrder::Alphabetical;
    }
    Ok(config)
}

fn load_with(input: &InputArgs, config: AnalysisConfig) -> Result<Analysis> {
    eprintln!("Loading counts from {:?}...", input.counts);
    Analysis::from_path(&input.counts, config)
}

fn load(input: &InputArgs) -> Result<Analysis> {
    load_with(input, build_config(input)?)
}

/// Write `text` to a file, or stdout when no path is given.
fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            eprintln!("Wrote {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
        }
    }
    Ok(())
}

fn cmd_info(input: &InputArgs, format: OutputFormat) -> Result<()> {
    let analysis = load(input)?;
    let profile = analysis.profile();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(profile)?),
        OutputFormat::Tsv => {
            println!("sample\ttotal\tn_present\tdominant\tdominant_proportion\texcluded");
            for s in &profile.samples {
                println!(
                    "{}\t{}\t{}\t{}\t{:.6}\t{}",
                    s.name,
                    s.total,
                    s.n_present,
                    s.dominant.as_deref().unwrap_or("NA"),
                    s.dominant_proportion,
                    s.excluded
                );
            }
        }
        OutputFormat::Text => {
            print!("{}", profile);
            println!();
            println!("Category order: {}", analysis.samples().categories().join(", "));
        }
    }
    Ok(())
}

fn cmd_dist(input: &InputArgs, cumulative: bool, output: Option<&Path>) -> Result<()> {
    let analysis = load(input)?;
    let mut buf = Vec::new();
    analysis.samples().write_tsv(&mut buf, cumulative)?;
    emit(output, &String::from_utf8_lossy(&buf))
}

#[allow(clippy::too_many_arguments)]
fn cmd_unmix(
    input: &InputArgs,
    sink: &str,
    sources: &[String],
    metric: &str,
    trials: Option<usize>,
    retain: Option<f64>,
    seed: Option<u64>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let metric: Metric = metric.parse()?;
    let mut config = build_config(input)?;
    if let Some(trials) = trials {
        config.unmix.trials = trials;
    }
    if let Some(retain) = retain {
        config.unmix.retain_fraction = retain;
    }
    if seed.is_some() {
        config.unmix.seed = seed;
    }
    let analysis = load_with(input, config)?;

    let source_refs: Vec<&str> = sources.iter().map(String::as_str).collect();
    eprintln!(
        "Unmixing '{}' from {} sources ({} metric, {} trials)...",
        sink,
        source_refs.len(),
        metric,
        analysis.config().unmix.trials
    );
    let result = analysis.unmix(sink, &source_refs, metric)?;

    let text = match format {
        OutputFormat::Text => result.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&result)? + "\n",
        OutputFormat::Tsv => {
            let mut buf = Vec::new();
            result.write_tsv(&mut buf)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };
    emit(output, &text)
}

fn cmd_mds(
    input: &InputArgs,
    metric: &str,
    dimensions: Option<usize>,
    max_iterations: Option<usize>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let metric: Metric = metric.parse()?;
    let mut config = build_config(input)?;
    if let Some(dimensions) = dimensions {
        config.mds.dimensions = dimensions;
    }
    if let Some(max_iterations) = max_iterations {
        config.mds.max_iterations = max_iterations;
    }
    let analysis = load_with(input, config)?;

    eprintln!(
        "Running MDS on {} samples ({} metric)...",
        analysis.samples().len(),
        metric
    );
    let result = analysis.mds(metric)?;
    if !result.converged {
        eprintln!("Warning: MDS stopped after {} iterations without converging", result.iterations);
    }

    let text = match format {
        OutputFormat::Text => result.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&result)? + "\n",
        OutputFormat::Tsv => {
            let mut buf = Vec::new();
            result.write_tsv(&mut buf)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };
    emit(output, &text)
}

fn cmd_metrics(input: &InputArgs, metric: Option<&str>, output_dir: Option<&Path>) -> Result<()> {
    let analysis = load(input)?;
    let matrices = match metric {
        Some(name) => vec![metric_matrix(analysis.samples(), name.parse()?)],
        None => metric_matrices(analysis.samples()),
    };

    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            for matrix in &matrices {
                let path = dir.join(format!("{}_matrix.tsv", matrix.metric));
                matrix.to_tsv(&path)?;
                eprintln!("Wrote {:?}", path);
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&matrices)?),
    }
    Ok(())
}

fn cmd_analyze(
    input: &InputArgs,
    output: &Path,
    mut steps: AnalysisSteps,
    mds_metric: &str,
) -> Result<()> {
    steps.mds_metric = mds_metric.parse()?;
    let analysis = load(input)?;

    eprintln!("Running analysis...");
    let report = analysis.run_all(&steps)?;
    let written = report.write_to_dir(output)?;
    for path in &written {
        eprintln!("Wrote {:?}", path);
    }

    print!("{}", report);
    println!("Results saved to {:?}", output);
    Ok(())
}

fn cmd_example_config(output: &Path) -> Result<()> {
    let mut config = AnalysisConfig::default();
    config.unmix.seed = Some(42);
    let yaml = config.to_yaml()?;

    std::fs::write(output, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);
    Ok(())
}
