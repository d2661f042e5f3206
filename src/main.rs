use anyhow::{bail, Result};
use clap::Parser;
use clonemap::cli::{Cli, Commands, OutputFormat};
use clonemap::clustering::{
    compare_algorithms, compare_distance_threshold, monitor_cluster_evolution,
    HierarchicalParams, KMeansParams, Linkage,
};
use clonemap::config::Config;
use clonemap::corpus;
use clonemap::extraction::FunctionRecord;
use clonemap::io::output;
use colored::Colorize;
use std::path::Path;

const DEFAULT_DISTANCE_THRESHOLD: f64 = 5.0;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Compare {
            path,
            functions,
            distance_threshold,
            cluster_count,
            kmeans_clusters,
            seed,
            format,
            save,
        } => run_compare(
            &config,
            &path,
            functions,
            distance_threshold,
            cluster_count,
            kmeans_clusters,
            seed,
            format,
            save,
        ),
        Commands::Sweep {
            path,
            functions,
            max_threshold,
            format,
        } => run_sweep(&config, &path, functions, max_threshold, format),
        Commands::Monitor {
            path,
            functions,
            linkage,
            distance_threshold,
            cluster_count,
            save,
        } => run_monitor(
            &config,
            &path,
            functions,
            linkage,
            distance_threshold,
            cluster_count,
            save,
        ),
        Commands::Vectors {
            path,
            functions,
            format,
        } => run_vectors(&path, functions, format),
    }
}

fn load_records(path: &Path, functions: Option<Vec<String>>) -> Result<Vec<FunctionRecord>> {
    let records = corpus::extract_directory(path)?;
    let records = corpus::select_functions(records, &functions.unwrap_or_default());
    if records.is_empty() {
        bail!("no matching functions found under {}", path.display());
    }
    Ok(records)
}

fn hierarchical_params(
    linkage: Linkage,
    distance_threshold: Option<f64>,
    cluster_count: Option<usize>,
) -> HierarchicalParams {
    match cluster_count {
        Some(count) => HierarchicalParams::with_cluster_count(linkage, count),
        None => HierarchicalParams::with_threshold(
            linkage,
            distance_threshold.unwrap_or(DEFAULT_DISTANCE_THRESHOLD),
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_compare(
    config: &Config,
    path: &Path,
    functions: Option<Vec<String>>,
    distance_threshold: Option<f64>,
    cluster_count: Option<usize>,
    kmeans_clusters: Option<usize>,
    seed: Option<u64>,
    format: OutputFormat,
    save: bool,
) -> Result<()> {
    let records = load_records(path, functions)?;
    let (labels, vectors) = FunctionRecord::split(&records);

    // the linkage field is replaced per strategy by compare_algorithms
    let hierarchical = hierarchical_params(Linkage::Ward, distance_threshold, cluster_count);
    let kmeans = KMeansParams {
        cluster_count: kmeans_clusters,
        random_seed: seed.unwrap_or(config.kmeans_seed),
        max_iterations: config.kmeans_max_iterations,
    };

    let results = compare_algorithms(&labels, &vectors, &hierarchical, &kmeans)?;
    let rendered = output::render_results(&results);
    match format {
        OutputFormat::Terminal => {
            println!("{}", "Comparing clustering algorithms".bold());
            println!("{rendered}");
        }
        OutputFormat::Json => println!("{}", output::to_json(&results)?),
    }
    if save {
        let report = output::save_report(&config.results_dir, &rendered, None)?;
        println!("report saved to {}", report.display());
    }
    Ok(())
}

fn run_sweep(
    config: &Config,
    path: &Path,
    functions: Option<Vec<String>>,
    max_threshold: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let records = load_records(path, functions)?;
    let (labels, vectors) = FunctionRecord::split(&records);
    let max_threshold = max_threshold.unwrap_or(config.max_distance_threshold);
    if max_threshold == 0 {
        bail!("max threshold must be at least 1");
    }

    let sweeps = compare_distance_threshold(&labels, &vectors, max_threshold)?;
    match format {
        OutputFormat::Terminal => {
            println!("{}", "Sweeping distance thresholds".bold());
            println!("{}", output::render_sweeps(&sweeps));
        }
        OutputFormat::Json => println!("{}", output::to_json(&sweeps)?),
    }
    Ok(())
}

fn run_monitor(
    config: &Config,
    path: &Path,
    functions: Option<Vec<String>>,
    linkage: Linkage,
    distance_threshold: Option<f64>,
    cluster_count: Option<usize>,
    save: bool,
) -> Result<()> {
    let mut records = load_records(path, functions)?;
    FunctionRecord::assign_labels(&mut records);
    let (labels, vectors) = FunctionRecord::split(&records);
    let params = hierarchical_params(linkage, distance_threshold, cluster_count);

    let (log_text, counts) = monitor_cluster_evolution(&labels, &vectors, &params)?;
    println!("{}", "Monitoring cluster evolution".bold());
    println!("{log_text}");
    println!("cluster counts: {counts:?}");
    if save {
        let name = format!("monitor-{}.txt", params.linkage);
        let report = output::save_report(&config.results_dir, &log_text, Some(&name))?;
        println!("log saved to {}", report.display());
    }
    Ok(())
}

fn run_vectors(path: &Path, functions: Option<Vec<String>>, format: OutputFormat) -> Result<()> {
    let mut records = load_records(path, functions)?;
    FunctionRecord::assign_labels(&mut records);
    match format {
        OutputFormat::Terminal => println!("{}", output::render_vector_summaries(&records)),
        OutputFormat::Json => println!("{}", output::to_json(&records)?),
    }
    Ok(())
}
