use crate::clustering::Linkage;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "clonemap")]
#[command(about = "Structural similarity analyzer for C functions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./clonemap.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cluster with every linkage strategy plus k-means and compare
    Compare {
        /// Directory of .c files to analyze
        path: PathBuf,

        /// Only analyze these function names
        #[arg(long, value_delimiter = ',')]
        functions: Option<Vec<String>>,

        /// Distance threshold for the hierarchical runs (default 5)
        #[arg(long, conflicts_with = "cluster_count")]
        distance_threshold: Option<f64>,

        /// Fixed cluster count for the hierarchical runs
        #[arg(long)]
        cluster_count: Option<usize>,

        /// Cluster count for k-means (defaults to the hierarchical consensus)
        #[arg(long)]
        kmeans_clusters: Option<usize>,

        /// Seed for k-means initialization
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Also save the report under the results directory
        #[arg(long)]
        save: bool,
    },

    /// Sweep the distance threshold and report cluster counts per linkage
    Sweep {
        /// Directory of .c files to analyze
        path: PathBuf,

        /// Only analyze these function names
        #[arg(long, value_delimiter = ',')]
        functions: Option<Vec<String>>,

        /// Upper bound of the sweep (default from config, 15)
        #[arg(long)]
        max_threshold: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Re-cluster growing prefixes and watch the cluster count stabilize
    Monitor {
        /// Directory of .c files to analyze
        path: PathBuf,

        /// Only analyze these function names
        #[arg(long, value_delimiter = ',')]
        functions: Option<Vec<String>>,

        /// Linkage strategy for every step
        #[arg(long, value_enum, default_value = "ward")]
        linkage: Linkage,

        /// Distance threshold for every step (default 5)
        #[arg(long, conflicts_with = "cluster_count")]
        distance_threshold: Option<f64>,

        /// Fixed cluster count for every step
        #[arg(long)]
        cluster_count: Option<usize>,

        /// Also save the log under the results directory
        #[arg(long)]
        save: bool,
    },

    /// Print per-function feature vector summaries
    Vectors {
        /// Directory of .c files to analyze
        path: PathBuf,

        /// Only analyze these function names
        #[arg(long, value_delimiter = ',')]
        functions: Option<Vec<String>>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },
}
