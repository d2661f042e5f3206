pub mod config;
pub mod engine;
pub mod hierarchical;
pub mod kmeans;

pub use config::{HierarchicalParams, KMeansParams, Linkage, RunConfig};
pub use engine::{
    compare_algorithms, compare_distance_threshold, monitor_cluster_evolution, run, to_rows,
    ClusterRun, RunResult, ThresholdSweep,
};
