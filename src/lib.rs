// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod clustering;
pub mod config;
pub mod core;
pub mod corpus;
pub mod errors;
pub mod extraction;
pub mod io;

// Re-export commonly used types
pub use crate::analyzers::CAnalyzer;
pub use crate::clustering::{
    compare_algorithms, compare_distance_threshold, monitor_cluster_evolution, run,
    ClusterRun, HierarchicalParams, KMeansParams, Linkage, RunConfig, RunResult, ThresholdSweep,
};
pub use crate::core::{CNode, FeatureVector, SyntaxTokenKind, VisitValue, TOKEN_KIND_COUNT};
pub use crate::errors::ClusterError;
pub use crate::extraction::{FeatureExtractor, FunctionRecord};
