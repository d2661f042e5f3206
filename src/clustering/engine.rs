//! Clustering comparison engine.
//!
//! One low-level primitive ([`run`]) delegates to the algorithm providers;
//! three analytical operations are built on it to characterize a vector set
//! without ground truth. The engine only reads its inputs, so the mutually
//! independent hierarchical runs are fanned out across rayon workers.

use crate::clustering::config::{HierarchicalParams, KMeansParams, Linkage, RunConfig};
use crate::clustering::{hierarchical, kmeans};
use crate::core::vector::FeatureVector;
use crate::errors::ClusterError;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// One clustering run. Created unexecuted; `execute` consumes the created
/// run and returns the executed one, so a run can never be re-executed.
#[derive(Debug, Clone)]
pub struct ClusterRun {
    title: String,
    config: RunConfig,
    labels: Vec<String>,
    assignment: Option<Vec<usize>>,
}

impl ClusterRun {
    pub fn new(title: impl Into<String>, config: RunConfig, labels: Vec<String>) -> ClusterRun {
        ClusterRun {
            title: title.into(),
            config,
            labels,
            assignment: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn execute(mut self, rows: &[Vec<f64>]) -> Result<ClusterRun, ClusterError> {
        debug!("executing '{}' ({})", self.title, self.config.describe());
        self.assignment = Some(run(rows, &self.config)?);
        Ok(self)
    }

    /// The run's read-only summary. Fails with [`ClusterError::UnexecutedRun`]
    /// until `execute` has produced an assignment.
    pub fn summary(&self) -> Result<RunResult, ClusterError> {
        let clusters = self
            .assignment
            .clone()
            .ok_or_else(|| ClusterError::UnexecutedRun(self.title.clone()))?;
        Ok(RunResult {
            title: self.title.clone(),
            params: self.config.describe(),
            labels: self.labels.clone(),
            clusters,
        })
    }
}

/// Externally visible artifact of one executed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub title: String,
    pub params: String,
    pub labels: Vec<String>,
    pub clusters: Vec<usize>,
}

impl RunResult {
    pub fn distinct_clusters(&self) -> usize {
        distinct_count(&self.clusters)
    }
}

/// Cluster counts observed while sweeping the distance threshold for one
/// linkage strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSweep {
    pub linkage: Linkage,
    pub cluster_counts: Vec<usize>,
}

/// The clustering primitive: validate, then delegate to the provider the
/// config selects. Cluster ids are arbitrary small integers, meaningless
/// beyond equality and not comparable across runs.
pub fn run(rows: &[Vec<f64>], config: &RunConfig) -> Result<Vec<usize>, ClusterError> {
    config.validate()?;
    match config {
        RunConfig::Hierarchical(params) => hierarchical::cluster(rows, params),
        RunConfig::KMeans(params) => kmeans::cluster(rows, params),
    }
}

pub fn to_rows(vectors: &[FeatureVector]) -> Vec<Vec<f64>> {
    vectors.iter().map(FeatureVector::to_row).collect()
}

fn distinct_count(assignment: &[usize]) -> usize {
    assignment.iter().collect::<HashSet<_>>().len()
}

/// Run every linkage strategy once with the given hierarchical parameters
/// (the `linkage` field is replaced per strategy), then k-means once.
///
/// When the k-means parameters do not pin a cluster count, the floor of the
/// mean distinct-cluster count of the four hierarchical results seeds it.
/// Returns exactly five results: ward, complete, average, single, k-means.
pub fn compare_algorithms(
    labels: &[String],
    vectors: &[FeatureVector],
    hierarchical_params: &HierarchicalParams,
    kmeans_params: &KMeansParams,
) -> Result<Vec<RunResult>, ClusterError> {
    hierarchical_params.validate()?;
    let rows = to_rows(vectors);

    let mut results = Linkage::ALL
        .par_iter()
        .map(|&linkage| {
            let params = HierarchicalParams {
                linkage,
                ..hierarchical_params.clone()
            };
            let title = format!("Agglomerative clustering with {linkage} linkage");
            ClusterRun::new(title, RunConfig::Hierarchical(params), labels.to_vec())
                .execute(&rows)?
                .summary()
        })
        .collect::<Result<Vec<_>, ClusterError>>()?;

    let mean = results
        .iter()
        .map(RunResult::distinct_clusters)
        .sum::<usize>() as f64
        / results.len() as f64;
    let consensus = (mean.floor() as usize).max(1);

    let mut kmeans_params = kmeans_params.clone();
    if kmeans_params.cluster_count.is_none() {
        debug!("seeding k-means with consensus cluster count {consensus}");
        kmeans_params.cluster_count = Some(consensus);
    }
    let kmeans_run = ClusterRun::new(
        "K-means clustering",
        RunConfig::KMeans(kmeans_params),
        labels.to_vec(),
    );
    results.push(kmeans_run.execute(&rows)?.summary()?);
    Ok(results)
}

/// For each linkage strategy, sweep an integer distance threshold over
/// `1..=max_threshold` in threshold-driven mode and record the distinct
/// cluster count at every step. No monotonicity is assumed.
pub fn compare_distance_threshold(
    labels: &[String],
    vectors: &[FeatureVector],
    max_threshold: usize,
) -> Result<Vec<ThresholdSweep>, ClusterError> {
    let rows = to_rows(vectors);
    Linkage::ALL
        .par_iter()
        .map(|&linkage| {
            let cluster_counts = (1..=max_threshold)
                .map(|threshold| {
                    let params = HierarchicalParams::with_threshold(linkage, threshold as f64);
                    let title = format!(
                        "Agglomerative clustering with {linkage} linkage at distance threshold {threshold}"
                    );
                    let result =
                        ClusterRun::new(title, RunConfig::Hierarchical(params), labels.to_vec())
                            .execute(&rows)?
                            .summary()?;
                    Ok(result.distinct_clusters())
                })
                .collect::<Result<Vec<_>, ClusterError>>()?;
            Ok(ThresholdSweep {
                linkage,
                cluster_counts,
            })
        })
        .collect()
}

/// Re-cluster growing prefixes of the input (sizes `2..=N`) under one fixed
/// hierarchical configuration, recording the distinct-cluster count and a
/// log line per step. Shows how the clustering structure stabilizes as
/// samples are added.
pub fn monitor_cluster_evolution(
    labels: &[String],
    vectors: &[FeatureVector],
    params: &HierarchicalParams,
) -> Result<(String, Vec<usize>), ClusterError> {
    params.validate()?;
    let rows = to_rows(vectors);
    let mut lines = vec![params.describe()];
    let mut counts = Vec::with_capacity(rows.len().saturating_sub(1));

    for end in 2..=rows.len() {
        let assignment = run(&rows[..end], &RunConfig::Hierarchical(params.clone()))?;
        counts.push(distinct_count(&assignment));
        let added = labels
            .get(end - 1)
            .cloned()
            .unwrap_or_else(|| format!("D{}", end - 1));
        lines.push(format!("added {added}:\n{assignment:?}"));
    }

    Ok((lines.join("\n"), counts))
}
