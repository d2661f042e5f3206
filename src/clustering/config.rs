//! Clustering run configuration and its validation.

use crate::errors::ClusterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule for measuring inter-cluster distance during hierarchical merging.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    Ward,
    Complete,
    Average,
    Single,
}

impl Linkage {
    pub const ALL: [Linkage; 4] = [
        Linkage::Ward,
        Linkage::Complete,
        Linkage::Average,
        Linkage::Single,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Linkage::Ward => "ward",
            Linkage::Complete => "complete",
            Linkage::Average => "average",
            Linkage::Single => "single",
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Linkage {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ward" => Ok(Linkage::Ward),
            "complete" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            "single" => Ok(Linkage::Single),
            other => Err(ClusterError::InvalidConfig(format!(
                "unknown linkage strategy '{other}'"
            ))),
        }
    }
}

/// Parameters for one agglomerative run. Exactly one of `cluster_count` and
/// `distance_threshold` must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalParams {
    pub cluster_count: Option<usize>,
    pub distance_threshold: Option<f64>,
    pub linkage: Linkage,
}

impl HierarchicalParams {
    pub fn with_threshold(linkage: Linkage, distance_threshold: f64) -> HierarchicalParams {
        HierarchicalParams {
            cluster_count: None,
            distance_threshold: Some(distance_threshold),
            linkage,
        }
    }

    pub fn with_cluster_count(linkage: Linkage, cluster_count: usize) -> HierarchicalParams {
        HierarchicalParams {
            cluster_count: Some(cluster_count),
            distance_threshold: None,
            linkage,
        }
    }

    pub fn validate(&self) -> Result<(), ClusterError> {
        match (self.cluster_count, self.distance_threshold) {
            (Some(_), Some(_)) => Err(ClusterError::InvalidConfig(
                "cluster_count and distance_threshold are mutually exclusive".to_string(),
            )),
            (None, None) => Err(ClusterError::InvalidConfig(
                "either cluster_count or distance_threshold is required".to_string(),
            )),
            (Some(0), None) => Err(ClusterError::InvalidConfig(
                "cluster_count must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn describe(&self) -> String {
        match (self.cluster_count, self.distance_threshold) {
            (Some(count), _) => format!("linkage={}, cluster_count={}", self.linkage, count),
            (_, Some(threshold)) => {
                format!("linkage={}, distance_threshold={}", self.linkage, threshold)
            }
            _ => format!("linkage={}", self.linkage),
        }
    }
}

/// Parameters for one k-means run. `cluster_count` may stay unset when the
/// caller lets `compare_algorithms` seed it from the hierarchical consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    pub cluster_count: Option<usize>,
    pub random_seed: u64,
    pub max_iterations: usize,
}

impl Default for KMeansParams {
    fn default() -> Self {
        KMeansParams {
            cluster_count: None,
            random_seed: 0,
            max_iterations: 300,
        }
    }
}

impl KMeansParams {
    pub fn validate(&self) -> Result<(), ClusterError> {
        match self.cluster_count {
            None => Err(ClusterError::InvalidConfig(
                "k-means requires a cluster_count".to_string(),
            )),
            Some(0) => Err(ClusterError::InvalidConfig(
                "cluster_count must be at least 1".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    pub fn describe(&self) -> String {
        let count = self
            .cluster_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "auto".to_string());
        format!(
            "cluster_count={}, random_seed={}",
            count, self.random_seed
        )
    }
}

/// Algorithm selection for the `run` primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunConfig {
    Hierarchical(HierarchicalParams),
    KMeans(KMeansParams),
}

impl RunConfig {
    /// Reject ambiguous configurations before anything reaches a provider.
    pub fn validate(&self) -> Result<(), ClusterError> {
        match self {
            RunConfig::Hierarchical(params) => params.validate(),
            RunConfig::KMeans(params) => params.validate(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            RunConfig::Hierarchical(params) => params.describe(),
            RunConfig::KMeans(params) => params.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchical_requires_exactly_one_stop_rule() {
        let both = HierarchicalParams {
            cluster_count: Some(3),
            distance_threshold: Some(5.0),
            linkage: Linkage::Ward,
        };
        assert!(both.validate().is_err());

        let neither = HierarchicalParams {
            cluster_count: None,
            distance_threshold: None,
            linkage: Linkage::Ward,
        };
        assert!(neither.validate().is_err());

        assert!(HierarchicalParams::with_threshold(Linkage::Ward, 5.0)
            .validate()
            .is_ok());
        assert!(HierarchicalParams::with_cluster_count(Linkage::Single, 2)
            .validate()
            .is_ok());
    }

    #[test]
    fn kmeans_without_count_is_rejected_at_run_time() {
        assert!(KMeansParams::default().validate().is_err());
    }

    #[test]
    fn linkage_round_trips_through_strings() {
        for linkage in Linkage::ALL {
            assert_eq!(linkage.as_str().parse::<Linkage>(), Ok(linkage));
        }
        assert!("centroid".parse::<Linkage>().is_err());
    }
}
