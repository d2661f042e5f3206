//! Report rendering and persistence.
//!
//! Everything human-readable lives here: cluster tables per run, threshold
//! sweep tables, and per-function vector summaries. The engine's records
//! come in read-only and labels are rendered as given, whatever their
//! length.

use crate::clustering::{RunResult, ThresholdSweep};
use crate::extraction::FunctionRecord;
use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::presets::ASCII_FULL;
use comfy_table::Table;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Render one table per clustering run: title, parameter description, then
/// every label with its cluster id.
pub fn render_results(results: &[RunResult]) -> String {
    let mut sections = Vec::new();
    for result in results {
        let mut table = Table::new();
        table.load_preset(ASCII_FULL);
        table.set_header(vec!["Label", "Cluster"]);
        for (label, cluster) in result.labels.iter().zip(result.clusters.iter()) {
            table.add_row(vec![label.clone(), cluster.to_string()]);
        }
        sections.push(format!("{}\n{}\n{table}", result.title, result.params));
    }
    sections.join("\n\n")
}

/// Render the threshold sweep as one row per linkage strategy.
pub fn render_sweeps(sweeps: &[ThresholdSweep]) -> String {
    let width = sweeps
        .first()
        .map(|sweep| sweep.cluster_counts.len())
        .unwrap_or(0);
    let mut header = vec!["Linkage".to_string()];
    header.extend((1..=width).map(|threshold| threshold.to_string()));

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(header);
    for sweep in sweeps {
        let mut row = vec![sweep.linkage.to_string()];
        row.extend(sweep.cluster_counts.iter().map(|count| count.to_string()));
        table.add_row(row);
    }
    format!("Clusters per distance threshold\n{table}")
}

/// Render the non-zero cells of every record's vector.
pub fn render_vector_summaries(records: &[FunctionRecord]) -> String {
    let mut sections = Vec::new();
    for record in records {
        let mut table = Table::new();
        table.load_preset(ASCII_FULL);
        table.set_header(vec!["Token", "Count"]);
        for (kind, count) in record.vector.non_zero() {
            table.add_row(vec![kind.to_string(), count.to_string()]);
        }
        sections.push(format!("{}\n{table}", record.display_label()));
    }
    sections.join("\n\n")
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize results")
}

/// Persist a report under `dir`, creating it if needed. Without an explicit
/// file name, a timestamped `result-...` name is used.
pub fn save_report(dir: &Path, text: &str, filename: Option<&str>) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create results directory {}", dir.display()))?;
    let name = match filename {
        Some(name) => name.to_string(),
        None => format!("result-{}.txt", Local::now().format("%d_%m_%Y-%H_%M")),
    };
    let path = dir.join(name);
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::Linkage;
    use tempfile::TempDir;

    #[test]
    fn rendered_results_contain_every_label_and_id() {
        let result = RunResult {
            title: "Agglomerative clustering with ward linkage".to_string(),
            params: "linkage=ward, distance_threshold=5".to_string(),
            labels: vec!["D0".to_string(), "D1".to_string()],
            clusters: vec![0, 1],
        };
        let rendered = render_results(&[result]);
        assert!(rendered.contains("ward"));
        assert!(rendered.contains("D0"));
        assert!(rendered.contains("D1"));
    }

    #[test]
    fn sweep_table_has_one_column_per_threshold() {
        let sweeps = vec![ThresholdSweep {
            linkage: Linkage::Single,
            cluster_counts: vec![3, 2, 1],
        }];
        let rendered = render_sweeps(&sweeps);
        assert!(rendered.contains("single"));
        for threshold in ["1", "2", "3"] {
            assert!(rendered.contains(threshold));
        }
    }

    #[test]
    fn reports_are_written_under_the_results_dir() {
        let dir = TempDir::new().unwrap();
        let results_dir = dir.path().join("results");
        let path = save_report(&results_dir, "content", Some("monitor-ward.txt")).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "content");
    }
}
