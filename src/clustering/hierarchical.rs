//! Agglomerative clustering provider.
//!
//! Bottom-up merging over a Euclidean distance matrix, with the four linkage
//! strategies expressed as Lance–Williams updates. Merging stops either when
//! the requested cluster count is reached or when no remaining pair is
//! closer than the distance threshold.

use crate::clustering::config::{HierarchicalParams, Linkage};
use crate::errors::ClusterError;

pub fn cluster(rows: &[Vec<f64>], params: &HierarchicalParams) -> Result<Vec<usize>, ClusterError> {
    params.validate()?;
    let n = rows.len();
    if n == 0 {
        return Ok(vec![]);
    }

    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&rows[i], &rows[j]);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut active = vec![true; n];
    let mut sizes = vec![1.0f64; n];
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut remaining = n;

    while remaining > 1 {
        if let Some(target) = params.cluster_count {
            if remaining <= target {
                break;
            }
        }

        let Some((i, j, d)) = closest_pair(&dist, &active) else {
            break;
        };
        if let Some(threshold) = params.distance_threshold {
            // Clusters at or above the threshold are never merged.
            if d >= threshold {
                break;
            }
        }

        for k in 0..n {
            if !active[k] || k == i || k == j {
                continue;
            }
            let dik = dist[i][k];
            let djk = dist[j][k];
            let updated = match params.linkage {
                Linkage::Single => dik.min(djk),
                Linkage::Complete => dik.max(djk),
                Linkage::Average => {
                    (sizes[i] * dik + sizes[j] * djk) / (sizes[i] + sizes[j])
                }
                Linkage::Ward => {
                    let (si, sj, sk) = (sizes[i], sizes[j], sizes[k]);
                    let total = si + sj + sk;
                    (((si + sk) * dik * dik + (sj + sk) * djk * djk - sk * d * d) / total)
                        .max(0.0)
                        .sqrt()
                }
            };
            dist[i][k] = updated;
            dist[k][i] = updated;
        }

        sizes[i] += sizes[j];
        let moved = std::mem::take(&mut members[j]);
        members[i].extend(moved);
        active[j] = false;
        remaining -= 1;
    }

    let mut assignment = vec![0usize; n];
    let mut next_id = 0;
    for i in 0..n {
        if active[i] {
            for &member in &members[i] {
                assignment[member] = next_id;
            }
            next_id += 1;
        }
    }
    Ok(assignment)
}

fn closest_pair(dist: &[Vec<f64>], active: &[bool]) -> Option<(usize, usize, f64)> {
    let n = active.len();
    let mut best: Option<(usize, usize, f64)> = None;
    for i in 0..n {
        if !active[i] {
            continue;
        }
        for j in (i + 1)..n {
            if !active[j] {
                continue;
            }
            if best.map_or(true, |(_, _, best_d)| dist[i][j] < best_d) {
                best = Some((i, j, dist[i][j]));
            }
        }
    }
    best
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.5, 0.0],
            vec![10.0, 10.0],
            vec![10.5, 10.0],
        ]
    }

    #[test]
    fn threshold_splits_well_separated_groups() {
        for linkage in Linkage::ALL {
            let params = HierarchicalParams::with_threshold(linkage, 2.0);
            let assignment = cluster(&rows(), &params).unwrap();
            assert_eq!(assignment[0], assignment[1], "{linkage}");
            assert_eq!(assignment[2], assignment[3], "{linkage}");
            assert_ne!(assignment[0], assignment[2], "{linkage}");
        }
    }

    #[test]
    fn cluster_count_of_one_merges_everything() {
        let params = HierarchicalParams::with_cluster_count(Linkage::Complete, 1);
        let assignment = cluster(&rows(), &params).unwrap();
        assert!(assignment.iter().all(|&id| id == assignment[0]));
    }

    #[test]
    fn cluster_count_beyond_sample_count_leaves_singletons() {
        let params = HierarchicalParams::with_cluster_count(Linkage::Average, 10);
        let assignment = cluster(&rows(), &params).unwrap();
        let mut ids = assignment.clone();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn singleton_input_is_one_cluster() {
        let params = HierarchicalParams::with_threshold(Linkage::Ward, 1.0);
        assert_eq!(cluster(&[vec![1.0, 2.0]], &params).unwrap(), vec![0]);
    }

    #[test]
    fn empty_input_is_empty_assignment() {
        let params = HierarchicalParams::with_threshold(Linkage::Ward, 1.0);
        assert!(cluster(&[], &params).unwrap().is_empty());
    }
}
