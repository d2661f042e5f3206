//! Centroid-based clustering provider.
//!
//! Lloyd iterations with k-means++-style initialization: the first centroid
//! is drawn with the seeded generator, the rest by farthest-point selection
//! so duplicate samples never produce coinciding centroids. Runs are
//! reproducible for a given `random_seed`. Empty clusters keep their
//! previous centroid.

use crate::clustering::config::KMeansParams;
use crate::errors::ClusterError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cmp::Ordering;

pub fn cluster(rows: &[Vec<f64>], params: &KMeansParams) -> Result<Vec<usize>, ClusterError> {
    let count = match params.cluster_count {
        Some(count) if count > 0 => count,
        _ => {
            return Err(ClusterError::InvalidConfig(
                "k-means requires a cluster_count of at least 1".to_string(),
            ))
        }
    };
    if rows.is_empty() {
        return Ok(vec![]);
    }
    let k = count.min(rows.len());

    let mut rng = ChaCha8Rng::seed_from_u64(params.random_seed);
    let mut centroids = init_centroids(rows, k, &mut rng);
    let mut assignment = vec![0usize; rows.len()];

    for _ in 0..params.max_iterations.max(1) {
        let mut changed = false;
        for (idx, row) in rows.iter().enumerate() {
            let best = nearest(row, &centroids);
            if assignment[idx] != best {
                assignment[idx] = best;
                changed = true;
            }
        }

        for (cluster, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&Vec<f64>> = rows
                .iter()
                .zip(assignment.iter())
                .filter(|(_, &id)| id == cluster)
                .map(|(row, _)| row)
                .collect();
            if !members.is_empty() {
                *centroid = mean_of(&members);
            }
        }

        if !changed {
            break;
        }
    }

    Ok(assignment)
}

fn init_centroids(rows: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let first = rng.gen_range(0..rows.len());
    let mut centroids = vec![rows[first].clone()];
    let mut min_distances: Vec<f64> = rows
        .iter()
        .map(|row| squared_euclidean(row, &rows[first]))
        .collect();

    while centroids.len() < k {
        let next = min_distances
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        centroids.push(rows[next].clone());
        for (idx, row) in rows.iter().enumerate() {
            let distance = squared_euclidean(row, &rows[next]);
            if distance < min_distances[idx] {
                min_distances[idx] = distance;
            }
        }
    }
    centroids
}

fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let distance = squared_euclidean(row, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = idx;
        }
    }
    best
}

fn mean_of(members: &[&Vec<f64>]) -> Vec<f64> {
    let dims = members.first().map_or(0, |row| row.len());
    let mut mean = vec![0.0f64; dims];
    for row in members {
        for (cell, value) in mean.iter_mut().zip(row.iter()) {
            *cell += value;
        }
    }
    for cell in mean.iter_mut() {
        *cell /= members.len() as f64;
    }
    mean
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_distant_groups() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.2, 0.1],
            vec![9.0, 9.0],
            vec![9.1, 8.9],
        ];
        let params = KMeansParams {
            cluster_count: Some(2),
            ..KMeansParams::default()
        };
        let assignment = cluster(&rows, &params).unwrap();
        assert_eq!(assignment[0], assignment[1]);
        assert_eq!(assignment[2], assignment[3]);
        assert_ne!(assignment[0], assignment[2]);
    }

    #[test]
    fn duplicate_samples_do_not_collapse_the_centroids() {
        // identical first rows must not leave both centroids on the same
        // point for any seed
        for seed in 0..8 {
            let rows = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 5.0]];
            let params = KMeansParams {
                cluster_count: Some(2),
                random_seed: seed,
                max_iterations: 50,
            };
            let assignment = cluster(&rows, &params).unwrap();
            assert_eq!(assignment[0], assignment[1], "seed {seed}");
            assert_ne!(assignment[0], assignment[2], "seed {seed}");
        }
    }

    #[test]
    fn same_seed_gives_same_assignment() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i % 4), 0.0]).collect();
        let params = KMeansParams {
            cluster_count: Some(3),
            random_seed: 42,
            max_iterations: 50,
        };
        assert_eq!(
            cluster(&rows, &params).unwrap(),
            cluster(&rows, &params).unwrap()
        );
    }

    #[test]
    fn missing_cluster_count_is_rejected() {
        let rows = vec![vec![0.0]];
        assert!(cluster(&rows, &KMeansParams::default()).is_err());
    }
}
