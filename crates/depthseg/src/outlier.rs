//! Statistical outlier removal for per-object point clouds.
//!
//! For every point the mean distance to its `mean_k` nearest neighbors is
//! computed; points whose mean distance exceeds `mu + sigma * std` of those
//! means over the whole cloud are dropped.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::SegmentError;
use crate::pointcloud::PointCloud;

/// k-nearest-neighbor distance queries over a fixed point set.
pub trait NeighborSearch {
    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distances from point `query` to its `k` nearest other points, ascending.
    ///
    /// Ties are resolved by index order. Fewer than `k` distances are
    /// returned when the set is smaller than `k + 1`.
    fn k_nearest_distances(&self, query: usize, k: usize, out: &mut Vec<f64>);
}

/// Exhaustive O(n) scan per query.
pub struct BruteForceNeighbors<'a> {
    points: &'a [Point3<f64>],
    scratch: std::cell::RefCell<Vec<(f64, usize)>>,
}

impl<'a> BruteForceNeighbors<'a> {
    pub fn new(points: &'a [Point3<f64>]) -> Self {
        Self {
            points,
            scratch: std::cell::RefCell::new(Vec::with_capacity(points.len())),
        }
    }
}

impl NeighborSearch for BruteForceNeighbors<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn k_nearest_distances(&self, query: usize, k: usize, out: &mut Vec<f64>) {
        out.clear();
        let q = self.points[query];
        let mut cand = self.scratch.borrow_mut();
        cand.clear();
        cand.extend(
            self.points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != query)
                .map(|(j, p)| ((p - q).norm(), j)),
        );
        let k = k.min(cand.len());
        if k == 0 {
            return;
        }
        if k < cand.len() {
            cand.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            cand.truncate(k);
        }
        cand.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        out.extend(cand.iter().map(|&(d, _)| d));
    }
}

/// Whether outlier filtering runs, and with which parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterPolicy {
    /// Clouds pass through untouched.
    #[default]
    Disabled,
    /// Statistical outlier removal with the given window and multiplier.
    Enabled { mean_k: usize, sigma: f64 },
}

impl FilterPolicy {
    /// Both parameters must be positive to enable filtering; anything else
    /// disables it.
    pub fn from_params(mean_k: i64, sigma: f64) -> Self {
        if mean_k > 0 && sigma > 0.0 && sigma.is_finite() {
            Self::Enabled {
                mean_k: mean_k as usize,
                sigma,
            }
        } else {
            Self::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    pub fn build(&self) -> Option<StatisticalOutlierFilter> {
        match *self {
            Self::Disabled => None,
            Self::Enabled { mean_k, sigma } => StatisticalOutlierFilter::new(mean_k, sigma),
        }
    }

    /// Apply the policy: identity when disabled.
    pub fn apply(&self, cloud: &PointCloud) -> PointCloud {
        match self.build() {
            Some(filter) => filter.apply(cloud),
            None => cloud.clone(),
        }
    }
}

/// Statistical outlier filter (see module docs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticalOutlierFilter {
    mean_k: usize,
    sigma: f64,
}

impl StatisticalOutlierFilter {
    /// Returns `None` unless `mean_k > 0` and `sigma > 0`.
    pub fn new(mean_k: usize, sigma: f64) -> Option<Self> {
        (mean_k > 0 && sigma > 0.0 && sigma.is_finite()).then_some(Self { mean_k, sigma })
    }

    pub fn mean_k(&self) -> usize {
        self.mean_k
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Filter `cloud`, returning the retained points in input order.
    ///
    /// Not idempotent in general: removing points changes the neighbor
    /// statistics of those that remain.
    pub fn apply(&self, cloud: &PointCloud) -> PointCloud {
        match self.run(cloud, || Ok::<(), Infallible>(())) {
            Ok(out) => out,
            Err(never) => match never {},
        }
    }

    /// Like [`apply`](Self::apply), checking `cancel` between per-point
    /// neighbor searches.
    pub fn apply_with_cancel(
        &self,
        cloud: &PointCloud,
        cancel: &AtomicBool,
    ) -> Result<PointCloud, SegmentError> {
        self.run(cloud, || cancellation_check(Some(cancel)))
    }

    /// `check` runs before every per-point neighbor search; its error aborts the pass.
    fn run<E>(
        &self,
        cloud: &PointCloud,
        check: impl FnMut() -> Result<(), E>,
    ) -> Result<PointCloud, E> {
        if cloud.is_empty() {
            return Ok(PointCloud::new());
        }
        let positions = cloud.positions();
        let index = BruteForceNeighbors::new(&positions);
        let mean_dists = neighbor_means(&index, self.mean_k, check)?;

        let n = mean_dists.len() as f64;
        let mu = mean_dists.iter().sum::<f64>() / n;
        let var = mean_dists.iter().map(|d| (d - mu).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();

        let (lo, hi) = mean_dists
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &d| {
                (lo.min(d), hi.max(d))
            });
        if hi - lo == 0.0 {
            // identical statistics everywhere: nothing stands out
            return Ok(cloud.clone());
        }

        let threshold = mu + self.sigma * std;
        let mut out = PointCloud::with_capacity(cloud.len());
        for (p, &d) in cloud.iter().zip(&mean_dists) {
            if d <= threshold {
                out.insert(*p);
            }
        }
        tracing::debug!(
            "outlier filter kept {}/{} points (mu={:.4}, std={:.4}, threshold={:.4})",
            out.len(),
            cloud.len(),
            mu,
            std,
            threshold
        );
        Ok(out)
    }
}

/// Mean distance of every point to its `k` nearest neighbors.
///
/// `k` is clamped to `len - 1`; a lone point gets a mean distance of zero.
pub fn mean_neighbor_distances(
    index: &impl NeighborSearch,
    k: usize,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<f64>, SegmentError> {
    neighbor_means(index, k, || cancellation_check(cancel))
}

fn cancellation_check(cancel: Option<&AtomicBool>) -> Result<(), SegmentError> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(SegmentError::Cancelled),
        _ => Ok(()),
    }
}

fn neighbor_means<E>(
    index: &impl NeighborSearch,
    k: usize,
    mut check: impl FnMut() -> Result<(), E>,
) -> Result<Vec<f64>, E> {
    let n = index.len();
    let k = k.min(n.saturating_sub(1));
    let mut out = Vec::with_capacity(n);
    let mut dists = Vec::with_capacity(k);
    for i in 0..n {
        check()?;
        index.k_nearest_distances(i, k, &mut dists);
        if dists.is_empty() {
            out.push(0.0);
        } else {
            out.push(dists.iter().sum::<f64>() / dists.len() as f64);
        }
    }
    Ok(out)
}
