//! Per-cluster color sums and counts gathered during a reduction pass

use crate::centroid::Centroids;
use palette::Srgb;

/// Running totals for a single cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClusterSum {
	/// Channel sums of every pixel assigned to this cluster
	pub sum: [u64; 3],
	/// Number of pixels assigned to this cluster
	pub count: u64,
}

impl ClusterSum {
	/// The mean color of this cluster, or `None` if no pixels were assigned
	#[must_use]
	pub fn mean(&self) -> Option<Srgb<f64>> {
		if self.count == 0 {
			None
		} else {
			// Sums and counts only lose precision past 2^53
			#[allow(clippy::cast_precision_loss)]
			let (r, g, b, n) = (
				self.sum[0] as f64,
				self.sum[1] as f64,
				self.sum[2] as f64,
				self.count as f64,
			);
			Some(Srgb::new(r / n, g / n, b / n))
		}
	}
}

/// Sums and counts for each of the k clusters along with the total assignment error
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
	/// One entry per cluster, indexed by centroid
	clusters: Vec<ClusterSum>,
	/// Sum of the squared distance from each pixel to its assigned centroid
	error: f64,
}

impl Aggregate {
	/// Create an aggregate for `k` clusters with all sums at zero
	#[must_use]
	pub fn new(k: usize) -> Self {
		Self {
			clusters: vec![ClusterSum::default(); k],
			error: 0.0,
		}
	}

	/// Assign a pixel to the cluster at `index`
	pub fn add(&mut self, index: usize, color: Srgb<u16>, distance: f64) {
		let cluster = &mut self.clusters[index];
		cluster.sum[0] += u64::from(color.red);
		cluster.sum[1] += u64::from(color.green);
		cluster.sum[2] += u64::from(color.blue);
		cluster.count += 1;
		self.error += distance;
	}

	/// Fold another aggregate over the same clusters into this one
	pub fn merge(&mut self, other: &Self) {
		debug_assert_eq!(self.clusters.len(), other.clusters.len());

		for (cluster, other) in self.clusters.iter_mut().zip(&other.clusters) {
			for (sum, &other) in cluster.sum.iter_mut().zip(&other.sum) {
				*sum += other;
			}
			cluster.count += other.count;
		}
		self.error += other.error;
	}

	/// The per-cluster totals
	#[must_use]
	pub fn clusters(&self) -> &[ClusterSum] {
		&self.clusters
	}

	/// Total squared distance of every pixel to its assigned centroid
	#[must_use]
	pub fn error(&self) -> f64 {
		self.error
	}

	/// Number of pixels across all clusters
	#[must_use]
	pub fn total_count(&self) -> u64 {
		self.clusters.iter().map(|cluster| cluster.count).sum()
	}

	/// Pixel count of each cluster
	#[must_use]
	pub fn counts(&self) -> Vec<u64> {
		self.clusters.iter().map(|cluster| cluster.count).collect()
	}

	/// Number of clusters that had no pixels assigned
	#[must_use]
	pub fn empty_clusters(&self) -> usize {
		self.clusters.iter().filter(|cluster| cluster.count == 0).count()
	}

	/// Compute the next centroids as the mean color of each cluster.
	///
	/// A cluster with no pixels keeps its centroid from `previous`.
	#[must_use]
	pub fn centroids(&self, previous: &Centroids) -> Centroids {
		debug_assert_eq!(self.clusters.len(), previous.k());

		let centroids = self
			.clusters
			.iter()
			.zip(previous.as_slice())
			.map(|(cluster, &old)| cluster.mean().unwrap_or(old))
			.collect();

		Centroids::from_nonempty(centroids)
	}
}
