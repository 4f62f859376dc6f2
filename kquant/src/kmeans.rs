//! Provides the iteration loop for k-means

use crate::{
	init::{self, Initialization},
	reduce::{self, Partition},
	source::PixelSource,
	Error, Result,
};
use log::{debug, info, warn};
use palette::Srgb;

/// Result from running k-means
#[derive(Debug, Clone)]
pub struct KmeansResult {
	/// Final centroid colors, in 16-bit channel units
	pub centroids: Vec<Srgb<f64>>,
	/// Number of pixels assigned to each centroid during the last pass
	pub counts: Vec<u64>,
	/// Total squared distance from each pixel to its assigned centroid during the last pass
	///
	/// A lower error indicates a higher accuracy.
	pub error: f64,
	/// Number of elapsed iterations
	pub iterations: u32,
	/// Whether k-means stopped because the change in error fell below the tolerance
	/// (as opposed to reaching the maximum number of iterations)
	pub converged: bool,
}

/// Reject arguments that would not allow a single pass to run
fn validate<S: PixelSource + ?Sized>(source: &S, k: usize, max_iter: u32, tolerance: f64) -> Result<()> {
	if k == 0 {
		Err(Error::InvalidK)
	} else if source.num_pixels() == 0 {
		Err(Error::EmptyImage)
	} else if max_iter == 0 {
		Err(Error::InvalidMaxIter)
	} else if tolerance.is_nan() || tolerance < 0.0 {
		Err(Error::InvalidTolerance(tolerance))
	} else {
		Ok(())
	}
}

/// Run k-means on `source`, splitting each pass into units of the given [`Partition`].
///
/// Each iteration assigns every pixel to its nearest centroid and then moves
/// each centroid to the mean of its pixels. Iteration stops once the total error
/// changes by less than `tolerance` or after `max_iter` iterations.
///
/// # Errors
/// Returns an error if `k` is 0, `source` has no pixels, `max_iter` is 0,
/// `tolerance` is negative or NaN, or `init` provides a number of centroids other than `k`.
pub fn run<S: PixelSource + ?Sized>(
	source: &S,
	k: usize,
	init: &Initialization,
	max_iter: u32,
	tolerance: f64,
	partition: Partition,
) -> Result<KmeansResult> {
	validate(source, k, max_iter, tolerance)?;

	let mut centroids = init::initial_centroids(source, k, init)?;
	let mut prev_error = 0.0;
	let mut iterations = 0;

	loop {
		let aggregate = reduce::reduce(source, &centroids, partition);
		debug_assert_eq!(aggregate.total_count(), source.num_pixels());
		iterations += 1;

		let empty = aggregate.empty_clusters();
		if empty > 0 {
			warn!("iteration {iterations}: {empty} of {k} clusters had no pixels and kept their previous centroid");
		}

		centroids = aggregate.centroids(&centroids);

		let error = aggregate.error();
		let deviation = (prev_error - error).abs();
		debug!("iteration {iterations}: error {error}, deviation {deviation}");

		let converged = deviation < tolerance;
		if converged || iterations >= max_iter {
			if converged {
				info!("k-means converged after {iterations} iterations with error {error}");
			} else {
				info!("k-means stopped at the maximum of {max_iter} iterations with error {error}");
			}

			return Ok(KmeansResult {
				centroids: centroids.into_inner(),
				counts: aggregate.counts(),
				error,
				iterations,
				converged,
			});
		}

		prev_error = error;
	}
}
