//! Strategies for choosing the starting centroids

use crate::{
	centroid::{to_centroid, Centroids},
	source::PixelSource,
	Error, Result,
};
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// How to pick the centroids for the first iteration
#[derive(Debug, Clone, PartialEq)]
pub enum Initialization {
	/// Use the colors of k pixels chosen uniformly at random (with replacement)
	Random {
		/// Seed for the random number generator
		seed: u64,
	},
	/// Sort the pixels by (r, g, b), split them into k equal sized buckets,
	/// and use the first color of each bucket
	Histogram,
	/// Use the given centroids, which must contain exactly k colors
	Centroids(Vec<Srgb<f64>>),
}

impl Default for Initialization {
	fn default() -> Self {
		Self::Random { seed: 0 }
	}
}

/// Pick `k` pixel colors at random positions in `source`.
///
/// The same position may be picked more than once.
///
/// # Panics
/// Panics if `source` has no pixels.
pub fn random<S: PixelSource + ?Sized>(source: &S, k: usize, rng: &mut impl Rng) -> Vec<Srgb<f64>> {
	debug_assert!(source.num_pixels() > 0);

	let (width, height) = (source.width(), source.height());
	(0..k)
		.map(|_| {
			let x = rng.gen_range(0..width);
			let y = rng.gen_range(0..height);
			to_centroid(source.color_at(x, y))
		})
		.collect()
}

/// Choose `k` centroids by bucketing the sorted pixels of `source`.
///
/// Bucket `i` starts at index `i * floor(n / k)` of the sorted pixels.
/// If there are fewer pixels than `k`, every centroid is the smallest color.
///
/// # Panics
/// Panics if `source` has no pixels or `k` is 0.
pub fn histogram<S: PixelSource + ?Sized>(source: &S, k: usize) -> Vec<Srgb<f64>> {
	debug_assert!(source.num_pixels() > 0);

	let mut pixels = Vec::with_capacity(usize::try_from(source.num_pixels()).unwrap_or(0));
	for x in 0..source.width() {
		for y in 0..source.height() {
			pixels.push(source.color_at(x, y));
		}
	}

	pixels.sort_unstable_by_key(|color| (color.red, color.green, color.blue));

	let bucket = pixels.len() / k;
	(0..k).map(|i| to_centroid(pixels[i * bucket])).collect()
}

/// Produce exactly `k` starting centroids according to `init`
pub(crate) fn initial_centroids<S: PixelSource + ?Sized>(
	source: &S,
	k: usize,
	init: &Initialization,
) -> Result<Centroids> {
	let centroids = match init {
		Initialization::Random { seed } => random(source, k, &mut Xoroshiro128PlusPlus::seed_from_u64(*seed)),
		Initialization::Histogram => histogram(source, k),
		Initialization::Centroids(centroids) => {
			if centroids.len() != k {
				return Err(Error::CentroidCount { expected: k, found: centroids.len() });
			}
			centroids.clone()
		},
	};

	Centroids::new(centroids)
}
