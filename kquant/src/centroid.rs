//! Centroid storage and nearest-centroid lookup

use crate::{Error, Result};
use palette::Srgb;

/// Squared euclidean distance between a pixel color and a centroid
#[must_use]
pub fn squared_distance(color: Srgb<u16>, centroid: Srgb<f64>) -> f64 {
	let dr = centroid.red - f64::from(color.red);
	let dg = centroid.green - f64::from(color.green);
	let db = centroid.blue - f64::from(color.blue);
	dr * dr + dg * dg + db * db
}

/// Returns the squared distance to the closest centroid and the index of that centroid.
///
/// Ties go to the centroid with the lowest index.
/// `centroids` should not be empty.
#[must_use]
pub fn nearest(color: Srgb<u16>, centroids: &[Srgb<f64>]) -> (f64, usize) {
	debug_assert!(!centroids.is_empty());

	let mut min_dist = f64::INFINITY;
	let mut min_index = 0;
	for (i, &centroid) in centroids.iter().enumerate() {
		let dist = squared_distance(color, centroid);
		if dist < min_dist {
			min_dist = dist;
			min_index = i;
		}
	}

	(min_dist, min_index)
}

/// Convert a pixel color into the centroid representation
#[must_use]
pub fn to_centroid(color: Srgb<u16>) -> Srgb<f64> {
	Srgb::new(f64::from(color.red), f64::from(color.green), f64::from(color.blue))
}

/// A non-empty set of k centroids
#[derive(Debug, Clone, PartialEq)]
pub struct Centroids(Vec<Srgb<f64>>);

impl Centroids {
	/// Wrap a list of centroids.
	///
	/// # Errors
	/// Returns [`Error::InvalidK`] if `centroids` is empty.
	pub fn new(centroids: Vec<Srgb<f64>>) -> Result<Self> {
		if centroids.is_empty() {
			Err(Error::InvalidK)
		} else {
			Ok(Self(centroids))
		}
	}

	/// Wrap centroids already known to be non-empty
	pub(crate) fn from_nonempty(centroids: Vec<Srgb<f64>>) -> Self {
		debug_assert!(!centroids.is_empty());
		Self(centroids)
	}

	/// The number of centroids (k)
	#[must_use]
	pub fn k(&self) -> usize {
		self.0.len()
	}

	/// See [`nearest`]
	#[must_use]
	pub fn nearest(&self, color: Srgb<u16>) -> (f64, usize) {
		nearest(color, &self.0)
	}

	/// The centroids as a slice
	#[must_use]
	pub fn as_slice(&self) -> &[Srgb<f64>] {
		&self.0
	}

	/// Unwrap the centroid list
	#[must_use]
	pub fn into_inner(self) -> Vec<Srgb<f64>> {
		self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_centroids() -> Vec<Srgb<f64>> {
		vec![
			Srgb::new(0.0, 0.0, 0.0),
			Srgb::new(1000.0, 1000.0, 1000.0),
			Srgb::new(65535.0, 0.0, 0.0),
			Srgb::new(0.0, 0.0, 0.0),
		]
	}

	#[test]
	#[allow(clippy::float_cmp)]
	fn distance_is_squared() {
		let dist = squared_distance(Srgb::new(3, 4, 12), Srgb::new(0.0, 0.0, 0.0));
		assert_eq!(dist, 169.0);
	}

	#[test]
	#[allow(clippy::float_cmp)]
	fn nearest_picks_closest() {
		let centroids = test_centroids();

		assert_eq!(nearest(Srgb::new(900, 1100, 1000), &centroids), (20000.0, 1));
		assert_eq!(nearest(Srgb::new(60000, 10, 0), &centroids).1, 2);
	}

	#[test]
	#[allow(clippy::float_cmp)]
	fn ties_go_to_lowest_index() {
		let centroids = test_centroids();

		// centroids 0 and 3 are identical
		assert_eq!(nearest(Srgb::new(1, 1, 1), &centroids), (3.0, 0));

		// equidistant from 0 and 1
		let centroids = [Srgb::new(0.0, 0.0, 0.0), Srgb::new(2.0, 0.0, 0.0)];
		assert_eq!(nearest(Srgb::new(1, 0, 0), &centroids), (1.0, 0));
	}

	#[test]
	fn nearest_is_deterministic() {
		let centroids = test_centroids();
		let color = Srgb::new(500, 500, 500);
		let first = nearest(color, &centroids);
		for _ in 0..16 {
			assert_eq!(nearest(color, &centroids), first);
		}
	}

	#[test]
	fn single_centroid() {
		let centroids = Centroids::new(vec![Srgb::new(5.0, 5.0, 5.0)]).expect("non-empty");
		assert_eq!(centroids.nearest(Srgb::new(u16::MAX, 0, 0)).1, 0);
		assert_eq!(centroids.k(), 1);
	}

	#[test]
	fn empty_centroids_rejected() {
		assert_eq!(Centroids::new(Vec::new()), Err(Error::InvalidK));
	}
}
