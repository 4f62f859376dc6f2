//! One pass of nearest-centroid assignment over every pixel
//!
//! The pixel grid is split into partition units (whole columns or whole rows).
//! Each unit folds its pixels into a private [`Aggregate`] and then merges it
//! into a single shared aggregate behind a mutex. The merge is the only
//! contended step; pixel data and centroids are only read.

use crate::{aggregate::Aggregate, centroid::Centroids, source::PixelSource};
use parking_lot::Mutex;

/// How the pixel grid is split into units of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
	/// One unit per column
	#[default]
	Columns,
	/// One unit per row
	Rows,
}

impl Partition {
	/// The number of units this partitioning produces for `source`
	fn units<S: PixelSource + ?Sized>(self, source: &S) -> u32 {
		match self {
			Partition::Columns => source.width(),
			Partition::Rows => source.height(),
		}
	}
}

/// Assign every pixel in a single unit, returning the unit's private totals
fn scan_unit<S: PixelSource + ?Sized>(
	source: &S,
	centroids: &Centroids,
	partition: Partition,
	unit: u32,
) -> Aggregate {
	let mut local = Aggregate::new(centroids.k());

	match partition {
		Partition::Columns => {
			for y in 0..source.height() {
				let color = source.color_at(unit, y);
				let (dist, index) = centroids.nearest(color);
				local.add(index, color, dist);
			}
		},
		Partition::Rows => {
			for x in 0..source.width() {
				let color = source.color_at(x, unit);
				let (dist, index) = centroids.nearest(color);
				local.add(index, color, dist);
			}
		},
	}

	local
}

/// Assign each pixel to its nearest centroid and total the results.
///
/// Units run on the current rayon thread pool,
/// so at most one unit per pool thread is in flight at a time.
/// Returns once every unit has been merged.
#[cfg(feature = "threads")]
pub fn reduce<S: PixelSource + ?Sized>(source: &S, centroids: &Centroids, partition: Partition) -> Aggregate {
	use rayon::prelude::*;

	let shared = Mutex::new(Aggregate::new(centroids.k()));

	(0..partition.units(source)).into_par_iter().for_each(|unit| {
		let local = scan_unit(source, centroids, partition, unit);
		shared.lock().merge(&local);
	});

	shared.into_inner()
}

/// Assign each pixel to its nearest centroid and total the results.
///
/// Units are processed one after another.
#[cfg(not(feature = "threads"))]
pub fn reduce<S: PixelSource + ?Sized>(source: &S, centroids: &Centroids, partition: Partition) -> Aggregate {
	let shared = Mutex::new(Aggregate::new(centroids.k()));

	for unit in 0..partition.units(source) {
		let local = scan_unit(source, centroids, partition, unit);
		shared.lock().merge(&local);
	}

	shared.into_inner()
}

/// Assign each pixel to its nearest centroid on the calling thread without any partitioning
#[must_use]
pub fn reduce_sequential<S: PixelSource + ?Sized>(source: &S, centroids: &Centroids) -> Aggregate {
	let mut aggregate = Aggregate::new(centroids.k());
	for y in 0..source.height() {
		for x in 0..source.width() {
			let color = source.color_at(x, y);
			let (dist, index) = centroids.nearest(color);
			aggregate.add(index, color, dist);
		}
	}
	aggregate
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::source::PixelGrid;
	use approx::assert_relative_eq;
	use palette::Srgb;

	#[allow(clippy::cast_possible_truncation)]
	fn test_grid() -> PixelGrid {
		PixelGrid::from_fn(17, 11, |x, y| {
			let x = x as u16;
			let y = y as u16;
			Srgb::new(x * 3000, y * 5000, (x * 7 + y * 13) * 200)
		})
	}

	fn test_centroids() -> Centroids {
		Centroids::new(vec![
			Srgb::new(0.0, 0.0, 0.0),
			Srgb::new(40000.0, 10000.0, 5000.0),
			Srgb::new(10000.0, 45000.0, 20000.0),
			Srgb::new(50000.0, 50000.0, 40000.0),
		])
		.expect("non-empty")
	}

	fn assert_same_aggregate(x: &Aggregate, y: &Aggregate) {
		assert_eq!(x.clusters(), y.clusters());
		assert_relative_eq!(x.error(), y.error(), max_relative = 1e-12);
	}

	#[test]
	fn counts_sum_to_pixel_count() {
		let grid = test_grid();
		let aggregate = reduce(&grid, &test_centroids(), Partition::Columns);
		assert_eq!(aggregate.total_count(), grid.num_pixels());
	}

	#[test]
	fn partitioning_does_not_change_result() {
		let grid = test_grid();
		let centroids = test_centroids();

		let sequential = reduce_sequential(&grid, &centroids);
		let columns = reduce(&grid, &centroids, Partition::Columns);
		let rows = reduce(&grid, &centroids, Partition::Rows);

		assert_same_aggregate(&sequential, &columns);
		assert_same_aggregate(&sequential, &rows);
	}

	#[test]
	fn sums_reflect_assignment() {
		let grid = test_grid();
		let centroids = test_centroids();
		let aggregate = reduce(&grid, &centroids, Partition::Columns);

		let mut expected = vec![[0u64; 3]; centroids.k()];
		let mut error = 0.0;
		for &color in grid.pixels() {
			let (dist, index) = centroids.nearest(color);
			expected[index][0] += u64::from(color.red);
			expected[index][1] += u64::from(color.green);
			expected[index][2] += u64::from(color.blue);
			error += dist;
		}

		for (cluster, expected) in aggregate.clusters().iter().zip(&expected) {
			assert_eq!(&cluster.sum, expected);
		}
		assert_relative_eq!(aggregate.error(), error, max_relative = 1e-12);
	}

	#[test]
	#[cfg(feature = "threads")]
	fn single_thread_pool_matches() {
		let grid = test_grid();
		let centroids = test_centroids();

		let pool = rayon::ThreadPoolBuilder::new()
			.num_threads(1)
			.build()
			.expect("initialized thread pool");

		let single = pool.install(|| reduce(&grid, &centroids, Partition::Columns));
		let many = reduce(&grid, &centroids, Partition::Columns);

		assert_same_aggregate(&single, &many);
	}
}
