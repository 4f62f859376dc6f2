//! Reduce the colors of an image by performing k-means clustering in RGB space.
//!
//! # Examples
//!
//! ## Read an image file and quantize it to 10 colors.
//!
//! ```no_run
//! use kquant::Initialization;
//!
//! let image = image::open("some image").unwrap().into_rgb16();
//! let result = kquant::cluster(&image, 10, &Initialization::Random { seed: 0 }, 10, 0.5).unwrap();
//! let quantized = kquant::remap(&image, &result.centroids).unwrap();
//! quantized.save("quantized.png").unwrap();
//! ```
//!
//! ## Use deterministic starting centroids and split the work by rows.
//!
//! ```no_run
//! use kquant::{Initialization, Partition};
//!
//! let image = image::open("some image").unwrap().into_rgb8();
//! let result = kquant::cluster_partitioned(&image, 8, &Initialization::Histogram, 32, 1.0, Partition::Rows);
//! ```
//!
//! # Arguments
//!
//! ## K
//!
//! The number of colors (centroids) to find. Must be at least 1.
//!
//! Every centroid is kept in the result, even if it ended up with no pixels.
//! A centroid whose cluster is empty during an iteration keeps its previous color.
//!
//! ## Initialization
//!
//! How the starting centroids are chosen:
//! - [`Initialization::Random`] picks the colors of k random pixels using a seeded random number generator.
//! - [`Initialization::Histogram`] sorts the pixels and picks the first color of k equally sized buckets.
//!   This is deterministic, but slower for large images as every pixel is copied and sorted.
//! - [`Initialization::Centroids`] uses exactly k colors provided by the caller.
//!
//! ## Max Iterations
//!
//! The maximum number of passes over the image. Must be at least 1.
//!
//! ## Tolerance
//!
//! k-means stops once the total error (the sum of the squared distance between each pixel and its centroid)
//! changes by less than this amount from one iteration to the next.
//! The error is measured in squared 16-bit channel units, so it grows with the size of the image.
//! A value of `0.0` means k-means always runs for the maximum number of iterations.
//!
//! # Parallelism
//!
//! With the default `threads` feature, each pass runs on the current rayon thread pool,
//! which is sized to the number of available processors unless configured otherwise.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::unreadable_literal)]

use palette::Srgb;

mod aggregate;
mod centroid;
mod error;
mod init;
mod kmeans;
mod reduce;
mod render;
mod source;

pub use aggregate::{Aggregate, ClusterSum};
pub use centroid::{nearest, squared_distance, Centroids};
pub use error::{Error, Result};
pub use init::{histogram, random, Initialization};
pub use kmeans::KmeansResult;
pub use reduce::{reduce, reduce_sequential, Partition};
pub use render::to_srgb8;
pub use source::{expand_u8, PixelGrid, PixelSource};

/// Runs k-means on `source`, assigning pixels column by column.
///
/// See the crate documentation for examples and information on each argument.
///
/// # Errors
/// Returns an error before doing any work if `k` is 0, `source` has no pixels, `max_iter` is 0,
/// `tolerance` is negative or NaN, or `init` provides a number of centroids other than `k`.
pub fn cluster<S: PixelSource + ?Sized>(
	source: &S,
	k: usize,
	init: &Initialization,
	max_iter: u32,
	tolerance: f64,
) -> Result<KmeansResult> {
	kmeans::run(source, k, init, max_iter, tolerance, Partition::Columns)
}

/// Runs k-means on `source`, splitting each pass into units of the given [`Partition`].
///
/// The result does not depend on the partitioning, apart from floating point rounding in the total error.
///
/// # Errors
/// See [`cluster`].
pub fn cluster_partitioned<S: PixelSource + ?Sized>(
	source: &S,
	k: usize,
	init: &Initialization,
	max_iter: u32,
	tolerance: f64,
	partition: Partition,
) -> Result<KmeansResult> {
	kmeans::run(source, k, init, max_iter, tolerance, partition)
}

/// Creates an 8-bit image where each pixel of `source` is replaced by its nearest centroid.
///
/// # Errors
/// Returns [`Error::InvalidK`] if `centroids` is empty.
pub fn remap<S: PixelSource + ?Sized>(source: &S, centroids: &[Srgb<f64>]) -> Result<image::RgbImage> {
	let centroids = Centroids::new(centroids.to_vec())?;
	Ok(render::remap(source, &centroids))
}
