//! Errors reported before any clustering work is scheduled

use thiserror::Error;

/// Invalid arguments or inputs to k-means
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	/// `k` was zero
	#[error("k must be at least 1")]
	InvalidK,

	/// The pixel source has a zero width or height
	#[error("the image contains no pixels")]
	EmptyImage,

	/// The iteration budget was zero
	#[error("the maximum number of iterations must be at least 1")]
	InvalidMaxIter,

	/// The convergence tolerance was negative or NaN
	#[error("tolerance must be a non-negative number, got {0}")]
	InvalidTolerance(f64),

	/// The number of supplied centroids does not match `k`
	#[error("expected {expected} initial centroids, found {found}")]
	CentroidCount {
		/// The requested number of clusters
		expected: usize,
		/// The number of centroids provided
		found: usize,
	},

	/// The pixel buffer does not match the grid dimensions
	#[error("a {width}x{height} grid needs {expected} pixels, found {found}")]
	GridSize {
		/// Grid width
		width: u32,
		/// Grid height
		height: u32,
		/// `width * height`
		expected: u64,
		/// The length of the provided buffer
		found: usize,
	},
}

/// Result type used throughout this crate
pub type Result<T> = std::result::Result<T, Error>;
