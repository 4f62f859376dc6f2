//! Map an image onto a palette of centroids

use crate::{centroid::Centroids, source::PixelSource};
use image::RgbImage;
use palette::Srgb;

/// Round a centroid to the nearest 16-bit color and keep the high byte of each channel
#[must_use]
pub fn to_srgb8(centroid: Srgb<f64>) -> Srgb<u8> {
	/// Clamp, round, and narrow a single channel
	fn narrow(value: f64) -> u8 {
		// clamped to 0..=u16::MAX, so the shifted value fits in a u8
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let value = value.clamp(0.0, f64::from(u16::MAX)).round() as u16;
		(value >> 8) as u8
	}

	Srgb::new(narrow(centroid.red), narrow(centroid.green), narrow(centroid.blue))
}

/// Write one row of the output image
fn remap_row<S: PixelSource + ?Sized>(
	source: &S,
	centroids: &Centroids,
	palette: &[Srgb<u8>],
	y: u32,
	row: &mut [u8],
) {
	for (x, pixel) in (0..source.width()).zip(row.chunks_exact_mut(3)) {
		let (_, index) = centroids.nearest(source.color_at(x, y));
		let color = palette[index];
		pixel.copy_from_slice(&[color.red, color.green, color.blue]);
	}
}

/// Replace every pixel of `source` with the color of its nearest centroid
#[must_use]
pub fn remap<S: PixelSource + ?Sized>(source: &S, centroids: &Centroids) -> RgbImage {
	let (width, height) = (source.width(), source.height());
	let mut image = RgbImage::new(width, height);
	if width == 0 || height == 0 {
		return image;
	}

	let palette = centroids.as_slice().iter().copied().map(to_srgb8).collect::<Vec<_>>();
	let row_len = 3 * width as usize;

	#[cfg(feature = "threads")]
	{
		use rayon::prelude::*;

		image
			.par_chunks_exact_mut(row_len)
			.zip(0..height)
			.for_each(|(row, y)| remap_row(source, centroids, &palette, y, row));
	}

	#[cfg(not(feature = "threads"))]
	for (row, y) in image.chunks_exact_mut(row_len).zip(0..height) {
		remap_row(source, centroids, &palette, y, row);
	}

	image
}
