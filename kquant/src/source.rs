//! Read-only access to the pixels being clustered

use crate::{Error, Result};
use image::{ImageBuffer, Rgb, RgbImage};
use palette::Srgb;

/// A pixel-addressable image with 16-bit channels
///
/// Every channel is in `0..=u16::MAX`. Sources with fewer bits per channel
/// should expand their values to the full 16-bit range (see [`expand_u8`]).
///
/// Partition units read from a source concurrently, so it must be [`Sync`].
pub trait PixelSource: Sync {
	/// Number of columns
	fn width(&self) -> u32;

	/// Number of rows
	fn height(&self) -> u32;

	/// The color at column `x` and row `y`, where `x < width` and `y < height`
	fn color_at(&self, x: u32, y: u32) -> Srgb<u16>;

	/// Total number of pixels
	fn num_pixels(&self) -> u64 {
		u64::from(self.width()) * u64::from(self.height())
	}
}

/// Expand an 8-bit channel value to 16 bits so that `0xFF` becomes `0xFFFF`
#[must_use]
pub fn expand_u8(value: u8) -> u16 {
	// 257 = 0x0101, i.e., the byte is repeated
	u16::from(value) * 257
}

impl PixelSource for RgbImage {
	fn width(&self) -> u32 {
		self.dimensions().0
	}

	fn height(&self) -> u32 {
		self.dimensions().1
	}

	fn color_at(&self, x: u32, y: u32) -> Srgb<u16> {
		let Rgb([r, g, b]) = *self.get_pixel(x, y);
		Srgb::new(expand_u8(r), expand_u8(g), expand_u8(b))
	}
}

impl PixelSource for ImageBuffer<Rgb<u16>, Vec<u16>> {
	fn width(&self) -> u32 {
		self.dimensions().0
	}

	fn height(&self) -> u32 {
		self.dimensions().1
	}

	fn color_at(&self, x: u32, y: u32) -> Srgb<u16> {
		let Rgb([r, g, b]) = *self.get_pixel(x, y);
		Srgb::new(r, g, b)
	}
}

/// An owned, row-major grid of 16-bit colors
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
	/// Number of columns
	width: u32,
	/// Number of rows
	height: u32,
	/// `width * height` colors, one row after another
	pixels: Vec<Srgb<u16>>,
}

impl PixelGrid {
	/// Create a grid from row-major pixels.
	///
	/// # Errors
	/// Returns [`Error::GridSize`] if `pixels.len() != width * height`.
	pub fn new(width: u32, height: u32, pixels: Vec<Srgb<u16>>) -> Result<Self> {
		let expected = u64::from(width) * u64::from(height);
		if u64::try_from(pixels.len()).map_or(true, |len| len != expected) {
			return Err(Error::GridSize {
				width,
				height,
				expected,
				found: pixels.len(),
			});
		}

		Ok(Self { width, height, pixels })
	}

	/// Create a grid by evaluating `f(x, y)` for every pixel
	#[must_use]
	pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Srgb<u16>) -> Self {
		let mut pixels = Vec::with_capacity(width as usize * height as usize);
		for y in 0..height {
			for x in 0..width {
				pixels.push(f(x, y));
			}
		}

		Self { width, height, pixels }
	}

	/// The pixels in row-major order
	#[must_use]
	pub fn pixels(&self) -> &[Srgb<u16>] {
		&self.pixels
	}
}

impl PixelSource for PixelGrid {
	fn width(&self) -> u32 {
		self.width
	}

	fn height(&self) -> u32 {
		self.height
	}

	fn color_at(&self, x: u32, y: u32) -> Srgb<u16> {
		self.pixels[y as usize * self.width as usize + x as usize]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expand_covers_full_range() {
		assert_eq!(expand_u8(0), 0);
		assert_eq!(expand_u8(0x80), 0x8080);
		assert_eq!(expand_u8(u8::MAX), u16::MAX);
	}

	#[test]
	fn grid_rejects_wrong_length() {
		let pixels = vec![Srgb::new(0, 0, 0); 5];
		assert_eq!(
			PixelGrid::new(2, 3, pixels),
			Err(Error::GridSize { width: 2, height: 3, expected: 6, found: 5 })
		);
	}

	#[test]
	fn grid_is_row_major() {
		#[allow(clippy::cast_possible_truncation)]
		let grid = PixelGrid::from_fn(3, 2, |x, y| Srgb::new(x as u16, y as u16, 0));

		assert_eq!(grid.num_pixels(), 6);
		assert_eq!(grid.color_at(2, 1), Srgb::new(2, 1, 0));
		assert_eq!(grid.pixels()[4], Srgb::new(1, 1, 0));
	}

	#[test]
	fn rgb_image_expands_channels() {
		let mut image = RgbImage::new(2, 1);
		image.put_pixel(1, 0, Rgb([0xFF, 0x01, 0x00]));

		assert_eq!(image.color_at(1, 0), Srgb::new(0xFFFF, 0x0101, 0));
		assert_eq!(image.color_at(0, 0), Srgb::new(0, 0, 0));
		assert_eq!(image.num_pixels(), 2);
	}
}
