//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	num::ParseFloatError,
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};

/// Supported output formats for the palette colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Sort orders for the palette colors
#[derive(Copy, Clone, ValueEnum)]
pub enum SortOutput {
	/// Ascending hue
	H,
	/// Ascending saturation
	S,
	/// Ascending lightness
	L,
	/// Descending number of pixels
	N,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Strategies for picking the starting centroids
#[derive(Copy, Clone, ValueEnum)]
pub enum InitMethod {
	/// Colors of randomly chosen pixels
	Random,
	/// First color of each bucket of the sorted pixels
	Histogram,
}

/// How each k-means pass is split into units of work
#[derive(Copy, Clone, ValueEnum)]
pub enum PartitionMethod {
	/// One unit per image column
	Columns,
	/// One unit per image row
	Rows,
}

impl From<PartitionMethod> for kquant::Partition {
	fn from(method: PartitionMethod) -> Self {
		match method {
			PartitionMethod::Columns => Self::Columns,
			PartitionMethod::Rows => Self::Rows,
		}
	}
}

/// Reduce an image to k colors by performing k-means clustering in RGB space.
///
/// The quantized image is written to the output path and the palette is printed.
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// The path to write the quantized image to
	///
	/// Defaults to "<input name>_quantized.png" in the same directory as the input image.
	/// The image format is chosen based off the file extension.
	#[arg(short, long)]
	pub output: Option<PathBuf>,

	/// The number of colors to reduce the image to
	#[arg(short, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
	pub k: u16,

	/// The maximum number of k-means iterations
	#[arg(short = 'i', long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
	pub max_iter: u32,

	/// The change in total error below which k-means is considered converged
	///
	/// The total error is the sum of squared distances between each pixel and its centroid,
	/// measured in 16-bit channel units.
	#[arg(short = 'e', long, default_value_t = 0.5, value_parser = parse_valid_tolerance)]
	pub tolerance: f64,

	/// How to choose the starting centroids
	#[arg(long, default_value = "random")]
	pub init: InitMethod,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// How to split each k-means pass into units of work
	#[arg(long, default_value = "columns")]
	pub partition: PartitionMethod,

	/// The number of threads to use
	///
	/// Defaults to the number of available processors.
	#[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
	pub threads: Option<u16>,

	/// The maximum image size, in number of pixels, before a thumbnail is created
	///
	/// This reduces the time needed for large images,
	/// but the output image will also have the reduced size.
	#[arg(short = 'p', long, default_value_t = u32::MAX)]
	pub max_pixels: u32,

	/// The format to print the palette colors in
	#[arg(short, long, default_value = "hex")]
	pub format: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// The order to print the colors in
	///
	/// The h, s, and l options below refer to Okhsl component values and not the HSL color space.
	#[arg(short, long, default_value = "n")]
	pub sort: SortOutput,

	/// Reverse the printed order of the colors
	#[arg(short, long)]
	pub reverse: bool,

	/// Do not print the palette
	#[arg(short, long)]
	pub quiet: bool,

	/// Print additional information, such as the error at each k-means iteration
	#[arg(long)]
	pub verbose: bool,
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse the tolerance and ensure it is >= `0.0`
fn parse_valid_tolerance(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..)
}
