//! Reduce an image to a small palette by performing k-means clustering in RGB space.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
	clippy::pedantic,
	clippy::cargo,
	clippy::use_debug,
	clippy::dbg_macro,
	clippy::todo,
	clippy::unimplemented,
	clippy::unwrap_used,
	clippy::unwrap_in_result,
	clippy::unneeded_field_pattern,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::unnecessary_self_imports,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::string_slice,
	missing_docs,
	clippy::missing_docs_in_private_items,
	rustdoc::all,
	clippy::float_cmp_const,
	clippy::lossy_float_literal
)]
#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::many_single_char_names,
	clippy::missing_panics_doc,
	clippy::unreadable_literal
)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
	fmt::{self, Display},
	path::{Path, PathBuf},
	process::ExitCode,
	time::Instant,
};

use clap::Parser;
use colored::Colorize;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};
use kquant::{Initialization, KmeansResult};
use log::debug;
use palette::{FromColor, LinSrgb, Okhsl, Oklab, Srgb};

/// Record the running time of a function and print the elapsed time
macro_rules! time {
	($name: literal, $verbose: expr, $func_call: expr) => {{
		let start = Instant::now();
		let result = $func_call;
		if $verbose {
			println!("{} took {}ms", $name, start.elapsed().as_millis());
		}
		result
	}};
}

/// Error cases for quantizing an image
#[derive(Debug)]
enum AppError {
	/// Failed to read or decode the image file
	ImageLoad(image::ImageError),
	/// Failed to encode or write the quantized image
	ImageSave(PathBuf, image::ImageError),
	/// The k-means arguments were rejected
	Kmeans(kquant::Error),
	/// Failed to start the worker threads
	#[cfg(feature = "threads")]
	ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for AppError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			AppError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
			AppError::ImageSave(path, e) => write!(f, "Failed to save the image to {}: {e}", path.display()),
			AppError::Kmeans(e) => write!(f, "Invalid k-means arguments: {e}"),
			#[cfg(feature = "threads")]
			AppError::ThreadPool(e) => write!(f, "Failed to create the thread pool: {e}"),
		}
	}
}

impl From<kquant::Error> for AppError {
	fn from(e: kquant::Error) -> Self {
		AppError::Kmeans(e)
	}
}

/// 16-bit per channel image used as the k-means input
type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

fn main() -> ExitCode {
	let options = Options::parse();

	let filter = if options.verbose { "kquant=debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

	let result = run_quantize(&options);

	// Returning Result<_> uses Debug printing instead of Display
	if let Err(e) = result {
		eprintln!("{e}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// The number of worker threads to use if none was specified
#[cfg(feature = "threads")]
fn default_threads() -> usize {
	std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Builds a thread pool and then runs `quantize`
#[cfg(feature = "threads")]
fn run_quantize(options: &Options) -> Result<(), AppError> {
	let threads = options.threads.map_or_else(default_threads, usize::from);
	debug!("Using {threads} threads");

	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(threads)
		.build()
		.map_err(AppError::ThreadPool)?;

	pool.install(|| quantize(options))
}

/// Runs `quantize` on a single thread
#[cfg(not(feature = "threads"))]
fn run_quantize(options: &Options) -> Result<(), AppError> {
	quantize(options)
}

/// Load an image, run k-means, write the quantized image, and print the palette
fn quantize(options: &Options) -> Result<(), AppError> {
	// Input
	let img = time!("Image loading", options.verbose, load_image(&options.image))?;
	debug!("Loaded a {}x{} image", img.width(), img.height());
	let img = generate_thumbnail(img, options.max_pixels, options.verbose);
	let img = img.into_rgb16();

	// Processing
	let result = time!("k-means", options.verbose, run_kmeans(&img, options))?;
	if options.verbose {
		println!(
			"k-means {} after {} iterations with a total error of {}",
			if result.converged { "converged" } else { "stopped" },
			result.iterations,
			result.error
		);
	}

	// Output
	let quantized = time!("Remapping", options.verbose, kquant::remap(&img, &result.centroids))?;
	let output = options
		.output
		.clone()
		.unwrap_or_else(|| default_output_path(&options.image));

	time!("Image saving", options.verbose, quantized.save(&output))
		.map_err(|e| AppError::ImageSave(output.clone(), e))?;

	if options.verbose {
		println!("Wrote {}", output.display());
	}

	if !options.quiet {
		let colors = sorted_colors(&result, options);
		print_palette(&colors, options);
	}

	Ok(())
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, AppError> {
	image::open(path).map_err(AppError::ImageLoad)
}

/// Create a thumbnail with at most `max_pixels` pixels if the image has more than `max_pixels` pixels
fn generate_thumbnail(image: DynamicImage, max_pixels: u32, verbose: bool) -> DynamicImage {
	// The number of pixels should be < u64::MAX, since image dimensions are (u32, u32)
	let (width, height) = image.dimensions();
	let pixels = u64::from(width) * u64::from(height);
	if pixels <= u64::from(max_pixels) {
		if verbose {
			println!("Skipping image thumbnail since pixels was below max pixels");
		}

		image
	} else {
		// (u64 as f64) only gives innaccurate results for very large u64
		// I.e, only when pixels is in the order of quintillions
		#[allow(clippy::cast_precision_loss)]
		let scale = (f64::from(max_pixels) / pixels as f64).sqrt();

		// multiplying by a positive factor < 1
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let (thumb_width, thumb_height) = (
			(f64::from(width) * scale) as u32,
			(f64::from(height) * scale) as u32,
		);

		if verbose {
			println!("Creating a thumbnail with dimensions {thumb_width}x{thumb_height}");
		}

		time!("Image thumbnail", verbose, image.thumbnail(thumb_width, thumb_height))
	}
}

/// Run k-means on the image using the given options
fn run_kmeans(image: &Rgb16Image, options: &Options) -> Result<KmeansResult, kquant::Error> {
	let init = match options.init {
		InitMethod::Random => Initialization::Random { seed: options.seed },
		InitMethod::Histogram => Initialization::Histogram,
	};

	kquant::cluster_partitioned(
		image,
		usize::from(options.k),
		&init,
		options.max_iter,
		options.tolerance,
		options.partition.into(),
	)
}

/// The path "<dir>/<stem>_quantized.png" next to the input image
fn default_output_path(input: &Path) -> PathBuf {
	let stem = input
		.file_stem()
		.map_or_else(|| "image".into(), |stem| stem.to_string_lossy());

	input.with_file_name(format!("{stem}_quantized.png"))
}

/// Narrow the centroids to [`Srgb`] colors, sorting by the given metric.
fn sorted_colors(result: &KmeansResult, options: &Options) -> Vec<Srgb<u8>> {
	let mut colors = result
		.centroids
		.iter()
		.map(|&centroid| {
			let srgb = kquant::to_srgb8(centroid);
			let linear: LinSrgb = srgb.into_format::<f32>().into_linear();
			(srgb, Okhsl::from_color(Oklab::from_color(linear)))
		})
		.zip(&result.counts)
		.collect::<Vec<_>>();

	match options.sort {
		SortOutput::H => {
			colors.sort_by(|((_, x), _), ((_, y), _)| f32::total_cmp(&x.hue.into(), &y.hue.into()));
		},
		SortOutput::S => {
			colors.sort_by(|((_, x), _), ((_, y), _)| f32::total_cmp(&x.saturation, &y.saturation));
		},
		SortOutput::L => {
			colors.sort_by(|((_, x), _), ((_, y), _)| f32::total_cmp(&x.lightness, &y.lightness));
		},
		SortOutput::N => colors.sort_by_key(|&(_, &count)| std::cmp::Reverse(count)),
	}

	if options.reverse {
		colors.reverse();
	}

	colors.into_iter().map(|((color, _), _)| color).collect()
}

/// Print the given colors based off the provided options
fn print_palette(colors: &[Srgb<u8>], options: &Options) {
	match options.format {
		FormatOutput::Hex => color_format_print(colors, options, " ", |color| format!("{color:X}")),

		FormatOutput::Rgb => color_format_print(colors, options, " ", |color| {
			format!("({},{},{})", color.red, color.green, color.blue)
		}),

		FormatOutput::Swatch => print_colors(colors, "", |color| {
			"   ".on_truecolor(color.red, color.green, color.blue).to_string()
		}),
	}
}

/// Print a line of colors using the given format
fn print_colors(colors: &[Srgb<u8>], delimiter: &str, format: impl Fn(Srgb<u8>) -> String) {
	println!("{}", format_colors(colors, delimiter, format));
}

/// Format a line of colors
fn format_colors(colors: &[Srgb<u8>], delimiter: &str, format: impl Fn(Srgb<u8>) -> String) -> String {
	colors
		.iter()
		.map(|&color| format(color))
		.collect::<Vec<_>>()
		.join(delimiter)
}

/// Format, colorize, and then print the text for all colors
fn color_format_print(
	colors: &[Srgb<u8>],
	options: &Options,
	delimiter: &str,
	format: impl Fn(Srgb<u8>) -> String,
) {
	match options.colorize {
		Some(ColorizeOutput::Fg) => print_colors(colors, delimiter, |color| {
			format(color).truecolor(color.red, color.green, color.blue).to_string()
		}),

		Some(ColorizeOutput::Bg) => print_colors(colors, delimiter, |color| {
			format(color).on_truecolor(color.red, color.green, color.blue).to_string()
		}),

		None => print_colors(colors, delimiter, format),
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use image::RgbImage;
	use std::ffi::OsString;

	/// Four flat quadrants of distinct colors
	fn quadrants(width: u32, height: u32) -> DynamicImage {
		let image = RgbImage::from_fn(width, height, |x, y| match (x < width / 2, y < height / 2) {
			(true, true) => Rgb([200, 30, 30]),
			(false, true) => Rgb([30, 200, 30]),
			(true, false) => Rgb([30, 30, 200]),
			(false, false) => Rgb([240, 240, 240]),
		});
		DynamicImage::ImageRgb8(image)
	}

	fn temp_path(name: &str) -> PathBuf {
		std::env::temp_dir().join(format!("kquant-{}-{name}", std::process::id()))
	}

	#[test]
	fn thumbnail_has_at_most_max_pixels() {
		let img = quadrants(400, 300);
		let (width, height) = (40, 30);

		for dw in 0..5 {
			for dh in 0..5 {
				let width = width - dw;
				let height = height - dh;
				let max_pixels = width * height;
				let thumb = generate_thumbnail(img.clone(), max_pixels, false);
				let pixels = thumb.width() * thumb.height();

				let max_d = u32::max(dw, dh);
				let min_pixels = (width - max_d - 1) * (height - max_d - 1);
				assert!(
					min_pixels <= pixels && pixels <= max_pixels,
					"{width}x{height}: {min_pixels} <= {pixels} <= {max_pixels}"
				);
			}
		}
	}

	#[test]
	fn small_image_is_not_thumbnailed() {
		let img = quadrants(8, 6);
		assert_eq!(generate_thumbnail(img, 48, false).dimensions(), (8, 6));
	}

	#[test]
	fn output_path_is_next_to_input() {
		assert_eq!(
			default_output_path(Path::new("photos/cloud.jpg")),
			PathBuf::from("photos/cloud_quantized.png")
		);
		assert_eq!(default_output_path(Path::new("cloud")), PathBuf::from("cloud_quantized.png"));
	}

	#[test]
	fn colors_sorted_by_descending_count() {
		let options = Options::try_parse_from(["kquant", "in.png"]).unwrap();
		let result = KmeansResult {
			centroids: vec![
				Srgb::new(0.0, 0.0, 0.0),
				Srgb::new(65535.0, 65535.0, 65535.0),
				Srgb::new(65535.0, 0.0, 0.0),
			],
			counts: vec![1, 5, 3],
			error: 0.0,
			iterations: 1,
			converged: true,
		};

		let colors = sorted_colors(&result, &options);
		assert_eq!(
			colors,
			vec![Srgb::new(255, 255, 255), Srgb::new(255, 0, 0), Srgb::new(0, 0, 0)]
		);

		let format = format_colors(&colors, " ", |color| format!("{color:X}"));
		assert_eq!(format, "FFFFFF FF0000 000000");
	}

	#[test]
	#[cfg(feature = "png")]
	fn quantize_writes_output_image() {
		let input = temp_path("input.png");
		let output = temp_path("output.png");
		quadrants(16, 12).save(&input).unwrap();

		let args: Vec<OsString> = vec![
			"kquant".into(),
			input.clone().into(),
			"-o".into(),
			output.clone().into(),
			"-k".into(),
			"4".into(),
			"--init".into(),
			"histogram".into(),
			"--quiet".into(),
		];
		let options = Options::try_parse_from(args).unwrap();

		quantize(&options).unwrap();

		let original = image::open(&input).unwrap().into_rgb8();
		let quantized = image::open(&output).unwrap().into_rgb8();
		assert_eq!(original, quantized);

		std::fs::remove_file(input).unwrap();
		std::fs::remove_file(output).unwrap();
	}

	#[test]
	fn missing_image_is_an_error() {
		let options = Options::try_parse_from(["kquant", "does/not/exist.png"]).unwrap();
		assert!(matches!(quantize(&options), Err(AppError::ImageLoad(_))));
	}
}
