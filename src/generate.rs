//! Producing the manifest from an image directory.
//!
//! Only files directly inside the directory are listed, filtered by [`IMAGE_EXTENSIONS`]
//! and sorted with [`natural_cmp`], so that `image2.jpg` comes before `image10.jpg`.

use core::cmp::Ordering;
use std::{
	fs, io,
	path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, instrument};

/// Recognised image file extensions, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error)]
pub enum GenerateError {
	#[error("image directory {0:?} not found")]
	MissingDirectory(PathBuf),
	#[error("IO error: {0}")]
	Io(#[from] io::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
	/// Natural ascending order.
	OldestFirst,
	/// Natural descending order, for galleries that show the latest upload on top.
	NewestFirst,
}
impl Default for Order {
	fn default() -> Self {
		Self::OldestFirst
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	/// A JSON array, fetched at runtime as `manifest.json`.
	Json,
	/// A `const manifest = [...]` script, included before the gallery script.
	Script,
}

#[must_use]
pub fn is_image(file_name: &str) -> bool {
	Path::new(file_name)
		.extension()
		.and_then(|extension| extension.to_str())
		.map_or(false, |extension| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(extension)))
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
	Number(u128),
	Text(String),
}

fn segments(name: &str) -> Vec<Segment> {
	let mut segments = Vec::new();
	let mut rest = name;
	while let Some(first) = rest.chars().next() {
		let digits = first.is_ascii_digit();
		let end = rest.find(|c: char| c.is_ascii_digit() != digits).unwrap_or_else(|| rest.len());
		let (run, tail) = rest.split_at(end);
		segments.push(if digits {
			// Runs too long for `u128` fall back to text order.
			run.parse().map_or_else(|_| Segment::Text(run.to_owned()), Segment::Number)
		} else {
			Segment::Text(run.to_lowercase())
		});
		rest = tail;
	}
	segments
}

/// Compares file names so that embedded numbers sort by value and letters ignore case.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
	segments(a).cmp(&segments(b)).then_with(|| a.cmp(b))
}

/// Lists the image files directly inside `dir`.
///
/// # Errors
///
/// Iff `dir` is not a directory or can't be read.
#[instrument]
pub fn scan_images(dir: &Path, order: Order) -> Result<Vec<String>, GenerateError> {
	if !dir.is_dir() {
		return Err(GenerateError::MissingDirectory(dir.to_owned()));
	}

	let mut images = Vec::new();
	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		if !entry.file_type()?.is_file() {
			continue;
		}
		match entry.file_name().into_string() {
			Ok(name) if is_image(&name) => images.push(name),
			Ok(name) => debug!("Skipping non-image file {:?}", name),
			Err(name) => debug!("Skipping non-UTF-8 file name {:?}", name),
		}
	}

	images.sort_by(|a, b| natural_cmp(a, b));
	if order == Order::NewestFirst {
		images.reverse();
	}
	Ok(images)
}

/// # Errors
///
/// Never in practice. Serializing strings can't fail.
pub fn render_json(images: &[String]) -> Result<String, GenerateError> {
	let mut json = serde_json::to_string_pretty(images)?;
	json.push('\n');
	Ok(json)
}

#[must_use]
pub fn render_script(images: &[String]) -> String {
	let mut script = String::from("const manifest = [\n");
	for image in images {
		script.push_str("  ");
		// JSON string literals are valid JavaScript string literals.
		script.push_str(&serde_json::Value::from(image.as_str()).to_string());
		script.push_str(",\n");
	}
	script.push_str("];\n");
	script
}

/// # Errors
///
/// Iff rendering fails.
pub fn render(images: &[String], format: Format) -> Result<String, GenerateError> {
	match format {
		Format::Json => render_json(images),
		Format::Script => Ok(render_script(images)),
	}
}
