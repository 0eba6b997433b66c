use crate::BATCH_SIZE;
use core::ops::Range;
use thiserror::Error;

/// Why a manifest couldn't be obtained.
///
/// None of these are fatal to the page. The gallery just stays empty.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("network error while fetching the manifest: {0}")]
	Network(String),
	#[error("manifest request failed with HTTP status {status}")]
	Status { status: u16 },
	#[error("could not read the manifest response body: {0}")]
	Body(String),
	#[error("manifest is not a JSON array of strings: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Ordered image identifiers. Order is display order, duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest(Vec<String>);
impl From<Vec<String>> for Manifest {
	fn from(identifiers: Vec<String>) -> Self {
		Self(identifiers)
	}
}
impl Manifest {
	#[must_use]
	pub fn new(identifiers: Vec<String>) -> Self {
		Self(identifiers)
	}

	/// Parses a JSON document that must be an array of strings.
	///
	/// # Errors
	///
	/// Iff `json` is malformed, not an array, or contains a non-string element.
	pub fn from_json(json: &str) -> Result<Self, LoadError> {
		Ok(Self(serde_json::from_str(json)?))
	}

	/// Interprets a fetched response. Anything outside `200..=299` is an error, regardless of the body.
	///
	/// # Errors
	///
	/// Iff `status` isn't a success status or `body` isn't accepted by [`Manifest::from_json`].
	pub fn from_response(status: u16, body: &str) -> Result<Self, LoadError> {
		if !(200..300).contains(&status) {
			return Err(LoadError::Status { status });
		}
		Self::from_json(body)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn identifiers(&self) -> &[String] {
		&self.0
	}

	/// The index range of the batch starting at `cursor`, clamped to the manifest.
	#[must_use]
	pub fn batch_range(&self, cursor: usize) -> Range<usize> {
		let start = cursor.min(self.0.len());
		let end = cursor.saturating_add(BATCH_SIZE).min(self.0.len());
		start..end
	}

	/// The identifiers in `[cursor, cursor + BATCH_SIZE)`. Empty once `cursor` is past the end.
	#[must_use]
	pub fn batch(&self, cursor: usize) -> &[String] {
		&self.0[self.batch_range(cursor)]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names(count: usize) -> Manifest {
		(0..count).map(|i| format!("{}.png", i)).collect::<Vec<_>>().into()
	}

	#[test]
	fn parses_string_arrays() {
		let manifest = Manifest::from_json(r#"["a.png", "images/b.jpg", "a.png"]"#).unwrap();
		assert_eq!(manifest.identifiers(), ["a.png", "images/b.jpg", "a.png"]);
	}

	#[test]
	fn empty_array_is_a_valid_manifest() {
		assert!(Manifest::from_json("[]").unwrap().is_empty());
	}

	#[test]
	fn rejects_everything_else() {
		for json in &["", "{", r#"{"images": []}"#, "\"a.png\"", "[1, 2]", r#"["a.png", null]"#] {
			assert!(matches!(Manifest::from_json(json), Err(LoadError::Parse(_))), "{:?}", json);
		}
	}

	#[test]
	fn failing_status_ignores_body() {
		assert!(matches!(Manifest::from_response(404, r#"["a.png"]"#), Err(LoadError::Status { status: 404 })));
		assert!(matches!(Manifest::from_response(500, ""), Err(LoadError::Status { status: 500 })));
		assert_eq!(Manifest::from_response(200, r#"["a.png"]"#).unwrap().len(), 1);
	}

	#[test]
	fn batches_are_clamped_windows() {
		let manifest = names(25);
		assert_eq!(manifest.batch_range(0), 0..10);
		assert_eq!(manifest.batch_range(10), 10..20);
		assert_eq!(manifest.batch_range(20), 20..25);
		assert!(manifest.batch(30).is_empty());
		assert!(manifest.batch(usize::MAX).is_empty());
		assert_eq!(manifest.batch(20)[0], "20.png");
	}
}
