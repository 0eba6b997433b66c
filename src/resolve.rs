//! The fixed image directory convention.

use std::borrow::Cow;

/// Directory that bare identifiers are resolved against.
pub const IMAGE_DIR: &str = "images/";

/// Prefixes that mark an identifier as already pointing into [`IMAGE_DIR`].
pub const IMAGE_DIR_PREFIXES: [&str; 2] = ["images/", "./images/"];

#[must_use]
pub fn is_full_path(identifier: &str) -> bool {
	IMAGE_DIR_PREFIXES.iter().any(|prefix| identifier.starts_with(prefix))
}

/// Resolves a manifest identifier to the `src` of its image.
///
/// Identifiers that already start with `images/` or `./images/` are used verbatim,
/// so that manifests listing full relative paths aren't prefixed twice.
#[must_use]
pub fn resolve_source(identifier: &str) -> Cow<'_, str> {
	if is_full_path(identifier) {
		Cow::Borrowed(identifier)
	} else {
		Cow::Owned(format!("{}{}", IMAGE_DIR, identifier))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bare_names_are_prefixed() {
		assert_eq!(resolve_source("a.png"), "images/a.png");
		assert_eq!(resolve_source("sub/b.jpg"), "images/sub/b.jpg");
	}

	#[test]
	fn full_paths_are_kept() {
		assert_eq!(resolve_source("images/a.png"), "images/a.png");
		assert_eq!(resolve_source("./images/a.png"), "./images/a.png");
		assert!(matches!(resolve_source("images/a.png"), Cow::Borrowed(_)));
	}

	#[test]
	fn lookalike_prefixes_are_not_full_paths() {
		assert_eq!(resolve_source("imagesa.png"), "images/imagesa.png");
		assert_eq!(resolve_source("/images/a.png"), "images//images/a.png");
		assert_eq!(resolve_source("Images/a.png"), "images/Images/a.png");
		assert_eq!(resolve_source(""), "images/");
	}
}
