use crate::{manifest::LoadError, resolve::resolve_source, Manifest, BATCH_SIZE};
use core::{fmt::Debug, mem};
use tracing::{debug, error, info, instrument, trace, warn};

/// Everything one rendered image carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec<'a> {
	/// The resolved source path.
	pub src: &'a str,
	/// The raw manifest identifier, used as accessible label.
	pub alt: &'a str,
	/// Whether fetching should be deferred until the image is near the viewport.
	pub lazy: bool,
}

/// The append target of a [`Gallery`].
///
/// Implementations must arrange for [`report_load_failure`] to be called on an appended image
/// if it later fails to load.
pub trait Surface {
	type Error: Debug;

	/// Appends one image after all previously appended ones.
	///
	/// # Errors
	///
	/// Iff the image could not be created or inserted. The [`Gallery`] logs this and moves on to the next identifier.
	fn append_image(&mut self, image: ImageSpec<'_>) -> Result<(), Self::Error>;
}

/// A rendered image that can be taken out of the layout without being removed.
pub trait Hide {
	fn hide(&self);
}

/// Logs a failed image load and hides the image, leaving a gap instead of a broken-image icon.
///
/// Sibling images are unaffected.
pub fn report_load_failure(image: &impl Hide, src: &str) {
	error!("Failed to load image: {}", src);
	image.hide();
}

/// Batch renderer state for one page load.
///
/// Before [`start`](`Gallery::start`), there is no manifest. Visibility notifications are only remembered then,
/// and a visible sentinel is answered with one extra batch once the manifest arrives.
#[derive(Debug)]
pub struct Gallery<S: Surface> {
	surface: S,
	manifest: Option<Manifest>,
	cursor: usize,
	sentinel_pending: bool,
}
impl<S: Surface> Gallery<S> {
	#[must_use]
	pub fn new(surface: S) -> Self {
		Self {
			surface,
			manifest: None,
			cursor: 0,
			sentinel_pending: false,
		}
	}

	/// How many identifiers have been scheduled so far. Always a multiple of [`BATCH_SIZE`].
	#[must_use]
	pub fn cursor(&self) -> usize {
		self.cursor
	}

	#[must_use]
	pub fn manifest(&self) -> Option<&Manifest> {
		self.manifest.as_ref()
	}

	#[must_use]
	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	#[must_use]
	pub fn into_surface(self) -> S {
		self.surface
	}

	/// Whether every identifier has been scheduled. `false` before [`start`](`Gallery::start`).
	#[must_use]
	pub fn is_exhausted(&self) -> bool {
		self.manifest.as_ref().map_or(false, |manifest| self.cursor >= manifest.len())
	}

	/// Installs the manifest and renders the first batch, unless it's empty.
	///
	/// If the sentinel was last reported visible before this call, the next batch is rendered right away too,
	/// since the browser won't report that same state again.
	///
	/// Returns the number of appended images.
	#[instrument(skip(self, manifest), fields(len = manifest.len()))]
	pub fn start(&mut self, manifest: Manifest) -> usize {
		info!("Manifest loaded with {} image(s).", manifest.len());
		debug!("Manifest contents: {:?}", manifest.identifiers());
		let empty = manifest.is_empty();
		self.manifest = Some(manifest);
		let sentinel_pending = mem::take(&mut self.sentinel_pending);
		if empty {
			warn!("Manifest is empty. No images to load.");
			return 0;
		}

		let mut appended = self.render_next();
		if sentinel_pending {
			trace!("Sentinel became visible while loading.");
			appended += self.render_next();
		}
		appended
	}

	/// Like [`start`](`Gallery::start`), but for the outcome of a load.
	///
	/// A failed load is logged and leaves the gallery with an empty manifest. Nothing is rendered then.
	pub fn start_with(&mut self, loaded: Result<Manifest, LoadError>) -> usize {
		match loaded {
			Ok(manifest) => self.start(manifest),
			Err(error) => {
				error!("Failed to load manifest: {}", error);
				self.manifest = Some(Manifest::default());
				self.sentinel_pending = false;
				0
			}
		}
	}

	/// Appends the batch at the cursor and advances the cursor by exactly [`BATCH_SIZE`],
	/// no matter how many images that batch actually had.
	///
	/// Calling this past the end of the manifest is a harmless no-op apart from the cursor.
	/// Returns the number of appended images.
	#[instrument(skip(self), fields(cursor = self.cursor))]
	pub fn render_next(&mut self) -> usize {
		let empty = Manifest::default();
		let manifest = self.manifest.as_ref().unwrap_or(&empty);
		let range = manifest.batch_range(self.cursor);
		info!("Loading images {} to {}", self.cursor, self.cursor.saturating_add(BATCH_SIZE - 1));

		let mut appended = 0;
		for identifier in &manifest.identifiers()[range] {
			let src = resolve_source(identifier);
			let image = ImageSpec {
				src: &src,
				alt: identifier,
				lazy: true,
			};
			match self.surface.append_image(image) {
				Ok(()) => appended += 1,
				Err(error) => error!("Failed to append image {:?}: {:?}", identifier, error),
			}
		}

		self.cursor = self.cursor.saturating_add(BATCH_SIZE);
		trace!("Appended {} image(s), cursor is now {}.", appended, self.cursor);
		appended
	}

	/// Call when the sentinel's visibility changes.
	///
	/// Renders the next batch iff it became visible and a non-empty manifest is installed.
	/// Before that, only the latest state is kept for [`start`](`Gallery::start`).
	pub fn on_sentinel(&mut self, is_intersecting: bool) -> usize {
		match &self.manifest {
			None => {
				trace!("Sentinel visibility {} before the manifest was loaded.", is_intersecting);
				self.sentinel_pending = is_intersecting;
				0
			}
			Some(_) if !is_intersecting => 0,
			Some(manifest) if manifest.is_empty() => 0,
			Some(_) => self.render_next(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	#[derive(Debug, Default)]
	struct Recorder {
		appended: Vec<(String, String, bool)>,
		reject: Option<String>,
	}
	impl Surface for Recorder {
		type Error = &'static str;

		fn append_image(&mut self, image: ImageSpec<'_>) -> Result<(), Self::Error> {
			if self.reject.as_deref() == Some(image.alt) {
				return Err("rejected");
			}
			self.appended.push((image.src.to_owned(), image.alt.to_owned(), image.lazy));
			Ok(())
		}
	}

	fn letters(count: u8) -> Manifest {
		(0..count).map(|i| format!("{}.png", (b'a' + i) as char)).collect::<Vec<_>>().into()
	}

	#[test]
	fn images_carry_resolved_source_label_and_lazy_hint() {
		let mut gallery = Gallery::new(Recorder::default());
		gallery.start(vec!["a.png".to_owned(), "./images/b.png".to_owned()].into());
		assert_eq!(
			gallery.surface().appended,
			[("images/a.png".to_owned(), "a.png".to_owned(), true), ("./images/b.png".to_owned(), "./images/b.png".to_owned(), true)]
		);
	}

	#[test]
	fn cursor_advances_by_whole_batches() {
		let mut gallery = Gallery::new(Recorder::default());
		assert_eq!(gallery.start(letters(3)), 3);
		assert_eq!(gallery.cursor(), 10);
		assert_eq!(gallery.render_next(), 0);
		assert_eq!(gallery.cursor(), 20);
		assert_eq!(gallery.surface().appended.len(), 3);
	}

	#[test]
	fn empty_manifest_renders_nothing() {
		let mut gallery = Gallery::new(Recorder::default());
		assert_eq!(gallery.start(Manifest::default()), 0);
		assert_eq!(gallery.cursor(), 0);
		assert_eq!(gallery.on_sentinel(true), 0);
		assert_eq!(gallery.cursor(), 0);
		assert!(gallery.surface().appended.is_empty());
	}

	#[test]
	fn sentinel_before_start_is_answered_once() {
		let mut gallery = Gallery::new(Recorder::default());
		assert_eq!(gallery.on_sentinel(true), 0);
		assert_eq!(gallery.cursor(), 0);
		assert!(!gallery.is_exhausted());

		assert_eq!(gallery.start(letters(25)), 20);
		assert_eq!(gallery.cursor(), 20);
		assert_eq!(gallery.surface().appended[0].1, "a.png");
		assert_eq!(gallery.surface().appended[19].1, "t.png");
	}

	#[test]
	fn only_the_latest_sentinel_state_counts_before_start() {
		let mut gallery = Gallery::new(Recorder::default());
		gallery.on_sentinel(true);
		gallery.on_sentinel(false);
		assert_eq!(gallery.start(letters(25)), 10);
		assert_eq!(gallery.cursor(), 10);
	}

	#[test]
	fn sentinel_before_failed_load_is_dropped() {
		let mut gallery = Gallery::new(Recorder::default());
		gallery.on_sentinel(true);
		assert_eq!(gallery.start_with(Err(LoadError::Status { status: 404 })), 0);
		assert_eq!(gallery.cursor(), 0);

		let mut gallery = Gallery::new(Recorder::default());
		gallery.on_sentinel(true);
		assert_eq!(gallery.start(Manifest::default()), 0);
		assert_eq!(gallery.cursor(), 0);
	}

	#[test]
	fn hidden_sentinel_does_not_render() {
		let mut gallery = Gallery::new(Recorder::default());
		gallery.start(letters(20));
		assert_eq!(gallery.on_sentinel(false), 0);
		assert_eq!(gallery.cursor(), 10);
		assert_eq!(gallery.on_sentinel(true), 10);
		assert!(gallery.is_exhausted());
	}

	#[test]
	fn rejected_append_does_not_abort_the_batch() {
		let mut gallery = Gallery::new(Recorder {
			reject: Some("c.png".to_owned()),
			..Recorder::default()
		});
		assert_eq!(gallery.start(letters(5)), 4);
		assert_eq!(gallery.cursor(), 10);
		let alts: Vec<_> = gallery.surface().appended.iter().map(|(_, alt, _)| alt.as_str()).collect();
		assert_eq!(alts, ["a.png", "b.png", "d.png", "e.png"]);
	}

	#[test]
	fn failed_load_never_renders() {
		let mut gallery = Gallery::new(Recorder::default());
		assert_eq!(gallery.start_with(Err(LoadError::Status { status: 404 })), 0);
		assert_eq!(gallery.manifest(), Some(&Manifest::default()));
		assert_eq!(gallery.on_sentinel(true), 0);
		assert_eq!(gallery.cursor(), 0);
		assert!(gallery.surface().appended.is_empty());
	}

	#[test]
	fn load_failure_hides_only_the_failed_image() {
		struct Image(Cell<bool>);
		impl Hide for Image {
			fn hide(&self) {
				self.0.set(true)
			}
		}

		let images: Vec<_> = (0..10).map(|_| Image(Cell::new(false))).collect();
		report_load_failure(&images[3], "images/missing.png");
		let hidden: Vec<_> = images.iter().map(|image| image.0.get()).collect();
		assert_eq!(hidden.iter().filter(|&&hidden| hidden).count(), 1);
		assert!(hidden[3]);
	}
}
