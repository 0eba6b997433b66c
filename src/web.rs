//! Binds a [`Gallery`] to the page: `<img>` creation, the sentinel's [***IntersectionObserver***](https://developer.mozilla.org/en-US/docs/Web/API/IntersectionObserver)
//! and fetching of the manifest.

use crate::{
	render::{report_load_failure, Hide, ImageSpec, Surface},
	Gallery, GalleryConfig, LoadError, Manifest,
};
use core::fmt::{self, Debug, Formatter};
use js_sys::{Array, Promise};
use std::{cell::RefCell, rc::Rc};
use thiserror::Error;
use tracing::{debug, error, info, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlImageElement, IntersectionObserver, IntersectionObserverEntry, Response};

#[derive(Debug, Error)]
pub enum DomError {
	#[error("no global `window` exists")]
	NoWindow,
	#[error("`window` has no document")]
	NoDocument,
	#[error("no element with id {0:?}")]
	MissingElement(String),
	#[error("JavaScript exception: {0}")]
	Js(String),
}
impl From<JsValue> for DomError {
	fn from(value: JsValue) -> Self {
		Self::Js(format!("{:?}", value))
	}
}
impl From<DomError> for JsValue {
	fn from(error: DomError) -> Self {
		js_sys::Error::new(&error.to_string()).into()
	}
}

fn document() -> Result<Document, DomError> {
	web_sys::window().ok_or(DomError::NoWindow)?.document().ok_or(DomError::NoDocument)
}

fn element_by_id(document: &Document, id: &str) -> Result<Element, DomError> {
	document.get_element_by_id(id).ok_or_else(|| DomError::MissingElement(id.to_owned()))
}

/// Resolves once the document has been parsed, immediately if that already happened.
async fn document_ready(document: &Document) -> Result<(), DomError> {
	if document.ready_state() != "loading" {
		return Ok(());
	}
	trace!("Waiting for DOMContentLoaded.");
	let mut result = Ok(());
	let ready = Promise::new(&mut |resolve, _reject| result = document.add_event_listener_with_callback("DOMContentLoaded", &resolve));
	result?;
	JsFuture::from(ready).await?;
	Ok(())
}

fn init_logging() {
	if tracing_wasm::try_set_as_global_default().is_err() {
		trace!("A global tracing subscriber was already set.");
	}
}

impl Hide for HtmlImageElement {
	fn hide(&self) {
		if let Err(error) = self.style().set_property("display", "none") {
			error!("Failed to hide image: {:?}", error);
		}
	}
}

/// Appends `<img>` elements to the gallery element.
///
/// Owns the `onerror` handlers of the images it created. Dropping it detaches them.
pub struct DomSurface {
	document: Document,
	gallery: Element,
	images: Vec<(HtmlImageElement, Closure<dyn FnMut()>)>,
}
impl Debug for DomSurface {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("DomSurface").field("gallery", &self.gallery).field("images", &self.images.len()).finish()
	}
}
impl DomSurface {
	#[must_use]
	pub fn new(document: Document, gallery: Element) -> Self {
		Self {
			document,
			gallery,
			images: Vec::new(),
		}
	}

	/// The element images are appended to.
	#[must_use]
	pub fn gallery(&self) -> &Element {
		&self.gallery
	}

	/// The images appended so far, in order.
	pub fn images(&self) -> impl '_ + ExactSizeIterator<Item = &HtmlImageElement> {
		self.images.iter().map(|(image, _)| image)
	}
}
impl Surface for DomSurface {
	type Error = DomError;

	fn append_image(&mut self, ImageSpec { src, alt, lazy }: ImageSpec<'_>) -> Result<(), DomError> {
		let image = self
			.document
			.create_element("img")?
			.dyn_into::<HtmlImageElement>()
			.map_err(|element| DomError::Js(format!("Expected `HtmlImageElement` but created {:?}", element)))?;

		// Before `src`, so the fetch is deferred.
		if lazy {
			image.set_attribute("loading", "lazy")?;
		}
		image.set_alt(alt);

		let on_error = {
			let image = image.clone();
			Closure::wrap(Box::new(move || report_load_failure(&image, &image.src())) as Box<dyn FnMut()>)
		};
		image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
		image.set_src(src);

		if let Err(error) = self.gallery.append_child(&image) {
			image.set_onerror(None);
			return Err(error.into());
		}
		self.images.push((image, on_error));
		Ok(())
	}
}
impl Drop for DomSurface {
	fn drop(&mut self) {
		for (image, _) in &self.images {
			image.set_onerror(None);
		}
		trace!("Detached {} error handler(s).", self.images.len());
	}
}

/// Reports visibility changes of one element until dropped.
pub struct SentinelObserver {
	observer: IntersectionObserver,
	_callback: Closure<dyn FnMut(Array)>,
}
impl Debug for SentinelObserver {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SentinelObserver").finish_non_exhaustive()
	}
}
impl SentinelObserver {
	/// Starts observing `sentinel`. `on_change` receives whether it currently intersects the viewport.
	///
	/// # Errors
	///
	/// Iff the browser refuses to create the observer.
	pub fn observe(sentinel: &Element, mut on_change: impl 'static + FnMut(bool)) -> Result<Self, DomError> {
		let callback = Closure::wrap(Box::new(move |entries: Array| match entries.get(0).dyn_into::<IntersectionObserverEntry>() {
			Ok(entry) => on_change(entry.is_intersecting()),
			Err(entry) => warn!("Expected `IntersectionObserverEntry` but found {:?}", entry),
		}) as Box<dyn FnMut(Array)>);
		let observer = IntersectionObserver::new(callback.as_ref().unchecked_ref())?;
		observer.observe(sentinel);
		Ok(Self { observer, _callback: callback })
	}
}
impl Drop for SentinelObserver {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

/// Fetches and parses the manifest at `url` with a single GET request. No retries, no timeout.
///
/// # Errors
///
/// Iff the request is rejected, answered with a non-success status, or the body isn't a JSON array of strings.
#[instrument]
pub async fn fetch_manifest(url: &str) -> Result<Manifest, LoadError> {
	let window = web_sys::window().ok_or_else(|| LoadError::Network("no global `window` exists".to_owned()))?;
	let response = JsFuture::from(window.fetch_with_str(url)).await.map_err(|error| LoadError::Network(format!("{:?}", error)))?;
	let response = response
		.dyn_into::<Response>()
		.map_err(|value| LoadError::Network(format!("Expected `Response` but found {:?}", value)))?;

	let status = response.status();
	if !response.ok() {
		return Manifest::from_response(status, "");
	}

	let text = response.text().map_err(|error| LoadError::Body(format!("{:?}", error)))?;
	let body = JsFuture::from(text).await.map_err(|error| LoadError::Body(format!("{:?}", error)))?;
	let body = body.as_string().ok_or_else(|| LoadError::Body(format!("Expected string but found {:?}", body)))?;
	debug!("Received {} byte(s) of manifest.", body.len());
	Manifest::from_response(status, &body)
}

/// One mounted gallery: the batch renderer on the page's gallery element, driven by the sentinel.
///
/// Visibility notifications before the manifest is installed are ignored.
#[derive(Debug)]
pub struct GalleryApp {
	gallery: Rc<RefCell<Gallery<DomSurface>>>,
	_observer: SentinelObserver,
}
impl GalleryApp {
	/// Looks up the gallery and sentinel elements and starts observing the latter.
	///
	/// # Errors
	///
	/// Iff there is no document, either element is missing, or the observer can't be created.
	#[instrument]
	pub fn mount(config: &GalleryConfig) -> Result<Self, DomError> {
		let document = document()?;
		let gallery_element = element_by_id(&document, config.gallery_id())?;
		let sentinel = element_by_id(&document, config.sentinel_id())?;

		let gallery = Rc::new(RefCell::new(Gallery::new(DomSurface::new(document, gallery_element))));
		let observer = SentinelObserver::observe(&sentinel, {
			let gallery = Rc::downgrade(&gallery);
			move |is_intersecting| {
				let gallery = match gallery.upgrade() {
					Some(gallery) => gallery,
					None => return trace!("Sentinel notification after unmount."),
				};
				let mut gallery = match gallery.try_borrow_mut() {
					Ok(gallery) => gallery,
					Err(error) => return error!("Gallery busy during sentinel notification: {}", error),
				};
				gallery.on_sentinel(is_intersecting);
			}
		})?;

		info!("Gallery mounted.");
		Ok(Self { gallery, _observer: observer })
	}

	#[must_use]
	pub fn gallery(&self) -> &Rc<RefCell<Gallery<DomSurface>>> {
		&self.gallery
	}

	/// Installs an in-memory manifest and renders the first batch unless it's empty.
	pub fn start(&self, manifest: Manifest) -> usize {
		self.gallery.borrow_mut().start(manifest)
	}

	/// Fetches the manifest at `url` and installs it. On failure, nothing is rendered.
	pub async fn load(&self, url: &str) -> usize {
		let loaded = fetch_manifest(url).await;
		self.gallery.borrow_mut().start_with(loaded)
	}
}

/// JavaScript handle of a mounted gallery. Call `free()` on page unload to detach it.
#[wasm_bindgen]
#[derive(Debug)]
pub struct GalleryHandle(GalleryApp);
#[wasm_bindgen]
impl GalleryHandle {
	/// Renders the next batch manually and returns the number of appended images.
	#[wasm_bindgen(js_name = renderNext)]
	pub fn render_next(&self) -> usize {
		self.0.gallery.borrow_mut().render_next()
	}

	#[wasm_bindgen(getter)]
	pub fn cursor(&self) -> usize {
		self.0.gallery.borrow().cursor()
	}
}
impl GalleryHandle {
	#[must_use]
	pub fn app(&self) -> &GalleryApp {
		&self.0
	}
}

/// Waits for the document, mounts the default gallery and fills it from `manifest.json`.
///
/// # Errors
///
/// Iff mounting fails. A manifest that can't be loaded is only logged.
#[wasm_bindgen(js_name = loadGallery)]
pub async fn load_gallery() -> Result<GalleryHandle, JsValue> {
	init_logging();
	let config = GalleryConfig::default();
	document_ready(&document()?).await?;
	info!("Document ready. Starting gallery.");

	let app = GalleryApp::mount(&config)?;
	app.load(config.manifest_url()).await;
	Ok(GalleryHandle(app))
}

/// Waits for the document, mounts the default gallery and fills it from `identifiers`.
///
/// Anything but an array of strings is treated like an empty manifest.
///
/// # Errors
///
/// Iff mounting fails.
#[wasm_bindgen(js_name = mountStatic)]
pub async fn mount_static(identifiers: JsValue) -> Result<GalleryHandle, JsValue> {
	init_logging();
	document_ready(&document()?).await?;
	info!("Document ready. Starting gallery.");

	let app = GalleryApp::mount(&GalleryConfig::default())?;
	app.start(manifest_from_js(&identifiers));
	Ok(GalleryHandle(app))
}

fn manifest_from_js(value: &JsValue) -> Manifest {
	if !Array::is_array(value) {
		warn!("Manifest is not an array: {:?}", value);
		return Manifest::default();
	}
	let array: &Array = value.unchecked_ref();
	match array.iter().map(|item| item.as_string()).collect::<Option<Vec<_>>>() {
		Some(identifiers) => identifiers.into(),
		None => {
			warn!("Manifest contains non-string entries. Ignoring it.");
			Manifest::default()
		}
	}
}
