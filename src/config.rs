/// Where on the page the gallery lives and where its manifest comes from.
///
/// Batch size and image directory are fixed; see [`BATCH_SIZE`](crate::BATCH_SIZE) and [`IMAGE_DIR`](crate::resolve::IMAGE_DIR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryConfig {
	gallery_id: String,
	sentinel_id: String,
	manifest_url: String,
}
impl Default for GalleryConfig {
	fn default() -> Self {
		Self {
			gallery_id: "gallery".to_owned(),
			sentinel_id: "sentinel".to_owned(),
			manifest_url: "manifest.json".to_owned(),
		}
	}
}
impl GalleryConfig {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// ID of the element images are appended to.
	#[must_use]
	pub fn gallery_id(&self) -> &str {
		&self.gallery_id
	}

	/// ID of the element whose visibility requests the next batch.
	#[must_use]
	pub fn sentinel_id(&self) -> &str {
		&self.sentinel_id
	}

	/// Relative URL of the JSON manifest.
	#[must_use]
	pub fn manifest_url(&self) -> &str {
		&self.manifest_url
	}

	pub fn set_gallery_id(&mut self, gallery_id: impl Into<String>) -> &mut Self {
		self.gallery_id = gallery_id.into();
		self
	}

	pub fn set_sentinel_id(&mut self, sentinel_id: impl Into<String>) -> &mut Self {
		self.sentinel_id = sentinel_id.into();
		self
	}

	pub fn set_manifest_url(&mut self, manifest_url: impl Into<String>) -> &mut Self {
		self.manifest_url = manifest_url.into();
		self
	}
}

#[cfg(test)]
mod tests {
	use super::GalleryConfig;

	#[test]
	fn defaults_match_the_page_contract() {
		let config = GalleryConfig::default();
		assert_eq!(config.gallery_id(), "gallery");
		assert_eq!(config.sentinel_id(), "sentinel");
		assert_eq!(config.manifest_url(), "manifest.json");
	}

	#[test]
	fn setters_chain() {
		let mut config = GalleryConfig::new();
		config.set_gallery_id("photos").set_sentinel_id("more").set_manifest_url("data/list.json");
		assert_eq!(config.gallery_id(), "photos");
		assert_eq!(config.sentinel_id(), "more");
		assert_eq!(config.manifest_url(), "data/list.json");
	}
}
