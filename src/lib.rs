#![doc(html_root_url = "https://docs.rs/infinite-gallery/0.1.0")]
#![warn(clippy::pedantic)]

//! Loads a list of image filenames and appends them to a gallery element in batches of [`BATCH_SIZE`],
//! one batch each time a sentinel element scrolls into view.
//!
//! The batching logic in [`render`] only talks to the page through the [`render::Surface`] trait,
//! so it can be driven without a browser. [`web`] binds it to the real DOM.

pub mod config;
#[cfg(feature = "cli")]
pub mod generate;
pub mod manifest;
pub mod render;
pub mod resolve;
pub mod web;

pub use config::GalleryConfig;
pub use manifest::{LoadError, Manifest};
pub use render::{Gallery, ImageSpec, Surface};

/// How many images are appended per trigger.
pub const BATCH_SIZE: usize = 10;
