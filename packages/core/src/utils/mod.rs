//! Utility functions for NoteTree Core

mod markdown;

pub use markdown::{normalize_image_key, rewrite_image_links, rewrite_wikilink_images};
