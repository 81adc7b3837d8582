//! Markdown handling for vaultbot: remote image scanning, splicing, math
//! delimiter cleanup and note rendering.

pub mod code_block;
pub mod image_links;
pub mod math;
pub mod note;

pub use image_links::{find_remote_images, splice, RemoteImageReference};
pub use math::normalize_math_delimiters;
pub use note::{assemble, timestamp_slug, Note, NoteDraft, Section, TIMESTAMP_FORMAT};
