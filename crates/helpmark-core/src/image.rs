use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ImageError;

/// Extensions that turn a bracketed token into an image reference.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".gif"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageData {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Resolves logical image names to image bytes at render time.
///
/// Implementations may cache; the cache belongs to the source value, so two
/// renders sharing a cache must share the source.
pub trait ImageSource {
    fn load(&mut self, name: &str) -> Result<Arc<ImageData>, ImageError>;
}

/// True when `name` ends in a known image extension, ignoring case.
pub fn has_image_extension(name: &str) -> bool {
    image_mime(name).is_some()
}

pub fn image_mime(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    let ext = IMAGE_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(**ext))?;
    Some(match *ext {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".bmp" => "image/bmp",
        _ => "image/gif",
    })
}

/// Images held in memory, keyed by their logical name.
#[derive(Clone, Debug, Default)]
pub struct MemoryImages {
    images: HashMap<String, Arc<ImageData>>,
}

impl MemoryImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, name: impl Into<String>, data: ImageData) -> Self {
        self.images.insert(name.into(), Arc::new(data));
        self
    }
}

impl ImageSource for MemoryImages {
    fn load(&mut self, name: &str) -> Result<Arc<ImageData>, ImageError> {
        self.images
            .get(name)
            .cloned()
            .ok_or_else(|| ImageError::NotFound {
                name: name.to_string(),
            })
    }
}
