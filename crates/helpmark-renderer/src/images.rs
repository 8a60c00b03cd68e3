use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use helpmark_core::{ImageData, ImageError, ImageSource, image_mime};
use lru::LruCache;
use walkdir::WalkDir;

/// Finds images anywhere below a root directory.
///
/// A file whose name equals the requested name wins. Otherwise the first file
/// (in file-name order) with the same stem and an image extension is used,
/// so `[logo.png]` also finds `logo.jpg`. Loaded images stay in an LRU cache
/// owned by this value.
pub struct DirectoryImages {
    root: PathBuf,
    cache: LruCache<String, Arc<ImageData>>,
}

impl DirectoryImages {
    /// `capacity` is clamped to at least one entry.
    pub fn new(root: impl Into<PathBuf>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            root: root.into(),
            cache: LruCache::new(capacity),
        }
    }

    fn find(&self, name: &str) -> Option<(PathBuf, &'static str)> {
        let wanted_stem = Path::new(name).file_stem();
        let mut by_stem: Option<(PathBuf, &'static str)> = None;

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            let Some(mime) = image_mime(&file_name) else {
                continue;
            };
            if file_name == name {
                return Some((entry.path().to_owned(), mime));
            }
            if by_stem.is_none() && wanted_stem.is_some() && entry.path().file_stem() == wanted_stem
            {
                by_stem = Some((entry.path().to_owned(), mime));
            }
        }
        by_stem
    }
}

impl ImageSource for DirectoryImages {
    fn load(&mut self, name: &str) -> Result<Arc<ImageData>, ImageError> {
        if let Some(data) = self.cache.get(name) {
            return Ok(Arc::clone(data));
        }

        let (path, mime) = self.find(name).ok_or_else(|| ImageError::NotFound {
            name: name.to_string(),
        })?;
        log::debug!("image '{}' found at {}", name, path.display());
        let bytes = fs::read(&path).map_err(|source| ImageError::Io {
            path: path.clone(),
            source,
        })?;

        let data = Arc::new(ImageData { mime, bytes });
        self.cache.put(name.to_string(), Arc::clone(&data));
        Ok(data)
    }
}
