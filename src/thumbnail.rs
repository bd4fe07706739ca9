use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::media::Thumbnail;

/// Bounding box applied to generated thumbnails, in pixels.
const DEFAULT_THUMBNAIL_SIZE: u32 = 256;

/// Failure to produce a thumbnail for a single file.
///
/// Busy, unreadable, or corrupt files are ordinary values of this type; a
/// generator must never panic for them. Scans treat the error as local to
/// the file and move on.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Produces a decoded thumbnail for a media file.
pub trait ThumbnailGenerator {
    fn generate(&self, path: &Path) -> Result<Thumbnail, DecodeError>;
}

/// Default generator backed by the `image` crate: decodes the file and
/// downscales it to fit a square bounding box, preserving aspect ratio.
#[derive(Debug, Clone)]
pub struct ImageThumbnailer {
    max_dim: u32,
}

impl ImageThumbnailer {
    #[must_use]
    pub fn new(max_dim: u32) -> Self {
        Self { max_dim }
    }
}

impl Default for ImageThumbnailer {
    fn default() -> Self {
        Self::new(DEFAULT_THUMBNAIL_SIZE)
    }
}

impl ThumbnailGenerator for ImageThumbnailer {
    fn generate(&self, path: &Path) -> Result<Thumbnail, DecodeError> {
        let reader = image::ImageReader::open(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| DecodeError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let scaled = decoded.thumbnail(self.max_dim, self.max_dim);
        let rgba = scaled.to_rgba8();
        Ok(Thumbnail::from_rgba8(
            rgba.width(),
            rgba.height(),
            rgba.into_raw(),
        ))
    }
}
