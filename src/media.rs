use std::path::PathBuf;

/// Broad grouping of a supported media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Formats a viewer can display directly.
    Picture,
    /// Supported but not directly displayable (camera raw and similar).
    Other,
}

/// Decoded thumbnail pixels in RGBA order.
///
/// The backing buffer is owned by the thumbnail and released together with
/// the [`MediaEntry`] that holds it.
#[derive(Clone)]
pub struct Thumbnail {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Thumbnail {
    /// Wrap an RGBA8 buffer. `pixels` must hold `width * height * 4` bytes.
    #[must_use]
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// One media file discovered during a folder scan, ready for display.
///
/// Entries are created only after thumbnail generation succeeded and are
/// immutable from then on; the list that holds them owns the decoded pixels.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: MediaKind,
    pub thumbnail: Thumbnail,
}

impl MediaEntry {
    /// Build an entry for `path`, deriving the display name from the final
    /// path component.
    #[must_use]
    pub fn new(path: PathBuf, kind: MediaKind, thumbnail: Thumbnail) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            file_name,
            kind,
            thumbnail,
        }
    }

    /// Whether a consumer may display this entry directly.
    #[must_use]
    pub fn is_picture(&self) -> bool {
        self.kind == MediaKind::Picture
    }
}
