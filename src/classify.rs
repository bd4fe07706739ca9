use serde::Deserialize;

use crate::media::MediaKind;

/// Maps file extensions to a supported/unsupported verdict and a media kind.
///
/// Implementations also define the order in which extensions are scanned:
/// [`MediaClassifier::supported_extensions`] is walked front to back, so the
/// position of an extension decides when its files appear in the stream.
pub trait MediaClassifier {
    /// Classify an extension, without the leading dot, case-insensitively.
    /// Returns `None` for unsupported types.
    fn classify(&self, ext: &str) -> Option<MediaKind>;

    /// Supported extensions in scan order.
    fn supported_extensions(&self) -> &[String];
}

/// Table-driven classifier backed by an ordered extension list.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "CatalogTable")]
pub struct ExtensionCatalog {
    entries: Vec<(String, MediaKind)>,
    ordered: Vec<String>,
}

/// Serialized form of the catalog: two lists, pictures scanned first.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct CatalogTable {
    pictures: Vec<String>,
    others: Vec<String>,
}

impl Default for CatalogTable {
    fn default() -> Self {
        Self {
            pictures: ["jpg", "jpeg", "png", "bmp", "gif", "tiff"]
                .map(str::to_string)
                .to_vec(),
            others: ["nef", "cr2", "arw", "dng", "orf", "raf", "rw2"]
                .map(str::to_string)
                .to_vec(),
        }
    }
}

impl From<CatalogTable> for ExtensionCatalog {
    fn from(table: CatalogTable) -> Self {
        let pictures = table.pictures.into_iter().map(|ext| (ext, MediaKind::Picture));
        let others = table.others.into_iter().map(|ext| (ext, MediaKind::Other));
        Self::new(pictures.chain(others))
    }
}

impl ExtensionCatalog {
    /// Build a catalog from `(extension, kind)` pairs, preserving their order.
    /// Extensions are normalised: trimmed, leading dot stripped, lowercased;
    /// empty entries are dropped.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, MediaKind)>,
        S: Into<String>,
    {
        let entries: Vec<(String, MediaKind)> = entries
            .into_iter()
            .map(|(ext, kind)| (normalize(&ext.into()), kind))
            .filter(|(ext, _)| !ext.is_empty())
            .collect();
        let ordered = entries.iter().map(|(ext, _)| ext.clone()).collect();
        Self { entries, ordered }
    }
}

impl Default for ExtensionCatalog {
    fn default() -> Self {
        Self::from(CatalogTable::default())
    }
}

impl MediaClassifier for ExtensionCatalog {
    fn classify(&self, ext: &str) -> Option<MediaKind> {
        let ext = normalize(ext);
        self.entries
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, kind)| *kind)
    }

    fn supported_extensions(&self) -> &[String] {
        &self.ordered
    }
}

fn normalize(ext: &str) -> String {
    let trimmed = ext.trim();
    trimmed
        .strip_prefix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}
