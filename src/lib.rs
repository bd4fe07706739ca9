//! Asynchronous folder-content loading for media browser UIs.
//!
//! Given a folder, the pipeline discovers supported media files, generates a
//! thumbnail for each off the consumer's thread, and streams the results
//! back in batches. The [`Loader`] owns a single scan at a time: reloading
//! while a scan is in flight cancels it cooperatively and coalesces rapid
//! repeated requests into one restart for the newest target.
//!
//! The crate root re-exports the handful of types an embedder needs; the
//! boundary traits ([`MediaClassifier`], [`ThumbnailGenerator`],
//! [`ContentSink`]) are the seams to swap in an application's own format
//! table, decoder, or list widget.

pub mod classify;
pub mod loader;
pub mod media;
pub mod thumbnail;

pub use classify::{ExtensionCatalog, MediaClassifier};
pub use loader::{BatchConfig, ContentSink, LoadEnvelope, LoadEvent, Loader, ScanError};
pub use media::{MediaEntry, MediaKind, Thumbnail};
pub use thumbnail::{DecodeError, ImageThumbnailer, ThumbnailGenerator};
