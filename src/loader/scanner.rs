use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::{fs, io};

use thiserror::Error;

use crate::classify::MediaClassifier;
use crate::media::MediaEntry;
use crate::thumbnail::ThumbnailGenerator;

use super::batch::{BatchAccumulator, BatchConfig};
use super::stream::{ContentStream, LoadEvent};

/// Folder-level failure that aborts a request before any entries are
/// produced. Per-file decode failures are not represented here; they are
/// local and the scan continues past them.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{} is not a folder", path.display())]
    NotAFolder { path: PathBuf },
    #[error("failed to read folder {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How a scan that got past the folder checks ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ScanOutcome {
    Completed { total: usize },
    Cancelled,
}

/// Enumerate `folder` and stream batches of scanned entries.
///
/// Extensions are walked in the classifier's order; within one extension,
/// files are sorted by name ascending. The cancel signal is polled before
/// every file and again before every flush, so no batch is delivered after
/// the signal has been observed.
pub(super) fn scan_folder(
    folder: &Path,
    stream: &ContentStream<'_>,
    cancel: &AtomicBool,
    classifier: &dyn MediaClassifier,
    generator: &dyn ThumbnailGenerator,
    batching: BatchConfig,
) -> Result<ScanOutcome, ScanError> {
    let listing = list_folder(folder)?;
    let mut accumulator = BatchAccumulator::new(batching);
    let mut delivered = 0usize;

    for ext in classifier.supported_extensions() {
        for (_, path) in files_with_extension(&listing, ext) {
            if cancel.load(AtomicOrdering::Acquire) {
                accumulator.discard();
                return Ok(ScanOutcome::Cancelled);
            }

            let Some(kind) = classifier.classify(ext) else {
                continue;
            };
            let thumbnail = match generator.generate(&path) {
                Ok(thumbnail) => thumbnail,
                Err(err) => {
                    log::debug!("skipping {}: {err}", path.display());
                    continue;
                }
            };

            if let Some(batch) = accumulator.offer(MediaEntry::new(path, kind, thumbnail)) {
                if cancel.load(AtomicOrdering::Acquire) {
                    return Ok(ScanOutcome::Cancelled);
                }
                delivered += batch.len();
                stream.send(LoadEvent::Batch(batch));
            }
        }
    }

    if cancel.load(AtomicOrdering::Acquire) {
        accumulator.discard();
        return Ok(ScanOutcome::Cancelled);
    }
    if let Some(batch) = accumulator.take_remainder() {
        delivered += batch.len();
        stream.send(LoadEvent::Batch(batch));
    }

    Ok(ScanOutcome::Completed { total: delivered })
}

/// Collect the plain files of `folder`, non-recursively.
///
/// A path that exists but is not a directory fails fast; a path that does
/// not exist at all reads as an empty folder and completes normally.
fn list_folder(folder: &Path) -> Result<Vec<(String, PathBuf)>, ScanError> {
    match fs::metadata(folder) {
        Ok(metadata) if !metadata.is_dir() => {
            return Err(ScanError::NotAFolder {
                path: folder.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ScanError::Unreadable {
                path: folder.to_path_buf(),
                source,
            });
        }
    }

    let reader = fs::read_dir(folder).map_err(|source| ScanError::Unreadable {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in reader {
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        files.push((file_name, entry.path()));
    }
    Ok(files)
}

fn files_with_extension(listing: &[(String, PathBuf)], ext: &str) -> Vec<(String, PathBuf)> {
    let mut matches: Vec<(String, PathBuf)> = listing
        .iter()
        .filter(|(_, path)| {
            path.extension()
                .and_then(|found| found.to_str())
                .is_some_and(|found| found.eq_ignore_ascii_case(ext))
        })
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.0.cmp(&b.0));
    matches
}
