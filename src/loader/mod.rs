//! The load coordinator: owns the single in-flight folder scan, exposes
//! start/cancel semantics, and streams batches back to the consumer context.
//!
//! Requests never block. Asking for a folder while a scan is running signals
//! the scan to stop and parks the new target; rapid repeated requests
//! overwrite the parked target so exactly one restart happens once the
//! worker reports back. Deliveries carry the generation token of their
//! request, and the pump drops anything from a superseded generation, so a
//! cancelled scan can never repopulate the consumer's list.

mod batch;
mod commands;
mod scanner;
mod state;
mod stream;
mod worker;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

pub use batch::BatchConfig;
pub use scanner::ScanError;
pub use stream::{ContentSink, LoadEnvelope, LoadEvent};

use crate::classify::MediaClassifier;
use crate::thumbnail::ThumbnailGenerator;

use commands::WorkerCommand;
use state::{LoadControl, StartDecision};

/// Handle to the folder-loading pipeline.
///
/// Owned by the consumer context (typically a UI thread), which issues
/// requests and periodically calls [`Loader::pump_events`] to drain results.
pub struct Loader {
    control: Arc<LoadControl>,
    command_tx: Sender<WorkerCommand>,
    events_rx: Receiver<LoadEnvelope>,
}

impl Loader {
    /// Launch the dedicated scan worker and return the owning handle.
    pub fn spawn(
        classifier: impl MediaClassifier + Send + 'static,
        generator: impl ThumbnailGenerator + Send + 'static,
        batching: BatchConfig,
    ) -> Self {
        let control = Arc::new(LoadControl::new());
        let (events_tx, events_rx) = mpsc::channel();
        let command_tx = worker::spawn(worker::WorkerContext {
            control: Arc::clone(&control),
            events: events_tx,
            classifier: Box::new(classifier),
            generator: Box::new(generator),
            batching,
        });
        Self {
            control,
            command_tx,
            events_rx,
        }
    }

    /// Ask for the contents of `folder`.
    ///
    /// Never blocks. If a scan is already running it is signalled to stop
    /// and `folder` is parked as the restart target, replacing any target
    /// parked earlier; the newest request always wins.
    pub fn request_load(&self, folder: impl Into<PathBuf>) {
        match self.control.request_load(folder.into()) {
            StartDecision::Dispatch(request) => {
                let _ = self.command_tx.send(WorkerCommand::Load(request));
            }
            StartDecision::Deferred => {}
        }
    }

    /// Cancel any active scan without starting a new one.
    ///
    /// Returns `true` when nothing was running and shutdown can proceed
    /// immediately; `false` when a cancellation was issued and the caller
    /// should keep pumping until the terminal [`LoadEvent::Cancelled`]
    /// arrives before finalizing shutdown.
    pub fn request_stop(&self) -> bool {
        self.control.request_stop()
    }

    /// Drain pending deliveries on the consumer context and dispatch them to
    /// `sink` in production order. Envelopes from superseded requests are
    /// dropped here, which keeps batches already in flight at cancel time
    /// from reaching the consumer.
    pub fn pump_events(&self, sink: &mut impl ContentSink) {
        loop {
            match self.events_rx.try_recv() {
                Ok(envelope) => self.dispatch(envelope, sink),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }

    fn dispatch(&self, envelope: LoadEnvelope, sink: &mut impl ContentSink) {
        if envelope.request_id != self.control.accepted_id() {
            return;
        }
        match envelope.event {
            LoadEvent::Started => sink.on_load_started(),
            LoadEvent::Batch(entries) => sink.append_batch(entries),
            LoadEvent::Completed { total } => sink.on_load_completed(total),
            LoadEvent::Cancelled => sink.on_load_cancelled(),
            LoadEvent::Failed(error) => sink.on_load_failed(&error),
        }
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::classify::ExtensionCatalog;
    use crate::media::{MediaEntry, MediaKind, Thumbnail};
    use crate::thumbnail::DecodeError;

    struct StubThumbs;

    impl ThumbnailGenerator for StubThumbs {
        fn generate(&self, _path: &Path) -> Result<Thumbnail, DecodeError> {
            Ok(Thumbnail::from_rgba8(1, 1, vec![0; 4]))
        }
    }

    /// Sleeps per file so scans stay in flight long enough to race against.
    struct SlowThumbs {
        delay: Duration,
    }

    impl ThumbnailGenerator for SlowThumbs {
        fn generate(&self, _path: &Path) -> Result<Thumbnail, DecodeError> {
            thread::sleep(self.delay);
            Ok(Thumbnail::from_rgba8(1, 1, vec![0; 4]))
        }
    }

    struct FailingThumbs {
        marker: &'static str,
    }

    impl ThumbnailGenerator for FailingThumbs {
        fn generate(&self, path: &Path) -> Result<Thumbnail, DecodeError> {
            if path.to_string_lossy().contains(self.marker) {
                return Err(DecodeError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::other("synthetic decode failure"),
                });
            }
            Ok(Thumbnail::from_rgba8(1, 1, vec![0; 4]))
        }
    }

    /// Sink that records everything and applies the select-first-picture
    /// policy a viewer list would.
    #[derive(Default)]
    struct CollectingSink {
        started: usize,
        names: Vec<String>,
        batches: usize,
        completed: Option<usize>,
        cancelled: bool,
        failed: Option<String>,
        selected: Option<String>,
    }

    impl ContentSink for CollectingSink {
        fn on_load_started(&mut self) {
            self.started += 1;
            self.names.clear();
            self.selected = None;
        }

        fn append_batch(&mut self, entries: Vec<MediaEntry>) {
            self.batches += 1;
            if self.selected.is_none() {
                self.selected = entries
                    .iter()
                    .find(|entry| entry.is_picture())
                    .map(|entry| entry.file_name.clone());
            }
            self.names
                .extend(entries.into_iter().map(|entry| entry.file_name));
        }

        fn on_load_completed(&mut self, total: usize) {
            self.completed = Some(total);
        }

        fn on_load_cancelled(&mut self) {
            self.cancelled = true;
        }

        fn on_load_failed(&mut self, error: &ScanError) {
            self.failed = Some(error.to_string());
        }
    }

    fn pump_until(
        loader: &Loader,
        sink: &mut CollectingSink,
        mut done: impl FnMut(&CollectingSink) -> bool,
    ) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(sink) && Instant::now() < deadline {
            loader.pump_events(sink);
            if !done(sink) {
                thread::sleep(Duration::from_millis(2));
            }
        }
        loader.pump_events(sink);
    }

    fn touch_files(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"").unwrap();
        }
    }

    fn touch_many(dir: &Path, count: usize) {
        for i in 0..count {
            fs::write(dir.join(format!("{i:04}.jpg")), b"").unwrap();
        }
    }

    /// Batching tuned for tests: small batches, no latency guard.
    fn eager_batching(flush_count: usize) -> BatchConfig {
        BatchConfig {
            flush_count,
            min_flush_interval: Duration::ZERO,
            max_flush_interval: Duration::from_secs(60),
        }
    }

    #[test]
    fn loads_a_folder_and_reports_completion() {
        let dir = tempfile::tempdir().unwrap();
        touch_files(dir.path(), &["b.jpg", "a.jpg", "c.jpg"]);

        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            StubThumbs,
            BatchConfig::default(),
        );
        loader.request_load(dir.path());

        let mut sink = CollectingSink::default();
        pump_until(&loader, &mut sink, |sink| sink.completed.is_some());

        assert_eq!(sink.started, 1);
        assert_eq!(sink.names, ["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(sink.completed, Some(3));
        assert!(!sink.cancelled);
    }

    #[test]
    fn decode_failures_do_not_abort_the_load() {
        let dir = tempfile::tempdir().unwrap();
        touch_files(dir.path(), &["a.jpg", "broken.jpg", "c.jpg"]);

        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            FailingThumbs { marker: "broken" },
            BatchConfig::default(),
        );
        loader.request_load(dir.path());

        let mut sink = CollectingSink::default();
        pump_until(&loader, &mut sink, |sink| sink.completed.is_some());

        assert_eq!(sink.completed, Some(2));
        assert_eq!(sink.names, ["a.jpg", "c.jpg"]);
        assert!(sink.failed.is_none());
    }

    #[test]
    fn rapid_reloads_coalesce_to_the_last_folder() {
        let slow_dir = tempfile::tempdir().unwrap();
        touch_many(slow_dir.path(), 40);
        let b_dir = tempfile::tempdir().unwrap();
        touch_files(b_dir.path(), &["from-b.jpg"]);
        let c_dir = tempfile::tempdir().unwrap();
        touch_files(c_dir.path(), &["from-c.jpg"]);

        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            SlowThumbs {
                delay: Duration::from_millis(5),
            },
            eager_batching(5),
        );

        loader.request_load(slow_dir.path());
        let mut sink = CollectingSink::default();
        pump_until(&loader, &mut sink, |sink| sink.started > 0);

        loader.request_load(b_dir.path());
        loader.request_load(c_dir.path());
        pump_until(&loader, &mut sink, |sink| sink.completed.is_some());

        assert_eq!(sink.names, ["from-c.jpg"], "only the last request lands");
        assert_eq!(sink.completed, Some(1));
        assert!(
            !sink.cancelled,
            "the superseded scan's terminal event must not surface"
        );
    }

    #[test]
    fn stop_mid_scan_cancels_and_freezes_deliveries() {
        let dir = tempfile::tempdir().unwrap();
        touch_many(dir.path(), 200);

        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            SlowThumbs {
                delay: Duration::from_millis(2),
            },
            eager_batching(10),
        );
        loader.request_load(dir.path());

        let mut sink = CollectingSink::default();
        pump_until(&loader, &mut sink, |sink| sink.batches > 0);

        assert!(!loader.request_stop(), "a scan was running");
        pump_until(&loader, &mut sink, |sink| sink.cancelled);
        assert!(sink.cancelled);
        assert!(sink.completed.is_none());

        // Nothing further may arrive once the cancellation surfaced.
        let frozen = sink.names.len();
        thread::sleep(Duration::from_millis(100));
        loader.pump_events(&mut sink);
        assert_eq!(sink.names.len(), frozen);
        assert!(frozen < 200, "the scan must have stopped early");
    }

    #[test]
    fn stop_when_idle_is_immediate() {
        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            StubThumbs,
            BatchConfig::default(),
        );
        assert!(loader.request_stop());

        let mut sink = CollectingSink::default();
        loader.pump_events(&mut sink);
        assert_eq!(sink.started, 0);
        assert!(!sink.cancelled);
    }

    #[test]
    fn invalid_target_surfaces_a_distinguishable_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("photo.jpg");
        fs::write(&file, b"").unwrap();

        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            StubThumbs,
            BatchConfig::default(),
        );
        loader.request_load(&file);

        let mut sink = CollectingSink::default();
        pump_until(&loader, &mut sink, |sink| sink.failed.is_some());

        let reason = sink.failed.expect("failure must surface");
        assert!(reason.contains("is not a folder"), "got: {reason}");
        assert!(sink.names.is_empty());
    }

    #[test]
    fn missing_folder_completes_with_zero_entries() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            StubThumbs,
            BatchConfig::default(),
        );
        loader.request_load(&missing);

        let mut sink = CollectingSink::default();
        pump_until(&loader, &mut sink, |sink| sink.completed.is_some());

        assert_eq!(sink.completed, Some(0));
        assert_eq!(sink.batches, 0);
        assert!(sink.failed.is_none());
    }

    #[test]
    fn sink_auto_select_skips_non_picture_entries() {
        let dir = tempfile::tempdir().unwrap();
        touch_files(dir.path(), &["a.nef", "b.jpg"]);

        // Raw files scan first here, so the first entry is not a picture.
        let catalog = ExtensionCatalog::new([
            ("nef", MediaKind::Other),
            ("jpg", MediaKind::Picture),
        ]);
        let loader = Loader::spawn(catalog, StubThumbs, BatchConfig::default());
        loader.request_load(dir.path());

        let mut sink = CollectingSink::default();
        pump_until(&loader, &mut sink, |sink| sink.completed.is_some());

        assert_eq!(sink.names, ["a.nef", "b.jpg"]);
        assert_eq!(sink.selected.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn loader_is_reusable_after_completion() {
        let first = tempfile::tempdir().unwrap();
        touch_files(first.path(), &["one.jpg"]);
        let second = tempfile::tempdir().unwrap();
        touch_files(second.path(), &["two.jpg"]);

        let loader = Loader::spawn(
            ExtensionCatalog::default(),
            StubThumbs,
            BatchConfig::default(),
        );

        let mut sink = CollectingSink::default();
        loader.request_load(first.path());
        pump_until(&loader, &mut sink, |sink| sink.completed.is_some());
        assert_eq!(sink.names, ["one.jpg"]);

        sink.completed = None;
        loader.request_load(second.path());
        pump_until(&loader, &mut sink, |sink| sink.completed.is_some());
        assert_eq!(sink.names, ["two.jpg"], "restart replaces the list");
        assert_eq!(sink.started, 2);
    }
}
