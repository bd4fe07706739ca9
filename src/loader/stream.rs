use std::sync::mpsc::Sender;

use crate::media::MediaEntry;

use super::scanner::ScanError;

/// Payload delivered to the consumer context for one load request.
#[derive(Debug)]
pub enum LoadEvent {
	/// The request was accepted and the folder is about to be enumerated.
	/// Anything the consumer still displays from an earlier request is stale.
	Started,
	/// An ordered, non-empty batch of freshly scanned entries.
	Batch(Vec<MediaEntry>),
	/// The scan exhausted the folder after delivering `total` entries.
	Completed { total: usize },
	/// The scan observed its cancel signal and stopped. Batches delivered
	/// before the signal remain valid; the undelivered tail was dropped.
	Cancelled,
	/// The request was rejected before enumeration began.
	Failed(ScanError),
}

impl LoadEvent {
	/// Whether no further events will follow for the originating request.
	#[must_use]
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			Self::Completed { .. } | Self::Cancelled | Self::Failed(_)
		)
	}
}

/// Message emitted by the scan worker, correlated with its load request.
#[derive(Debug)]
pub struct LoadEnvelope {
	/// Generation token of the request the payload belongs to.
	pub request_id: u64,
	pub event: LoadEvent,
}

/// Consumer responsible for applying streamed load results.
///
/// Methods are invoked only from the context that pumps the
/// [`Loader`](super::Loader), in the order the worker produced the events.
/// Presentation policy stays on this side of the boundary: a sink that wants
/// the original viewer behaviour selects the first [`Picture`] entry of the
/// first batch that carries one, while the core remains selection-agnostic.
///
/// [`Picture`]: crate::media::MediaKind::Picture
pub trait ContentSink {
	/// A new request was accepted; previously displayed contents are stale
	/// and their thumbnail resources may be released.
	fn on_load_started(&mut self);

	/// Append `entries` to the end of the displayed list, order-preserving.
	fn append_batch(&mut self, entries: Vec<MediaEntry>);

	/// The scan finished normally after delivering `total` entries.
	fn on_load_completed(&mut self, total: usize);

	/// The scan stopped on request without a successor.
	fn on_load_cancelled(&mut self);

	/// The request was rejected outright; present the reason rather than an
	/// empty list.
	fn on_load_failed(&mut self, error: &ScanError);
}

/// Handle used by the worker to stream events for a single request.
pub(super) struct ContentStream<'a> {
	tx: &'a Sender<LoadEnvelope>,
	request_id: u64,
}

impl<'a> ContentStream<'a> {
	#[must_use]
	pub(super) fn new(tx: &'a Sender<LoadEnvelope>, request_id: u64) -> Self {
		Self { tx, request_id }
	}

	/// Emit `event` to the consumer. Returns `false` once the receiving side
	/// has gone away.
	pub(super) fn send(&self, event: LoadEvent) -> bool {
		self.tx
			.send(LoadEnvelope {
				request_id: self.request_id,
				event,
			})
			.is_ok()
	}
}
