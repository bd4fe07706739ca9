use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::classify::MediaClassifier;
use crate::thumbnail::ThumbnailGenerator;

use super::batch::BatchConfig;
use super::commands::WorkerCommand;
use super::scanner::{self, ScanOutcome};
use super::state::{LoadControl, LoadRequest};
use super::stream::{ContentStream, LoadEnvelope, LoadEvent};

/// Everything the worker thread owns for the lifetime of the loader.
pub(super) struct WorkerContext {
    pub(super) control: Arc<LoadControl>,
    pub(super) events: Sender<LoadEnvelope>,
    pub(super) classifier: Box<dyn MediaClassifier + Send>,
    pub(super) generator: Box<dyn ThumbnailGenerator + Send>,
    pub(super) batching: BatchConfig,
}

/// Launches the dedicated scan worker thread and returns its command channel.
pub(super) fn spawn(ctx: WorkerContext) -> Sender<WorkerCommand> {
    let (command_tx, command_rx) = mpsc::channel();
    thread::spawn(move || worker_loop(&ctx, &command_rx));
    command_tx
}

fn worker_loop(ctx: &WorkerContext, command_rx: &Receiver<WorkerCommand>) {
    while let Ok(command) = command_rx.recv() {
        match command {
            WorkerCommand::Load(request) => run_until_settled(ctx, request),
            WorkerCommand::Shutdown => break,
        }
    }
}

/// Run `request`, then whichever restart was parked while it was in flight,
/// until the coordinator settles without a successor.
fn run_until_settled(ctx: &WorkerContext, request: LoadRequest) {
    let mut next = Some(request);
    while let Some(request) = next.take() {
        run_scan(ctx, &request);
        next = ctx.control.finish_scan();
    }
}

fn run_scan(ctx: &WorkerContext, request: &LoadRequest) {
    let stream = ContentStream::new(&ctx.events, request.request_id);
    stream.send(LoadEvent::Started);

    let outcome = scanner::scan_folder(
        &request.folder,
        &stream,
        ctx.control.cancel_signal(),
        ctx.classifier.as_ref(),
        ctx.generator.as_ref(),
        ctx.batching.clone(),
    );

    match outcome {
        Ok(ScanOutcome::Completed { total }) => {
            log::debug!(
                "scan {} of {} completed with {total} entries",
                request.request_id,
                request.folder.display()
            );
            stream.send(LoadEvent::Completed { total });
        }
        Ok(ScanOutcome::Cancelled) => {
            log::debug!("scan {} cancelled", request.request_id);
            stream.send(LoadEvent::Cancelled);
        }
        Err(error) => {
            log::debug!("scan {} rejected: {error}", request.request_id);
            stream.send(LoadEvent::Failed(error));
        }
    }
}
