use super::state::LoadRequest;

/// Commands understood by the scan worker thread.
#[derive(Debug)]
pub(super) enum WorkerCommand {
    /// Begin scanning for the provided request.
    Load(LoadRequest),
    /// Stop the worker thread.
    Shutdown,
}
