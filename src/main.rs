mod cli;

use std::path::PathBuf;
use std::time::Duration;
use std::{fs, thread};

use anyhow::{Context, Result, bail};
use cli::{LoadReport, OutputFormat, ReportEntry};
use lightbox::{
	BatchConfig, ContentSink, ExtensionCatalog, ImageThumbnailer, Loader, MediaEntry,
	MediaKind, ScanError,
};

fn main() -> Result<()> {
	env_logger::init();
	let args = cli::parse_cli();

	let folder = resolve_folder(args.folder.clone())?;
	let batching = build_batching(&args);
	let thumbnailer = args
		.thumb_size
		.map_or_else(ImageThumbnailer::default, ImageThumbnailer::new);

	let loader = Loader::spawn(ExtensionCatalog::default(), thumbnailer, batching);
	loader.request_load(&folder);

	let mut sink = ReportSink::default();
	while !sink.finished {
		loader.pump_events(&mut sink);
		if !sink.finished {
			thread::sleep(Duration::from_millis(25));
		}
	}

	if let Some(reason) = sink.failure {
		bail!("could not load {}: {reason}", folder.display());
	}

	let report = LoadReport {
		folder,
		outcome: sink.outcome,
		total: sink.total,
		selected: sink.selected,
		entries: sink.entries,
	};
	match args.output {
		OutputFormat::Plain => cli::print_plain(&report),
		OutputFormat::Json => cli::print_json(&report)?,
	}

	Ok(())
}

/// The pipeline only accepts folders; a file target resolves to its parent
/// before the request is made.
fn resolve_folder(path: PathBuf) -> Result<PathBuf> {
	match fs::metadata(&path) {
		Ok(metadata) if metadata.is_file() => path
			.parent()
			.map(PathBuf::from)
			.with_context(|| format!("{} has no parent folder", path.display())),
		_ => Ok(path),
	}
}

fn build_batching(args: &cli::CliArgs) -> BatchConfig {
	let mut batching = BatchConfig::default();
	if let Some(count) = args.flush_count {
		batching.flush_count = count;
	}
	if let Some(ms) = args.min_flush_ms {
		batching.min_flush_interval = Duration::from_millis(ms);
	}
	if let Some(ms) = args.max_flush_ms {
		batching.max_flush_interval = Duration::from_millis(ms);
	}
	batching
}

/// Console consumer: accumulates entries as batches land and applies the
/// select-first-picture policy a viewer list would.
#[derive(Default)]
struct ReportSink {
	entries: Vec<ReportEntry>,
	selected: Option<String>,
	outcome: &'static str,
	total: usize,
	failure: Option<String>,
	finished: bool,
}

impl ContentSink for ReportSink {
	fn on_load_started(&mut self) {
		self.entries.clear();
		self.selected = None;
	}

	fn append_batch(&mut self, entries: Vec<MediaEntry>) {
		if self.selected.is_none() {
			self.selected = entries
				.iter()
				.find(|entry| entry.is_picture())
				.map(|entry| entry.file_name.clone());
		}
		for entry in entries {
			self.entries.push(ReportEntry {
				name: entry.file_name,
				kind: match entry.kind {
					MediaKind::Picture => "picture",
					MediaKind::Other => "other",
				},
				width: entry.thumbnail.width(),
				height: entry.thumbnail.height(),
			});
		}
	}

	fn on_load_completed(&mut self, total: usize) {
		self.outcome = "completed";
		self.total = total;
		self.finished = true;
	}

	fn on_load_cancelled(&mut self) {
		self.outcome = "cancelled";
		self.total = self.entries.len();
		self.finished = true;
	}

	fn on_load_failed(&mut self, error: &ScanError) {
		self.failure = Some(error.to_string());
		self.finished = true;
	}
}
