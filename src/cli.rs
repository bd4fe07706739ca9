use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;

/// Command-line arguments accepted by the `lightbox` binary.
#[derive(Parser, Debug)]
#[command(
	name = "lightbox",
	version,
	about = "Scan a folder and stream media thumbnails in batches"
)]
pub(crate) struct CliArgs {
	/// Folder to scan. A file path is resolved to its parent folder.
	pub(crate) folder: PathBuf,
	#[arg(
		long,
		value_name = "COUNT",
		help = "Entries per batch before an early flush (default: 100)"
	)]
	pub(crate) flush_count: Option<usize>,
	#[arg(
		long,
		value_name = "MS",
		help = "Minimum milliseconds between flushes (default: 500)"
	)]
	pub(crate) min_flush_ms: Option<u64>,
	#[arg(
		long,
		value_name = "MS",
		help = "Flush whatever is buffered after this many milliseconds (default: 1000)"
	)]
	pub(crate) max_flush_ms: Option<u64>,
	#[arg(
		long,
		value_name = "PX",
		help = "Thumbnail bounding box in pixels (default: 256)"
	)]
	pub(crate) thumb_size: Option<u32>,
	#[arg(
		short,
		long,
		value_enum,
		default_value_t = OutputFormat::Plain,
		help = "Report format once loading settles"
	)]
	pub(crate) output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
	Plain,
	Json,
}

pub(crate) fn parse_cli() -> CliArgs {
	CliArgs::parse()
}

/// Summary of a finished load, printed once the pipeline settles.
#[derive(Debug, Serialize)]
pub(crate) struct LoadReport {
	pub(crate) folder: PathBuf,
	pub(crate) outcome: &'static str,
	pub(crate) total: usize,
	pub(crate) selected: Option<String>,
	pub(crate) entries: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportEntry {
	pub(crate) name: String,
	pub(crate) kind: &'static str,
	pub(crate) width: u32,
	pub(crate) height: u32,
}

pub(crate) fn print_plain(report: &LoadReport) {
	for entry in &report.entries {
		println!(
			"{}  {}x{}  {}",
			entry.kind, entry.width, entry.height, entry.name
		);
	}
	match &report.selected {
		Some(name) => println!("selected: {name}"),
		None => println!("selected: none"),
	}
	println!(
		"{}: {} entries from {}",
		report.outcome,
		report.total,
		report.folder.display()
	);
}

pub(crate) fn print_json(report: &LoadReport) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(report)?);
	Ok(())
}
