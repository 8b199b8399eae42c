//! CLI command implementations.
//!
//! Each command returns its output as a string; printing is left to the
//! binary.

use crate::cli::output::{
    OutputFormat, SessionStats, format_export_formats, format_stats, format_table,
};
use crate::cli::parser::{Cli, Commands, ReplayArgs};
use crate::codec::{ascii_text, decode_hex, dump, to_text};
use crate::core::{ChunkFilter, DataMode, DisplayMode};
use crate::error::{CommandError, Result};
use crate::export::ExportFormat;
use crate::ingest::{EOL, IngestCoordinator, LoggingSink};
use crate::io::{read_capture, write_file};
use crate::render::ClockFormatter;
use std::fmt::Write as FmtWrite;
use std::path::Path;
use tracing::info;

/// Bytes per line in `encode --dump` output.
const DUMP_WIDTH: usize = 16;

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Render { replay, table, utc } => cmd_render(replay, *table, *utc, format),
        Commands::Export { replay, to, output } => {
            cmd_export(replay, to, output.as_deref(), format)
        }
        Commands::Stats { replay } => cmd_stats(replay, format),
        Commands::Encode {
            text,
            hex,
            eol,
            dump,
        } => cmd_encode(text, *hex, *eol, *dump),
        Commands::Decode { hex } => cmd_decode(hex),
        Commands::Formats => Ok(format_export_formats(format)),
    }
}

/// Feeds a capture through a fresh coordinator.
fn replay_capture(replay: &ReplayArgs, display_mode: DisplayMode) -> Result<IngestCoordinator> {
    let chunks = read_capture(&replay.capture)?;
    let mut coordinator =
        IngestCoordinator::new(replay.store_config(), replay.view_config(display_mode))?;
    coordinator.attach_sink(Box::new(LoggingSink));

    for chunk in &chunks {
        coordinator.on_bytes_transferred(chunk.direction(), chunk.payload(), chunk.timestamp());
    }

    info!(
        records = chunks.len(),
        retained = coordinator.store().len(),
        "capture replayed"
    );
    Ok(coordinator)
}

fn cmd_render(replay: &ReplayArgs, table: bool, utc: bool, format: OutputFormat) -> Result<String> {
    let display_mode = if table {
        DisplayMode::Table
    } else {
        DisplayMode::Text
    };
    let coordinator = replay_capture(replay, display_mode)?;

    if table || format == OutputFormat::Json {
        let formatter = if utc {
            ClockFormatter::utc()
        } else {
            ClockFormatter::local()
        };
        return Ok(format_table(&coordinator.table_rows(&formatter), format));
    }

    let mut output = coordinator.rendered_text().plain_text();
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(&coordinator.counters().to_string());
    output.push('\n');
    Ok(output)
}

fn cmd_export(
    replay: &ReplayArgs,
    to: &str,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let export_format: ExportFormat = to.parse()?;
    let coordinator = replay_capture(replay, DisplayMode::Text)?;
    let content = coordinator.export(export_format, ChunkFilter::for_echo(!replay.no_echo))?;

    let Some(path) = output else {
        return Ok(content);
    };

    write_file(path, &content)?;
    info!(path = %path.display(), format = %export_format, "export written");

    let message = format!("Exported {} to {}", export_format.name(), path.display());
    Ok(match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json => serde_json::json!({
            "format": export_format.name(),
            "path": path.to_string_lossy(),
            "bytes": content.len(),
        })
        .to_string(),
    })
}

fn cmd_stats(replay: &ReplayArgs, format: OutputFormat) -> Result<String> {
    let coordinator = replay_capture(replay, DisplayMode::Text)?;
    let counters = coordinator.counters();
    let chunks = coordinator.store().snapshot(ChunkFilter::All);

    let stats = SessionStats {
        chunks: chunks.len(),
        sent_bytes: counters.sent,
        received_bytes: counters.received,
        first_timestamp: chunks.first().map(|c| c.timestamp()),
        last_timestamp: chunks.last().map(|c| c.timestamp()),
    };
    Ok(format_stats(&stats, format))
}

fn cmd_encode(text: &str, hex: bool, eol: bool, as_dump: bool) -> Result<String> {
    let mut bytes = text.as_bytes().to_vec();
    if eol {
        bytes.extend_from_slice(EOL.as_bytes());
    }
    if bytes.is_empty() {
        return Err(CommandError::InvalidArgument("nothing to encode".to_string()).into());
    }

    if as_dump {
        return Ok(dump(&bytes, DUMP_WIDTH));
    }

    let mode = if hex { DataMode::Hex } else { DataMode::Ascii };
    let mut output = to_text(&bytes, mode);
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn cmd_decode(hex: &str) -> Result<String> {
    let bytes = decode_hex(hex)?;
    let mut output = String::new();
    let _ = writeln!(output, "{}", ascii_text(&bytes));
    Ok(output)
}
