//! Integration tests for the UART log.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};
use uart_log::codec::StyledText;
use uart_log::core::{
    ByteCounters, ChunkFilter, ChunkStore, DataMode, Direction, StoreConfig, UartDataChunk,
    ViewConfig,
};
use uart_log::error::{Error, ExportError};
use uart_log::export::{ExportFormat, export};
use uart_log::ingest::{DisplaySink, IngestCoordinator};
use uart_log::render::{render_full, render_incremental, render_table};

/// Sink recording what the display would show.
#[derive(Clone, Default)]
struct ScreenSink {
    screen: Arc<Mutex<String>>,
    status: Arc<Mutex<String>>,
}

impl DisplaySink for ScreenSink {
    fn on_chunk_appended(&mut self, _: &UartDataChunk, counters: ByteCounters, text: &StyledText) {
        *self.screen.lock().expect("screen lock") = text.plain_text();
        *self.status.lock().expect("status lock") = counters.to_string();
    }

    fn on_buffer_cleared(&mut self) {
        self.screen.lock().expect("screen lock").clear();
        self.status.lock().expect("status lock").clear();
    }
}

fn session(view: ViewConfig) -> (IngestCoordinator, ScreenSink) {
    let mut coordinator =
        IngestCoordinator::new(StoreConfig::default(), view).expect("coordinator");
    let sink = ScreenSink::default();
    coordinator.attach_sink(Box::new(sink.clone()));
    (coordinator, sink)
}

fn five_chunks() -> Vec<UartDataChunk> {
    vec![
        UartDataChunk::new(1.0, Direction::Sent, b"AT\r\n".to_vec()),
        UartDataChunk::new(1.1, Direction::Received, b"OK\r\n".to_vec()),
        UartDataChunk::new(2.0, Direction::Sent, b"AT+GMR\r\n".to_vec()),
        UartDataChunk::new(3.0, Direction::Sent, b"AT+RST\r\n".to_vec()),
        UartDataChunk::new(3.4, Direction::Received, b"ready\r\n".to_vec()),
    ]
}

#[test]
fn test_modem_session_end_to_end() {
    let (mut coordinator, sink) = session(ViewConfig::default());

    let written = coordinator.send_text("AT", true, 1.0);
    assert_eq!(written, b"AT\n");
    coordinator.on_bytes_transferred(Direction::Received, b"OK\n", 1.1);

    assert_eq!(*sink.screen.lock().expect("lock"), "AT\nOK\n");
    assert_eq!(
        *sink.status.lock().expect("lock"),
        "Sent: 3 bytes     Received: 3 bytes"
    );

    let csv = coordinator
        .export(ExportFormat::Csv, ChunkFilter::All)
        .expect("csv export");
    assert_eq!(csv, "Timestamp,Direction,Data\n1.0,TX,\"AT\n\"\n1.1,RX,\"OK\n\"");

    coordinator.clear();
    assert!(sink.screen.lock().expect("lock").is_empty());
    assert_eq!(coordinator.counters(), ByteCounters::default());
    assert!(matches!(
        coordinator.export(ExportFormat::Json, ChunkFilter::All),
        Err(Error::Export(ExportError::NoData))
    ));
}

#[test]
fn test_switching_to_hex_rebuilds_stream() {
    let (mut coordinator, sink) = session(ViewConfig::default());
    coordinator.on_bytes_transferred(Direction::Received, b"OK", 1.0);
    coordinator.set_view(ViewConfig::default().with_data_mode(DataMode::Hex));

    assert_eq!(coordinator.rendered_text().plain_text(), "4F 4B");

    coordinator.on_bytes_transferred(Direction::Received, b"\r\n", 1.1);
    assert_eq!(*sink.screen.lock().expect("lock"), "4F 4B 0D 0A");
}

#[test]
fn test_coalesced_session_exports_merged_chunks() {
    let config = StoreConfig::default().with_coalesce_window(0.05);
    let mut coordinator =
        IngestCoordinator::new(config, ViewConfig::default()).expect("coordinator");

    coordinator.on_bytes_transferred(Direction::Received, b"rea", 1.00);
    coordinator.on_bytes_transferred(Direction::Received, b"dy", 1.02);
    coordinator.on_bytes_transferred(Direction::Received, b"\r\n", 1.04);
    coordinator.on_bytes_transferred(Direction::Sent, b"AT", 1.05);

    let text = coordinator
        .export(ExportFormat::PlainText, ChunkFilter::All)
        .expect("text export");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("ready\\r\\n"));
    assert_eq!(coordinator.counters().total(), 9);
}

#[test]
fn test_csv_export_hex_literal() {
    let chunks = vec![
        UartDataChunk::new(1.0, Direction::Sent, b"AB".to_vec()),
        UartDataChunk::new(2.5, Direction::Received, vec![0x00, 0xFF]),
    ];
    let csv = export(&chunks, ExportFormat::Csv, DataMode::Hex).expect("csv export");
    assert_eq!(csv, "Timestamp,Direction,Data\n1.0,TX,41 42\n2.5,RX,00 FF");
}

#[test]
fn test_export_failures() {
    assert!(matches!(
        export(&[], ExportFormat::PlainText, DataMode::Ascii),
        Err(Error::Export(ExportError::NoData))
    ));
    assert!(matches!(
        export(&five_chunks(), ExportFormat::Xml, DataMode::Ascii),
        Err(Error::Export(ExportError::InvalidFormat { .. }))
    ));
}

#[test]
fn test_table_without_echo_keeps_received_rows_in_order() {
    let chunks = five_chunks();
    let view = ViewConfig::default().with_echo(false);
    let formatter = |ts: f64| format!("t{ts}");

    let rows = render_table(&chunks, &view, &formatter);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].timestamp_label, "t1.1");
    assert_eq!(rows[0].data.plain_text(), "OK\r\n");
    assert_eq!(rows[1].timestamp_label, "t3.4");
    assert!(rows.iter().all(|row| row.direction == Direction::Received));
}

#[test]
fn test_capacity_keeps_newest() {
    let capacity = 4;
    let mut store =
        ChunkStore::new(StoreConfig::default().with_max_chunks(capacity)).expect("store");

    for i in 0..=capacity {
        let ts = f64::from(u32::try_from(i).expect("small index"));
        store.append(Direction::Received, &[u8::try_from(i).expect("small index")], ts);
    }

    let kept = store.snapshot(ChunkFilter::All);
    assert_eq!(kept.len(), capacity);
    let payloads: Vec<u8> = kept.iter().map(|c| c.payload()[0]).collect();
    assert_eq!(payloads, vec![1, 2, 3, 4]);
    assert_eq!(store.counters().received, capacity);
    assert_eq!(store.counters().sent, 0);
}

#[test]
fn test_buffering_disabled_drops_transfers() {
    let (mut coordinator, sink) = session(ViewConfig::default());
    coordinator.set_buffering_enabled(false);
    assert!(
        coordinator
            .on_bytes_transferred(Direction::Received, b"lost", 1.0)
            .is_none()
    );
    assert!(coordinator.store().is_empty());
    assert!(sink.screen.lock().expect("lock").is_empty());
}

/// Property-based tests.
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use uart_log::codec::{decode_hex, to_text};

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Sent), Just(Direction::Received)]
    }

    fn transfers() -> impl Strategy<Value = Vec<(Direction, Vec<u8>)>> {
        prop::collection::vec(
            (direction(), prop::collection::vec(any::<u8>(), 0..16)),
            0..24,
        )
    }

    fn build(transfers: &[(Direction, Vec<u8>)]) -> Vec<UartDataChunk> {
        transfers
            .iter()
            .enumerate()
            .map(|(i, (direction, payload))| {
                let ts = f64::from(u32::try_from(i).unwrap_or(0));
                UartDataChunk::new(ts, *direction, payload.clone())
            })
            .collect()
    }

    proptest! {
        #[test]
        fn hex_round_trips(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let text = to_text(&bytes, DataMode::Hex);
            prop_assert_eq!(decode_hex(&text).expect("decode"), bytes);
        }

        #[test]
        fn counters_match_retained_payloads(
            transfers in transfers(),
            window in prop::option::of(0.0f64..2.0),
            max_chunks in prop::option::of(1usize..8),
            max_bytes in prop::option::of(16usize..64),
        ) {
            let config = StoreConfig {
                coalesce_window: window,
                max_chunks,
                max_bytes,
            };
            let mut store = ChunkStore::new(config).expect("store");
            for (i, (direction, payload)) in transfers.iter().enumerate() {
                let ts = f64::from(u32::try_from(i).unwrap_or(0)) * 0.5;
                store.append(*direction, payload, ts);
            }

            let snapshot = store.snapshot(ChunkFilter::All);
            let total: usize = snapshot.iter().map(UartDataChunk::len).sum();
            prop_assert_eq!(store.counters().total(), total);
            if let Some(max) = max_chunks {
                prop_assert!(snapshot.len() <= max);
            }
            if let Some(max) = max_bytes
                && transfers.iter().all(|(_, payload)| payload.len() <= max)
            {
                prop_assert!(total <= max);
            }
        }

        #[test]
        fn clear_always_empties(transfers in transfers()) {
            let mut store = ChunkStore::default();
            for (i, (direction, payload)) in transfers.iter().enumerate() {
                store.append(*direction, payload, f64::from(u32::try_from(i).unwrap_or(0)));
            }
            store.clear();
            prop_assert!(store.snapshot(ChunkFilter::All).is_empty());
            prop_assert_eq!(store.counters(), ByteCounters::default());
        }

        #[test]
        fn incremental_rendering_matches_full(
            transfers in transfers(),
            hex in any::<bool>(),
            show_echo in any::<bool>(),
        ) {
            let chunks = build(&transfers);
            let mode = if hex { DataMode::Hex } else { DataMode::Ascii };
            let view = ViewConfig::default().with_data_mode(mode).with_echo(show_echo);

            let incremental = chunks
                .iter()
                .fold(StyledText::new(), |text, chunk| render_incremental(text, chunk, &view));
            prop_assert_eq!(incremental, render_full(&chunks, &view));
        }
    }
}

/// Tests that drive `execute` with a constructed `Cli`.
mod cli_tests {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use uart_log::cli::commands::execute;
    use uart_log::cli::parser::{Cli, Commands, ReplayArgs};

    const CAPTURE: &str = r#"[
  {"timestamp": 1.0, "direction": "TX", "data": "41 54 0D 0A"},
  {"timestamp": 1.1, "direction": "RX", "data": "4F 4B 0D 0A"},
  {"timestamp": 2.0, "direction": "TX", "data": "41 54 2B 52 53 54 0D 0A"}
]"#;

    fn write_capture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("capture.json");
        std::fs::write(&path, CAPTURE).expect("write capture");
        path
    }

    fn make_cli(format: &str, command: Commands) -> Cli {
        Cli {
            verbose: false,
            format: format.to_string(),
            command,
        }
    }

    fn replay(capture: &Path) -> ReplayArgs {
        ReplayArgs {
            capture: capture.to_path_buf(),
            ..ReplayArgs::default()
        }
    }

    #[test]
    fn test_cmd_render_table_json() {
        let temp_dir = TempDir::new().expect("temp dir");
        let capture = write_capture(&temp_dir);
        let mut args = replay(&capture);
        args.no_echo = true;

        let cli = make_cli(
            "json",
            Commands::Render {
                replay: args,
                table: true,
                utc: true,
            },
        );
        let output = execute(&cli).expect("render");
        let rows: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(rows.as_array().map(Vec::len), Some(1));
        assert_eq!(rows[0]["direction"], "RX");
        assert_eq!(rows[0]["time"], "00:00:01");
    }

    #[test]
    fn test_cmd_export_json_to_stdout() {
        let temp_dir = TempDir::new().expect("temp dir");
        let capture = write_capture(&temp_dir);
        let mut args = replay(&capture);
        args.hex = true;

        let cli = make_cli(
            "text",
            Commands::Export {
                replay: args,
                to: "json".to_string(),
                output: None,
            },
        );
        let output = execute(&cli).expect("export");
        let chunks = uart_log::io::parse_capture(&output).expect("exported json reads back");
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_cmd_stats_with_capacity() {
        let temp_dir = TempDir::new().expect("temp dir");
        let capture = write_capture(&temp_dir);
        let mut args = replay(&capture);
        args.max_chunks = Some(2);

        let cli = make_cli("json", Commands::Stats { replay: args });
        let output = execute(&cli).expect("stats");
        let stats: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(stats["chunks"], 2);
        assert_eq!(stats["sent_bytes"], 8);
        assert_eq!(stats["received_bytes"], 4);
    }

    #[test]
    fn test_cmd_missing_capture() {
        let cli = make_cli(
            "text",
            Commands::Stats {
                replay: replay(Path::new("/nonexistent/capture.json")),
            },
        );
        assert!(execute(&cli).is_err());
    }

    #[test]
    fn test_cmd_formats() {
        let cli = make_cli("json", Commands::Formats);
        let output = execute(&cli).expect("formats");
        let names: Vec<String> = serde_json::from_str(&output).expect("json");
        assert_eq!(names, vec!["txt", "csv", "json"]);
    }
}

/// Tests that run the built binary.
mod binary_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn uart_log() -> Command {
        let mut cmd = Command::cargo_bin("uart-log").expect("binary");
        cmd.env_remove("UART_LOG_HEX")
            .env_remove("UART_LOG_NO_ECHO")
            .env_remove("UART_LOG_COALESCE_MS")
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn test_encode_hex() {
        uart_log()
            .args(["encode", "AT", "--hex", "--eol"])
            .assert()
            .success()
            .stdout("41 54 0A\n");
    }

    #[test]
    fn test_decode_invalid_hex_fails() {
        uart_log()
            .args(["decode", "4G"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn test_render_hex_from_env() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("capture.ndjson");
        std::fs::write(
            &path,
            "{\"timestamp\":1.0,\"direction\":\"RX\",\"data\":\"4F 4B\"}\n",
        )
        .expect("write capture");

        uart_log()
            .env("UART_LOG_HEX", "true")
            .arg("render")
            .arg(&path)
            .assert()
            .success()
            .stdout(predicate::str::starts_with("4F 4B\n"))
            .stdout(predicate::str::contains("Received: 2 bytes"));
    }

    #[test]
    fn test_export_xml_reports_error_as_json() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("capture.ndjson");
        std::fs::write(
            &path,
            "{\"timestamp\":1.0,\"direction\":\"TX\",\"data\":\"41\"}\n",
        )
        .expect("write capture");

        uart_log()
            .args(["--format", "json", "export"])
            .arg(&path)
            .args(["--to", "xml"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("not implemented"));
    }
}
