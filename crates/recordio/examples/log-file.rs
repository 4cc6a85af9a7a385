//! Append JSON events to a record file, then read them back.
//!
//! Run with:
//!   cargo run --example log-file
//!
//! Record-level trace events go to stderr.

use std::fs;

use recordio::frame::{RecordReader, RecordWriter};
use recordio::message::{ReadMessageExt, WriteMessageExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Event {
    seq: u32,
    kind: String,
    detail: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_target(false)
        .init();

    let dir = std::env::temp_dir().join(format!("recordio-log-{}", std::process::id()));
    fs::create_dir_all(&dir)?;
    let path = dir.join("events.rio");

    let mut writer = RecordWriter::create(&path)?;
    for seq in 0..6 {
        // Long details compress well; short ones are stored as-is.
        let detail = if seq % 2 == 0 {
            "retry ".repeat(40)
        } else {
            "ok".to_string()
        };
        writer.set_compress(seq % 2 == 0);
        let event = Event {
            seq,
            kind: if seq % 2 == 0 { "retry" } else { "ok" }.to_string(),
            detail,
        };
        let header = writer.write_json(&event)?;
        eprintln!(
            "wrote event {seq}: {} bytes, {} on disk",
            header.uncompressed_size,
            header.on_disk_size()
        );
    }
    writer.finish()?;

    let mut reader = RecordReader::open(&path)?;
    loop {
        match reader.read_json::<Event>() {
            Ok(event) => println!("{} {} ({} bytes)", event.seq, event.kind, event.detail.len()),
            Err(err) if err.is_end_of_stream() => break,
            Err(err) => return Err(err.into()),
        }
    }

    let _ = fs::remove_dir_all(&dir);
    Ok(())
}
