//! Stream records from one thread to another over a Unix socket pair.
//!
//! Run with:
//!   cargo run --example socket-pair

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;

    use recordio::frame::{RecordReader, RecordWriter};

    let (left, right) = UnixStream::pair()?;

    let producer = std::thread::spawn(move || -> recordio::frame::Result<()> {
        let mut writer = RecordWriter::new(left).with_compression(true);
        for i in 1..=4 {
            writer.write_record(format!("RECORD {i}").as_bytes())?;
        }
        // Dropping the writer closes the socket, which ends the stream.
        Ok(())
    });

    for record in RecordReader::new(right) {
        let record = record?;
        println!("{}", String::from_utf8_lossy(&record));
    }

    producer.join().map_err(|_| "producer panicked")??;
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("socket-pair example requires a Unix platform");
}
