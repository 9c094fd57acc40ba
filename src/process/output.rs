//! Child output capture

use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Maximum bytes kept per stream (10MB)
pub const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

const TRUNCATION_NOTICE: &[u8] = b"\n[output truncated at 10MB]";

/// Drain `stream` on a background thread.
///
/// The receiver yields the captured text once the stream hits EOF, which for
/// a child pipe means the child (and everything sharing the pipe) has exited.
pub(crate) fn spawn_reader<R: Read + Send + 'static>(stream: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();

    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }

    rx
}

/// Read a stream to string, keeping at most [`MAX_OUTPUT_SIZE`] bytes.
///
/// Anything past the limit is read and discarded so the writer never blocks
/// on a full pipe.
pub(crate) fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    truncated = true;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    if truncated {
        buf.extend_from_slice(TRUNCATION_NOTICE);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Last `max_lines` lines of `text`, for error messages
pub(crate) fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
