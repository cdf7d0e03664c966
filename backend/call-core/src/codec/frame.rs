//! Newline framing over the backend's stdout.
//!
//! The transport delivers whatever the pipe hands it: half a payload, or
//! three payloads and a log line at once. [`FrameDecoder`] keeps the
//! unterminated tail between chunks and yields one frame per complete
//! line, so payload boundaries never depend on how the pipe was flushed.

use log::{trace, warn};

pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

const FRAME_DELIMITER: u8 = b'\n';

/// Accumulates raw stdout bytes until a frame boundary is seen.
#[derive(Debug)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    max_frame_bytes: usize,
    discarding: bool,
}

impl FrameDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_frame_bytes,
            discarding: false,
        }
    }

    /// Append a chunk and return every frame it completes, in order.
    ///
    /// Blank lines are skipped. A line longer than `max_frame_bytes` is
    /// dropped whole; decoding resumes after its terminating newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut frames = Vec::new();
        let mut rest = chunk;

        while let Some(position) = rest.iter().position(|byte| *byte == FRAME_DELIMITER) {
            let (line, tail) = rest.split_at(position);
            rest = &tail[1..];

            if self.discarding {
                trace!("Resynchronised after oversized frame");
                self.discarding = false;
                continue;
            }

            if self.pending.len() + line.len() > self.max_frame_bytes {
                warn!(
                    "Dropping frame of {} bytes (limit {})",
                    self.pending.len() + line.len(),
                    self.max_frame_bytes
                );
                self.pending.clear();
                continue;
            }

            self.pending.extend_from_slice(line);
            if let Some(frame) = self.take_frame() {
                frames.push(frame);
            }
        }

        if !self.discarding && !rest.is_empty() {
            self.pending.extend_from_slice(rest);

            if self.pending.len() > self.max_frame_bytes {
                warn!(
                    "Pending frame exceeded {} bytes, discarding until next newline",
                    self.max_frame_bytes
                );
                self.pending.clear();
                self.discarding = true;
            }
        }

        frames
    }

    /// Flush the unterminated tail, used once the backend has exited.
    pub fn finish(&mut self) -> Option<String> {
        if self.discarding {
            self.discarding = false;
            self.pending.clear();
            return None;
        }

        self.take_frame()
    }

    /// Bytes buffered while waiting for a frame boundary.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn take_frame(&mut self) -> Option<String> {
        let bytes = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&bytes);
        let line = text.trim_end_matches('\r');

        if line.trim().is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_BYTES)
    }
}
