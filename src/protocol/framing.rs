//! Cuts a byte stream into JSON objects by counting braces.
//!
//! The controller does not delimit its frames, so a frame ends where the
//! outermost `{` is balanced. Braces inside JSON strings are not counted.

use log::trace;

#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Remove and return the next complete frame, if one has arrived.
    ///
    /// Anything before the frame's opening brace is discarded.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let Some(start) = self.buf.iter().position(|&b| b == b'{') else {
            if !self.buf.is_empty() {
                trace!("Discarding {} bytes outside any frame", self.buf.len());
            }
            self.buf.clear();
            return None;
        };
        if start > 0 {
            trace!("Discarding {} bytes before frame", start);
            self.buf.drain(..start);
        }

        let end = frame_end(&self.buf)?;
        Some(self.buf.drain(..=end).collect())
    }
}

/// Index of the brace closing the object that opens at `buf[0]`.
fn frame_end(buf: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &byte) in buf.iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
