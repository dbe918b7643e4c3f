//! Streaming JSON frame decoder for the executor byte channel.
//!
//! Commands arrive as bare JSON objects with no length prefix or
//! delimiter, possibly split across arbitrary read boundaries and
//! interleaved with line noise. The decoder tracks brace depth to find
//! object ends, and is string-literal and escape aware so braces inside
//! string values do not terminate a frame.
//!
//! Bytes outside an object are discarded. A frame that outgrows the
//! fixed buffer is dropped with an error and the decoder resets.

use heapless::Vec;

use crate::error::FrameError;

/// Maximum frame size (protects against memory exhaustion).
const MAX_FRAME_SIZE: usize = 512;

/// Streaming frame decoder.
pub struct CommandDecoder {
    buf: Vec<u8, MAX_FRAME_SIZE>,
    depth: u16,
    in_string: bool,
    escaped: bool,
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }

    /// Feed one byte into the decoder.
    ///
    /// Returns `Ok(Some(frame))` when the byte completes a top-level JSON
    /// object. The returned slice is valid until the next call to `push`.
    pub fn push(&mut self, byte: u8) -> Result<Option<&[u8]>, FrameError> {
        if self.depth == 0 {
            // Between frames: wait for an object to open, drop noise.
            if byte == b'{' {
                self.buf.clear();
                // push to an empty buffer cannot fail, MAX_FRAME_SIZE > 0
                let _ = self.buf.push(byte);
                self.depth = 1;
                self.in_string = false;
                self.escaped = false;
            }
            return Ok(None);
        }

        if self.buf.push(byte).is_err() {
            self.reset();
            return Err(FrameError::Overflow);
        }

        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return Ok(None);
        }

        match byte {
            b'"' => self.in_string = true,
            b'{' => self.depth += 1,
            b'}' => {
                self.depth -= 1;
                if self.depth == 0 {
                    return Ok(Some(&self.buf));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    /// Discard any partial frame (e.g. after a link reset).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.depth = 0;
        self.in_string = false;
        self.escaped = false;
    }
}

impl Default for CommandDecoder {
    fn default() -> Self {
        Self::new()
    }
}
