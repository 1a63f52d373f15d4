//! Newline-delimited JSON codec for the stdio transport.
//!
//! Each message is a single JSON value on its own line. A line that is not
//! valid JSON is reported as a [`Frame::Malformed`] item rather than an error,
//! so one bad message does not end the session.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

/// Default maximum frame size (16 MB).
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// One decoded line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<T> {
    Message(T),
    /// The line could not be deserialized; carries the parser's message.
    Malformed(String),
}

#[derive(Debug)]
pub struct NdJsonCodec<T> {
    _phantom: PhantomData<T>,
    max_length: usize,
    /// Bytes already searched for a newline in the pending frame
    next_index: usize,
}

impl<T> NdJsonCodec<T> {
    /// Create a new newline-delimited codec with default max length.
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LENGTH)
    }

    /// Create a new codec with custom max length.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            _phantom: PhantomData,
            max_length,
            next_index: 0,
        }
    }

    /// Get the max message length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl<T> Default for NdJsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NdJsonCodec<T> {
    fn clone(&self) -> Self {
        Self::with_max_length(self.max_length)
    }
}

fn too_large(length: usize, max: usize) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("Message too large: {} > {}", length, max),
    )
}

impl<T: DeserializeOwned> Decoder for NdJsonCodec<T> {
    type Item = Frame<T>;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        loop {
            let start = self.next_index.min(src.len());
            let Some(offset) = src[start..].iter().position(|&b| b == b'\n') else {
                self.next_index = src.len();
                // Check if buffer is getting too large
                if src.len() > self.max_length {
                    return Err(too_large(src.len(), self.max_length));
                }
                return Ok(None);
            };
            let pos = start + offset;
            self.next_index = 0;

            if pos > self.max_length {
                return Err(too_large(pos, self.max_length));
            }

            // Take the line, then skip the newline
            let line = src.split_to(pos);
            src.advance(1);

            let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return Ok(Some(match serde_json::from_slice(line) {
                Ok(item) => Frame::Message(item),
                Err(e) => Frame::Malformed(e.to_string()),
            }));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        // A final message without a trailing newline
        if src.iter().all(u8::is_ascii_whitespace) {
            src.clear();
            self.next_index = 0;
            return Ok(None);
        }
        src.put_u8(b'\n');
        self.decode(src)
    }
}

impl<T: Serialize> Encoder<T> for NdJsonCodec<T> {
    type Error = std::io::Error;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> std::result::Result<(), Self::Error> {
        // Serialize to JSON (compact, no newlines)
        let json = serde_json::to_vec(&item)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("JSON error: {}", e)))?;

        if json.len() > self.max_length {
            return Err(too_large(json.len(), self.max_length));
        }

        // Write data and newline
        dst.reserve(json.len() + 1);
        dst.put_slice(&json);
        dst.put_u8(b'\n');

        Ok(())
    }
}
