//! stdio transport for MCP server.
//!
//! This module implements the stdio transport as specified by MCP:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: may be used for logging (not MCP messages)
//!
//! The transport is generic over its reader and writer so tests can drive
//! it with in-memory buffers; [`StdioTransport`] is the process binding.

use serde_json::Value;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin,
    Stdout,
};
use tracing::trace;

use crate::error::TransportError;
use crate::mcp::protocol::Outgoing;

/// Default largest inbound frame, in bytes.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Newline-delimited JSON transport over a byte stream pair.
pub struct Transport<R, W> {
    /// Buffered inbound stream.
    reader: R,
    /// Outbound stream.
    writer: W,
    /// Largest accepted frame, excluding the newline.
    max_message_bytes: usize,
}

/// The transport bound to process standard input and output.
pub type StdioTransport = Transport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    /// Creates a transport over stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport with the given reader and writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Sets the largest accepted inbound frame.
    #[must_use]
    pub const fn with_max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }

    /// Consumes the transport, returning the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Reads the next raw frame, without its line terminator.
    ///
    /// Returns `None` if the stream is closed (EOF) between frames.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Truncated`] if the stream ends inside a
    /// frame, [`TransportError::FrameTooLarge`] if a frame exceeds the
    /// limit, or [`TransportError::Read`] on I/O failure.
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut frame = Vec::new();
        // One extra byte for the newline itself
        let budget = self.max_message_bytes.saturating_add(1) as u64;

        let bytes_read = (&mut self.reader)
            .take(budget)
            .read_until(b'\n', &mut frame)
            .await
            .map_err(TransportError::Read)?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if frame.last() == Some(&b'\n') {
            frame.pop();
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
        } else if bytes_read as u64 >= budget {
            return Err(TransportError::FrameTooLarge {
                bytes: bytes_read,
                limit: self.max_message_bytes,
            });
        } else if frame.iter().all(u8::is_ascii_whitespace) {
            // Trailing whitespace before EOF is not a message
            return Ok(None);
        } else {
            return Err(TransportError::Truncated { bytes: bytes_read });
        }

        trace!(len = frame.len(), "read frame");
        Ok(Some(frame))
    }

    /// Reads and decodes the next message, skipping blank lines.
    ///
    /// Returns `None` on EOF.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Decode`] if a frame is not valid JSON, or
    /// any error from [`Self::read_frame`].
    pub async fn receive(&mut self) -> Result<Option<Value>, TransportError> {
        loop {
            let Some(frame) = self.read_frame().await? else {
                return Ok(None);
            };

            if frame.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return serde_json::from_slice(&frame)
                .map(Some)
                .map_err(TransportError::Decode);
        }
    }

    /// Writes one outgoing message followed by a newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn send(&mut self, message: &Outgoing) -> Result<(), TransportError> {
        let json = serde_json::to_string(message).map_err(TransportError::Encode)?;
        self.write_raw(&json).await
    }

    /// Writes a raw JSON string with newline termination.
    async fn write_raw(&mut self, json: &str) -> Result<(), TransportError> {
        // Messages must not contain embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        trace!(len = json.len(), "writing message");

        self.writer
            .write_all(json.as_bytes())
            .await
            .map_err(TransportError::Write)?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(TransportError::Write)?;
        self.writer.flush().await.map_err(TransportError::Write)?;

        Ok(())
    }
}
