//! Bounds-checked binary reader for Arrow IPC framing.
//!
//! The FlatBuffers payloads inside an Arrow IPC stream or file are wrapped in
//! a thin layer of little-endian framing: continuation markers, length
//! prefixes and the `ARROW1` file magic. This crate walks that layer without
//! ever indexing out of bounds; every read returns a [`Result`].
//!
//! # Overview
//!
//! - [`Reader`] - Reads little-endian integers and byte runs with cursor tracking
//! - [`BufferError`] - Reports a short read together with where it happened
//!
//! # Example
//!
//! ```
//! use arrow_ipc_verify_buffers::{BufferError, Reader};
//!
//! let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x08, 0x00, 0x00, 0x00];
//! let mut reader = Reader::new(&data);
//!
//! assert_eq!(reader.u32_le(), Ok(0xFFFF_FFFF));
//! assert_eq!(reader.i32_le(), Ok(8));
//! assert!(matches!(reader.u8(), Err(BufferError::EndOfBuffer { .. })));
//! ```

mod reader;

pub use reader::Reader;

/// Error type for buffer reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// Attempted to read past the end of the readable window.
    #[error("end of buffer: wanted {wanted} bytes at offset {offset}, {available} available")]
    EndOfBuffer {
        offset: usize,
        wanted: usize,
        available: usize,
    },
    /// A window was requested outside of the underlying slice.
    #[error("invalid window {start}..{end} over {len} bytes")]
    InvalidWindow { start: usize, end: usize, len: usize },
}
