//! Error types for root verification and IPC framing.

use arrow_ipc_verify_buffers::BufferError;
use flatbuffers::InvalidFlatbuffer;
use thiserror::Error;

use crate::RootKind;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid {kind} buffer: {source}")]
    Structure {
        kind: RootKind,
        #[source]
        source: InvalidFlatbuffer,
    },
    #[error("invalid IPC framing: {0}")]
    Framing(#[from] FramingError),
    #[error("truncated IPC framing: {0}")]
    Buffer(#[from] BufferError),
    #[error("invalid verification limits: {0}")]
    InvalidLimits(String),
}

/// Problems in the framing that surrounds the FlatBuffers payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("negative metadata length {0}")]
    NegativeMetadataLength(i32),
    #[error("negative body length {0}")]
    NegativeBodyLength(i64),
    #[error("body length {wanted} exceeds the {available} bytes after the metadata")]
    BodyOutOfBounds { wanted: i64, available: usize },
    #[error("stream must start with a Schema message, found {0}")]
    StreamMustStartWithSchema(String),
    #[error("missing ARROW1 magic at the {0} of the file")]
    BadMagic(&'static str),
    #[error("footer length {0} does not fit in the file")]
    InvalidFooterLength(i32),
    #[error("block {index} ({offset}+{meta_len}+{body_len}) lies outside the file body")]
    BlockOutOfBounds {
        index: usize,
        offset: i64,
        meta_len: i32,
        body_len: i64,
    },
    #[error("block at offset {offset} overlaps the block ending at {previous_end}")]
    OverlappingBlocks { offset: i64, previous_end: usize },
    #[error("block {index} should hold a {expected} message, found {found}")]
    UnexpectedBlockMessage {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("block {index} declares {field} {declared}, its message frame has {actual}")]
    BlockLengthMismatch {
        index: usize,
        field: &'static str,
        declared: i64,
        actual: i64,
    },
}

impl VerifyError {
    pub(crate) fn structure(kind: RootKind, source: InvalidFlatbuffer) -> Self {
        VerifyError::Structure { kind, source }
    }
}
