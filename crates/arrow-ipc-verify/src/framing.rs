//! Encapsulated IPC messages and streams.
//!
//! An encapsulated message is laid out as
//!
//! ```text
//! <continuation: 0xFFFFFFFF> <metadata length: i32 LE> <Message flatbuffer> <body>
//! ```
//!
//! Writers older than Arrow 0.15 omit the continuation marker. A metadata
//! length of zero marks the end of a stream.

use arrow_ipc::MessageHeader;
use arrow_ipc_verify_buffers::Reader;
use tracing::debug;

use crate::{FramingError, VerificationLimits, Verifier, VerifyError};

pub const CONTINUATION_MARKER: u32 = 0xFFFF_FFFF;

/// One frame read from the front of a buffer.
#[derive(Debug, Clone, Copy)]
pub enum MessageFrame<'a> {
    EndOfStream { consumed: usize },
    Message(EncapsulatedMessage<'a>),
}

impl MessageFrame<'_> {
    /// Number of bytes the frame occupies.
    pub fn consumed(&self) -> usize {
        match self {
            MessageFrame::EndOfStream { consumed } => *consumed,
            MessageFrame::Message(message) => message.consumed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EncapsulatedMessage<'a> {
    pub header_type: MessageHeader,
    /// The verified `Message` flatbuffer, including any trailing padding.
    pub metadata: &'a [u8],
    pub body: &'a [u8],
    pub consumed: usize,
    /// `true` when the frame had no continuation marker.
    pub legacy: bool,
}

/// Counts gathered while walking a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub messages: usize,
    pub record_batches: usize,
    pub dictionary_batches: usize,
    pub end_of_stream: bool,
    pub consumed: usize,
}

/// Reads and verifies the frame at the start of `bytes`.
///
/// Bytes after the frame are ignored; use [`MessageFrame::consumed`] to
/// advance to the next one.
pub fn verify_encapsulated_message<'a>(
    bytes: &'a [u8],
    limits: &VerificationLimits,
) -> Result<MessageFrame<'a>, VerifyError> {
    let verifier = Verifier::new(*limits)?;
    read_frame(&verifier, bytes)
}

pub(crate) fn read_frame<'a>(
    verifier: &Verifier,
    bytes: &'a [u8],
) -> Result<MessageFrame<'a>, VerifyError> {
    let mut reader = Reader::new(bytes);
    let legacy = reader.peek_u32_le()? != CONTINUATION_MARKER;
    if !legacy {
        reader.skip(4)?;
    }

    let meta_len = reader.i32_le()?;
    if meta_len == 0 {
        return Ok(MessageFrame::EndOfStream {
            consumed: reader.position(),
        });
    }
    if meta_len < 0 {
        return Err(FramingError::NegativeMetadataLength(meta_len).into());
    }

    let metadata = reader.buf(meta_len as usize)?;
    let message = verifier.message(metadata)?;

    let body_len = message.bodyLength();
    if body_len < 0 {
        return Err(FramingError::NegativeBodyLength(body_len).into());
    }
    let available = reader.remaining();
    let body = usize::try_from(body_len)
        .ok()
        .filter(|len| *len <= available)
        .ok_or(FramingError::BodyOutOfBounds {
            wanted: body_len,
            available,
        })?;
    let body = reader.buf(body)?;

    Ok(MessageFrame::Message(EncapsulatedMessage {
        header_type: message.header_type(),
        metadata,
        body,
        consumed: reader.position(),
        legacy,
    }))
}

/// Verifies every frame of an IPC stream.
///
/// The first message must carry a `Schema`. Walking stops at the
/// end-of-stream marker or when the input is exhausted; bytes after the
/// marker are not inspected.
pub fn verify_stream(
    bytes: &[u8],
    limits: &VerificationLimits,
) -> Result<StreamSummary, VerifyError> {
    let verifier = Verifier::new(*limits)?;
    let mut summary = StreamSummary::default();

    while summary.consumed < bytes.len() {
        let frame = read_frame(&verifier, &bytes[summary.consumed..])?;
        summary.consumed += frame.consumed();
        match frame {
            MessageFrame::EndOfStream { .. } => {
                summary.end_of_stream = true;
                break;
            }
            MessageFrame::Message(message) => {
                if summary.messages == 0 && message.header_type != MessageHeader::Schema {
                    return Err(FramingError::StreamMustStartWithSchema(format!(
                        "{:?}",
                        message.header_type
                    ))
                    .into());
                }
                match message.header_type {
                    MessageHeader::RecordBatch => summary.record_batches += 1,
                    MessageHeader::DictionaryBatch => summary.dictionary_batches += 1,
                    _ => {}
                }
                summary.messages += 1;
            }
        }
    }

    debug!(
        messages = summary.messages,
        end_of_stream = summary.end_of_stream,
        "verified IPC stream"
    );
    Ok(summary)
}
