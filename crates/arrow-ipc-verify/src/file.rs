//! Arrow IPC file layout.
//!
//! ```text
//! ARROW1 <pad to 8> <stream messages> <Footer flatbuffer> <footer length: i32 LE> ARROW1
//! ```

use arrow_ipc::{Block, MessageHeader};
use arrow_ipc_verify_buffers::Reader;
use tracing::debug;

use crate::framing::{read_frame, MessageFrame};
use crate::{FramingError, VerificationLimits, Verifier, VerifyError};

pub const MAGIC: &[u8; 6] = b"ARROW1";

/// Magic plus padding at the start of the file.
pub const HEADER_LEN: usize = 8;

/// Footer length plus magic at the end of the file.
pub const TRAILER_LEN: usize = 4 + MAGIC.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLayout<'a> {
    /// The verified `Footer` flatbuffer.
    pub footer: &'a [u8],
    /// Offset of the footer from the start of the file.
    pub footer_offset: usize,
    pub record_batches: usize,
    pub dictionaries: usize,
}

/// Verifies the framing and footer of a complete Arrow IPC file.
///
/// Every record batch and dictionary block named by the footer must lie
/// between the header and the footer without overlapping another block,
/// and must hold an encapsulated message of the matching type whose
/// metadata and body lengths agree with the block.
pub fn verify_file<'a>(
    bytes: &'a [u8],
    limits: &VerificationLimits,
) -> Result<FileLayout<'a>, VerifyError> {
    let verifier = Verifier::new(*limits)?;

    let mut header = Reader::new(bytes);
    if header.buf(MAGIC.len())? != MAGIC {
        return Err(FramingError::BadMagic("start").into());
    }
    header.skip(HEADER_LEN - MAGIC.len())?;

    let trailer_start = header
        .size()
        .checked_sub(TRAILER_LEN)
        .filter(|start| *start >= HEADER_LEN)
        .ok_or(FramingError::BadMagic("end"))?;
    let mut trailer = Reader::from_slice(bytes, trailer_start, bytes.len())?;
    let footer_len = trailer.i32_le()?;
    if trailer.buf(MAGIC.len())? != MAGIC {
        return Err(FramingError::BadMagic("end").into());
    }

    let footer_offset = usize::try_from(footer_len)
        .ok()
        .filter(|len| *len > 0)
        .and_then(|len| trailer_start.checked_sub(len))
        .filter(|offset| *offset >= HEADER_LEN)
        .ok_or(FramingError::InvalidFooterLength(footer_len))?;
    let footer_bytes = &bytes[footer_offset..trailer_start];
    let footer = verifier.footer(footer_bytes)?;

    let body = &bytes[..footer_offset];
    let record_batches = footer.recordBatches();
    let dictionaries = footer.dictionaries();

    let mut ranges = Vec::new();
    for (expected, blocks) in [
        (MessageHeader::DictionaryBatch, dictionaries),
        (MessageHeader::RecordBatch, record_batches),
    ] {
        for (index, block) in blocks.iter().flat_map(|v| v.iter()).enumerate() {
            ranges.push(BlockRange::new(index, expected, block, body.len())?);
        }
    }

    // Disjoint ranges keep the total verified bytes within the file body.
    ranges.sort_unstable_by_key(|range| range.start);
    for pair in ranges.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(FramingError::OverlappingBlocks {
                offset: pair[1].block.offset(),
                previous_end: pair[0].end,
            }
            .into());
        }
    }
    for range in &ranges {
        range.verify(&verifier, body)?;
    }

    let layout = FileLayout {
        footer: footer_bytes,
        footer_offset,
        record_batches: record_batches.map(|v| v.len()).unwrap_or(0),
        dictionaries: dictionaries.map(|v| v.len()).unwrap_or(0),
    };
    debug!(
        footer_offset,
        record_batches = layout.record_batches,
        dictionaries = layout.dictionaries,
        max_depth = verifier.limits().max_depth,
        "verified IPC file"
    );
    Ok(layout)
}

/// A footer block resolved to a byte range of the file body.
struct BlockRange<'b> {
    index: usize,
    expected: MessageHeader,
    block: &'b Block,
    start: usize,
    meta_len: usize,
    end: usize,
}

impl<'b> BlockRange<'b> {
    fn new(
        index: usize,
        expected: MessageHeader,
        block: &'b Block,
        body_len: usize,
    ) -> Result<Self, FramingError> {
        let out_of_bounds = || FramingError::BlockOutOfBounds {
            index,
            offset: block.offset(),
            meta_len: block.metaDataLength(),
            body_len: block.bodyLength(),
        };

        let start = usize::try_from(block.offset()).map_err(|_| out_of_bounds())?;
        let meta_len = usize::try_from(block.metaDataLength()).map_err(|_| out_of_bounds())?;
        let block_body = usize::try_from(block.bodyLength()).map_err(|_| out_of_bounds())?;
        let end = start
            .checked_add(meta_len)
            .and_then(|end| end.checked_add(block_body))
            .ok_or_else(out_of_bounds)?;
        if start < HEADER_LEN || end > body_len {
            return Err(out_of_bounds());
        }

        Ok(Self {
            index,
            expected,
            block,
            start,
            meta_len,
            end,
        })
    }

    fn verify(&self, verifier: &Verifier, body: &[u8]) -> Result<(), VerifyError> {
        let message = match read_frame(verifier, &body[self.start..self.end])? {
            MessageFrame::Message(message) => message,
            MessageFrame::EndOfStream { .. } => {
                return Err(FramingError::BlockOutOfBounds {
                    index: self.index,
                    offset: self.block.offset(),
                    meta_len: self.block.metaDataLength(),
                    body_len: self.block.bodyLength(),
                }
                .into())
            }
        };

        if message.header_type != self.expected {
            return Err(FramingError::UnexpectedBlockMessage {
                index: self.index,
                expected: format!("{:?}", self.expected),
                found: format!("{:?}", message.header_type),
            }
            .into());
        }

        let frame_meta = message.consumed - message.body.len();
        if frame_meta != self.meta_len {
            return Err(FramingError::BlockLengthMismatch {
                index: self.index,
                field: "metadata length",
                declared: self.block.metaDataLength().into(),
                actual: frame_meta as i64,
            }
            .into());
        }
        if message.body.len() as i64 != self.block.bodyLength() {
            return Err(FramingError::BlockLengthMismatch {
                index: self.index,
                field: "body length",
                declared: self.block.bodyLength(),
                actual: message.body.len() as i64,
            }
            .into());
        }
        Ok(())
    }
}
