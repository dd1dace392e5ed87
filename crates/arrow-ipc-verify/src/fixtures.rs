//! Builders for well-formed IPC buffers.
//!
//! Used by the test suites of this workspace, and handy for callers that
//! want known-good inputs when testing their own integration.
//!
//! Every schema built here creates its first field name before anything
//! else, which places that string at the very end of the finished buffer.
//! With a name whose length is `3 mod 4` (e.g. `"abc"`) no alignment
//! padding follows it, so the final byte is the string's null terminator
//! and every strict prefix of the buffer is structurally invalid.

use arrow_ipc::{
    Block, BoolBuilder, DictionaryBatchBuilder, FieldBuilder, FooterBuilder, MessageBuilder,
    MessageHeader, MetadataVersion, RecordBatchBuilder, SchemaBuilder, Type,
};
use flatbuffers::{FlatBufferBuilder, WIPOffset};

use crate::file::{HEADER_LEN, MAGIC};
use crate::framing::CONTINUATION_MARKER;

fn build_schema<'a>(
    fbb: &mut FlatBufferBuilder<'a>,
    names: &[&str],
) -> WIPOffset<arrow_ipc::Schema<'a>> {
    let names: Vec<_> = names.iter().map(|name| fbb.create_string(name)).collect();
    let mut fields = Vec::with_capacity(names.len());
    for name in names {
        let bool_type = BoolBuilder::new(fbb).finish();
        let mut field = FieldBuilder::new(fbb);
        field.add_name(name);
        field.add_nullable(true);
        field.add_type_type(Type::Bool);
        field.add_type_(bool_type.as_union_value());
        fields.push(field.finish());
    }
    let fields = fbb.create_vector(&fields);
    let mut schema = SchemaBuilder::new(fbb);
    schema.add_fields(fields);
    schema.finish()
}

/// A `Schema` root with one nullable boolean field per name.
pub fn schema(names: &[&str]) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::new();
    let root = build_schema(&mut fbb, names);
    fbb.finish(root, None);
    fbb.finished_data().to_vec()
}

/// A `Message` root whose header is a `Schema`.
pub fn schema_message(names: &[&str]) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::new();
    let schema = build_schema(&mut fbb, names);
    let mut message = MessageBuilder::new(&mut fbb);
    message.add_version(MetadataVersion::V5);
    message.add_header_type(MessageHeader::Schema);
    message.add_header(schema.as_union_value());
    let root = message.finish();
    fbb.finish(root, None);
    fbb.finished_data().to_vec()
}

/// A `Message` root whose header is a `RecordBatch` of `rows` rows.
pub fn record_batch_message(rows: i64, body_len: i64) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::new();
    let mut batch = RecordBatchBuilder::new(&mut fbb);
    batch.add_length(rows);
    let batch = batch.finish();
    let mut message = MessageBuilder::new(&mut fbb);
    message.add_version(MetadataVersion::V5);
    message.add_header_type(MessageHeader::RecordBatch);
    message.add_header(batch.as_union_value());
    message.add_bodyLength(body_len);
    let root = message.finish();
    fbb.finish(root, None);
    fbb.finished_data().to_vec()
}

/// A `Message` root whose header is a `DictionaryBatch` for dictionary `id`.
pub fn dictionary_batch_message(id: i64, rows: i64, body_len: i64) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::new();
    let mut batch = RecordBatchBuilder::new(&mut fbb);
    batch.add_length(rows);
    let batch = batch.finish();
    let mut dictionary = DictionaryBatchBuilder::new(&mut fbb);
    dictionary.add_id(id);
    dictionary.add_data(batch);
    let dictionary = dictionary.finish();
    let mut message = MessageBuilder::new(&mut fbb);
    message.add_version(MetadataVersion::V5);
    message.add_header_type(MessageHeader::DictionaryBatch);
    message.add_header(dictionary.as_union_value());
    message.add_bodyLength(body_len);
    let root = message.finish();
    fbb.finish(root, None);
    fbb.finished_data().to_vec()
}

/// A `Footer` root carrying a schema and the given record batch blocks.
pub fn footer(names: &[&str], record_batches: &[Block]) -> Vec<u8> {
    footer_with_dictionaries(names, &[], record_batches)
}

/// A `Footer` root carrying a schema, dictionary blocks and record batch
/// blocks.
pub fn footer_with_dictionaries(
    names: &[&str],
    dictionaries: &[Block],
    record_batches: &[Block],
) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::new();
    let schema = build_schema(&mut fbb, names);
    let dictionaries = fbb.create_vector(dictionaries);
    let blocks = fbb.create_vector(record_batches);
    let mut footer = FooterBuilder::new(&mut fbb);
    footer.add_version(MetadataVersion::V5);
    footer.add_schema(schema);
    footer.add_dictionaries(dictionaries);
    footer.add_recordBatches(blocks);
    let root = footer.finish();
    fbb.finish(root, None);
    fbb.finished_data().to_vec()
}

/// Wraps `metadata` in a continuation-marked frame, padded to 8 bytes,
/// followed by `body`.
pub fn encapsulate(metadata: &[u8], body: &[u8]) -> Vec<u8> {
    let padded = metadata.len().next_multiple_of(8);
    let mut out = Vec::with_capacity(8 + padded + body.len());
    out.extend_from_slice(&CONTINUATION_MARKER.to_le_bytes());
    out.extend_from_slice(&(padded as i32).to_le_bytes());
    out.extend_from_slice(metadata);
    out.resize(8 + padded, 0);
    out.extend_from_slice(body);
    out
}

/// Same as [`encapsulate`] without the continuation marker.
pub fn encapsulate_legacy(metadata: &[u8], body: &[u8]) -> Vec<u8> {
    encapsulate(metadata, body).split_off(4)
}

pub fn end_of_stream() -> Vec<u8> {
    let mut out = CONTINUATION_MARKER.to_le_bytes().to_vec();
    out.extend_from_slice(&0i32.to_le_bytes());
    out
}

/// Schema message, `batches` record batches with 8-byte bodies, end marker.
pub fn stream(names: &[&str], batches: usize) -> Vec<u8> {
    stream_with_dictionaries(names, 0, batches)
}

/// Like [`stream`], with `dictionaries` dictionary batches between the
/// schema and the record batches.
pub fn stream_with_dictionaries(names: &[&str], dictionaries: usize, batches: usize) -> Vec<u8> {
    let mut out = encapsulate(&schema_message(names), &[]);
    for (_, frame) in batch_frames(dictionaries, batches) {
        out.extend(frame);
    }
    out.extend(end_of_stream());
    out
}

/// A complete IPC file: header, schema message, `batches` record batches,
/// footer and trailer.
pub fn file(names: &[&str], batches: usize) -> Vec<u8> {
    file_with_dictionaries(names, 0, batches)
}

/// Like [`file`], with `dictionaries` dictionary batches listed in the
/// footer ahead of the record batches.
pub fn file_with_dictionaries(names: &[&str], dictionaries: usize, batches: usize) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.resize(HEADER_LEN, 0);
    out.extend(encapsulate(&schema_message(names), &[]));

    let mut dictionary_blocks = Vec::with_capacity(dictionaries);
    let mut batch_blocks = Vec::with_capacity(batches);
    for (header, frame) in batch_frames(dictionaries, batches) {
        let meta_len = frame.len() - BATCH_BODY.len();
        let block = Block::new(out.len() as i64, meta_len as i32, BATCH_BODY.len() as i64);
        match header {
            MessageHeader::DictionaryBatch => dictionary_blocks.push(block),
            _ => batch_blocks.push(block),
        }
        out.extend(frame);
    }

    let footer = footer_with_dictionaries(names, &dictionary_blocks, &batch_blocks);
    out.extend_from_slice(&footer);
    out.extend_from_slice(&(footer.len() as i32).to_le_bytes());
    out.extend_from_slice(MAGIC);
    out
}

const BATCH_BODY: [u8; 8] = [0; 8];

/// Encapsulated dictionary batches followed by record batches, each with an
/// 8-byte body.
fn batch_frames(dictionaries: usize, batches: usize) -> Vec<(MessageHeader, Vec<u8>)> {
    let body_len = BATCH_BODY.len() as i64;
    let dictionaries = (0..dictionaries).map(|i| {
        let metadata = dictionary_batch_message(i as i64, 1, body_len);
        (MessageHeader::DictionaryBatch, encapsulate(&metadata, &BATCH_BODY))
    });
    let batches = (0..batches).map(|i| {
        let metadata = record_batch_message(i as i64, body_len);
        (MessageHeader::RecordBatch, encapsulate(&metadata, &BATCH_BODY))
    });
    dictionaries.chain(batches).collect()
}
