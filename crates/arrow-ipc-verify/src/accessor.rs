//! Typed root accessors over the generated Arrow IPC FlatBuffers types.

use flatbuffers::{InvalidFlatbuffer, VerifierOptions};

use crate::{RootKind, VerificationLimits};

/// Decodes and verifies one kind of root record.
///
/// `root` runs the FlatBuffers verifier before it hands out the typed view,
/// so a returned root is safe to read. Implementations delegate to the
/// accessors generated from the Arrow `.fbs` files.
///
/// Only same-kind acceptance is guaranteed: a buffer written as a `Schema`
/// verifies with [`SchemaRoot`], but verifying it with [`MessageRoot`] may
/// succeed or fail depending on how its fields happen to line up. Callers
/// that need to know the kind must track it out of band.
pub trait RootAccessor {
    const KIND: RootKind;

    type Root<'a>;

    fn root<'a>(
        opts: &VerifierOptions,
        buf: &'a [u8],
    ) -> Result<Self::Root<'a>, InvalidFlatbuffer>;

    fn verify(buf: &[u8], limits: &VerificationLimits) -> bool {
        Self::root(&limits.verifier_options(buf.len()), buf).is_ok()
    }
}

/// `Schema` root, as stored in a standalone schema buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaRoot;

/// `Message` root, the metadata of an encapsulated IPC message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageRoot;

/// `Footer` root, found at the end of an Arrow IPC file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FooterRoot;

impl RootAccessor for SchemaRoot {
    const KIND: RootKind = RootKind::Schema;

    type Root<'a> = arrow_ipc::Schema<'a>;

    fn root<'a>(
        opts: &VerifierOptions,
        buf: &'a [u8],
    ) -> Result<Self::Root<'a>, InvalidFlatbuffer> {
        arrow_ipc::root_as_schema_with_opts(opts, buf)
    }
}

impl RootAccessor for MessageRoot {
    const KIND: RootKind = RootKind::Message;

    type Root<'a> = arrow_ipc::Message<'a>;

    fn root<'a>(
        opts: &VerifierOptions,
        buf: &'a [u8],
    ) -> Result<Self::Root<'a>, InvalidFlatbuffer> {
        arrow_ipc::root_as_message_with_opts(opts, buf)
    }
}

impl RootAccessor for FooterRoot {
    const KIND: RootKind = RootKind::Footer;

    type Root<'a> = arrow_ipc::Footer<'a>;

    fn root<'a>(
        opts: &VerifierOptions,
        buf: &'a [u8],
    ) -> Result<Self::Root<'a>, InvalidFlatbuffer> {
        arrow_ipc::root_as_footer_with_opts(opts, buf)
    }
}
