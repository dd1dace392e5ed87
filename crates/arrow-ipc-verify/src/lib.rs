//! Verification of Arrow IPC metadata buffers.
//!
//! An Arrow IPC buffer is only safe to read once the FlatBuffers verifier has
//! checked every offset, vector length and string length in it against the
//! buffer bounds. This crate runs that check for the three root record kinds
//! (`Schema`, `Message`, `Footer`) under explicit depth and table-count
//! limits, and verifies the stream and file framing around them.
//!
//! # Example
//!
//! ```
//! use arrow_ipc_verify::{fixtures, verify_message, verify_schema, Verifier};
//!
//! let buf = fixtures::schema(&["abc"]);
//! assert!(verify_schema(&buf));
//! assert!(!verify_schema(&buf[..buf.len() - 1]));
//! assert!(!verify_message(&[]));
//!
//! let schema = Verifier::default().schema(&buf).unwrap();
//! assert_eq!(schema.fields().unwrap().len(), 1);
//! ```

mod accessor;
mod error;
mod kind;
mod limits;
mod verifier;

pub mod file;
pub mod fixtures;
pub mod framing;

pub use accessor::{FooterRoot, MessageRoot, RootAccessor, SchemaRoot};
pub use error::{FramingError, VerifyError};
pub use file::{verify_file, FileLayout};
pub use framing::{
    verify_encapsulated_message, verify_stream, EncapsulatedMessage, MessageFrame, StreamSummary,
};
pub use kind::RootKind;
pub use limits::{
    TableCountLimit, VerificationLimits, DEFAULT_MAX_DEPTH, DEFAULT_TABLES_PER_BYTE,
};
pub use verifier::{verify_footer, verify_message, verify_schema, Verifier};

pub use arrow_ipc_verify_buffers::BufferError;
pub use flatbuffers::{InvalidFlatbuffer, VerifierOptions};
