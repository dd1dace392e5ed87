//! Structural verification of Schema, Message and Footer roots.

use arrow_ipc::Block;
use arrow_ipc_verify::{
    fixtures, verify_footer, verify_message, verify_schema, FooterRoot, MessageRoot, RootAccessor,
    RootKind, SchemaRoot, TableCountLimit, VerificationLimits, Verifier, VerifyError,
};
use proptest::prelude::*;

fn samples() -> Vec<(RootKind, Vec<u8>)> {
    vec![
        (RootKind::Schema, fixtures::schema(&["abc", "flag", "x"])),
        (RootKind::Message, fixtures::schema_message(&["abc", "y"])),
        (
            RootKind::Footer,
            fixtures::footer(&["abc"], &[Block::new(8, 16, 8), Block::new(32, 16, 8)]),
        ),
    ]
}

fn verify_default(kind: RootKind, buf: &[u8]) -> bool {
    match kind {
        RootKind::Schema => verify_schema(buf),
        RootKind::Message => verify_message(buf),
        RootKind::Footer => verify_footer(buf),
    }
}

fn read_u32(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap())
}

fn write_u32(buf: &mut [u8], pos: usize, value: u32) {
    buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}

// ---------------------------------------------------------------------------
// Acceptance and rejection
// ---------------------------------------------------------------------------

#[test]
fn empty_buffers_are_rejected() {
    assert!(!verify_schema(&[]));
    assert!(!verify_message(&[]));
    assert!(!verify_footer(&[]));
}

#[test]
fn buffers_shorter_than_a_root_offset_are_rejected() {
    for len in 1..4 {
        let buf = vec![0u8; len];
        for kind in RootKind::ALL {
            assert!(!verify_default(kind, &buf), "{kind} accepted {len} zero bytes");
        }
    }
}

#[test]
fn well_formed_roots_are_accepted() {
    for (kind, buf) in samples() {
        assert!(verify_default(kind, &buf), "{kind} fixture rejected");
        assert!(Verifier::default().verify_kind(kind, &buf).is_ok());
    }
}

#[test]
fn every_strict_prefix_is_rejected() {
    for (kind, buf) in samples() {
        for len in 0..buf.len() {
            assert!(
                !verify_default(kind, &buf[..len]),
                "{kind} prefix of {len}/{} bytes accepted",
                buf.len()
            );
        }
    }
}

#[test]
fn rejection_names_the_root_kind() {
    let buf = fixtures::schema(&["abc"]);
    let err = Verifier::default()
        .verify::<FooterRoot>(&buf[..4])
        .unwrap_err();
    assert!(matches!(err, VerifyError::Structure { kind: RootKind::Footer, .. }));
    assert!(err.to_string().starts_with("invalid footer buffer"));
}

// ---------------------------------------------------------------------------
// Offset corruption
// ---------------------------------------------------------------------------

#[test]
fn root_offset_outside_buffer_is_rejected() {
    for (kind, buf) in samples() {
        for bad in [buf.len() as u32, buf.len() as u32 + 4, u32::MAX - 3] {
            let mut corrupt = buf.clone();
            write_u32(&mut corrupt, 0, bad);
            assert!(!verify_default(kind, &corrupt), "{kind} root offset {bad}");
        }
    }
}

#[test]
fn vtable_offset_outside_buffer_is_rejected() {
    for (kind, buf) in samples() {
        let table = read_u32(&buf, 0) as usize;
        for bad in [table as i32 + 4, -(buf.len() as i32)] {
            let mut corrupt = buf.clone();
            corrupt[table..table + 4].copy_from_slice(&bad.to_le_bytes());
            assert!(!verify_default(kind, &corrupt), "{kind} vtable soffset {bad}");
        }
    }
}

#[test]
fn schema_fields_offset_outside_buffer_is_rejected() {
    let mut buf = fixtures::schema(&["abc", "flag"]);
    let table = read_u32(&buf, 0) as usize;
    let soffset = i32::from_le_bytes(buf[table..table + 4].try_into().unwrap());
    let vtable = (table as i64 - soffset as i64) as usize;
    // Schema.fields is the second slot of the vtable.
    let voffset = u16::from_le_bytes([buf[vtable + 6], buf[vtable + 7]]) as usize;
    assert_ne!(voffset, 0);
    let field = table + voffset;

    let len = buf.len() as u32;
    write_u32(&mut buf, field, len);
    assert!(!verify_schema(&buf));
}

// ---------------------------------------------------------------------------
// Typed views
// ---------------------------------------------------------------------------

#[test]
fn message_header_is_readable_after_verification() {
    let buf = fixtures::schema_message(&["abc", "y"]);
    let message = Verifier::default().message(&buf).unwrap();
    assert_eq!(message.header_type(), arrow_ipc::MessageHeader::Schema);
    let schema = message.header_as_schema().unwrap();
    assert_eq!(schema.fields().unwrap().len(), 2);
}

#[test]
fn footer_blocks_are_readable_after_verification() {
    let blocks = [Block::new(8, 16, 8), Block::new(32, 16, 8)];
    let buf = fixtures::footer(&["abc"], &blocks);
    let footer = Verifier::default().footer(&buf).unwrap();
    let read: Vec<_> = footer
        .recordBatches()
        .unwrap()
        .iter()
        .map(|b| (b.offset(), b.metaDataLength(), b.bodyLength()))
        .collect();
    assert_eq!(read, vec![(8, 16, 8), (32, 16, 8)]);
}

#[test]
fn root_accessor_trait_dispatch() {
    let limits = VerificationLimits::default();
    assert!(SchemaRoot::verify(&fixtures::schema(&["abc"]), &limits));
    assert!(MessageRoot::verify(&fixtures::record_batch_message(3, 0), &limits));
    assert!(FooterRoot::verify(&fixtures::footer(&["abc"], &[]), &limits));
    assert_eq!(SchemaRoot::KIND, RootKind::Schema);
    assert_eq!(MessageRoot::KIND, RootKind::Message);
    assert_eq!(FooterRoot::KIND, RootKind::Footer);
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[test]
fn depth_limit_rejects_nested_tables() {
    let buf = fixtures::schema(&["abc"]);
    let shallow = Verifier::new(VerificationLimits {
        max_depth: 1,
        ..Default::default()
    })
    .unwrap();
    assert!(shallow.verify::<SchemaRoot>(&buf).is_err());
    assert!(Verifier::default().verify::<SchemaRoot>(&buf).is_ok());
}

#[test]
fn flat_root_fits_tight_limits() {
    let buf = fixtures::schema(&[]);
    let shallow = Verifier::new(VerificationLimits {
        max_depth: 2,
        max_table_count: TableCountLimit::Fixed(2),
    })
    .unwrap();
    assert!(shallow.verify::<SchemaRoot>(&buf).is_ok());
}

#[test]
fn table_count_limit_rejects_wide_buffers() {
    let buf = fixtures::schema(&["abc", "def", "ghi", "jkl"]);
    let narrow = Verifier::new(VerificationLimits {
        max_table_count: TableCountLimit::Fixed(1),
        ..Default::default()
    })
    .unwrap();
    assert!(narrow.verify::<SchemaRoot>(&buf).is_err());

    let roomy = Verifier::new(VerificationLimits {
        max_table_count: TableCountLimit::Fixed(64),
        ..Default::default()
    })
    .unwrap();
    assert!(roomy.verify::<SchemaRoot>(&buf).is_ok());
}

#[test]
fn zero_tables_per_byte_rejects_everything() {
    let buf = fixtures::schema(&["abc"]);
    let none = Verifier::new(VerificationLimits {
        max_table_count: TableCountLimit::PerByte(0),
        ..Default::default()
    })
    .unwrap();
    assert!(none.verify::<SchemaRoot>(&buf).is_err());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn names() -> impl Strategy<Value = Vec<String>> {
    (
        prop_oneof!["[a-z]{3}", "[a-z]{7}", "[a-z]{11}"],
        proptest::collection::vec("[a-z]{1,12}", 0..4),
    )
        .prop_map(|(first, rest)| std::iter::once(first).chain(rest).collect())
}

proptest! {
    #[test]
    fn generated_schemas_verify_and_prefixes_do_not(names in names()) {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        for (kind, buf) in [
            (RootKind::Schema, fixtures::schema(&names)),
            (RootKind::Message, fixtures::schema_message(&names)),
            (RootKind::Footer, fixtures::footer(&names, &[])),
        ] {
            prop_assert!(verify_default(kind, &buf));
            for len in 0..buf.len() {
                prop_assert!(!verify_default(kind, &buf[..len]));
            }
        }
    }

    #[test]
    fn verification_is_idempotent(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        for kind in RootKind::ALL {
            let first = verify_default(kind, &data);
            let second = verify_default(kind, &data);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn single_byte_corruption_never_panics(index in any::<prop::sample::Index>(), byte in any::<u8>()) {
        for (kind, mut buf) in samples() {
            let i = index.index(buf.len());
            buf[i] = byte;
            let _ = verify_default(kind, &buf);
        }
    }
}
