//! Applies [`VerificationLimits`] to buffers of a given root kind.

use tracing::debug;

use crate::accessor::{FooterRoot, MessageRoot, RootAccessor, SchemaRoot};
use crate::{RootKind, VerificationLimits, VerifyError};

/// Stateless verifier carrying the limits for every call it makes.
///
/// Each call builds a fresh FlatBuffers verifier sized to the buffer, so a
/// single `Verifier` can be shared freely between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verifier {
    limits: VerificationLimits,
}

impl Verifier {
    pub fn new(limits: VerificationLimits) -> Result<Self, VerifyError> {
        limits.validate()?;
        Ok(Self { limits })
    }

    pub fn limits(&self) -> &VerificationLimits {
        &self.limits
    }

    /// Verifies `buf` as an `R` root and returns the typed view.
    pub fn root<'a, R: RootAccessor>(&self, buf: &'a [u8]) -> Result<R::Root<'a>, VerifyError> {
        let opts = self.limits.verifier_options(buf.len());
        R::root(&opts, buf).map_err(|source| {
            debug!(
                kind = %R::KIND,
                len = buf.len(),
                max_depth = opts.max_depth,
                max_tables = opts.max_tables,
                error = %source,
                "rejected IPC root"
            );
            VerifyError::structure(R::KIND, source)
        })
    }

    pub fn verify<R: RootAccessor>(&self, buf: &[u8]) -> Result<(), VerifyError> {
        self.root::<R>(buf).map(|_| ())
    }

    pub fn verify_kind(&self, kind: RootKind, buf: &[u8]) -> Result<(), VerifyError> {
        match kind {
            RootKind::Schema => self.verify::<SchemaRoot>(buf),
            RootKind::Message => self.verify::<MessageRoot>(buf),
            RootKind::Footer => self.verify::<FooterRoot>(buf),
        }
    }

    pub fn schema<'a>(&self, buf: &'a [u8]) -> Result<arrow_ipc::Schema<'a>, VerifyError> {
        self.root::<SchemaRoot>(buf)
    }

    pub fn message<'a>(&self, buf: &'a [u8]) -> Result<arrow_ipc::Message<'a>, VerifyError> {
        self.root::<MessageRoot>(buf)
    }

    pub fn footer<'a>(&self, buf: &'a [u8]) -> Result<arrow_ipc::Footer<'a>, VerifyError> {
        self.root::<FooterRoot>(buf)
    }
}

/// Returns `true` if `buf` holds a valid `Schema` root under the default limits.
pub fn verify_schema(buf: &[u8]) -> bool {
    Verifier::default().verify::<SchemaRoot>(buf).is_ok()
}

/// Returns `true` if `buf` holds a valid `Message` root under the default limits.
pub fn verify_message(buf: &[u8]) -> bool {
    Verifier::default().verify::<MessageRoot>(buf).is_ok()
}

/// Returns `true` if `buf` holds a valid `Footer` root under the default limits.
pub fn verify_footer(buf: &[u8]) -> bool {
    Verifier::default().verify::<FooterRoot>(buf).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, TableCountLimit};

    #[test]
    fn empty_buffer_is_rejected_for_every_kind() {
        let verifier = Verifier::default();
        for kind in RootKind::ALL {
            let err = verifier.verify_kind(kind, &[]).unwrap_err();
            assert!(matches!(err, VerifyError::Structure { kind: k, .. } if k == kind));
        }
    }

    #[test]
    fn verified_schema_is_readable() {
        let buf = fixtures::schema(&["abc", "flag"]);
        let schema = Verifier::default().schema(&buf).unwrap();
        let names: Vec<_> = schema
            .fields()
            .unwrap()
            .iter()
            .map(|f| f.name().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["abc", "flag"]);
    }

    #[test]
    fn trait_verify_matches_verifier() {
        let buf = fixtures::footer(&["abc"], &[]);
        let limits = VerificationLimits::default();
        assert!(FooterRoot::verify(&buf, &limits));
        assert!(Verifier::default().verify::<FooterRoot>(&buf).is_ok());
    }

    #[test]
    fn keeps_the_limits_it_was_built_with() {
        let limits = VerificationLimits {
            max_depth: 16,
            max_table_count: TableCountLimit::Fixed(64),
        };
        let verifier = Verifier::new(limits).unwrap();
        assert_eq!(verifier.limits(), &limits);
        assert_eq!(Verifier::default().limits(), &VerificationLimits::default());
    }

    #[test]
    fn zero_depth_limits_are_refused() {
        let limits = VerificationLimits {
            max_depth: 0,
            ..Default::default()
        };
        assert!(matches!(
            Verifier::new(limits),
            Err(VerifyError::InvalidLimits(_))
        ));
    }
}
