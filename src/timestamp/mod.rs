//! Timestamp tokens and the references they cover.
//!
//! The types in this module model what a timestamp found in an advanced
//! signature *is*: a [`TimestampToken`] of a certain [`TimestampKind`],
//! carrying validation material of its own, a message imprint, and the
//! ordered set of [`TimestampedReference`]s naming everything the token
//! cryptographically covers. Discovery and classification of tokens lives
//! in [`source`], the per-format specifics in [`dialect`] and its two
//! realisations.

pub mod cades;
pub mod dialect;
pub mod source;
pub mod xades;

pub use self::dialect::{AttributeValue, Dialect};
pub use self::source::{
    SignatureData, SignatureScope, TimestampSource, UnsupportedTimestampKind
};

use std::fmt;
use std::slice;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use crate::cert::CertificateToken;
use crate::crl::{CrlBinary, CrlSource};
use crate::crypto::Digest;
use crate::identifier::Identifier;
use crate::ocsp::{OcspResponseBinary, OcspSource};


//------------ TimestampKind -------------------------------------------------

/// The role a timestamp token plays within a signature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TimestampKind {
    /// A CAdES timestamp over the signed content, taken before signing.
    Content,

    /// A XAdES timestamp over all signed data objects.
    AllDataObjects,

    /// A XAdES timestamp over a subset of the signed data objects.
    IndividualDataObjects,

    /// A timestamp over the signature value.
    Signature,

    /// A timestamp over the complete reference attributes only.
    ValidationDataRefsOnly,

    /// A timestamp over the signature value and the reference attributes.
    ValidationData,

    /// A timestamp re-sealing the signature and all collected material.
    Archive,

    /// A PDF document timestamp. Not produced by the dialects here.
    Document,
}

impl TimestampKind {
    /// Returns the stable name of the kind.
    ///
    /// The names key the certificate map export and must not change.
    pub fn name(self) -> &'static str {
        match self {
            TimestampKind::Content => "CONTENT_TIMESTAMP",
            TimestampKind::AllDataObjects => "ALL_DATA_OBJECTS_TIMESTAMP",
            TimestampKind::IndividualDataObjects => {
                "INDIVIDUAL_DATA_OBJECTS_TIMESTAMP"
            }
            TimestampKind::Signature => "SIGNATURE_TIMESTAMP",
            TimestampKind::ValidationDataRefsOnly => {
                "VALIDATION_DATA_REFSONLY_TIMESTAMP"
            }
            TimestampKind::ValidationData => "VALIDATION_DATA_TIMESTAMP",
            TimestampKind::Archive => "ARCHIVE_TIMESTAMP",
            TimestampKind::Document => "DOCUMENT_TIMESTAMP",
        }
    }
}

impl fmt::Display for TimestampKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//------------ ArchiveSubKind ------------------------------------------------

/// The dialect-specific flavour of an archive timestamp.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ArchiveSubKind {
    /// CAdES `archive-time-stamp-v2`.
    CadesV2,

    /// CAdES `archive-time-stamp-v3` with an `ats-hash-index`.
    CadesV3,

    /// XAdES `ArchiveTimeStamp` in the 1.3.2 namespace.
    Xades,

    /// XAdES `ArchiveTimeStamp` in the 1.4.1 namespace.
    Xades141,
}


//------------ ObjectKind ----------------------------------------------------

/// The kind of object a timestamped reference points at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ObjectKind {
    SignedData,
    Signature,
    Certificate,
    Revocation,
    Timestamp,
}


//------------ TimestampedReference ------------------------------------------

/// A logical pointer to one object covered by a timestamp.
///
/// Equality is structural over the identifier and the object kind; where
/// a reference came from does not enter into it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TimestampedReference {
    id: Identifier,
    kind: ObjectKind,
}

impl TimestampedReference {
    pub fn new(id: Identifier, kind: ObjectKind) -> Self {
        TimestampedReference { id, kind }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }
}

impl fmt::Display for TimestampedReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} {}", self.kind, self.id)
    }
}


//------------ ReferenceSet --------------------------------------------------

/// An ordered, duplicate-free collection of timestamped references.
///
/// References keep the order in which they were first added; adding an
/// already-present reference is a no-op. There is no removal. The order is
/// observable and meaningful: it reflects the order in which material was
/// encountered in the signature.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReferenceSet {
    refs: Vec<TimestampedReference>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference. Returns whether it was actually appended.
    pub fn add(&mut self, reference: TimestampedReference) -> bool {
        if self.refs.contains(&reference) {
            false
        }
        else {
            self.refs.push(reference);
            true
        }
    }

    /// Adds all given references in order, skipping duplicates.
    pub fn add_all(
        &mut self, references: impl IntoIterator<Item = TimestampedReference>
    ) {
        for reference in references {
            self.add(reference);
        }
    }

    pub fn contains(&self, reference: &TimestampedReference) -> bool {
        self.refs.contains(reference)
    }

    pub fn as_slice(&self) -> &[TimestampedReference] {
        &self.refs
    }

    pub fn iter(&self) -> slice::Iter<'_, TimestampedReference> {
        self.refs.iter()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn into_vec(self) -> Vec<TimestampedReference> {
        self.refs
    }
}


//--- From and IntoIterator

impl From<Vec<TimestampedReference>> for ReferenceSet {
    fn from(refs: Vec<TimestampedReference>) -> Self {
        let mut res = ReferenceSet::new();
        res.add_all(refs);
        res
    }
}

impl<'a> IntoIterator for &'a ReferenceSet {
    type Item = &'a TimestampedReference;
    type IntoIter = slice::Iter<'a, TimestampedReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}


//------------ MatchResult ---------------------------------------------------

/// The outcome of matching a token's message imprint against rebuilt data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchResult {
    /// The token has not been matched against any data yet.
    Unchecked,

    /// The rebuilt data digests to the message imprint.
    Matched,

    /// The rebuilt data does not digest to the message imprint.
    Mismatched,
}


//------------ TimestampInfo -------------------------------------------------

/// The parsed payload of a timestamp token.
///
/// The enclosing parser decodes the RFC 3161 structure and hands over the
/// pieces the timestamp machinery needs: the message imprint, the
/// generation time, and whatever validation material the token carries.
#[derive(Clone, Debug)]
pub struct TimestampInfo {
    /// The digest the token asserts existence of.
    pub message_imprint: Digest,

    /// The time the token was produced at.
    pub generation_time: DateTime<Utc>,

    /// Certificates embedded in the token, usually the TSA chain.
    pub certificates: Vec<CertificateToken>,

    /// DER encodings of CRLs embedded in the token.
    pub crls: Vec<Bytes>,

    /// DER encodings of OCSP responses embedded in the token.
    pub ocsps: Vec<Bytes>,

    /// For individual-data-objects timestamps: the covered scope ids.
    pub covered_scopes: Vec<Identifier>,
}

impl TimestampInfo {
    /// Creates an info with the mandatory fields and no material.
    pub fn new(
        message_imprint: Digest, generation_time: DateTime<Utc>
    ) -> Self {
        TimestampInfo {
            message_imprint,
            generation_time,
            certificates: Vec::new(),
            crls: Vec::new(),
            ocsps: Vec::new(),
            covered_scopes: Vec::new(),
        }
    }
}


//------------ TimestampToken ------------------------------------------------

/// A timestamp token found in, or supplied for, a signature.
///
/// Tokens are created once, by the dialect extractor during discovery or by
/// the caller for external archive timestamps. Afterwards only two things
/// change: the covered-reference set may grow (archive signed-data
/// references, external intake) and [`match_data`][Self::match_data] records
/// the imprint check exactly once.
#[derive(Clone, Debug)]
pub struct TimestampToken {
    id: Identifier,
    kind: TimestampKind,
    archive_sub_kind: Option<ArchiveSubKind>,
    message_imprint: Digest,
    generation_time: DateTime<Utc>,
    certificates: Vec<CertificateToken>,
    crls: CrlSource,
    ocsps: OcspSource,
    references: ReferenceSet,
    processed: bool,
    match_result: MatchResult,
}

impl TimestampToken {
    /// Creates a new token.
    ///
    /// The identifier is derived from `raw`, the encoded octets of the
    /// token as found in the signature. The embedded CRL and OCSP blobs of
    /// `info` become the token's own revocation sources; `references` is
    /// deduplicated while keeping its order.
    pub fn new(
        raw: &[u8],
        kind: TimestampKind,
        info: TimestampInfo,
        references: impl IntoIterator<Item = TimestampedReference>,
    ) -> Self {
        let mut crls = CrlSource::new();
        for der in info.crls {
            crls.add_binary(CrlBinary::new(der))
        }
        let mut ocsps = OcspSource::new();
        for der in info.ocsps {
            ocsps.add_binary(OcspResponseBinary::new(der))
        }
        let mut refs = ReferenceSet::new();
        refs.add_all(references);
        TimestampToken {
            id: Identifier::from_bytes(raw),
            kind,
            archive_sub_kind: None,
            message_imprint: info.message_imprint,
            generation_time: info.generation_time,
            certificates: info.certificates,
            crls,
            ocsps,
            references: refs,
            processed: false,
            match_result: MatchResult::Unchecked,
        }
    }

    /// Returns the stable identifier of the token.
    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn kind(&self) -> TimestampKind {
        self.kind
    }

    pub fn archive_sub_kind(&self) -> Option<ArchiveSubKind> {
        self.archive_sub_kind
    }

    pub fn set_archive_sub_kind(&mut self, sub_kind: ArchiveSubKind) {
        self.archive_sub_kind = Some(sub_kind)
    }

    pub fn message_imprint(&self) -> &Digest {
        &self.message_imprint
    }

    pub fn generation_time(&self) -> DateTime<Utc> {
        self.generation_time
    }

    /// Returns the certificates embedded in the token.
    pub fn certificates(&self) -> &[CertificateToken] {
        &self.certificates
    }

    /// Returns the token's own CRL source.
    pub fn crl_source(&self) -> &CrlSource {
        &self.crls
    }

    /// Returns the token's own OCSP source.
    pub fn ocsp_source(&self) -> &OcspSource {
        &self.ocsps
    }

    /// Returns the references covered by this token.
    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    /// Extends the covered references, skipping duplicates.
    pub fn add_references(
        &mut self, references: impl IntoIterator<Item = TimestampedReference>
    ) {
        self.references.add_all(references)
    }
}

/// # Message Imprint Matching
///
impl TimestampToken {
    /// Matches the token's message imprint against rebuilt data.
    ///
    /// The data is digested with the imprint's algorithm and compared to
    /// the imprint value. The first call decides; once a token is
    /// processed, further calls return the recorded result without looking
    /// at the data.
    pub fn match_data(&mut self, data: &[u8]) -> MatchResult {
        if self.processed {
            return self.match_result
        }
        self.processed = true;
        self.match_result = if self.message_imprint.matches(data) {
            MatchResult::Matched
        }
        else {
            MatchResult::Mismatched
        };
        self.match_result
    }

    /// Returns whether the token has been matched against data.
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Returns the recorded match result.
    pub fn match_result(&self) -> MatchResult {
        self.match_result
    }
}


//--- Display

impl fmt::Display for TimestampToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}


//============ Tests =========================================================
