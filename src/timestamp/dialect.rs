//! The per-format seam: classification, extraction, data rebuilding.
//!
//! Each signature format encodes its properties differently: CAdES as CMS
//! attributes identified by OID, XAdES as XML elements identified by
//! qualified name. The timestamp machinery over them is identical, though.
//! The [`Dialect`] trait carries everything the format decides: how to
//! classify an attribute, how to pull material out of it, and how to
//! rebuild the octets a given timestamp was computed over.
//!
//! Attribute payloads arrive pre-decomposed from the container parser as
//! [`AttributeValue`]s. Classification never looks at the payload; the
//! extractors do, and fail soft when classification and payload disagree.

use bytes::Bytes;
use crate::crypto::Digest;
use crate::identifier::Identifier;
use super::{
    ArchiveSubKind, TimestampInfo, TimestampKind, TimestampToken,
    TimestampedReference
};


//------------ AttributeValue ------------------------------------------------

/// The decoded payload of a signature attribute.
///
/// An attribute the parser could not decode further carries
/// [`Opaque`][Self::Opaque]; if the classifier nevertheless recognises its
/// OID or name as a timestamp, extraction fails soft and the attribute is
/// skipped.
#[derive(Clone, Debug)]
pub enum AttributeValue {
    /// A timestamp token.
    Timestamp(TimestampInfo),

    /// Certificate references by digest.
    CertificateRefs(Vec<Digest>),

    /// Revocation references by digest, split by material kind.
    RevocationRefs {
        crl: Vec<Digest>,
        ocsp: Vec<Digest>,
    },

    /// Encapsulated certificate values.
    CertificateValues(Vec<Bytes>),

    /// Encapsulated revocation values.
    RevocationValues {
        crls: Vec<Bytes>,
        ocsps: Vec<Bytes>,
    },

    /// Validation material collected for earlier timestamps.
    ValidationData {
        certificates: Vec<Bytes>,
        crls: Vec<Bytes>,
        ocsps: Vec<Bytes>,
    },

    /// A payload the parser did not decompose.
    Opaque,
}


//------------ Dialect -------------------------------------------------------

/// Everything the timestamp source needs to know about one format.
///
/// The fourteen classification predicates must be mutually exclusive for
/// any given attribute; the source dispatches through them in a fixed
/// order, so a sloppy dialect cannot make an attribute count twice, but it
/// can misclassify. Predicates that have no meaning in a format simply
/// return `false` there.
pub trait Dialect {
    /// The dialect's representation of a single signature attribute.
    type Attribute;

    /// Returns a short label for an attribute, for diagnostics.
    fn attribute_label(&self, attr: &Self::Attribute) -> String;

    //--- Classification

    /// A timestamp over the signed content. CAdES only.
    fn is_content_timestamp(&self, attr: &Self::Attribute) -> bool;

    /// A timestamp over all signed data objects. XAdES only.
    fn is_all_data_objects_timestamp(&self, attr: &Self::Attribute) -> bool;

    /// A timestamp over some signed data objects. XAdES only.
    fn is_individual_data_objects_timestamp(
        &self, attr: &Self::Attribute
    ) -> bool;

    /// A timestamp over the signature value.
    fn is_signature_timestamp(&self, attr: &Self::Attribute) -> bool;

    /// The complete set of certificate references.
    fn is_complete_certificate_ref(&self, attr: &Self::Attribute) -> bool;

    /// Certificate references for attribute authorities.
    fn is_attribute_certificate_ref(&self, attr: &Self::Attribute) -> bool;

    /// The complete set of revocation references.
    fn is_complete_revocation_ref(&self, attr: &Self::Attribute) -> bool;

    /// Revocation references for attribute authorities.
    fn is_attribute_revocation_ref(&self, attr: &Self::Attribute) -> bool;

    /// A timestamp over the reference attributes only.
    fn is_refs_only_timestamp(&self, attr: &Self::Attribute) -> bool;

    /// A timestamp over the signature value and the reference attributes.
    fn is_sig_and_refs_timestamp(&self, attr: &Self::Attribute) -> bool;

    /// Encapsulated certificate values.
    fn is_certificate_values(&self, attr: &Self::Attribute) -> bool;

    /// Encapsulated revocation values.
    fn is_revocation_values(&self, attr: &Self::Attribute) -> bool;

    /// An archive timestamp.
    fn is_archive_timestamp(&self, attr: &Self::Attribute) -> bool;

    /// Validation material for earlier timestamps. XAdES 1.4.1 only.
    fn is_timestamp_validation_data(&self, attr: &Self::Attribute) -> bool;

    //--- Extraction

    /// Creates a timestamp token from an attribute.
    ///
    /// Returns `None` if the attribute does not actually carry a parseable
    /// timestamp; the caller skips it. Implementations log the failure.
    fn make_timestamp_token(
        &self,
        attr: &Self::Attribute,
        kind: TimestampKind,
        references: Vec<TimestampedReference>,
    ) -> Option<TimestampToken>;

    /// Returns the certificate digests of a certificate-references
    /// attribute.
    fn certificate_ref_digests(&self, attr: &Self::Attribute) -> Vec<Digest>;

    /// Returns the CRL digests of a revocation-references attribute.
    fn revocation_ref_crl_digests(
        &self, attr: &Self::Attribute
    ) -> Vec<Digest>;

    /// Returns the OCSP digests of a revocation-references attribute.
    fn revocation_ref_ocsp_digests(
        &self, attr: &Self::Attribute
    ) -> Vec<Digest>;

    /// Returns the identifiers of encapsulated certificate values.
    ///
    /// Recognises both plain certificate-values attributes and
    /// timestamp-validation-data.
    fn encapsulated_certificate_ids(
        &self, attr: &Self::Attribute
    ) -> Vec<Identifier>;

    /// Returns the identifiers of encapsulated CRLs.
    fn encapsulated_crl_ids(&self, attr: &Self::Attribute) -> Vec<Identifier>;

    /// Returns the identifiers of encapsulated OCSP responses.
    fn encapsulated_ocsp_ids(
        &self, attr: &Self::Attribute
    ) -> Vec<Identifier>;

    /// Returns the references covered by an individual-data-objects
    /// timestamp.
    fn individual_content_references(
        &self, attr: &Self::Attribute
    ) -> Vec<TimestampedReference>;

    /// Returns the archive flavour of an archive-timestamp attribute.
    fn archive_sub_kind(
        &self, attr: &Self::Attribute
    ) -> Option<ArchiveSubKind>;

    /// Returns signed-data references an archive token additionally covers.
    ///
    /// Formats that wrap the signature in a CMS SignedData use this to pull
    /// the SignedData content into the archive coverage. Empty by default.
    fn signed_data_references(
        &self, _token: &TimestampToken
    ) -> Vec<TimestampedReference> {
        Vec::new()
    }

    /// Returns references to everything in the signature's SignedData.
    ///
    /// Used when an external archive timestamp is taken over the whole
    /// signature file. Empty by default.
    fn signature_signed_data_references(&self) -> Vec<TimestampedReference> {
        Vec::new()
    }

    //--- Data rebuilding

    /// Rebuilds the octets covered by a content timestamp.
    ///
    /// All five rebuilders return an empty document when the data cannot
    /// be reconstructed; matching an imprint against it then fails, which
    /// is the intended outcome.
    fn content_timestamp_data(&self, token: &TimestampToken) -> Bytes;

    /// Rebuilds the octets covered by a signature timestamp.
    fn signature_timestamp_data(&self, token: &TimestampToken) -> Bytes;

    /// Rebuilds the octets covered by a sig-and-refs timestamp.
    fn timestamp_x1_data(
        &self, token: &TimestampToken, unsigned: &[Self::Attribute]
    ) -> Bytes;

    /// Rebuilds the octets covered by a refs-only timestamp.
    fn timestamp_x2_data(
        &self, token: &TimestampToken, unsigned: &[Self::Attribute]
    ) -> Bytes;

    /// Rebuilds the octets covered by an archive timestamp.
    fn archive_timestamp_data(
        &self, token: &TimestampToken, unsigned: &[Self::Attribute]
    ) -> Bytes;
}
