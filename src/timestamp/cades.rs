//! The CAdES dialect.
//!
//! CAdES signatures are CMS structures; their properties are signed and
//! unsigned attributes identified by OID. Classification is OID equality
//! against the constants in [`crate::oid`]. Rebuilt timestamp data is a
//! concatenation of the relevant encoded pieces: the signed content, the
//! signature value, and attribute encodings in document order.

use bcder::Oid;
use bytes::Bytes;
use log::warn;
use crate::identifier::Identifier;
use crate::crypto::Digest;
use crate::oid;
use super::dialect::{AttributeValue, Dialect};
use super::{
    ArchiveSubKind, ObjectKind, TimestampKind, TimestampToken,
    TimestampedReference
};


//------------ CadesAttribute ------------------------------------------------

/// One CMS signed or unsigned attribute, as decomposed by the parser.
#[derive(Clone, Debug)]
pub struct CadesAttribute {
    oid: Oid<Bytes>,
    value: AttributeValue,
    encoded: Bytes,
}

impl CadesAttribute {
    /// Creates an attribute from its OID, payload and DER encoding.
    pub fn new(
        oid: Oid<Bytes>, value: AttributeValue, encoded: impl Into<Bytes>
    ) -> Self {
        CadesAttribute { oid, value, encoded: encoded.into() }
    }

    pub fn oid(&self) -> &Oid<Bytes> {
        &self.oid
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Returns the DER encoding of the complete attribute.
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }
}


//------------ CadesDialect --------------------------------------------------

/// The CAdES realisation of the dialect seam.
///
/// Holds the byte artifacts data rebuilding needs, the signature value
/// octets and, unless the signature is detached without provided content,
/// the signed content octets, plus the identifiers of the signature
/// scopes. An archive timestamp seals the whole CMS SignedData, so it
/// covers every scope even when no earlier timestamp mentioned them.
#[derive(Clone, Debug, Default)]
pub struct CadesDialect {
    signature_value: Bytes,
    content: Option<Bytes>,
    scopes: Vec<Identifier>,
}

impl CadesDialect {
    pub fn new(
        signature_value: impl Into<Bytes>,
        content: Option<Bytes>,
        scopes: Vec<Identifier>,
    ) -> Self {
        CadesDialect {
            signature_value: signature_value.into(),
            content,
            scopes,
        }
    }

    /// Returns whether the attribute is one of the reference attributes.
    fn is_refs_attribute(&self, attr: &CadesAttribute) -> bool {
        self.is_complete_certificate_ref(attr)
            || self.is_attribute_certificate_ref(attr)
            || self.is_complete_revocation_ref(attr)
            || self.is_attribute_revocation_ref(attr)
    }
}

impl Dialect for CadesDialect {
    type Attribute = CadesAttribute;

    fn attribute_label(&self, attr: &CadesAttribute) -> String {
        attr.oid.to_string()
    }

    fn is_content_timestamp(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_CONTENT_TIMESTAMP
    }

    fn is_all_data_objects_timestamp(&self, _attr: &CadesAttribute) -> bool {
        false
    }

    fn is_individual_data_objects_timestamp(
        &self, _attr: &CadesAttribute
    ) -> bool {
        false
    }

    fn is_signature_timestamp(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_SIGNATURE_TIMESTAMP
    }

    fn is_complete_certificate_ref(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_CERTIFICATE_REFS
    }

    fn is_attribute_certificate_ref(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_ATTR_CERTIFICATE_REFS
    }

    fn is_complete_revocation_ref(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_REVOCATION_REFS
    }

    fn is_attribute_revocation_ref(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_ATTR_REVOCATION_REFS
    }

    fn is_refs_only_timestamp(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_CERT_CRL_TIMESTAMP
    }

    fn is_sig_and_refs_timestamp(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_ESC_TIMESTAMP
    }

    fn is_certificate_values(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_CERT_VALUES
    }

    fn is_revocation_values(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_REVOCATION_VALUES
    }

    fn is_archive_timestamp(&self, attr: &CadesAttribute) -> bool {
        attr.oid == oid::AA_ETS_ARCHIVE_TIMESTAMP_V2
            || attr.oid == oid::AA_ETS_ARCHIVE_TIMESTAMP_V3
    }

    fn is_timestamp_validation_data(&self, _attr: &CadesAttribute) -> bool {
        false
    }

    fn make_timestamp_token(
        &self,
        attr: &CadesAttribute,
        kind: TimestampKind,
        references: Vec<TimestampedReference>,
    ) -> Option<TimestampToken> {
        match attr.value {
            AttributeValue::Timestamp(ref info) => {
                Some(TimestampToken::new(
                    attr.encoded.as_ref(), kind, info.clone(), references
                ))
            }
            _ => {
                warn!(
                    "attribute [{}] does not contain a parseable \
                     timestamp, skipping", attr.oid
                );
                None
            }
        }
    }

    fn certificate_ref_digests(&self, attr: &CadesAttribute) -> Vec<Digest> {
        match attr.value {
            AttributeValue::CertificateRefs(ref digests) => digests.clone(),
            _ => Vec::new(),
        }
    }

    fn revocation_ref_crl_digests(
        &self, attr: &CadesAttribute
    ) -> Vec<Digest> {
        match attr.value {
            AttributeValue::RevocationRefs { ref crl, .. } => crl.clone(),
            _ => Vec::new(),
        }
    }

    fn revocation_ref_ocsp_digests(
        &self, attr: &CadesAttribute
    ) -> Vec<Digest> {
        match attr.value {
            AttributeValue::RevocationRefs { ref ocsp, .. } => ocsp.clone(),
            _ => Vec::new(),
        }
    }

    fn encapsulated_certificate_ids(
        &self, attr: &CadesAttribute
    ) -> Vec<Identifier> {
        match attr.value {
            AttributeValue::CertificateValues(ref certs)
            | AttributeValue::ValidationData {
                certificates: ref certs, ..
            } => {
                certs.iter().map(|der| {
                    Identifier::from_bytes(der.as_ref())
                }).collect()
            }
            _ => Vec::new(),
        }
    }

    fn encapsulated_crl_ids(&self, attr: &CadesAttribute) -> Vec<Identifier> {
        match attr.value {
            AttributeValue::RevocationValues { ref crls, .. }
            | AttributeValue::ValidationData { ref crls, .. } => {
                crls.iter().map(|der| {
                    Identifier::from_bytes(der.as_ref())
                }).collect()
            }
            _ => Vec::new(),
        }
    }

    fn encapsulated_ocsp_ids(
        &self, attr: &CadesAttribute
    ) -> Vec<Identifier> {
        match attr.value {
            AttributeValue::RevocationValues { ref ocsps, .. }
            | AttributeValue::ValidationData { ref ocsps, .. } => {
                ocsps.iter().map(|der| {
                    Identifier::from_bytes(der.as_ref())
                }).collect()
            }
            _ => Vec::new(),
        }
    }

    fn individual_content_references(
        &self, _attr: &CadesAttribute
    ) -> Vec<TimestampedReference> {
        Vec::new()
    }

    fn archive_sub_kind(
        &self, attr: &CadesAttribute
    ) -> Option<ArchiveSubKind> {
        if attr.oid == oid::AA_ETS_ARCHIVE_TIMESTAMP_V2 {
            Some(ArchiveSubKind::CadesV2)
        }
        else if attr.oid == oid::AA_ETS_ARCHIVE_TIMESTAMP_V3 {
            Some(ArchiveSubKind::CadesV3)
        }
        else {
            None
        }
    }

    fn signed_data_references(
        &self, _token: &TimestampToken
    ) -> Vec<TimestampedReference> {
        self.scopes.iter().map(|id| {
            TimestampedReference::new(*id, ObjectKind::SignedData)
        }).collect()
    }

    fn content_timestamp_data(&self, _token: &TimestampToken) -> Bytes {
        self.content.clone().unwrap_or_default()
    }

    fn signature_timestamp_data(&self, _token: &TimestampToken) -> Bytes {
        self.signature_value.clone()
    }

    fn timestamp_x1_data(
        &self, _token: &TimestampToken, unsigned: &[CadesAttribute]
    ) -> Bytes {
        let mut data = Vec::new();
        data.extend_from_slice(self.signature_value.as_ref());
        for attr in unsigned {
            if self.is_signature_timestamp(attr) {
                data.extend_from_slice(attr.encoded.as_ref())
            }
        }
        for attr in unsigned {
            if self.is_refs_attribute(attr) {
                data.extend_from_slice(attr.encoded.as_ref())
            }
        }
        data.into()
    }

    fn timestamp_x2_data(
        &self, _token: &TimestampToken, unsigned: &[CadesAttribute]
    ) -> Bytes {
        let mut data = Vec::new();
        for attr in unsigned {
            if self.is_refs_attribute(attr) {
                data.extend_from_slice(attr.encoded.as_ref())
            }
        }
        data.into()
    }

    fn archive_timestamp_data(
        &self, token: &TimestampToken, unsigned: &[CadesAttribute]
    ) -> Bytes {
        // The archive coverage ends right before the attribute the token
        // came from. An external token does not correspond to any
        // attribute and covers the whole list.
        let end = unsigned.iter().position(|attr| {
            Identifier::from_bytes(attr.encoded.as_ref()) == token.id()
        }).unwrap_or(unsigned.len());

        let mut data = Vec::new();
        if let Some(ref content) = self.content {
            data.extend_from_slice(content.as_ref())
        }
        data.extend_from_slice(self.signature_value.as_ref());
        for attr in &unsigned[..end] {
            data.extend_from_slice(attr.encoded.as_ref())
        }
        data.into()
    }
}


//============ Tests =========================================================
