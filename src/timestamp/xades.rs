//! The XAdES dialect.
//!
//! XAdES signatures keep their properties as XML elements; classification
//! matches the element's local name and namespace. The qualifying
//! properties of ETSI TS 101 903 live in the 1.3.2 namespace, the
//! long-term extensions of TS 101 903 v1.4.1 (`ArchiveTimeStamp`,
//! `TimeStampValidationData`) in the 1.4.1 namespace.
//!
//! Rebuilt timestamp data concatenates canonicalised octets. The
//! canonicalisation itself is the parser's business; every attribute and
//! signature scope arrives here with its canonical form attached.

use bytes::Bytes;
use log::warn;
use crate::crypto::Digest;
use crate::identifier::Identifier;
use super::dialect::{AttributeValue, Dialect};
use super::{
    ArchiveSubKind, ObjectKind, TimestampKind, TimestampToken,
    TimestampedReference
};


/// The namespace of XAdES 1.3.2 qualifying properties.
pub const XADES_132: &str = "http://uri.etsi.org/01903/v1.3.2#";

/// The namespace of XAdES 1.4.1 long-term properties.
pub const XADES_141: &str = "http://uri.etsi.org/01903/v1.4.1#";


//------------ XadesAttribute ------------------------------------------------

/// One signed or unsigned XAdES property, as decomposed by the parser.
#[derive(Clone, Debug)]
pub struct XadesAttribute {
    namespace: String,
    name: String,
    value: AttributeValue,
    encoded: Bytes,
}

impl XadesAttribute {
    /// Creates an attribute from its qualified name, payload and
    /// canonicalised encoding.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: AttributeValue,
        encoded: impl Into<Bytes>,
    ) -> Self {
        XadesAttribute {
            namespace: namespace.into(),
            name: name.into(),
            value,
            encoded: encoded.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Returns the canonicalised encoding of the complete element.
    pub fn encoded(&self) -> &Bytes {
        &self.encoded
    }

    fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }
}


//------------ XadesDialect --------------------------------------------------

/// The XAdES realisation of the dialect seam.
///
/// Holds the canonicalised signature value and the canonical octets of
/// every signature scope, keyed by scope identifier, so that content
/// timestamps over all or some of the data objects can be rebuilt.
#[derive(Clone, Debug, Default)]
pub struct XadesDialect {
    signature_value: Bytes,
    scope_data: Vec<(Identifier, Bytes)>,
}

impl XadesDialect {
    pub fn new(
        signature_value: impl Into<Bytes>,
        scope_data: Vec<(Identifier, Bytes)>,
    ) -> Self {
        XadesDialect {
            signature_value: signature_value.into(),
            scope_data,
        }
    }

    /// Returns whether the attribute is one of the reference properties.
    fn is_refs_attribute(&self, attr: &XadesAttribute) -> bool {
        self.is_complete_certificate_ref(attr)
            || self.is_attribute_certificate_ref(attr)
            || self.is_complete_revocation_ref(attr)
            || self.is_attribute_revocation_ref(attr)
    }

    /// Concatenates the canonical octets of the scopes a token covers.
    fn covered_scope_data(&self, token: &TimestampToken) -> Bytes {
        let mut data = Vec::new();
        for (id, octets) in &self.scope_data {
            let covered = token.references().iter().any(|reference| {
                reference.kind() == ObjectKind::SignedData
                    && reference.id() == *id
            });
            if covered {
                data.extend_from_slice(octets.as_ref())
            }
        }
        data.into()
    }
}

impl Dialect for XadesDialect {
    type Attribute = XadesAttribute;

    fn attribute_label(&self, attr: &XadesAttribute) -> String {
        format!("{}{}", attr.namespace, attr.name)
    }

    fn is_content_timestamp(&self, _attr: &XadesAttribute) -> bool {
        false
    }

    fn is_all_data_objects_timestamp(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "AllDataObjectsTimeStamp")
    }

    fn is_individual_data_objects_timestamp(
        &self, attr: &XadesAttribute
    ) -> bool {
        attr.is(XADES_132, "IndividualDataObjectsTimeStamp")
    }

    fn is_signature_timestamp(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "SignatureTimeStamp")
    }

    fn is_complete_certificate_ref(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "CompleteCertificateRefs")
    }

    fn is_attribute_certificate_ref(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "AttributeCertificateRefs")
    }

    fn is_complete_revocation_ref(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "CompleteRevocationRefs")
    }

    fn is_attribute_revocation_ref(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "AttributeRevocationRefs")
    }

    fn is_refs_only_timestamp(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "RefsOnlyTimeStamp")
    }

    fn is_sig_and_refs_timestamp(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "SigAndRefsTimeStamp")
    }

    fn is_certificate_values(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "CertificateValues")
    }

    fn is_revocation_values(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_132, "RevocationValues")
    }

    fn is_archive_timestamp(&self, attr: &XadesAttribute) -> bool {
        attr.name == "ArchiveTimeStamp"
            && (attr.namespace == XADES_132 || attr.namespace == XADES_141)
    }

    fn is_timestamp_validation_data(&self, attr: &XadesAttribute) -> bool {
        attr.is(XADES_141, "TimeStampValidationData")
    }

    fn make_timestamp_token(
        &self,
        attr: &XadesAttribute,
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
                    "element [{}] does not contain a parseable timestamp, \
                     skipping", self.attribute_label(attr)
                );
                None
            }
        }
    }

    fn certificate_ref_digests(&self, attr: &XadesAttribute) -> Vec<Digest> {
        match attr.value {
            AttributeValue::CertificateRefs(ref digests) => digests.clone(),
            _ => Vec::new(),
        }
    }

    fn revocation_ref_crl_digests(
        &self, attr: &XadesAttribute
    ) -> Vec<Digest> {
        match attr.value {
            AttributeValue::RevocationRefs { ref crl, .. } => crl.clone(),
            _ => Vec::new(),
        }
    }

    fn revocation_ref_ocsp_digests(
        &self, attr: &XadesAttribute
    ) -> Vec<Digest> {
        match attr.value {
            AttributeValue::RevocationRefs { ref ocsp, .. } => ocsp.clone(),
            _ => Vec::new(),
        }
    }

    fn encapsulated_certificate_ids(
        &self, attr: &XadesAttribute
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

    fn encapsulated_crl_ids(&self, attr: &XadesAttribute) -> Vec<Identifier> {
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
        &self, attr: &XadesAttribute
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
        &self, attr: &XadesAttribute
    ) -> Vec<TimestampedReference> {
        match attr.value {
            AttributeValue::Timestamp(ref info) => {
                info.covered_scopes.iter().map(|id| {
                    TimestampedReference::new(*id, ObjectKind::SignedData)
                }).collect()
            }
            _ => Vec::new(),
        }
    }

    fn archive_sub_kind(
        &self, attr: &XadesAttribute
    ) -> Option<ArchiveSubKind> {
        if !self.is_archive_timestamp(attr) {
            None
        }
        else if attr.namespace == XADES_141 {
            Some(ArchiveSubKind::Xades141)
        }
        else {
            Some(ArchiveSubKind::Xades)
        }
    }

    fn content_timestamp_data(&self, token: &TimestampToken) -> Bytes {
        self.covered_scope_data(token)
    }

    fn signature_timestamp_data(&self, _token: &TimestampToken) -> Bytes {
        self.signature_value.clone()
    }

    fn timestamp_x1_data(
        &self, _token: &TimestampToken, unsigned: &[XadesAttribute]
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
        &self, _token: &TimestampToken, unsigned: &[XadesAttribute]
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
        &self, token: &TimestampToken, unsigned: &[XadesAttribute]
    ) -> Bytes {
        let end = unsigned.iter().position(|attr| {
            Identifier::from_bytes(attr.encoded.as_ref()) == token.id()
        }).unwrap_or(unsigned.len());

        let mut data = Vec::new();
        for (_, octets) in &self.scope_data {
            data.extend_from_slice(octets.as_ref())
        }
        data.extend_from_slice(self.signature_value.as_ref());
        for attr in &unsigned[..end] {
            data.extend_from_slice(attr.encoded.as_ref())
        }
        data.into()
    }
}


//============ Tests =========================================================
