//! Discovering and validating the timestamps of a signature.
//!
//! [`TimestampSource`] walks the signed and unsigned properties of one
//! parsed signature in document order, emits a [`TimestampToken`] for every
//! timestamp attribute it recognises, and computes, at the moment each
//! token is emitted, the exact set of references the token covers. The
//! walk keeps a running set of encapsulated references: every reference
//! and value attribute encountered so far contributes to what later
//! timestamps of the validation-data and archive kinds cover.
//!
//! The walk runs at most once per source. Whichever accessor is called
//! first triggers it, builds the five classified token lists, merges the
//! validation material found inside tokens into aggregate sources, and
//! matches every token's message imprint against the rebuilt data. Later
//! calls see the finished state. An external archive timestamp can still
//! be added afterwards through
//! [`add_external_timestamp`][TimestampSource::add_external_timestamp].

use std::{error, fmt};
use std::collections::HashMap;
use std::sync::Mutex;
use log::{debug, warn};
use crate::cert::{CertificateSource, CertificateToken, ListCertificateSource};
use crate::crl::{CrlSource, ListCrlSource};
use crate::identifier::Identifier;
use crate::ocsp::{ListOcspSource, OcspSource};
use super::dialect::Dialect;
use super::{
    ObjectKind, ReferenceSet, TimestampKind, TimestampToken,
    TimestampedReference
};


//------------ SignatureScope ------------------------------------------------

/// One portion of signed data covered by the signature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureScope {
    id: Identifier,
    name: String,
}

impl SignatureScope {
    pub fn new(id: Identifier, name: impl Into<String>) -> Self {
        SignatureScope { id, name: name.into() }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}


//------------ SignatureData -------------------------------------------------

/// What the timestamp source keeps of a parsed signature.
///
/// This is everything it will ever look at: the stable signature id, the
/// signature scopes, the three per-signature material sources, and the two
/// ordered attribute lists. There is deliberately no handle back to the
/// signature object itself.
#[derive(Clone, Debug)]
pub struct SignatureData<A> {
    /// The stable identifier of the signature.
    pub id: Identifier,

    /// The signed data portions covered by the signature.
    pub scopes: Vec<SignatureScope>,

    /// The certificates and certificate references of the signature.
    pub certificates: CertificateSource,

    /// The CRLs and CRL references of the signature.
    pub crls: CrlSource,

    /// The OCSP responses and references of the signature.
    pub ocsps: OcspSource,

    /// The signed properties, in document order.
    pub signed_attributes: Vec<A>,

    /// The unsigned properties, in document order.
    pub unsigned_attributes: Vec<A>,
}


//------------ TimestampSource -----------------------------------------------

/// The timestamps of one signature, classified and validated.
pub struct TimestampSource<D: Dialect> {
    dialect: D,
    signature: SignatureData<D::Attribute>,
    state: Mutex<Option<Built>>,
}

/// The outcome of the one-shot build.
struct Built {
    content: Vec<TimestampToken>,
    signature: Vec<TimestampToken>,
    sig_and_refs: Vec<TimestampToken>,
    refs_only: Vec<TimestampToken>,
    archive: Vec<TimestampToken>,

    /// Certificates accumulated from all timestamps.
    certificates: CertificateSource,

    /// CRL material of the signature and all timestamps seen so far.
    crls: ListCrlSource,

    /// OCSP material of the signature and all timestamps seen so far.
    ocsps: ListOcspSource,
}

impl Built {
    /// The tokens of all five lists in their canonical order.
    fn all_in_order(&self) -> impl Iterator<Item = &TimestampToken> + '_ {
        self.content.iter()
            .chain(self.signature.iter())
            .chain(self.sig_and_refs.iter())
            .chain(self.refs_only.iter())
            .chain(self.archive.iter())
    }
}

impl<D: Dialect> TimestampSource<D> {
    /// Creates a source over a parsed signature.
    ///
    /// Nothing happens until the first accessor is called.
    pub fn new(dialect: D, signature: SignatureData<D::Attribute>) -> Self {
        TimestampSource {
            dialect,
            signature,
            state: Mutex::new(None),
        }
    }

    fn with_built<R>(&self, op: impl FnOnce(&Built) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|err| {
            err.into_inner()
        });
        op(state.get_or_insert_with(|| self.build()))
    }

    fn with_built_mut<R>(&self, op: impl FnOnce(&mut Built) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|err| {
            err.into_inner()
        });
        op(state.get_or_insert_with(|| self.build()))
    }
}

/// # Access to the Discovered Timestamps
///
impl<D: Dialect> TimestampSource<D> {
    /// Returns the content timestamps, in document order.
    pub fn content_timestamps(&self) -> Vec<TimestampToken> {
        self.with_built(|built| built.content.clone())
    }

    /// Returns the signature timestamps, in document order.
    pub fn signature_timestamps(&self) -> Vec<TimestampToken> {
        self.with_built(|built| built.signature.clone())
    }

    /// Returns the sig-and-refs (ES-X type 1) timestamps.
    pub fn sig_and_refs_timestamps(&self) -> Vec<TimestampToken> {
        self.with_built(|built| built.sig_and_refs.clone())
    }

    /// Returns the refs-only (ES-X type 2) timestamps.
    pub fn refs_only_timestamps(&self) -> Vec<TimestampToken> {
        self.with_built(|built| built.refs_only.clone())
    }

    /// Returns the archive timestamps, internal ones first.
    pub fn archive_timestamps(&self) -> Vec<TimestampToken> {
        self.with_built(|built| built.archive.clone())
    }

    /// Returns the document timestamps.
    ///
    /// Only PDF signatures have document timestamps; neither dialect here
    /// produces any, so the list is always empty. Document timestamps do
    /// not participate in [`all_timestamps`][Self::all_timestamps].
    pub fn document_timestamps(&self) -> Vec<TimestampToken> {
        Vec::new()
    }

    /// Returns all timestamps.
    ///
    /// The order is content, signature, sig-and-refs, refs-only, archive.
    pub fn all_timestamps(&self) -> Vec<TimestampToken> {
        self.with_built(|built| built.all_in_order().cloned().collect())
    }

    /// Returns the CRL sources of all timestamps.
    pub fn timestamp_crl_sources(&self) -> ListCrlSource {
        self.with_built(|built| {
            let mut res = ListCrlSource::new();
            for token in built.all_in_order() {
                res.add(token.crl_source().clone())
            }
            res
        })
    }

    /// Returns the OCSP sources of all timestamps.
    pub fn timestamp_ocsp_sources(&self) -> ListOcspSource {
        self.with_built(|built| {
            let mut res = ListOcspSource::new();
            for token in built.all_in_order() {
                res.add(token.ocsp_source().clone())
            }
            res
        })
    }

    /// Returns the certificate material of each timestamp as a list source.
    pub fn timestamp_certificate_sources(&self) -> ListCertificateSource {
        self.with_built(|built| {
            let mut res = ListCertificateSource::new();
            for token in built.all_in_order() {
                let mut source = CertificateSource::new();
                for cert in token.certificates() {
                    source.add_certificate(cert.clone())
                }
                res.add(source)
            }
            res
        })
    }

    /// Returns the certificates accumulated from all timestamps.
    pub fn certificates(&self) -> Vec<CertificateToken> {
        self.with_built(|built| built.certificates.certificates().to_vec())
    }

    /// Returns a map from synthetic keys to per-timestamp certificates.
    ///
    /// Keys are the kind name followed by a counter that is shared across
    /// all lists, so keys are unique even though kind names repeat. The
    /// lists contribute in the order content, sig-and-refs, refs-only,
    /// signature, archive. With `skip_last_archive`, the newest archive
    /// timestamp is left out; its own certificates cannot have been
    /// covered by anything.
    pub fn certificate_map(
        &self, skip_last_archive: bool
    ) -> HashMap<String, Vec<CertificateToken>> {
        self.with_built(|built| {
            let mut map = HashMap::new();
            let mut counter = 0;
            let head = built.content.iter()
                .chain(built.sig_and_refs.iter())
                .chain(built.refs_only.iter())
                .chain(built.signature.iter());
            for token in head {
                map.insert(
                    format!("{}{}", token.kind().name(), counter),
                    token.certificates().to_vec(),
                );
                counter += 1;
            }
            let mut archive_len = built.archive.len();
            if skip_last_archive && archive_len > 0 {
                archive_len -= 1;
            }
            for token in &built.archive[..archive_len] {
                map.insert(
                    format!("{}{}", token.kind().name(), counter),
                    token.certificates().to_vec(),
                );
                counter += 1;
            }
            map
        })
    }
}

/// # External Timestamps
///
impl<D: Dialect> TimestampSource<D> {
    /// Adds an archive timestamp acquired outside the signature.
    ///
    /// The token's covered references are extended with the signature's
    /// SignedData references and with everything every already-known
    /// timestamp covers; its certificates join the aggregate certificate
    /// source; then it is appended to the archive list and its message
    /// imprint is matched.
    ///
    /// Only archive timestamps can be added. Any other kind fails without
    /// touching the source.
    pub fn add_external_timestamp(
        &self, token: TimestampToken
    ) -> Result<(), UnsupportedTimestampKind> {
        if token.kind() != TimestampKind::Archive {
            return Err(UnsupportedTimestampKind(token.kind()))
        }
        self.with_built_mut(|built| {
            let mut token = token;
            token.add_references(
                self.dialect.signature_signed_data_references()
            );
            let mut refs = ReferenceSet::new();
            Self::add_references_for_previous(
                &mut refs, built.all_in_order()
            );
            token.add_references(refs.into_vec());
            for cert in token.certificates() {
                built.certificates.add_certificate(cert.clone())
            }
            built.archive.push(token);
            self.validate_archive(built);
        });
        Ok(())
    }
}

/// # Building
///
impl<D: Dialect> TimestampSource<D> {
    fn build(&self) -> Built {
        let mut built = Built {
            content: Vec::new(),
            signature: Vec::new(),
            sig_and_refs: Vec::new(),
            refs_only: Vec::new(),
            archive: Vec::new(),
            certificates: CertificateSource::new(),
            crls: ListCrlSource::with_source(self.signature.crls.clone()),
            ocsps: ListOcspSource::with_source(self.signature.ocsps.clone()),
        };
        self.collect_signed(&mut built);
        self.collect_unsigned(&mut built);
        self.validate(&mut built);
        built
    }

    /// Walks the signed properties, collecting content timestamps.
    fn collect_signed(&self, built: &mut Built) {
        for attr in &self.signature.signed_attributes {
            let token = if self.dialect.is_content_timestamp(attr) {
                self.dialect.make_timestamp_token(
                    attr, TimestampKind::Content,
                    self.content_references().into_vec(),
                )
            }
            else if self.dialect.is_all_data_objects_timestamp(attr) {
                self.dialect.make_timestamp_token(
                    attr, TimestampKind::AllDataObjects,
                    self.content_references().into_vec(),
                )
            }
            else if self.dialect.is_individual_data_objects_timestamp(attr) {
                let references =
                    self.dialect.individual_content_references(attr);
                self.dialect.make_timestamp_token(
                    attr, TimestampKind::IndividualDataObjects, references
                )
            }
            else {
                // Signed properties are full of things that are none of
                // our business. Only timestamps matter here.
                continue
            };
            let token = match token {
                Some(token) => token,
                None => continue,
            };
            Self::absorb(built, &token);
            built.content.push(token);
        }
    }

    /// Walks the unsigned properties.
    ///
    /// This is where the ordering matters: the set of encapsulated
    /// references grows as reference and value attributes go by, and every
    /// timestamp emitted along the way covers exactly what has accumulated
    /// up to its own position.
    fn collect_unsigned(&self, built: &mut Built) {
        if self.signature.unsigned_attributes.is_empty() {
            return
        }

        let mut emitted: Vec<TimestampToken> = Vec::new();
        let mut encapsulated = ReferenceSet::new();

        for attr in &self.signature.unsigned_attributes {
            let token = if self.dialect.is_signature_timestamp(attr) {
                let token = self.dialect.make_timestamp_token(
                    attr, TimestampKind::Signature,
                    self.signature_timestamp_references().into_vec(),
                );
                let token = match token {
                    Some(token) => token,
                    None => continue,
                };
                built.signature.push(token.clone());
                token
            }
            else if self.dialect.is_complete_certificate_ref(attr)
                || self.dialect.is_attribute_certificate_ref(attr)
            {
                encapsulated.add_all(
                    self.certificate_ref_references(built, attr)
                );
                continue
            }
            else if self.dialect.is_complete_revocation_ref(attr)
                || self.dialect.is_attribute_revocation_ref(attr)
            {
                encapsulated.add_all(
                    self.revocation_ref_references(built, attr)
                );
                continue
            }
            else if self.dialect.is_refs_only_timestamp(attr) {
                let token = self.dialect.make_timestamp_token(
                    attr, TimestampKind::ValidationDataRefsOnly,
                    encapsulated.clone().into_vec(),
                );
                let token = match token {
                    Some(token) => token,
                    None => continue,
                };
                built.refs_only.push(token.clone());
                token
            }
            else if self.dialect.is_sig_and_refs_timestamp(attr) {
                let mut references = ReferenceSet::new();
                Self::add_references_for_previous(
                    &mut references,
                    emitted.iter().filter(|token| {
                        token.kind() == TimestampKind::Signature
                    }),
                );
                references.add_all(encapsulated.iter().cloned());
                let token = self.dialect.make_timestamp_token(
                    attr, TimestampKind::ValidationData,
                    references.into_vec(),
                );
                let token = match token {
                    Some(token) => token,
                    None => continue,
                };
                built.sig_and_refs.push(token.clone());
                token
            }
            else if self.dialect.is_certificate_values(attr) {
                encapsulated.add_all(
                    self.dialect.encapsulated_certificate_ids(attr)
                        .into_iter().map(|id| {
                            TimestampedReference::new(
                                id, ObjectKind::Certificate
                            )
                        })
                );
                continue
            }
            else if self.dialect.is_revocation_values(attr) {
                encapsulated.add_all(
                    self.dialect.encapsulated_crl_ids(attr).into_iter()
                        .chain(self.dialect.encapsulated_ocsp_ids(attr))
                        .map(|id| {
                            TimestampedReference::new(
                                id, ObjectKind::Revocation
                            )
                        })
                );
                continue
            }
            else if self.dialect.is_archive_timestamp(attr) {
                let mut references = ReferenceSet::new();
                Self::add_references_for_previous(
                    &mut references, emitted.iter()
                );
                references.add_all(encapsulated.iter().cloned());
                let token = self.dialect.make_timestamp_token(
                    attr, TimestampKind::Archive, references.into_vec(),
                );
                let mut token = match token {
                    Some(token) => token,
                    None => continue,
                };
                if let Some(sub_kind) = self.dialect.archive_sub_kind(attr) {
                    token.set_archive_sub_kind(sub_kind)
                }
                let signed_data = self.dialect.signed_data_references(&token);
                token.add_references(signed_data);
                built.archive.push(token.clone());
                token
            }
            else if self.dialect.is_timestamp_validation_data(attr) {
                encapsulated.add_all(
                    self.dialect.encapsulated_certificate_ids(attr)
                        .into_iter().map(|id| {
                            TimestampedReference::new(
                                id, ObjectKind::Certificate
                            )
                        })
                );
                encapsulated.add_all(
                    self.dialect.encapsulated_crl_ids(attr).into_iter()
                        .chain(self.dialect.encapsulated_ocsp_ids(attr))
                        .map(|id| {
                            TimestampedReference::new(
                                id, ObjectKind::Revocation
                            )
                        })
                );
                continue
            }
            else {
                warn!(
                    "unsupported unsigned attribute [{}], skipping",
                    self.dialect.attribute_label(attr)
                );
                continue
            };

            Self::absorb(built, &token);
            emitted.push(token);
        }
    }

    /// References to every signature scope.
    fn content_references(&self) -> ReferenceSet {
        let mut references = ReferenceSet::new();
        for scope in &self.signature.scopes {
            references.add(TimestampedReference::new(
                scope.id(), ObjectKind::SignedData
            ));
        }
        references
    }

    /// References covered by a signature timestamp: the signature scopes,
    /// the signature itself, and the signing certificates.
    fn signature_timestamp_references(&self) -> ReferenceSet {
        let mut references = self.content_references();
        references.add(TimestampedReference::new(
            self.signature.id, ObjectKind::Signature
        ));
        for cert in self.signature.certificates.signing_certificates() {
            references.add(TimestampedReference::new(
                cert.id(), ObjectKind::Certificate
            ));
        }
        references
    }

    /// Resolves certificate reference digests to covered references.
    ///
    /// Each digest is looked up in the signature's certificate source
    /// first, then among the certificates collected from timestamps, then
    /// among the signature's declared certificate references. A digest
    /// resolving nowhere is dropped.
    fn certificate_ref_references(
        &self, built: &Built, attr: &D::Attribute
    ) -> Vec<TimestampedReference> {
        let mut references = Vec::new();
        for digest in self.dialect.certificate_ref_digests(attr) {
            let id = self.signature.certificates
                .certificate_by_digest(&digest)
                .map(|cert| cert.id())
                .or_else(|| {
                    built.certificates.certificate_by_digest(&digest)
                        .map(|cert| cert.id())
                })
                .or_else(|| {
                    self.signature.certificates.ref_by_digest(&digest)
                        .map(|cert_ref| cert_ref.id())
                });
            match id {
                Some(id) => {
                    references.push(TimestampedReference::new(
                        id, ObjectKind::Certificate
                    ))
                }
                None => {
                    debug!(
                        "certificate reference digest {} resolves to \
                         nothing, dropping", digest
                    );
                }
            }
        }
        references
    }

    /// Resolves revocation reference digests to covered references.
    ///
    /// CRL digests are looked up in the combined CRL material, OCSP
    /// digests in the combined OCSP material; binaries take precedence
    /// over declared references. A digest resolving nowhere is dropped.
    fn revocation_ref_references(
        &self, built: &Built, attr: &D::Attribute
    ) -> Vec<TimestampedReference> {
        let mut references = Vec::new();
        for digest in self.dialect.revocation_ref_crl_digests(attr) {
            let id = built.crls.binary_by_digest(&digest)
                .map(|binary| binary.id())
                .or_else(|| {
                    built.crls.ref_by_digest(&digest).map(|r| r.id())
                });
            match id {
                Some(id) => {
                    references.push(TimestampedReference::new(
                        id, ObjectKind::Revocation
                    ))
                }
                None => {
                    debug!(
                        "CRL reference digest {} resolves to nothing, \
                         dropping", digest
                    );
                }
            }
        }
        for digest in self.dialect.revocation_ref_ocsp_digests(attr) {
            let id = built.ocsps.binary_by_digest(&digest)
                .map(|binary| binary.id())
                .or_else(|| {
                    built.ocsps.ref_by_digest(&digest).map(|r| r.id())
                });
            match id {
                Some(id) => {
                    references.push(TimestampedReference::new(
                        id, ObjectKind::Revocation
                    ))
                }
                None => {
                    debug!(
                        "OCSP reference digest {} resolves to nothing, \
                         dropping", digest
                    );
                }
            }
        }
        references
    }

    /// Expands previously emitted timestamps into covered references.
    ///
    /// Covering an earlier timestamp means covering the timestamp itself,
    /// everything it covers, and every certificate embedded in it.
    fn add_references_for_previous<'a>(
        references: &mut ReferenceSet,
        tokens: impl Iterator<Item = &'a TimestampToken>,
    ) {
        for token in tokens {
            references.add(TimestampedReference::new(
                token.id(), ObjectKind::Timestamp
            ));
            references.add_all(token.references().iter().cloned());
            for cert in token.certificates() {
                references.add(TimestampedReference::new(
                    cert.id(), ObjectKind::Certificate
                ));
            }
        }
    }

    /// Merges a token's validation material into the aggregates.
    fn absorb(built: &mut Built, token: &TimestampToken) {
        for cert in token.certificates() {
            built.certificates.add_certificate(cert.clone())
        }
        built.crls.add(token.crl_source().clone());
        built.ocsps.add(token.ocsp_source().clone());
    }
}

/// # Validation
///
impl<D: Dialect> TimestampSource<D> {
    /// Matches every token's message imprint against its rebuilt data.
    fn validate(&self, built: &mut Built) {
        for token in &mut built.content {
            let data = self.dialect.content_timestamp_data(token);
            token.match_data(data.as_ref());
        }
        for token in &mut built.signature {
            let data = self.dialect.signature_timestamp_data(token);
            token.match_data(data.as_ref());
        }
        for token in &mut built.sig_and_refs {
            let data = self.dialect.timestamp_x1_data(
                token, &self.signature.unsigned_attributes
            );
            token.match_data(data.as_ref());
        }
        for token in &mut built.refs_only {
            let data = self.dialect.timestamp_x2_data(
                token, &self.signature.unsigned_attributes
            );
            token.match_data(data.as_ref());
        }
        self.validate_archive(built);
    }

    /// Matches the archive tokens that have not been matched yet.
    ///
    /// Skipping processed tokens makes the pass incremental: after an
    /// external timestamp is appended, re-running it matches exactly the
    /// new token.
    fn validate_archive(&self, built: &mut Built) {
        for token in &mut built.archive {
            if !token.is_processed() {
                let data = self.dialect.archive_timestamp_data(
                    token, &self.signature.unsigned_attributes
                );
                token.match_data(data.as_ref());
            }
        }
    }
}


//------------ UnsupportedTimestampKind --------------------------------------

/// An external timestamp had a kind the source cannot accept.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnsupportedTimestampKind(TimestampKind);

impl UnsupportedTimestampKind {
    /// Returns the offending kind.
    pub fn kind(self) -> TimestampKind {
        self.0
    }
}

impl fmt::Display for UnsupportedTimestampKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "external timestamps of kind {} are not supported, \
             only archive timestamps can be added",
            self.0
        )
    }
}

impl error::Error for UnsupportedTimestampKind { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::{ConstOid, Oid};
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use crate::cert::CertificateRef;
    use crate::crl::CrlBinary;
    use crate::crypto::DigestAlgorithm;
    use crate::oid;
    use crate::timestamp::cades::{CadesAttribute, CadesDialect};
    use crate::timestamp::dialect::AttributeValue;
    use crate::timestamp::{MatchResult, TimestampInfo};
    use super::*;

    fn attr_oid(const_oid: ConstOid) -> Oid<Bytes> {
        Oid(Bytes::from_static(const_oid.0))
    }

    fn info(covered: &[u8]) -> TimestampInfo {
        TimestampInfo::new(
            DigestAlgorithm::Sha256.digest(covered),
            Utc.with_ymd_and_hms(2022, 5, 5, 5, 5, 5).unwrap(),
        )
    }

    fn ts_attr(
        const_oid: ConstOid, raw: &'static [u8], covered: &[u8]
    ) -> CadesAttribute {
        CadesAttribute::new(
            attr_oid(const_oid),
            AttributeValue::Timestamp(info(covered)),
            Bytes::from_static(raw),
        )
    }

    fn signature_data() -> SignatureData<CadesAttribute> {
        let mut certificates = CertificateSource::new();
        certificates.add_signing_certificate(CertificateToken::new(
            Bytes::from_static(b"signer cert"), "CN=Signer", "CN=CA"
        ));
        SignatureData {
            id: Identifier::from_bytes(b"the signature"),
            scopes: vec![SignatureScope::new(
                Identifier::from_bytes(b"full document"), "Full document"
            )],
            certificates,
            crls: CrlSource::new(),
            ocsps: OcspSource::new(),
            signed_attributes: Vec::new(),
            unsigned_attributes: Vec::new(),
        }
    }

    fn dialect() -> CadesDialect {
        CadesDialect::new(
            Bytes::from_static(b"signature value"),
            Some(Bytes::from_static(b"content")),
            vec![Identifier::from_bytes(b"full document")],
        )
    }

    #[test]
    fn empty_signature_has_no_timestamps() {
        let source = TimestampSource::new(dialect(), signature_data());
        assert!(source.content_timestamps().is_empty());
        assert!(source.signature_timestamps().is_empty());
        assert!(source.sig_and_refs_timestamps().is_empty());
        assert!(source.refs_only_timestamps().is_empty());
        assert!(source.archive_timestamps().is_empty());
        assert!(source.document_timestamps().is_empty());
        assert!(source.all_timestamps().is_empty());
        assert!(source.certificate_map(false).is_empty());
    }

    #[test]
    fn content_timestamp_covers_scopes() {
        let mut data = signature_data();
        data.signed_attributes.push(ts_attr(
            oid::AA_ETS_CONTENT_TIMESTAMP, b"content-ts", b"content"
        ));
        let source = TimestampSource::new(dialect(), data);

        let content = source.content_timestamps();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].kind(), TimestampKind::Content);
        assert_eq!(content[0].references().as_slice(), &[
            TimestampedReference::new(
                Identifier::from_bytes(b"full document"),
                ObjectKind::SignedData,
            )
        ]);
        assert_eq!(content[0].match_result(), MatchResult::Matched);
    }

    #[test]
    fn signature_timestamp_references() {
        let mut data = signature_data();
        data.unsigned_attributes.push(ts_attr(
            oid::AA_SIGNATURE_TIMESTAMP, b"sig-ts", b"signature value"
        ));
        let source = TimestampSource::new(dialect(), data);

        let tokens = source.signature_timestamps();
        assert_eq!(tokens.len(), 1);
        let refs = tokens[0].references();
        assert!(refs.contains(&TimestampedReference::new(
            Identifier::from_bytes(b"the signature"), ObjectKind::Signature
        )));
        assert!(refs.contains(&TimestampedReference::new(
            Identifier::from_bytes(b"signer cert"), ObjectKind::Certificate
        )));
        assert!(refs.contains(&TimestampedReference::new(
            Identifier::from_bytes(b"full document"), ObjectKind::SignedData
        )));
        assert_eq!(tokens[0].match_result(), MatchResult::Matched);
    }

    #[test]
    fn malformed_timestamp_attribute_is_skipped() {
        let mut data = signature_data();
        data.unsigned_attributes.push(CadesAttribute::new(
            attr_oid(oid::AA_SIGNATURE_TIMESTAMP),
            AttributeValue::Opaque,
            Bytes::from_static(b"broken"),
        ));
        data.unsigned_attributes.push(ts_attr(
            oid::AA_SIGNATURE_TIMESTAMP, b"good", b"signature value"
        ));
        let source = TimestampSource::new(dialect(), data);
        let tokens = source.signature_timestamps();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].id(), Identifier::from_bytes(b"good"));
    }

    #[test]
    fn unknown_attribute_is_skipped() {
        let mut data = signature_data();
        // A content-type attribute; nothing the classifier knows.
        data.unsigned_attributes.push(CadesAttribute::new(
            Oid(Bytes::from_static(&[42, 134, 72, 134, 247, 13, 1, 9, 3])),
            AttributeValue::Opaque,
            Bytes::from_static(b"irrelevant"),
        ));
        let source = TimestampSource::new(dialect(), data);
        assert!(source.all_timestamps().is_empty());
    }

    #[test]
    fn certificate_refs_resolve_in_order() {
        // One digest resolves to a signature certificate, one to a
        // declared reference, one to nothing.
        let mut data = signature_data();
        let cert_digest = DigestAlgorithm::Sha256.digest(b"signer cert");
        let declared_digest = DigestAlgorithm::Sha256.digest(b"elsewhere");
        data.certificates.add_ref(
            CertificateRef::new(declared_digest.clone())
        );
        let unresolved = DigestAlgorithm::Sha256.digest(b"gone");
        data.unsigned_attributes.push(CadesAttribute::new(
            attr_oid(oid::AA_ETS_CERTIFICATE_REFS),
            AttributeValue::CertificateRefs(vec![
                cert_digest, declared_digest.clone(), unresolved
            ]),
            Bytes::from_static(b"[cert-refs]"),
        ));
        data.unsigned_attributes.push(ts_attr(
            oid::AA_ETS_CERT_CRL_TIMESTAMP, b"x2", b"[cert-refs]"
        ));
        let source = TimestampSource::new(dialect(), data);

        let tokens = source.refs_only_timestamps();
        assert_eq!(tokens.len(), 1);
        // Two of three digests resolved; the third is dropped.
        assert_eq!(tokens[0].references().len(), 2);
        assert!(tokens[0].references().contains(&TimestampedReference::new(
            Identifier::from_bytes(b"signer cert"), ObjectKind::Certificate
        )));
        assert!(tokens[0].references().contains(&TimestampedReference::new(
            Identifier::from_digest(&declared_digest),
            ObjectKind::Certificate,
        )));
        assert_eq!(tokens[0].match_result(), MatchResult::Matched);
    }

    #[test]
    fn revocation_refs_resolve_against_combined_material() {
        let mut data = signature_data();
        data.crls.add_binary(CrlBinary::new(
            Bytes::from_static(b"signature crl")
        ));
        let crl_digest = DigestAlgorithm::Sha256.digest(b"signature crl");
        data.unsigned_attributes.push(CadesAttribute::new(
            attr_oid(oid::AA_ETS_REVOCATION_REFS),
            AttributeValue::RevocationRefs {
                crl: vec![crl_digest],
                ocsp: Vec::new(),
            },
            Bytes::from_static(b"[rev-refs]"),
        ));
        data.unsigned_attributes.push(ts_attr(
            oid::AA_ETS_CERT_CRL_TIMESTAMP, b"x2", b"[rev-refs]"
        ));
        let source = TimestampSource::new(dialect(), data);

        let tokens = source.refs_only_timestamps();
        assert_eq!(tokens[0].references().as_slice(), &[
            TimestampedReference::new(
                Identifier::from_bytes(b"signature crl"),
                ObjectKind::Revocation,
            )
        ]);
    }

    #[test]
    fn build_runs_once() {
        let mut data = signature_data();
        data.unsigned_attributes.push(ts_attr(
            oid::AA_SIGNATURE_TIMESTAMP, b"sig-ts", b"signature value"
        ));
        let source = TimestampSource::new(dialect(), data);

        let first: Vec<_> = source.all_timestamps().iter()
            .map(|token| token.id()).collect();
        let second: Vec<_> = source.all_timestamps().iter()
            .map(|token| token.id()).collect();
        assert_eq!(first, second);
        assert_eq!(source.signature_timestamps().len(), 1);
    }

    #[test]
    fn external_timestamp_must_be_archive() {
        let source = TimestampSource::new(dialect(), signature_data());
        let token = TimestampToken::new(
            b"external", TimestampKind::Signature, info(b"x"), Vec::new()
        );
        let err = source.add_external_timestamp(token).unwrap_err();
        assert_eq!(err.kind(), TimestampKind::Signature);
        assert!(source.archive_timestamps().is_empty());
    }

    #[test]
    fn aggregate_sources_follow_tokens() {
        let mut data = signature_data();
        let mut ts_info = info(b"signature value");
        ts_info.certificates.push(CertificateToken::new(
            Bytes::from_static(b"tsa cert"), "CN=TSA", "CN=TSA CA"
        ));
        ts_info.crls.push(Bytes::from_static(b"tsa crl"));
        ts_info.ocsps.push(Bytes::from_static(b"tsa ocsp"));
        data.unsigned_attributes.push(CadesAttribute::new(
            attr_oid(oid::AA_SIGNATURE_TIMESTAMP),
            AttributeValue::Timestamp(ts_info),
            Bytes::from_static(b"sig-ts"),
        ));
        let source = TimestampSource::new(dialect(), data);

        let certificates = source.certificates();
        assert_eq!(certificates.len(), 1);
        assert_eq!(certificates[0].subject(), "CN=TSA");

        let crls = source.timestamp_crl_sources();
        assert_eq!(crls.len(), 1);
        assert!(crls.binary_by_digest(
            &DigestAlgorithm::Sha256.digest(b"tsa crl")
        ).is_some());

        let ocsps = source.timestamp_ocsp_sources();
        assert!(ocsps.binary_by_digest(
            &DigestAlgorithm::Sha256.digest(b"tsa ocsp")
        ).is_some());

        let cert_sources = source.timestamp_certificate_sources();
        assert_eq!(cert_sources.len(), 1);
        assert!(cert_sources.certificate_by_digest(
            &DigestAlgorithm::Sha256.digest(b"tsa cert")
        ).is_some());
    }
}
