//! End-to-end tests walking a CAdES signature through its upgrade levels.
//!
//! Each test assembles the attribute lists a signature carries at one of
//! the B, T, LT and LTA levels, runs the timestamp source over them and
//! checks the discovered tokens, their covered references and their
//! message-imprint match results.

use bcder::{ConstOid, Oid};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use adsig::cert::{CertificateSource, CertificateToken};
use adsig::crl::CrlSource;
use adsig::crypto::DigestAlgorithm;
use adsig::identifier::Identifier;
use adsig::ocsp::OcspSource;
use adsig::oid;
use adsig::timestamp::cades::{CadesAttribute, CadesDialect};
use adsig::timestamp::{
    AttributeValue, MatchResult, ObjectKind, SignatureData, SignatureScope,
    TimestampInfo, TimestampKind, TimestampSource, TimestampToken,
    TimestampedReference,
};


//------------ Fixtures ------------------------------------------------------

const SIGNATURE_VALUE: &[u8] = b"signature value";
const CONTENT: &[u8] = b"signed content";

fn attr_oid(const_oid: ConstOid) -> Oid<Bytes> {
    Oid(Bytes::from_static(const_oid.0))
}

fn info(covered: &[u8]) -> TimestampInfo {
    TimestampInfo::new(
        DigestAlgorithm::Sha256.digest(covered),
        Utc.with_ymd_and_hms(2023, 11, 7, 8, 0, 0).unwrap(),
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

fn tsa_cert() -> CertificateToken {
    CertificateToken::new(
        Bytes::from_static(b"tsa cert"), "CN=TSA", "CN=TSA CA"
    )
}

fn signature_data() -> SignatureData<CadesAttribute> {
    let mut certificates = CertificateSource::new();
    certificates.add_signing_certificate(CertificateToken::new(
        Bytes::from_static(b"signer cert"), "CN=Signer", "CN=CA"
    ));
    certificates.add_certificate(CertificateToken::new(
        Bytes::from_static(b"ca cert"), "CN=CA", "CN=CA"
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
        Bytes::from_static(SIGNATURE_VALUE),
        Some(Bytes::from_static(CONTENT)),
        vec![Identifier::from_bytes(b"full document")],
    )
}

/// The attribute set of an LT-level signature: a signature timestamp
/// followed by certificate and revocation values.
fn lt_unsigned_attributes() -> Vec<CadesAttribute> {
    vec![
        ts_attr(oid::AA_SIGNATURE_TIMESTAMP, b"[sig-ts]", SIGNATURE_VALUE),
        CadesAttribute::new(
            attr_oid(oid::AA_ETS_CERT_VALUES),
            AttributeValue::CertificateValues(vec![
                Bytes::from_static(b"ca cert"),
            ]),
            Bytes::from_static(b"[cert-values]"),
        ),
        CadesAttribute::new(
            attr_oid(oid::AA_ETS_REVOCATION_VALUES),
            AttributeValue::RevocationValues {
                crls: vec![Bytes::from_static(b"crl der")],
                ocsps: vec![Bytes::from_static(b"ocsp der")],
            },
            Bytes::from_static(b"[rev-values]"),
        ),
    ]
}

/// The rebuilt coverage of an archive timestamp sitting after the LT
/// attributes produced by [`lt_unsigned_attributes`].
fn lt_archive_data() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(CONTENT);
    data.extend_from_slice(SIGNATURE_VALUE);
    data.extend_from_slice(b"[sig-ts]");
    data.extend_from_slice(b"[cert-values]");
    data.extend_from_slice(b"[rev-values]");
    data
}

fn assert_no_duplicate_references(token: &TimestampToken) {
    let refs = token.references().as_slice();
    for (index, reference) in refs.iter().enumerate() {
        assert!(
            !refs[index + 1..].contains(reference),
            "duplicate reference {} in {}", reference, token
        );
    }
}


//------------ Level B -------------------------------------------------------

#[test]
fn level_b_has_nothing() {
    let source = TimestampSource::new(dialect(), signature_data());
    assert!(source.content_timestamps().is_empty());
    assert!(source.signature_timestamps().is_empty());
    assert!(source.sig_and_refs_timestamps().is_empty());
    assert!(source.refs_only_timestamps().is_empty());
    assert!(source.archive_timestamps().is_empty());
    assert!(source.all_timestamps().is_empty());
    assert!(source.certificate_map(false).is_empty());
    assert!(source.certificates().is_empty());
}


//------------ Level T -------------------------------------------------------

#[test]
fn level_t_signature_timestamp() {
    let mut data = signature_data();
    let mut ts_info = info(SIGNATURE_VALUE);
    ts_info.certificates.push(tsa_cert());
    data.unsigned_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_SIGNATURE_TIMESTAMP),
        AttributeValue::Timestamp(ts_info),
        Bytes::from_static(b"[sig-ts]"),
    ));
    let source = TimestampSource::new(dialect(), data);

    let tokens = source.signature_timestamps();
    assert_eq!(tokens.len(), 1);
    let token = &tokens[0];
    assert_eq!(token.kind(), TimestampKind::Signature);
    assert_eq!(token.match_result(), MatchResult::Matched);
    assert_no_duplicate_references(token);

    // The covered references: the scope, the signature, the signing
    // certificate.
    assert!(token.references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"full document"), ObjectKind::SignedData
    )));
    assert!(token.references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"the signature"), ObjectKind::Signature
    )));
    assert!(token.references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"signer cert"), ObjectKind::Certificate
    )));
    // The non-signing CA certificate is not among them.
    assert!(!token.references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"ca cert"), ObjectKind::Certificate
    )));

    assert!(source.archive_timestamps().is_empty());

    // The TSA certificate surfaces through the aggregate.
    assert_eq!(source.certificates(), vec![tsa_cert()]);
}


//------------ Level LT ------------------------------------------------------

#[test]
fn level_lt_values_do_not_emit_tokens() {
    let mut data = signature_data();
    data.unsigned_attributes = lt_unsigned_attributes();
    let source = TimestampSource::new(dialect(), data);

    assert_eq!(source.signature_timestamps().len(), 1);
    assert!(source.archive_timestamps().is_empty());
    assert!(source.sig_and_refs_timestamps().is_empty());
    assert!(source.refs_only_timestamps().is_empty());
    assert_eq!(source.all_timestamps().len(), 1);
}

#[test]
fn level_lt_timestamp_material_reaches_aggregates() {
    let mut data = signature_data();
    let mut ts_info = info(SIGNATURE_VALUE);
    ts_info.certificates.push(tsa_cert());
    ts_info.crls.push(Bytes::from_static(b"tsa crl"));
    ts_info.ocsps.push(Bytes::from_static(b"tsa ocsp"));
    data.unsigned_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_SIGNATURE_TIMESTAMP),
        AttributeValue::Timestamp(ts_info),
        Bytes::from_static(b"[sig-ts]"),
    ));
    let source = TimestampSource::new(dialect(), data);

    let crls = source.timestamp_crl_sources();
    assert!(crls.binary_by_digest(
        &DigestAlgorithm::Sha256.digest(b"tsa crl")
    ).is_some());
    let ocsps = source.timestamp_ocsp_sources();
    assert!(ocsps.binary_by_digest(
        &DigestAlgorithm::Sha256.digest(b"tsa ocsp")
    ).is_some());
    assert_eq!(source.certificates(), vec![tsa_cert()]);
}


//------------ Level LTA -----------------------------------------------------

#[test]
fn level_lta_archive_covers_everything_before_it() {
    let mut data = signature_data();
    data.unsigned_attributes = lt_unsigned_attributes();
    let covered = lt_archive_data();
    data.unsigned_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_ETS_ARCHIVE_TIMESTAMP_V3),
        AttributeValue::Timestamp(info(&covered)),
        Bytes::from_static(b"[archive]"),
    ));
    let source = TimestampSource::new(dialect(), data);

    let signature_tokens = source.signature_timestamps();
    let archive_tokens = source.archive_timestamps();
    assert_eq!(archive_tokens.len(), 1);
    let t1 = &signature_tokens[0];
    let t2 = &archive_tokens[0];
    assert_eq!(t2.match_result(), MatchResult::Matched);
    assert_no_duplicate_references(t2);

    // The archive timestamp covers the earlier signature timestamp...
    assert!(t2.references().contains(&TimestampedReference::new(
        t1.id(), ObjectKind::Timestamp
    )));
    // ... everything that timestamp covers ...
    for reference in t1.references() {
        assert!(t2.references().contains(reference));
    }
    // ... and the values the LT upgrade added.
    assert!(t2.references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"ca cert"), ObjectKind::Certificate
    )));
    assert!(t2.references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"crl der"), ObjectKind::Revocation
    )));
    assert!(t2.references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"ocsp der"), ObjectKind::Revocation
    )));
}

#[test]
fn archive_without_prior_timestamps_covers_signed_data() {
    // A legal upgrade path goes straight to the archive level: the
    // archive timestamp is the first unsigned attribute, with no earlier
    // timestamp whose references it could inherit.
    let mut data = signature_data();
    let mut covered = CONTENT.to_vec();
    covered.extend_from_slice(SIGNATURE_VALUE);
    data.unsigned_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_ETS_ARCHIVE_TIMESTAMP_V3),
        AttributeValue::Timestamp(info(&covered)),
        Bytes::from_static(b"[archive]"),
    ));
    let source = TimestampSource::new(dialect(), data);

    let tokens = source.archive_timestamps();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].match_result(), MatchResult::Matched);
    assert!(tokens[0].references().contains(&TimestampedReference::new(
        Identifier::from_bytes(b"full document"), ObjectKind::SignedData
    )));
}

#[test]
fn all_timestamps_order_and_length() {
    let mut data = signature_data();
    data.signed_attributes.push(ts_attr(
        oid::AA_ETS_CONTENT_TIMESTAMP, b"[content-ts]", CONTENT
    ));
    data.unsigned_attributes = lt_unsigned_attributes();
    let covered = lt_archive_data();
    data.unsigned_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_ETS_ARCHIVE_TIMESTAMP_V2),
        AttributeValue::Timestamp(info(&covered)),
        Bytes::from_static(b"[archive]"),
    ));
    let source = TimestampSource::new(dialect(), data);

    let all = source.all_timestamps();
    assert_eq!(
        all.len(),
        source.content_timestamps().len()
            + source.signature_timestamps().len()
            + source.sig_and_refs_timestamps().len()
            + source.refs_only_timestamps().len()
            + source.archive_timestamps().len()
    );
    let kinds: Vec<_> = all.iter().map(|token| token.kind()).collect();
    assert_eq!(kinds, vec![
        TimestampKind::Content,
        TimestampKind::Signature,
        TimestampKind::Archive,
    ]);

    // Building again yields pointwise the same lists.
    let again: Vec<_> = source.all_timestamps().iter()
        .map(|token| token.id()).collect();
    let first: Vec<_> = all.iter().map(|token| token.id()).collect();
    assert_eq!(first, again);
}

#[test]
fn certificate_map_counts_across_kinds() {
    let mut data = signature_data();
    let mut content_info = info(CONTENT);
    content_info.certificates.push(tsa_cert());
    data.signed_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_ETS_CONTENT_TIMESTAMP),
        AttributeValue::Timestamp(content_info),
        Bytes::from_static(b"[content-ts]"),
    ));
    data.unsigned_attributes = lt_unsigned_attributes();
    let covered = lt_archive_data();
    data.unsigned_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_ETS_ARCHIVE_TIMESTAMP_V3),
        AttributeValue::Timestamp(info(&covered)),
        Bytes::from_static(b"[archive]"),
    ));
    let source = TimestampSource::new(dialect(), data);

    let map = source.certificate_map(false);
    assert_eq!(map.len(), 3);
    assert_eq!(map["CONTENT_TIMESTAMP0"], vec![tsa_cert()]);
    assert!(map.contains_key("SIGNATURE_TIMESTAMP1"));
    assert!(map.contains_key("ARCHIVE_TIMESTAMP2"));

    // Skipping the last archive timestamp drops exactly that entry.
    let map = source.certificate_map(true);
    assert_eq!(map.len(), 2);
    assert!(!map.contains_key("ARCHIVE_TIMESTAMP2"));
}


//------------ External intake -----------------------------------------------

#[test]
fn external_intake_rejects_non_archive() {
    let mut data = signature_data();
    data.unsigned_attributes = lt_unsigned_attributes();
    let source = TimestampSource::new(dialect(), data);

    let err = source.add_external_timestamp(TimestampToken::new(
        b"external", TimestampKind::ValidationData, info(b"x"), Vec::new()
    )).unwrap_err();
    assert_eq!(err.kind(), TimestampKind::ValidationData);
    assert_eq!(source.archive_timestamps().len(), 0);
}

#[test]
fn external_intake_extends_and_validates() {
    let mut data = signature_data();
    data.unsigned_attributes = lt_unsigned_attributes();
    let covered = lt_archive_data();
    data.unsigned_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_ETS_ARCHIVE_TIMESTAMP_V3),
        AttributeValue::Timestamp(info(&covered)),
        Bytes::from_static(b"[archive]"),
    ));
    let source = TimestampSource::new(dialect(), data);

    let prior_ids: Vec<_> = source.all_timestamps().iter()
        .map(|token| token.id()).collect();
    assert_eq!(prior_ids.len(), 2);

    // The external token covers the whole unsigned list.
    let mut external_covered = lt_archive_data();
    external_covered.extend_from_slice(b"[archive]");
    let mut external_info = info(&external_covered);
    external_info.certificates.push(CertificateToken::new(
        Bytes::from_static(b"fresh tsa cert"), "CN=Fresh TSA", "CN=TSA CA"
    ));
    let external = TimestampToken::new(
        b"external raw", TimestampKind::Archive, external_info, Vec::new()
    );
    source.add_external_timestamp(external).unwrap();

    let archive_tokens = source.archive_timestamps();
    assert_eq!(archive_tokens.len(), 2);
    let external = &archive_tokens[1];
    assert_eq!(external.id(), Identifier::from_bytes(b"external raw"));

    // It references every timestamp that existed before intake.
    for id in prior_ids {
        assert!(external.references().contains(&TimestampedReference::new(
            id, ObjectKind::Timestamp
        )));
    }
    assert_no_duplicate_references(external);

    // Intake validated the new token and left the old one untouched.
    assert_eq!(external.match_result(), MatchResult::Matched);
    assert_eq!(archive_tokens[0].match_result(), MatchResult::Matched);

    // Its certificates joined the aggregate.
    assert!(source.certificates().iter().any(|cert| {
        cert.subject() == "CN=Fresh TSA"
    }));
}


//------------ Degraded input ------------------------------------------------

#[test]
fn malformed_signed_timestamp_is_skipped() {
    let mut data = signature_data();
    data.signed_attributes.push(ts_attr(
        oid::AA_ETS_CONTENT_TIMESTAMP, b"[first]", CONTENT
    ));
    data.signed_attributes.push(CadesAttribute::new(
        attr_oid(oid::AA_ETS_CONTENT_TIMESTAMP),
        AttributeValue::Opaque,
        Bytes::from_static(b"[broken]"),
    ));
    data.signed_attributes.push(ts_attr(
        oid::AA_ETS_CONTENT_TIMESTAMP, b"[last]", CONTENT
    ));
    let source = TimestampSource::new(dialect(), data);

    let tokens = source.content_timestamps();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].id(), Identifier::from_bytes(b"[first]"));
    assert_eq!(tokens[1].id(), Identifier::from_bytes(b"[last]"));
}

#[test]
fn x_timestamps_cover_reference_attributes() {
    // A full ES-X signature: signature timestamp, both reference
    // attributes, a refs-only and a sig-and-refs timestamp.
    let mut data = signature_data();
    let cert_digest = DigestAlgorithm::Sha256.digest(b"ca cert");
    let refs_attr = CadesAttribute::new(
        attr_oid(oid::AA_ETS_CERTIFICATE_REFS),
        AttributeValue::CertificateRefs(vec![cert_digest]),
        Bytes::from_static(b"[cert-refs]"),
    );
    let mut x1_covered = SIGNATURE_VALUE.to_vec();
    x1_covered.extend_from_slice(b"[sig-ts]");
    x1_covered.extend_from_slice(b"[cert-refs]");
    let x2_covered: Vec<u8> = b"[cert-refs]".to_vec();
    data.unsigned_attributes = vec![
        ts_attr(oid::AA_SIGNATURE_TIMESTAMP, b"[sig-ts]", SIGNATURE_VALUE),
        refs_attr,
        ts_attr(oid::AA_ETS_CERT_CRL_TIMESTAMP, b"[x2]", &x2_covered),
        ts_attr(oid::AA_ETS_ESC_TIMESTAMP, b"[x1]", &x1_covered),
    ];
    let source = TimestampSource::new(dialect(), data);

    let x2 = source.refs_only_timestamps();
    assert_eq!(x2.len(), 1);
    assert_eq!(x2[0].match_result(), MatchResult::Matched);
    // The refs-only timestamp covers the accumulated references only.
    assert_eq!(x2[0].references().as_slice(), &[
        TimestampedReference::new(
            Identifier::from_bytes(b"ca cert"), ObjectKind::Certificate
        )
    ]);

    let x1 = source.sig_and_refs_timestamps();
    assert_eq!(x1.len(), 1);
    assert_eq!(x1[0].match_result(), MatchResult::Matched);
    // The sig-and-refs timestamp additionally covers the prior signature
    // timestamp, but not the refs-only one.
    let t1 = &source.signature_timestamps()[0];
    assert!(x1[0].references().contains(&TimestampedReference::new(
        t1.id(), ObjectKind::Timestamp
    )));
    assert!(!x1[0].references().contains(&TimestampedReference::new(
        x2[0].id(), ObjectKind::Timestamp
    )));
    assert_no_duplicate_references(&x1[0]);
}
