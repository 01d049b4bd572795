//! The object identifiers used in this crate.
//!
//! This module collects all the object identifiers used at various places
//! in this crate in one central place. They are public so you can refer to
//! them should that ever become necessary.
//!
//! Most of these identify the signed and unsigned CMS attributes a CAdES
//! signature is built from. The attribute classifier compares the OID of
//! each attribute it encounters against these constants.

use bcder::{ConstOid, Oid};

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-contentTimestamp`
///
/// A timestamp over the signed content, taken before signing.
pub const AA_ETS_CONTENT_TIMESTAMP: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 20]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-signatureTimeStampToken`
///
/// A timestamp over the signature value.
pub const AA_SIGNATURE_TIMESTAMP: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 14]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-certificateRefs`
///
/// References (by digest) to the full set of CA certificates used to
/// validate the signature.
pub const AA_ETS_CERTIFICATE_REFS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 21]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-revocationRefs`
///
/// References (by digest) to the full set of revocation data used to
/// validate the signature.
pub const AA_ETS_REVOCATION_REFS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 22]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-certValues`
///
/// The certificate values themselves, carried inside the signature.
pub const AA_ETS_CERT_VALUES: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 23]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-revocationValues`
///
/// The revocation values themselves, carried inside the signature.
pub const AA_ETS_REVOCATION_VALUES: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 24]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-escTimeStamp`
///
/// A timestamp over the signature value plus the complete reference
/// attributes, also known as an ES-X type 1 timestamp.
pub const AA_ETS_ESC_TIMESTAMP: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 25]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-certCRLTimestamp`
///
/// A timestamp over the complete reference attributes only, also known as
/// an ES-X type 2 timestamp.
pub const AA_ETS_CERT_CRL_TIMESTAMP: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 26]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-attrCertificateRefs`
///
/// References to certificates for attribute authorities.
pub const AA_ETS_ATTR_CERTIFICATE_REFS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 44]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-attrRevocationRefs`
///
/// References to revocation data for attribute authorities.
pub const AA_ETS_ATTR_REVOCATION_REFS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 45]);

/// [RFC 5126](https://tools.ietf.org/html/rfc5126) `id-aa-ets-archiveTimestampV2`
///
/// An archive timestamp re-sealing the signature and all validation
/// material collected so far.
pub const AA_ETS_ARCHIVE_TIMESTAMP_V2: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 48]);

/// [ETSI EN 319 122-1] `id-aa-ets-archiveTimestampV3`
///
/// The current archive timestamp attribute, hashing through an
/// `ats-hash-index` structure.
///
/// [ETSI EN 319 122-1]: https://www.etsi.org/deliver/etsi_en/319100_319199/31912201/
pub const AA_ETS_ARCHIVE_TIMESTAMP_V3: ConstOid
    = Oid(&[4, 0, 141, 69, 2, 4]);
