//! Certificates as validation material.
//!
//! This crate never parses X.509 itself. A [`CertificateToken`] is handed
//! over by the enclosing parser with its DER encoding and the few decoded
//! fields the timestamp machinery needs. What this module adds is identity
//! (via [`Identifier`]), digest-based lookup, and the source types that
//! collect certificates found in the signature and inside timestamps.

use std::fmt;
use bytes::Bytes;
use crate::crypto::{Digest, DigestAlgorithm};
use crate::identifier::Identifier;


//------------ CertificateToken ----------------------------------------------

/// A parsed X.509 certificate.
///
/// The token is immutable once produced. Equality is identity: two tokens
/// compare equal exactly when they were derived from the same DER encoding.
#[derive(Clone, Debug)]
pub struct CertificateToken {
    id: Identifier,
    der: Bytes,
    subject: String,
    issuer: String,
}

impl CertificateToken {
    /// Creates a new token from its DER encoding and decoded names.
    pub fn new(
        der: impl Into<Bytes>,
        subject: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        let der = der.into();
        CertificateToken {
            id: Identifier::from_bytes(der.as_ref()),
            der,
            subject: subject.into(),
            issuer: issuer.into(),
        }
    }

    /// Returns the stable identifier of the certificate.
    pub fn id(&self) -> Identifier {
        self.id
    }

    /// Returns the DER encoding of the certificate.
    pub fn der(&self) -> &Bytes {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns whether the certificate is self-signed.
    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer
    }

    /// Returns the digest of the DER encoding under the given algorithm.
    pub fn digest(&self, algorithm: DigestAlgorithm) -> Digest {
        algorithm.digest(self.der.as_ref())
    }
}


//--- PartialEq and Eq

impl PartialEq for CertificateToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CertificateToken { }


//--- Display

impl fmt::Display for CertificateToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.subject, self.id)
    }
}


//------------ CertificateRef ------------------------------------------------

/// A digest reference to a certificate that was not recovered.
///
/// Complete-certificate-references attributes list certificates by digest
/// only. When no matching certificate value can be found anywhere, the
/// reference itself becomes the covered object, with an identity of its
/// own derived from the digest.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificateRef {
    digest: Digest,
    id: Identifier,
}

impl CertificateRef {
    pub fn new(digest: Digest) -> Self {
        CertificateRef {
            id: Identifier::from_digest(&digest),
            digest,
        }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }
}


//------------ CertificateSource ---------------------------------------------

/// A collection of certificates and certificate references.
///
/// Keeps insertion order, deduplicates by identifier and supports lookup by
/// digest. One such source holds the certificates the signature itself
/// carries, another accumulates the certificates found inside timestamps.
#[derive(Clone, Debug, Default)]
pub struct CertificateSource {
    certificates: Vec<CertificateToken>,
    refs: Vec<CertificateRef>,
    signing: Vec<Identifier>,
}

impl CertificateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a certificate unless it is already present.
    pub fn add_certificate(&mut self, cert: CertificateToken) {
        if !self.certificates.iter().any(|item| item.id() == cert.id()) {
            self.certificates.push(cert)
        }
    }

    /// Adds a certificate and marks it as a signing certificate.
    pub fn add_signing_certificate(&mut self, cert: CertificateToken) {
        let id = cert.id();
        self.add_certificate(cert);
        if !self.signing.contains(&id) {
            self.signing.push(id)
        }
    }

    /// Adds a certificate reference unless it is already present.
    pub fn add_ref(&mut self, cert_ref: CertificateRef) {
        if !self.refs.iter().any(|item| item.id() == cert_ref.id()) {
            self.refs.push(cert_ref)
        }
    }

    /// Returns all certificates in insertion order.
    pub fn certificates(&self) -> &[CertificateToken] {
        &self.certificates
    }

    /// Returns the certificates used for signing.
    pub fn signing_certificates(
        &self
    ) -> impl Iterator<Item = &CertificateToken> + '_ {
        self.certificates.iter().filter(|cert| {
            self.signing.contains(&cert.id())
        })
    }

    /// Looks up a certificate whose encoding matches the given digest.
    pub fn certificate_by_digest(
        &self, digest: &Digest
    ) -> Option<&CertificateToken> {
        self.certificates.iter().find(|cert| {
            digest.matches(cert.der().as_ref())
        })
    }

    /// Looks up a declared reference carrying exactly the given digest.
    pub fn ref_by_digest(&self, digest: &Digest) -> Option<&CertificateRef> {
        self.refs.iter().find(|item| item.digest() == digest)
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty() && self.refs.is_empty()
    }
}


//------------ ListCertificateSource -----------------------------------------

/// An append-only list of certificate sources.
///
/// Component sources keep their identity and order; lookups delegate
/// across all of them. Nothing is ever removed.
#[derive(Clone, Debug, Default)]
pub struct ListCertificateSource {
    sources: Vec<CertificateSource>,
}

impl ListCertificateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a component source.
    pub fn add(&mut self, source: CertificateSource) {
        self.sources.push(source)
    }

    /// Returns the component sources in insertion order.
    pub fn sources(&self) -> &[CertificateSource] {
        &self.sources
    }

    /// Looks up a certificate by digest across all component sources.
    pub fn certificate_by_digest(
        &self, digest: &Digest
    ) -> Option<&CertificateToken> {
        self.sources.iter().find_map(|source| {
            source.certificate_by_digest(digest)
        })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}


//============ Tests =========================================================
