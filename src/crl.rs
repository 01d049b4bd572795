//! Certificate revocation lists as validation material.
//!
//! Advanced signatures embed CRLs in two forms: as encapsulated values
//! (the DER of the list itself) and as references by digest. This module
//! provides both, plus the per-signature source and the append-only
//! list-source that merges the signature's CRLs with those recovered from
//! timestamp tokens.

use std::fmt;
use bytes::Bytes;
use crate::crypto::{Digest, DigestAlgorithm};
use crate::identifier::Identifier;


//------------ CrlBinary -----------------------------------------------------

/// An encapsulated certificate revocation list.
///
/// Only the raw DER is kept. Parsing the list and checking revocation
/// status happens elsewhere; here the list is a piece of timestamped
/// material with an identity.
#[derive(Clone, Debug)]
pub struct CrlBinary {
    id: Identifier,
    der: Bytes,
}

impl CrlBinary {
    pub fn new(der: impl Into<Bytes>) -> Self {
        let der = der.into();
        CrlBinary {
            id: Identifier::from_bytes(der.as_ref()),
            der,
        }
    }

    pub fn id(&self) -> Identifier {
        self.id
    }

    pub fn der(&self) -> &Bytes {
        &self.der
    }

    /// Returns the digest of the DER encoding under the given algorithm.
    pub fn digest(&self, algorithm: DigestAlgorithm) -> Digest {
        algorithm.digest(self.der.as_ref())
    }
}


//--- PartialEq and Eq

impl PartialEq for CrlBinary {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CrlBinary { }


//--- Display

impl fmt::Display for CrlBinary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CRL {}", self.id)
    }
}


//------------ CrlRef --------------------------------------------------------

/// A digest reference to a CRL that was not recovered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrlRef {
    digest: Digest,
    id: Identifier,
}

impl CrlRef {
    pub fn new(digest: Digest) -> Self {
        CrlRef {
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


//------------ CrlSource -----------------------------------------------------

/// A collection of CRL binaries and references.
///
/// Keeps insertion order and deduplicates by identifier.
#[derive(Clone, Debug, Default)]
pub struct CrlSource {
    binaries: Vec<CrlBinary>,
    refs: Vec<CrlRef>,
}

impl CrlSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an encapsulated CRL unless it is already present.
    pub fn add_binary(&mut self, binary: CrlBinary) {
        if !self.binaries.iter().any(|item| item.id() == binary.id()) {
            self.binaries.push(binary)
        }
    }

    /// Adds a CRL reference unless it is already present.
    pub fn add_ref(&mut self, crl_ref: CrlRef) {
        if !self.refs.iter().any(|item| item.id() == crl_ref.id()) {
            self.refs.push(crl_ref)
        }
    }

    pub fn binaries(&self) -> &[CrlBinary] {
        &self.binaries
    }

    pub fn refs(&self) -> &[CrlRef] {
        &self.refs
    }

    /// Looks up an encapsulated CRL whose encoding matches the digest.
    pub fn binary_by_digest(&self, digest: &Digest) -> Option<&CrlBinary> {
        self.binaries.iter().find(|item| {
            digest.matches(item.der().as_ref())
        })
    }

    /// Looks up a declared reference carrying exactly the given digest.
    pub fn ref_by_digest(&self, digest: &Digest) -> Option<&CrlRef> {
        self.refs.iter().find(|item| item.digest() == digest)
    }

    pub fn is_empty(&self) -> bool {
        self.binaries.is_empty() && self.refs.is_empty()
    }
}


//------------ ListCrlSource -------------------------------------------------

/// An append-only list of CRL sources.
///
/// The first component is typically the signature's own CRL source; each
/// timestamp that carries CRLs contributes another. Components keep their
/// order, lookups delegate across all of them and nothing is ever removed.
#[derive(Clone, Debug, Default)]
pub struct ListCrlSource {
    sources: Vec<CrlSource>,
}

impl ListCrlSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list source seeded with one component.
    pub fn with_source(source: CrlSource) -> Self {
        ListCrlSource { sources: vec![source] }
    }

    /// Appends a component source.
    pub fn add(&mut self, source: CrlSource) {
        self.sources.push(source)
    }

    pub fn sources(&self) -> &[CrlSource] {
        &self.sources
    }

    /// Looks up an encapsulated CRL by digest across all components.
    pub fn binary_by_digest(&self, digest: &Digest) -> Option<&CrlBinary> {
        self.sources.iter().find_map(|source| {
            source.binary_by_digest(digest)
        })
    }

    /// Looks up a declared CRL reference by digest across all components.
    pub fn ref_by_digest(&self, digest: &Digest) -> Option<&CrlRef> {
        self.sources.iter().find_map(|source| {
            source.ref_by_digest(digest)
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
