//! OCSP responses as validation material.
//!
//! The OCSP side mirrors the CRL side: encapsulated response binaries,
//! digest references, a per-signature source and an append-only
//! list-source merging material across the signature and its timestamps.

use std::fmt;
use bytes::Bytes;
use crate::crypto::{Digest, DigestAlgorithm};
use crate::identifier::Identifier;


//------------ OcspResponseBinary --------------------------------------------

/// An encapsulated OCSP response.
#[derive(Clone, Debug)]
pub struct OcspResponseBinary {
    id: Identifier,
    der: Bytes,
}

impl OcspResponseBinary {
    pub fn new(der: impl Into<Bytes>) -> Self {
        let der = der.into();
        OcspResponseBinary {
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

impl PartialEq for OcspResponseBinary {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OcspResponseBinary { }


//--- Display

impl fmt::Display for OcspResponseBinary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OCSP response {}", self.id)
    }
}


//------------ OcspRef -------------------------------------------------------

/// A digest reference to an OCSP response that was not recovered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OcspRef {
    digest: Digest,
    id: Identifier,
}

impl OcspRef {
    pub fn new(digest: Digest) -> Self {
        OcspRef {
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


//------------ OcspSource ----------------------------------------------------

/// A collection of OCSP response binaries and references.
///
/// Keeps insertion order and deduplicates by identifier.
#[derive(Clone, Debug, Default)]
pub struct OcspSource {
    binaries: Vec<OcspResponseBinary>,
    refs: Vec<OcspRef>,
}

impl OcspSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an encapsulated response unless it is already present.
    pub fn add_binary(&mut self, binary: OcspResponseBinary) {
        if !self.binaries.iter().any(|item| item.id() == binary.id()) {
            self.binaries.push(binary)
        }
    }

    /// Adds a response reference unless it is already present.
    pub fn add_ref(&mut self, ocsp_ref: OcspRef) {
        if !self.refs.iter().any(|item| item.id() == ocsp_ref.id()) {
            self.refs.push(ocsp_ref)
        }
    }

    pub fn binaries(&self) -> &[OcspResponseBinary] {
        &self.binaries
    }

    pub fn refs(&self) -> &[OcspRef] {
        &self.refs
    }

    /// Looks up an encapsulated response whose encoding matches the digest.
    pub fn binary_by_digest(
        &self, digest: &Digest
    ) -> Option<&OcspResponseBinary> {
        self.binaries.iter().find(|item| {
            digest.matches(item.der().as_ref())
        })
    }

    /// Looks up a declared reference carrying exactly the given digest.
    pub fn ref_by_digest(&self, digest: &Digest) -> Option<&OcspRef> {
        self.refs.iter().find(|item| item.digest() == digest)
    }

    pub fn is_empty(&self) -> bool {
        self.binaries.is_empty() && self.refs.is_empty()
    }
}


//------------ ListOcspSource ------------------------------------------------

/// An append-only list of OCSP sources.
#[derive(Clone, Debug, Default)]
pub struct ListOcspSource {
    sources: Vec<OcspSource>,
}

impl ListOcspSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list source seeded with one component.
    pub fn with_source(source: OcspSource) -> Self {
        ListOcspSource { sources: vec![source] }
    }

    /// Appends a component source.
    pub fn add(&mut self, source: OcspSource) {
        self.sources.push(source)
    }

    pub fn sources(&self) -> &[OcspSource] {
        &self.sources
    }

    /// Looks up an encapsulated response by digest across all components.
    pub fn binary_by_digest(
        &self, digest: &Digest
    ) -> Option<&OcspResponseBinary> {
        self.sources.iter().find_map(|source| {
            source.binary_by_digest(digest)
        })
    }

    /// Looks up a declared reference by digest across all components.
    pub fn ref_by_digest(&self, digest: &Digest) -> Option<&OcspRef> {
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
