//! Digest algorithms and values.

use std::fmt;
use bytes::Bytes;
use ring::digest;
use crate::util::hex;


//------------ DigestAlgorithm -----------------------------------------------

/// The digest algorithms found in advanced signature material.
///
/// Unlike tightly profiled PKIs, advanced signatures mix algorithms freely:
/// an old signature may reference certificates by SHA-1 digest while its
/// archive timestamp uses SHA-512. Every digest value therefore travels
/// together with its algorithm.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the digest size in octets for this algorithm.
    pub fn digest_len(self) -> usize {
        self.ring().output_len()
    }

    /// Returns the conventional name of the algorithm.
    ///
    /// The name is stable and used when deriving identifiers from digests,
    /// so it must never change for an existing variant.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    fn ring(self) -> &'static digest::Algorithm {
        match self {
            DigestAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            DigestAlgorithm::Sha256 => &digest::SHA256,
            DigestAlgorithm::Sha384 => &digest::SHA384,
            DigestAlgorithm::Sha512 => &digest::SHA512,
        }
    }
}

/// # Creating Digest Values
///
impl DigestAlgorithm {
    /// Returns the digest of `data` using this algorithm.
    pub fn digest(self, data: &[u8]) -> Digest {
        Digest::new(
            self,
            Bytes::copy_from_slice(digest::digest(self.ring(), data).as_ref())
        )
    }

    /// Returns a digest context for multi-step calculation of the digest.
    pub fn start(self) -> Context {
        Context {
            context: digest::Context::new(self.ring()),
            algorithm: self,
        }
    }
}


//--- Default

impl Default for DigestAlgorithm {
    fn default() -> Self {
        DigestAlgorithm::Sha256
    }
}


//--- Display

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}


//------------ Digest --------------------------------------------------------

/// An algorithm-qualified digest value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    value: Bytes,
}

impl Digest {
    /// Creates a digest from an algorithm and a raw value.
    pub fn new(algorithm: DigestAlgorithm, value: impl Into<Bytes>) -> Self {
        Digest { algorithm, value: value.into() }
    }

    /// Returns the algorithm the value was produced with.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Returns the digest value.
    pub fn value(&self) -> &[u8] {
        self.value.as_ref()
    }

    /// Returns whether digesting `data` with our algorithm yields our value.
    pub fn matches(&self, data: &[u8]) -> bool {
        digest::digest(self.algorithm.ring(), data).as_ref()
            == self.value.as_ref()
    }
}


//--- Display

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:", self.algorithm)?;
        hex::format(self.value(), f)
    }
}


//------------ Context -------------------------------------------------------

/// A context for multi-step digest calculation.
#[derive(Clone)]
pub struct Context {
    context: digest::Context,
    algorithm: DigestAlgorithm,
}

impl Context {
    pub fn update(&mut self, data: &[u8]) {
        self.context.update(data)
    }

    pub fn finish(self) -> Digest {
        Digest::new(
            self.algorithm,
            Bytes::copy_from_slice(self.context.finish().as_ref())
        )
    }
}


//============ Tests =========================================================
