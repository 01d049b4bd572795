//! Stable identities for validation material.

use std::fmt;
use std::str::FromStr;
use ring::digest;
use crate::crypto::Digest;
use crate::util::hex;


//------------ Identifier ----------------------------------------------------

/// A stable identity for a piece of validation material.
///
/// Certificates, CRLs, OCSP responses, timestamp tokens and reference
/// digests all get an identifier derived from their raw octets. Equality of
/// identifiers defines identity of the underlying material, so the same
/// certificate encountered in the signature and again inside a timestamp
/// collapses into one entry.
///
/// There are two distinct derivations: [`from_bytes`][Self::from_bytes]
/// hashes the encoded material itself and is used for everything carried by
/// value, while [`from_digest`][Self::from_digest] hashes an
/// algorithm-qualified digest and is used for material only referenced by
/// digest. The two never collide for the same object, which is what keeps a
/// recovered certificate distinct from a mere reference to it.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Identifier([u8; 32]);

impl Identifier {
    /// Creates the identifier for an encapsulated value.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(
            digest::digest(&digest::SHA256, data)
                .as_ref().try_into().unwrap()
        )
    }

    /// Creates the identifier for material referenced by digest.
    pub fn from_digest(digest_ref: &Digest) -> Self {
        let mut ctx = digest::Context::new(&digest::SHA256);
        ctx.update(digest_ref.algorithm().name().as_bytes());
        ctx.update(b":");
        ctx.update(digest_ref.value());
        Self(ctx.finish().as_ref().try_into().unwrap())
    }

    /// Returns an octet slice of the identifier's value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- FromStr

impl FromStr for Identifier {
    type Err = ParseIdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        fn nibble(ch: u8) -> Result<u8, ParseIdentifierError> {
            match ch {
                b'0'..=b'9' => Ok(ch - b'0'),
                b'a'..=b'f' => Ok(ch - b'a' + 10),
                b'A'..=b'F' => Ok(ch - b'A' + 10),
                _ => Err(ParseIdentifierError),
            }
        }

        let value = value.as_bytes();
        if value.len() != 64 {
            return Err(ParseIdentifierError)
        }
        let mut res = [0u8; 32];
        for (octet, pair) in res.iter_mut().zip(value.chunks(2)) {
            *octet = (nibble(pair[0])? << 4) | nibble(pair[1])?;
        }
        Ok(Self(res))
    }
}


//--- AsRef

impl AsRef<[u8]> for Identifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Display and Debug

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        hex::format(self.as_slice(), f)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Identifier({})", self)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Identifier {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct IdentifierVisitor;

        impl serde::de::Visitor<'_> for IdentifierVisitor {
            type Value = Identifier;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter, "a string with a hex-encoded identifier")
            }

            fn visit_str<E: serde::de::Error>(
                self, s: &str
            ) -> Result<Self::Value, E> {
                Identifier::from_str(s).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(IdentifierVisitor)
    }
}


//------------ ParseIdentifierError ------------------------------------------

/// A string could not be parsed into an identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseIdentifierError;

impl fmt::Display for ParseIdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid identifier")
    }
}

impl std::error::Error for ParseIdentifierError { }


//============ Tests =========================================================
