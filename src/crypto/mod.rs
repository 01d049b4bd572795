//! Cryptographic building blocks.
//!
//! Only digests live here. Signature verification and certificate path
//! building are the business of the enclosing validator.

pub mod digest;

pub use self::digest::{Context, Digest, DigestAlgorithm};
