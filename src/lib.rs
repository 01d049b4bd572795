//! Timestamp handling for advanced electronic signatures.
//!
//! Advanced signatures of the CAdES and XAdES families carry their own
//! validation material: as a signature is upgraded through the B, T, LT and
//! LTA levels, timestamp tokens, certificates, CRLs and OCSP responses
//! accumulate inside its properties. This crate implements the subsystem
//! that digs all of that out again. Given a parsed signature it discovers
//! every embedded timestamp token, classifies it, computes the exact set of
//! artifacts each timestamp cryptographically covers, collects the
//! validation material found inside timestamps into aggregate sources, and
//! rebuilds the octet stream each timestamp was computed over so that its
//! message imprint can be checked.
//!
//! The crate deliberately does not parse the signature container itself.
//! Certificates, revocation material and signature attributes arrive
//! pre-decomposed from the enclosing parser; what happens here is the
//! ordering-sensitive classification, reference bookkeeping and data
//! reconstruction that turns those pieces into verifiable timestamps. The
//! entry point is [`timestamp::TimestampSource`], parameterised over a
//! [`timestamp::Dialect`] describing one concrete signature format.

pub mod cert;
pub mod crl;
pub mod crypto;
pub mod identifier;
pub mod ocsp;
pub mod oid;
pub mod timestamp;

mod util;
