//! Formatting octet sequences as hex.

use std::fmt;


/// Writes an octet sequence to a formatter as lowercase hex.
///
/// Identifiers and digests display through this so their textual form
/// stays uniform across the crate.
pub fn format(src: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    for ch in src {
        write!(f, "{:02x}", ch)?;
    }
    Ok(())
}


//============ Tests =========================================================
