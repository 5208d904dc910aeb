//! Content fingerprints used as embedding cache keys.
//!
//! A [`Fingerprint`] is the BLAKE3 digest of the normalized text. Normalization only trims
//! surrounding whitespace; case and inner whitespace are preserved, so `"Boot"` and `"boot"`
//! are different cache entries.

use std::fmt;

/// Normalizes text before fingerprinting (trim only, case-preserving).
#[inline]
pub fn normalize_text(text: &str) -> &str {
    text.trim()
}

/// 32-byte BLAKE3 digest of normalized text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprints `text` after [`normalize_text`].
    #[inline]
    pub fn of(text: &str) -> Self {
        Self(*blake3::hash(normalize_text(text).as_bytes()).as_bytes())
    }

    /// Wraps a precomputed digest.
    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 8 bytes as a little-endian integer, for compact log fields.
    #[inline]
    pub fn short(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Full lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:016x})", self.short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Shorthand for [`Fingerprint::of`].
#[inline]
pub fn fingerprint(text: &str) -> Fingerprint {
    Fingerprint::of(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fingerprint_determinism() {
        let text = "Cannot get my device to boot";

        let fp1 = fingerprint(text);
        let fp2 = fingerprint(text);
        let fp3 = fingerprint(text);

        assert_eq!(fp1, fp2);
        assert_eq!(fp2, fp3);
    }

    #[test]
    fn test_fingerprint_ignores_surrounding_whitespace() {
        assert_eq!(fingerprint("  disk image \n"), fingerprint("disk image"));
    }

    #[test]
    fn test_fingerprint_preserves_case_and_inner_whitespace() {
        let inputs = ["disk image", "Disk image", "DISK IMAGE", "disk  image"];

        let unique: HashSet<_> = inputs.iter().map(|t| fingerprint(t)).collect();
        assert_eq!(unique.len(), inputs.len());
    }

    #[test]
    fn test_fingerprint_empty_string() {
        let fp = fingerprint("");
        assert!(!fp.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(fp, fingerprint("   "));
    }

    #[test]
    fn test_fingerprint_hex_roundtrip_length() {
        let fp = fingerprint("boot loader");
        assert_eq!(fp.to_hex().len(), 64);
        assert_eq!(fp.to_string(), fp.to_hex());
    }

    #[test]
    fn test_fingerprint_short_matches_prefix() {
        let fp = fingerprint("tried three images");
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&fp.as_bytes()[..8]);
        assert_eq!(fp.short(), u64::from_le_bytes(prefix));
    }

    #[test]
    fn test_fingerprint_from_bytes() {
        let fp = fingerprint("abc");
        assert_eq!(Fingerprint::from_bytes(*fp.as_bytes()), fp);
    }
}
