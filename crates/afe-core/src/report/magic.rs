//! Magic tag recognition.
//!
//! Every report starts with a 4-byte tag spelling `AFE` followed by a version
//! digit. The tag decides which layout the rest of the buffer uses.

use std::fmt;

use tracing::debug;

use crate::error::{AfeError, AfeResult};

/// The 4-byte tag at offset 0 of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Magic(u32);

impl Magic
{
    /// `AFE0`: registers and fault metadata only
    pub const AFE0: Self = Magic(0x3045_4641);
    /// `AFE1`: adds module base, stack trace and stack dump
    pub const AFE1: Self = Magic(0x3145_4641);
    /// `AFE2`: adds the TLS dump
    pub const AFE2: Self = Magic(0x3245_4641);

    /// Bits compared when deciding family membership.
    ///
    /// Only the high nibble of the version byte survives, so `AFE0`..`AFE9`
    /// (and the few punctuation bytes sharing that nibble) belong to the family.
    pub const FAMILY_MASK: u32 = 0xF0FF_FFFF;

    /// Wrap a raw tag value
    pub const fn new(value: u32) -> Self
    {
        Magic(value)
    }

    /// Read the tag from the first four bytes of `bytes` (little-endian)
    ///
    /// ## Errors
    ///
    /// [`AfeError::TruncatedInput`] when fewer than four bytes are available.
    pub fn read(bytes: &[u8]) -> AfeResult<Self>
    {
        match bytes.first_chunk::<4>() {
            Some(tag) => Ok(Magic(u32::from_le_bytes(*tag))),
            None => Err(AfeError::TruncatedInput {
                region: "magic",
                needed: 4,
                available: bytes.len(),
            }),
        }
    }

    /// Raw tag value
    pub const fn value(self) -> u32
    {
        self.0
    }

    /// The tag bytes as text, with non-printable bytes shown as `.`
    pub fn text(self) -> String
    {
        self.0
            .to_le_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { char::from(b) } else { '.' })
            .collect()
    }

    /// Decide which report kind this tag denotes
    ///
    /// Exact matches are checked from the newest version down, then the
    /// family mask. Pure function of the tag value.
    pub fn classify(self) -> ReportKind
    {
        let kind = if self == Self::AFE2 {
            ReportKind::Version2
        } else if self == Self::AFE1 {
            ReportKind::Version1
        } else if self == Self::AFE0 {
            ReportKind::Version0
        } else if self.0 & Self::FAMILY_MASK == Self::AFE0.0 {
            ReportKind::UnknownSameFamily
        } else {
            ReportKind::NotAReport
        };
        debug!(magic = %self, ?kind, "classified report tag");
        kind
    }
}

impl fmt::Display for Magic
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} (0x{:X})", self.text(), self.0)
    }
}

/// Outcome of looking at a report's magic tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind
{
    /// `AFE0` layout
    Version0,
    /// `AFE1` layout
    Version1,
    /// `AFE2` layout
    Version2,
    /// Same family as `AFE0` but not a version we can decode
    UnknownSameFamily,
    /// Not a fatal-error report
    NotAReport,
}

/// Classify a buffer by its first four bytes
///
/// Does not look past the tag.
///
/// ## Errors
///
/// [`AfeError::TruncatedInput`] when the buffer is shorter than four bytes.
///
/// ## Example
///
/// ```rust
/// use afe_core::report::{classify, ReportKind};
///
/// assert_eq!(classify(b"AFE2").unwrap(), ReportKind::Version2);
/// assert_eq!(classify(b"AFE7").unwrap(), ReportKind::UnknownSameFamily);
/// assert_eq!(classify(b"\x7fELF").unwrap(), ReportKind::NotAReport);
/// ```
pub fn classify(bytes: &[u8]) -> AfeResult<ReportKind>
{
    Magic::read(bytes).map(Magic::classify)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_constants_spell_afe()
    {
        assert_eq!(Magic::AFE0.text(), "AFE0");
        assert_eq!(Magic::AFE1.text(), "AFE1");
        assert_eq!(Magic::AFE2.text(), "AFE2");
    }

    #[test]
    fn test_display()
    {
        assert_eq!(Magic::AFE2.to_string(), "AFE2 (0x32454641)");
        assert_eq!(Magic::new(0x0045_4641).to_string(), "AFE. (0x454641)");
    }

    #[test]
    fn test_family_mask_only_checks_high_nibble_of_version()
    {
        // ':' is 0x3A, same high nibble as the digits
        assert_eq!(classify(b"AFE:").unwrap(), ReportKind::UnknownSameFamily);
        // 'A' is 0x41, different high nibble
        assert_eq!(classify(b"AFEA").unwrap(), ReportKind::NotAReport);
        // Lowercase prefix is a different tag entirely
        assert_eq!(classify(b"afe0").unwrap(), ReportKind::NotAReport);
    }

    #[test]
    fn test_short_buffer()
    {
        let err = classify(b"AF").unwrap_err();
        assert!(matches!(err, AfeError::TruncatedInput { needed: 4, available: 2, .. }));
    }
}
