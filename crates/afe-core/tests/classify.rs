//! Tests for magic tag classification

mod common;

use afe_core::report::{classify, Magic, ReportKind};
use common::{ReportBuilder, MAGIC_AFE0, MAGIC_AFE1, MAGIC_AFE2};

#[test]
fn test_exact_tags_select_versions()
{
    assert_eq!(classify(&MAGIC_AFE0.to_le_bytes()).unwrap(), ReportKind::Version0);
    assert_eq!(classify(&MAGIC_AFE1.to_le_bytes()).unwrap(), ReportKind::Version1);
    assert_eq!(classify(&MAGIC_AFE2.to_le_bytes()).unwrap(), ReportKind::Version2);
}

#[test]
fn test_tags_spell_afe_on_disk()
{
    assert_eq!(classify(b"AFE0").unwrap(), ReportKind::Version0);
    assert_eq!(classify(b"AFE1").unwrap(), ReportKind::Version1);
    assert_eq!(classify(b"AFE2").unwrap(), ReportKind::Version2);
}

#[test]
fn test_future_versions_are_same_family()
{
    for digit in b'3'..=b'9' {
        let tag = [b'A', b'F', b'E', digit];
        assert_eq!(classify(&tag).unwrap(), ReportKind::UnknownSameFamily, "tag {digit}");
    }
}

#[test]
fn test_mask_is_applied_to_version_byte_only()
{
    let masked = Magic::AFE0.value() & Magic::FAMILY_MASK;
    assert_eq!(masked, Magic::AFE0.value());
    // Low nibble of the version byte is ignored
    assert_eq!(classify(&0x3F45_4641u32.to_le_bytes()).unwrap(), ReportKind::UnknownSameFamily);
    // Any change in the first three bytes leaves the family
    assert_eq!(classify(&0x3045_4642u32.to_le_bytes()).unwrap(), ReportKind::NotAReport);
    assert_eq!(classify(&0x3046_4641u32.to_le_bytes()).unwrap(), ReportKind::NotAReport);
}

#[test]
fn test_foreign_files_are_not_reports()
{
    assert_eq!(classify(b"\x7fELF\x02\x01\x01").unwrap(), ReportKind::NotAReport);
    assert_eq!(classify(b"NRO0").unwrap(), ReportKind::NotAReport);
    assert_eq!(classify(&[0u8; 4]).unwrap(), ReportKind::NotAReport);
}

#[test]
fn test_classify_ignores_the_rest_of_the_buffer()
{
    let full = ReportBuilder::v1().build();
    assert_eq!(classify(&full).unwrap(), ReportKind::Version1);
    assert_eq!(classify(&full[..4]).unwrap(), ReportKind::Version1);
}

#[test]
fn test_classify_needs_four_bytes()
{
    assert!(classify(b"AFE").is_err());
    assert!(classify(&[]).is_err());
}
