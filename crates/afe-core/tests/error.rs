//! Tests for error handling

use afe_core::error::{AfeError, AfeResult};
use afe_core::report::{parse_report, Magic};
use afe_core::resolve::ResolveError;

#[test]
fn test_unrecognized_format_display()
{
    let err = AfeError::UnrecognizedFormat {
        magic: Magic::new(0x464C_457F),
    };
    assert_eq!(err.to_string(), "Passed file is not a valid AFE file (magic 0x464C457F)");
}

#[test]
fn test_unknown_version_display()
{
    let err = AfeError::UnknownVersion(Magic::new(0x3745_4641));
    assert_eq!(err.to_string(), "Passed file contains an unknown AFE version: AFE7 (0x37454641)");
}

#[test]
fn test_truncated_input_display()
{
    let err = AfeError::TruncatedInput {
        region: "stack dump",
        needed: 0x270,
        available: 0x26F,
    };
    let message = err.to_string();
    assert!(message.contains("stack dump"));
    assert!(message.contains("624"));
    assert!(message.contains("623"));
}

#[test]
fn test_capacity_and_alignment_display()
{
    let err = AfeError::CapacityExceeded {
        field: "stack_trace_size",
        declared: 40,
        capacity: 32,
    };
    assert!(err.to_string().contains("stack_trace_size is 40"));

    let err = AfeError::MisalignedDump { declared: 24 };
    assert!(err.to_string().contains("not a multiple of 16"));
}

#[test]
fn test_io_error_conversion()
{
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "report.bin");
    let err: AfeError = io_err.into();
    assert!(matches!(err, AfeError::Io(_)));
    assert!(err.to_string().starts_with("IO error:"));
}

#[test]
fn test_parse_error_propagates_with_question_mark()
{
    fn parse(bytes: &[u8]) -> AfeResult<u8>
    {
        let report = parse_report(bytes)?;
        Ok(report.version())
    }

    assert!(matches!(parse(b"NOPE"), Err(AfeError::UnrecognizedFormat { .. })));
}

#[test]
fn test_resolve_error_display()
{
    assert_eq!(ResolveError::NoOutput.to_string(), "symbolizer produced no output");
    assert_eq!(ResolveError::NoFrames.to_string(), "no frames found for address");
    let launch = ResolveError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
    assert!(launch.to_string().starts_with("failed to run symbolizer"));
}
