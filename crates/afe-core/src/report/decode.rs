//! Decoding of raw report buffers into typed [`Report`]s.
//!
//! The decoder never pads: every region it reads must be fully present in the
//! buffer, and the variable-length regions are bounded by the counts declared
//! in the header, checked against the storage the device reserves for them.

use tracing::debug;

use super::layout::{
    DUMP_ROW, GPR_SLOTS, STACK_DUMP_CAPACITY, STACK_DUMP_OFFSET, STACK_TRACE_CAPACITY, STACK_TRACE_OFFSET,
    TLS_DUMP_SIZE, TLS_OFFSET, V0_SIZE, V1_HEADER_SIZE, V2_SIZE,
};
use super::magic::{classify, Magic, ReportKind};
use super::{FaultMetadata, Report, ReportHeader, ReportV0, ReportV1, ReportV2, StackCapture};
use crate::error::{AfeError, AfeResult};
use crate::types::{Address, ModuleBase, RegisterSnapshot, GENERAL_PURPOSE_COUNT};

/// Classify a buffer and decode it in one step
///
/// This is the main entry point for turning file contents into a report.
///
/// ## Errors
///
/// - [`AfeError::UnrecognizedFormat`] / [`AfeError::UnknownVersion`] for tags
///   that are not a decodable layout
/// - [`AfeError::TruncatedInput`], [`AfeError::CapacityExceeded`] and
///   [`AfeError::MisalignedDump`] for corrupt or partially written reports
///
/// ## Example
///
/// ```rust
/// use afe_core::error::AfeError;
/// use afe_core::report::parse_report;
///
/// let err = parse_report(b"AFE7 and then some").unwrap_err();
/// assert!(matches!(err, AfeError::UnknownVersion(_)));
/// ```
pub fn parse_report(bytes: &[u8]) -> AfeResult<Report>
{
    let kind = classify(bytes)?;
    decode(bytes, kind)
}

/// Decode `bytes` using the layout selected by `kind`
///
/// `kind` is normally the result of [`classify`] on the same buffer. The two
/// non-decodable kinds are turned into their matching errors.
///
/// ## Errors
///
/// See [`parse_report`].
pub fn decode(bytes: &[u8], kind: ReportKind) -> AfeResult<Report>
{
    debug!(?kind, len = bytes.len(), "decoding report");
    match kind {
        ReportKind::Version0 => decode_v0(bytes).map(Report::V0),
        ReportKind::Version1 => decode_v1(bytes).map(Report::V1),
        ReportKind::Version2 => decode_v2(bytes).map(Report::V2),
        ReportKind::UnknownSameFamily => Err(AfeError::UnknownVersion(Magic::read(bytes)?)),
        ReportKind::NotAReport => Err(AfeError::UnrecognizedFormat {
            magic: Magic::read(bytes)?,
        }),
    }
}

fn decode_v0(bytes: &[u8]) -> AfeResult<ReportV0>
{
    require(bytes, V0_SIZE, "AFE0 report")?;
    let mut reader = Reader::new(bytes);

    let (magic, error_desc, title_id) = read_ident(&mut reader)?;
    let registers = read_registers(&mut reader)?;
    let fault = read_fault(&mut reader)?;

    Ok(ReportV0 {
        header: ReportHeader {
            magic,
            error_desc,
            title_id,
            module_base: ModuleBase::ABSENT,
        },
        registers,
        fault,
    })
}

fn decode_v1(bytes: &[u8]) -> AfeResult<ReportV1>
{
    let (header, registers, fault, stack) = decode_common(bytes)?;
    Ok(ReportV1 {
        header,
        registers,
        fault,
        stack,
    })
}

fn decode_v2(bytes: &[u8]) -> AfeResult<ReportV2>
{
    let (header, registers, fault, stack) = decode_common(bytes)?;
    require(bytes, V2_SIZE, "TLS dump")?;
    let tls_dump = Reader::at(bytes, TLS_OFFSET).take(TLS_DUMP_SIZE, "TLS dump")?.to_vec();

    Ok(ReportV2 {
        header,
        registers,
        fault,
        stack,
        tls_dump,
    })
}

/// Everything `AFE1` and `AFE2` share: header, registers, fault data and the
/// declared prefix of the stack trace and stack dump storage.
fn decode_common(bytes: &[u8]) -> AfeResult<(ReportHeader, RegisterSnapshot, FaultMetadata, StackCapture)>
{
    require(bytes, V1_HEADER_SIZE, "report header")?;
    let mut reader = Reader::new(bytes);

    let (magic, error_desc, title_id) = read_ident(&mut reader)?;
    let registers = read_registers(&mut reader)?;
    let module_base = ModuleBase::new(reader.u64("module_base")?);
    let fault = read_fault(&mut reader)?;
    let stack_trace_size = reader.u64("stack_trace_size")?;
    let stack_dump_size = reader.u64("stack_dump_size")?;

    let trace_len = bounded_count(stack_trace_size, STACK_TRACE_CAPACITY, "stack_trace_size")?;
    let dump_len = bounded_count(stack_dump_size, STACK_DUMP_CAPACITY, "stack_dump_size")?;
    if dump_len % DUMP_ROW != 0 {
        return Err(AfeError::MisalignedDump {
            declared: stack_dump_size,
        });
    }

    require(bytes, STACK_TRACE_OFFSET + trace_len * 8, "stack trace")?;
    let mut trace_reader = Reader::at(bytes, STACK_TRACE_OFFSET);
    let trace = (0..trace_len)
        .map(|_| trace_reader.u64("stack trace").map(Address::new))
        .collect::<AfeResult<Vec<_>>>()?;

    let dump = if dump_len == 0 {
        Vec::new()
    } else {
        require(bytes, STACK_DUMP_OFFSET + dump_len, "stack dump")?;
        Reader::at(bytes, STACK_DUMP_OFFSET).take(dump_len, "stack dump")?.to_vec()
    };

    debug!(
        %magic,
        module_base = format_args!("0x{:x}", module_base.value()),
        trace_len,
        dump_len,
        "decoded report header"
    );

    Ok((
        ReportHeader {
            magic,
            error_desc,
            title_id,
            module_base,
        },
        registers,
        fault,
        StackCapture { trace, dump },
    ))
}

fn read_ident(reader: &mut Reader<'_>) -> AfeResult<(Magic, u32, u64)>
{
    let magic = Magic::new(reader.u32("magic")?);
    let error_desc = reader.u32("error_desc")?;
    let title_id = reader.u64("title_id")?;
    Ok((magic, error_desc, title_id))
}

fn read_registers(reader: &mut Reader<'_>) -> AfeResult<RegisterSnapshot>
{
    let mut gprs = [0u64; GPR_SLOTS];
    for slot in &mut gprs {
        *slot = reader.u64("registers")?;
    }
    let pc = reader.u64("pc")?;

    let mut x = [0u64; GENERAL_PURPOSE_COUNT];
    x.copy_from_slice(&gprs[..GENERAL_PURPOSE_COUNT]);
    Ok(RegisterSnapshot {
        x,
        fp: gprs[29],
        lr: gprs[30],
        sp: gprs[31],
        pc,
    })
}

fn read_fault(reader: &mut Reader<'_>) -> AfeResult<FaultMetadata>
{
    Ok(FaultMetadata {
        pstate: reader.u32("pstate")?,
        afsr0: reader.u32("afsr0")?,
        afsr1: reader.u32("afsr1")?,
        esr: reader.u32("esr")?,
        far: reader.u64("far")?,
        report_identifier: reader.u64("report_identifier")?,
    })
}

/// Validate a declared count against the storage reserved for it.
fn bounded_count(declared: u64, capacity: usize, field: &'static str) -> AfeResult<usize>
{
    usize::try_from(declared)
        .ok()
        .filter(|&n| n <= capacity)
        .ok_or(AfeError::CapacityExceeded {
            field,
            declared,
            capacity,
        })
}

fn require(bytes: &[u8], needed: usize, region: &'static str) -> AfeResult<()>
{
    if bytes.len() < needed {
        return Err(AfeError::TruncatedInput {
            region,
            needed,
            available: bytes.len(),
        });
    }
    Ok(())
}

/// Little-endian cursor over a report buffer.
struct Reader<'a>
{
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a>
{
    fn new(bytes: &'a [u8]) -> Self
    {
        Self::at(bytes, 0)
    }

    fn at(bytes: &'a [u8], pos: usize) -> Self
    {
        Self { bytes, pos }
    }

    fn take(&mut self, len: usize, region: &'static str) -> AfeResult<&'a [u8]>
    {
        let end = self.pos.saturating_add(len);
        let slice = self.bytes.get(self.pos..end).ok_or(AfeError::TruncatedInput {
            region,
            needed: end,
            available: self.bytes.len(),
        })?;
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, region: &'static str) -> AfeResult<[u8; N]>
    {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, region)?);
        Ok(out)
    }

    fn u32(&mut self, region: &'static str) -> AfeResult<u32>
    {
        self.array(region).map(u32::from_le_bytes)
    }

    fn u64(&mut self, region: &'static str) -> AfeResult<u64>
    {
        self.array(region).map(u64::from_le_bytes)
    }
}
