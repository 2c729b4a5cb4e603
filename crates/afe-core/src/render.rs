//! # Rendering
//!
//! Text output for decoded reports.
//!
//! The layout (column labels, hex widths, tab placement) is fixed: existing
//! scripts parse it, so every line here is byte-for-byte stable.
//!
//! Sections appear in this order, each followed by a blank line:
//!
//! | Section | `AFE0` | `AFE1` | `AFE2` |
//! |---|---|---|---|
//! | Header | yes, without module base | yes | yes |
//! | Registers | yes | yes | yes |
//! | Fault metadata | yes | yes | yes |
//! | Stack trace | | yes | yes |
//! | Stack dump | | yes | yes |
//! | TLS dump | | | yes |

use std::fmt;

use crate::report::layout::DUMP_ROW;
use crate::report::{FaultMetadata, Report, ReportHeader, StackCapture};
use crate::resolve::AddressResolver;
use crate::types::{ModuleBase, RegisterSnapshot};

const RULE: &str = "---------------------------------------------------------------";
const DUMP_COLUMNS: &str = "00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f";

/// Render `report` to a string, resolving addresses through `resolver`
///
/// ## Example
///
/// ```rust
/// use afe_core::render::render_report;
/// use afe_core::report::parse_report;
/// use afe_core::resolve::PlainResolver;
///
/// # fn example(bytes: &[u8]) -> afe_core::error::AfeResult<()> {
/// let report = parse_report(bytes)?;
/// print!("{}", render_report(&report, &PlainResolver));
/// # Ok(())
/// # }
/// ```
pub fn render_report(report: &Report, resolver: &dyn AddressResolver) -> String
{
    ReportView::new(report, resolver).to_string()
}

/// Borrowed report plus resolver, rendered through [`fmt::Display`]
///
/// Lets callers stream the report into any writer without building the
/// whole string first.
pub struct ReportView<'a>
{
    report: &'a Report,
    resolver: &'a dyn AddressResolver,
}

impl<'a> ReportView<'a>
{
    pub fn new(report: &'a Report, resolver: &'a dyn AddressResolver) -> Self
    {
        Self { report, resolver }
    }
}

impl fmt::Display for ReportView<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let report = self.report;
        let base = report.header().module_base;

        writeln!(f, "Fatal report (AFE{}):", report.version())?;
        writeln!(f)?;

        write_header(f, report.header(), !matches!(report, Report::V0(_)))?;
        writeln!(f)?;

        write_registers(f, report.registers(), base, self.resolver)?;
        writeln!(f)?;

        write_fault(f, report.fault())?;
        writeln!(f)?;

        match report {
            Report::V0(_) => {}
            Report::V1(r) => write_stack(f, &r.stack, base, self.resolver)?,
            Report::V2(r) => {
                write_stack(f, &r.stack, base, self.resolver)?;
                write_dump(f, "TLS Dump:", &r.tls_dump)?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

fn write_header(f: &mut fmt::Formatter<'_>, header: &ReportHeader, with_module_base: bool) -> fmt::Result
{
    writeln!(f, "Magic            : {}", header.magic)?;
    writeln!(f, "Error description: 0x{:X}", header.error_desc)?;
    writeln!(f, "Title ID         : {:X}", header.title_id)?;
    if with_module_base {
        writeln!(f, "Module base addr : {:X}", header.module_base)?;
    }
    Ok(())
}

fn write_registers(
    f: &mut fmt::Formatter<'_>,
    registers: &RegisterSnapshot,
    base: ModuleBase,
    resolver: &dyn AddressResolver,
) -> fmt::Result
{
    writeln!(f, "Registers:")?;
    for (id, value) in registers.iter() {
        writeln!(f, "\t{id}: {}", resolver.resolve(base, value.into()))?;
    }
    Ok(())
}

fn write_fault(f: &mut fmt::Formatter<'_>, fault: &FaultMetadata) -> fmt::Result
{
    writeln!(f, "PSTATE           : 0x{:x} (Processor State Register)", fault.pstate)?;
    writeln!(f, "AFSR0            : 0x{:x} (Auxiliary Fault Status Registers)", fault.afsr0)?;
    writeln!(f, "AFSR1            : 0x{:x} (Auxiliary Fault Status Registers)", fault.afsr1)?;
    writeln!(f, "ESR              : 0x{:x} (Category and details of the fault)", fault.esr)?;
    writeln!(
        f,
        "FAR              : 0x{:x} (Fault Address Register, the virtual address involved in the fault)",
        fault.far
    )?;
    writeln!(f, "Report Identifier: 0x{:x} (Name of the report)", fault.report_identifier)
}

/// Stack trace and stack dump sections, each with its trailing blank line.
fn write_stack(
    f: &mut fmt::Formatter<'_>,
    stack: &StackCapture,
    base: ModuleBase,
    resolver: &dyn AddressResolver,
) -> fmt::Result
{
    writeln!(f, "Stack trace:")?;
    for (index, address) in stack.trace.iter().enumerate() {
        writeln!(f, "\t{index:02} - {}", resolver.resolve(base, *address))?;
    }
    writeln!(f)?;

    write_dump(f, "Stack Dump:", &stack.dump)?;
    writeln!(f)
}

fn write_dump(f: &mut fmt::Formatter<'_>, title: &str, bytes: &[u8]) -> fmt::Result
{
    writeln!(f, "{title}\t{DUMP_COLUMNS}")?;
    writeln!(f, "{RULE}")?;
    write_rows(f, bytes)
}

fn write_rows(out: &mut impl fmt::Write, bytes: &[u8]) -> fmt::Result
{
    for (row, chunk) in bytes.chunks(DUMP_ROW).enumerate() {
        write!(out, "{:06x}\t\t", row * DUMP_ROW)?;
        for (i, byte) in chunk.iter().enumerate() {
            if i > 0 {
                out.write_char(' ')?;
            }
            write!(out, "{byte:02x}")?;
        }
        out.write_char('\n')?;
    }
    Ok(())
}

/// Displays its bytes as hex rows
struct HexRows<'a>(&'a [u8]);

impl fmt::Display for HexRows<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write_rows(f, self.0)
    }
}

/// Hex rows of 16 bytes, each prefixed with its 6-digit offset
///
/// A trailing partial row is printed with the bytes it has; decoded reports
/// never produce one.
///
/// ## Example
///
/// ```rust
/// use afe_core::render::hex_dump;
///
/// let text = hex_dump(&[0xde, 0xad, 0xbe, 0xef]);
/// assert_eq!(text, "000000\t\tde ad be ef\n");
/// ```
pub fn hex_dump(bytes: &[u8]) -> String
{
    HexRows(bytes).to_string()
}
