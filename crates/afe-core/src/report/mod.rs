//! # Reports
//!
//! Typed model of the three fatal-error report layouts, plus the classifier
//! and decoder that build it from raw bytes.
//!
//! A decoded [`Report`] is one of three variants. Each variant owns exactly
//! the sections its layout carries, so code matching on a `Report` can never
//! read a stack trace from an `AFE0` report or a TLS dump from an `AFE1` one.

pub mod decode;
pub mod layout;
pub mod magic;

pub use decode::{decode, parse_report};
pub use magic::{classify, Magic, ReportKind};

use crate::types::{Address, ModuleBase, RegisterSnapshot};

/// Fields at the top of every report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader
{
    /// Tag at offset 0
    pub magic: Magic,
    /// Result code describing the error
    pub error_desc: u32,
    /// Program (title) that crashed
    pub title_id: u64,
    /// Load address of the faulting module, [`ModuleBase::ABSENT`] for `AFE0`
    pub module_base: ModuleBase,
}

/// Exception state captured alongside the registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultMetadata
{
    /// Processor state register
    pub pstate: u32,
    /// Auxiliary fault status register 0
    pub afsr0: u32,
    /// Auxiliary fault status register 1
    pub afsr1: u32,
    /// Exception syndrome register
    pub esr: u32,
    /// Fault address register
    pub far: u64,
    /// Report identifier (normally the system tick at crash time)
    pub report_identifier: u64,
}

/// Call stack evidence carried by `AFE1` and `AFE2`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackCapture
{
    /// Return addresses as recorded by the OS, innermost first
    pub trace: Vec<Address>,
    /// Raw stack memory starting at SP; length is a multiple of 16
    pub dump: Vec<u8>,
}

/// `AFE0`: registers and fault metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportV0
{
    pub header: ReportHeader,
    pub registers: RegisterSnapshot,
    pub fault: FaultMetadata,
}

/// `AFE1`: `AFE0` plus module base and stack capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportV1
{
    pub header: ReportHeader,
    pub registers: RegisterSnapshot,
    pub fault: FaultMetadata,
    pub stack: StackCapture,
}

/// `AFE2`: `AFE1` plus the thread-local storage block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportV2
{
    pub header: ReportHeader,
    pub registers: RegisterSnapshot,
    pub fault: FaultMetadata,
    pub stack: StackCapture,
    /// Raw TLS memory, always [`layout::TLS_DUMP_SIZE`] bytes
    pub tls_dump: Vec<u8>,
}

/// One decoded fatal-error report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report
{
    V0(ReportV0),
    V1(ReportV1),
    V2(ReportV2),
}

impl Report
{
    /// Layout version number (0, 1 or 2)
    pub fn version(&self) -> u8
    {
        match self {
            Report::V0(_) => 0,
            Report::V1(_) => 1,
            Report::V2(_) => 2,
        }
    }

    /// Header shared by all versions
    pub fn header(&self) -> &ReportHeader
    {
        match self {
            Report::V0(r) => &r.header,
            Report::V1(r) => &r.header,
            Report::V2(r) => &r.header,
        }
    }

    /// Register snapshot shared by all versions
    pub fn registers(&self) -> &RegisterSnapshot
    {
        match self {
            Report::V0(r) => &r.registers,
            Report::V1(r) => &r.registers,
            Report::V2(r) => &r.registers,
        }
    }

    /// Fault metadata shared by all versions
    pub fn fault(&self) -> &FaultMetadata
    {
        match self {
            Report::V0(r) => &r.fault,
            Report::V1(r) => &r.fault,
            Report::V2(r) => &r.fault,
        }
    }

    /// Stack capture, absent for `AFE0`
    pub fn stack(&self) -> Option<&StackCapture>
    {
        match self {
            Report::V0(_) => None,
            Report::V1(r) => Some(&r.stack),
            Report::V2(r) => Some(&r.stack),
        }
    }
}
