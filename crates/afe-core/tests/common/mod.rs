//! Synthetic report buffers for the integration tests.
//!
//! Buffers are assembled field by field in the device's little-endian layout,
//! so tests do not depend on the decoder to build their inputs.

#![allow(dead_code)]

pub const MAGIC_AFE0: u32 = 0x3045_4641;
pub const MAGIC_AFE1: u32 = 0x3145_4641;
pub const MAGIC_AFE2: u32 = 0x3245_4641;

pub const V0_SIZE: usize = 0x138;
pub const HEADER_SIZE: usize = 0x150;
pub const TRACE_OFFSET: usize = 0x150;
pub const DUMP_OFFSET: usize = 0x250;
pub const TLS_OFFSET: usize = 0x350;
pub const V1_SIZE: usize = 0x350;
pub const V2_SIZE: usize = 0x450;

pub const MODULE_BASE: u64 = 0x0000_0001_0000_0000;
pub const PC: u64 = 0x0000_0001_0000_1234;

/// Field values for one synthetic report
#[derive(Debug, Clone)]
pub struct ReportBuilder
{
    pub magic: u32,
    pub error_desc: u32,
    pub title_id: u64,
    /// X0-X28, FP, LR, SP
    pub gprs: [u64; 32],
    pub pc: u64,
    pub module_base: u64,
    pub pstate: u32,
    pub afsr0: u32,
    pub afsr1: u32,
    pub esr: u32,
    pub far: u64,
    pub report_identifier: u64,
    pub trace: Vec<u64>,
    pub dump: Vec<u8>,
    /// Overrides the trace count written to the header
    pub declared_trace: Option<u64>,
    /// Overrides the dump length written to the header
    pub declared_dump: Option<u64>,
    pub tls: Vec<u8>,
}

impl ReportBuilder
{
    fn with_magic(magic: u32) -> Self
    {
        let mut gprs = [0u64; 32];
        for (i, slot) in gprs.iter_mut().enumerate() {
            *slot = 0x1000 + i as u64;
        }
        Self {
            magic,
            error_desc: 0xA8,
            title_id: 0x0100_0000_0000_1000,
            gprs,
            pc: PC,
            module_base: MODULE_BASE,
            pstate: 0x6000_0000,
            afsr0: 0x11,
            afsr1: 0x22,
            esr: 0x9200_0046,
            far: 0xDEAD_BEEF,
            report_identifier: 0x1234_5678_9ABC,
            trace: Vec::new(),
            dump: Vec::new(),
            declared_trace: None,
            declared_dump: None,
            tls: (0..=255u8).collect(),
        }
    }

    pub fn v0() -> Self
    {
        Self::with_magic(MAGIC_AFE0)
    }

    pub fn v1() -> Self
    {
        Self::with_magic(MAGIC_AFE1)
    }

    pub fn v2() -> Self
    {
        Self::with_magic(MAGIC_AFE2)
    }

    pub fn trace(mut self, entries: &[u64]) -> Self
    {
        self.trace = entries.to_vec();
        self
    }

    pub fn dump(mut self, bytes: &[u8]) -> Self
    {
        self.dump = bytes.to_vec();
        self
    }

    pub fn magic(mut self, magic: u32) -> Self
    {
        self.magic = magic;
        self
    }

    /// Serialize using the `AFE0` layout
    pub fn build_v0(&self) -> Vec<u8>
    {
        let mut out = Vec::with_capacity(V0_SIZE);
        self.put_ident_and_registers(&mut out);
        self.put_fault(&mut out);
        assert_eq!(out.len(), V0_SIZE);
        out
    }

    /// Serialize using the `AFE1` layout, full size
    pub fn build_v1(&self) -> Vec<u8>
    {
        let mut out = Vec::with_capacity(V1_SIZE);
        self.put_ident_and_registers(&mut out);
        out.extend_from_slice(&self.module_base.to_le_bytes());
        self.put_fault(&mut out);
        let trace_len = self.declared_trace.unwrap_or(self.trace.len() as u64);
        let dump_len = self.declared_dump.unwrap_or(self.dump.len() as u64);
        out.extend_from_slice(&trace_len.to_le_bytes());
        out.extend_from_slice(&dump_len.to_le_bytes());
        assert_eq!(out.len(), HEADER_SIZE);

        out.resize(V1_SIZE, 0);
        for (i, entry) in self.trace.iter().enumerate() {
            let at = TRACE_OFFSET + i * 8;
            out[at..at + 8].copy_from_slice(&entry.to_le_bytes());
        }
        out[DUMP_OFFSET..DUMP_OFFSET + self.dump.len()].copy_from_slice(&self.dump);
        out
    }

    /// Serialize using the `AFE2` layout, full size
    pub fn build_v2(&self) -> Vec<u8>
    {
        let mut out = self.build_v1();
        out.resize(V2_SIZE, 0);
        out[TLS_OFFSET..TLS_OFFSET + self.tls.len()].copy_from_slice(&self.tls);
        out
    }

    /// Serialize with the layout matching the magic's version digit
    pub fn build(&self) -> Vec<u8>
    {
        match self.magic {
            MAGIC_AFE0 => self.build_v0(),
            MAGIC_AFE1 => self.build_v1(),
            _ => self.build_v2(),
        }
    }

    fn put_ident_and_registers(&self, out: &mut Vec<u8>)
    {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.error_desc.to_le_bytes());
        out.extend_from_slice(&self.title_id.to_le_bytes());
        for gpr in &self.gprs {
            out.extend_from_slice(&gpr.to_le_bytes());
        }
        out.extend_from_slice(&self.pc.to_le_bytes());
    }

    fn put_fault(&self, out: &mut Vec<u8>)
    {
        out.extend_from_slice(&self.pstate.to_le_bytes());
        out.extend_from_slice(&self.afsr0.to_le_bytes());
        out.extend_from_slice(&self.afsr1.to_le_bytes());
        out.extend_from_slice(&self.esr.to_le_bytes());
        out.extend_from_slice(&self.far.to_le_bytes());
        out.extend_from_slice(&self.report_identifier.to_le_bytes());
    }
}

/// Bytes `0x00, 0x01, ...` of length `len`
pub fn ramp(len: usize) -> Vec<u8>
{
    (0..len).map(|i| i as u8).collect()
}
