//! Byte offsets and sizes of the on-device report structures.
//!
//! All fields are little-endian. `AFE1` and `AFE2` share everything up to the
//! end of the stack dump; `AFE2` appends a fixed TLS block.

/// Number of 64-bit slots in the register array (X0-X28, FP, LR, SP).
pub const GPR_SLOTS: usize = 32;

/// Capacity of the stack trace storage, in entries.
pub const STACK_TRACE_CAPACITY: usize = 0x20;

/// Capacity of the stack dump storage, in bytes.
pub const STACK_DUMP_CAPACITY: usize = 0x100;

/// Size of the TLS dump carried by `AFE2`, in bytes.
pub const TLS_DUMP_SIZE: usize = 0x100;

/// Width of a rendered dump row, in bytes. Dump lengths are multiples of it.
pub const DUMP_ROW: usize = 16;

/// Total size of an `AFE0` report.
pub const V0_SIZE: usize = 0x138;

/// Fixed header of `AFE1`/`AFE2`: everything up to `stack_dump_size`.
pub const V1_HEADER_SIZE: usize = 0x150;

/// Start of the stack trace storage in `AFE1`/`AFE2`.
pub const STACK_TRACE_OFFSET: usize = V1_HEADER_SIZE;

/// Start of the stack dump storage in `AFE1`/`AFE2`.
pub const STACK_DUMP_OFFSET: usize = STACK_TRACE_OFFSET + STACK_TRACE_CAPACITY * 8;

/// Start of the TLS dump in `AFE2`.
pub const TLS_OFFSET: usize = STACK_DUMP_OFFSET + STACK_DUMP_CAPACITY;

/// Total size of an `AFE1` report.
pub const V1_SIZE: usize = TLS_OFFSET;

/// Total size of an `AFE2` report.
pub const V2_SIZE: usize = TLS_OFFSET + TLS_DUMP_SIZE;
