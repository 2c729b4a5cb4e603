//! # Error Types
//!
//! Error handling for report decoding.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::report::Magic;

/// Main error type for report operations
///
/// Every variant is fatal for the report being processed: nothing of a report
/// is rendered once decoding has failed. Address resolution problems are not
/// represented here; see [`crate::resolve::ResolveError`], which never
/// escapes a resolver.
///
/// ## Error Categories
///
/// 1. **Format errors**: UnrecognizedFormat, UnknownVersion
/// 2. **Layout errors**: TruncatedInput, CapacityExceeded, MisalignedDump
/// 3. **Symbol errors**: InvalidSymbols
/// 4. **I/O errors**: Io (reading report files and symbol images)
#[derive(Error, Debug)]
pub enum AfeError
{
    /// The leading tag is neither a known version nor part of the AFE family
    ///
    /// The buffer is not a fatal-error report at all.
    #[error("Passed file is not a valid AFE file (magic 0x{:08X})", magic.value())]
    UnrecognizedFormat
    {
        /// Tag found at offset 0
        magic: Magic,
    },

    /// The tag belongs to the AFE family but names a layout we cannot decode
    ///
    /// Usually a report written by a newer firmware than this tool knows.
    #[error("Passed file contains an unknown AFE version: {0}")]
    UnknownVersion(Magic),

    /// The buffer ends before a fixed or declared region does
    ///
    /// `region` names the part of the layout that did not fit, `needed` is the
    /// total buffer length required to read it.
    #[error("Truncated report: {region} needs {needed} bytes, only {available} available")]
    TruncatedInput
    {
        /// Layout region that could not be read
        region: &'static str,
        /// Required buffer length in bytes
        needed: usize,
        /// Actual buffer length in bytes
        available: usize,
    },

    /// A declared count exceeds the storage the device reserves for it
    #[error("Corrupt report: {field} is {declared}, capacity is {capacity}")]
    CapacityExceeded
    {
        /// Header field holding the count
        field: &'static str,
        /// Value read from the header
        declared: u64,
        /// Largest value the layout can hold
        capacity: usize,
    },

    /// The stack dump length is not a whole number of 16-byte rows
    #[error("Corrupt report: stack dump size {declared} is not a multiple of 16")]
    MisalignedDump
    {
        /// Value read from the header
        declared: u64,
    },

    /// A symbol image could not be parsed
    #[error("Invalid symbol file: {0}")]
    InvalidSymbols(String),

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, AfeError>`
///
/// ```rust
/// use afe_core::error::AfeResult;
/// fn foo() -> AfeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type AfeResult<T> = std::result::Result<T, AfeError>;
