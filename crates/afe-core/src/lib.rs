//! # afe-core
//!
//! Decoding and rendering of Atmosphère fatal-error reports.
//!
//! When a Horizon process crashes under Atmosphère, the fatal handler writes a
//! binary report (`AFE0`, `AFE1` or `AFE2`, named after its magic tag) to the
//! SD card. This crate turns such a file into readable text:
//!
//! 1. [`report::classify`] looks at the tag and picks a layout
//! 2. [`report::decode`] maps the bytes onto a typed [`Report`]
//! 3. [`render::render_report`] prints it, describing every code address
//!    through an [`AddressResolver`]
//!
//! Resolvers range from [`PlainResolver`] (offset from the module base only)
//! to [`SymbolizingResolver`] wrapping an external `addr2line` or the
//! in-process DWARF reader.
//!
//! ## Example
//!
//! ```rust,no_run
//! use afe_core::prelude::*;
//!
//! # fn example() -> AfeResult<()> {
//! let bytes = std::fs::read("report_01234567.bin")?;
//! let report = parse_report(&bytes)?;
//! print!("{}", render_report(&report, &PlainResolver));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod prelude;
pub mod render;
pub mod report;
pub mod resolve;
pub mod types;

pub use error::{AfeError, AfeResult};
pub use render::{hex_dump, render_report, ReportView};
pub use report::{classify, decode, parse_report, Report, ReportKind};
pub use resolve::{AddressResolver, PlainResolver, SymbolizingResolver};
