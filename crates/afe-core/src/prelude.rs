//! Common module for library exports

pub use crate::error::{AfeError, AfeResult};
pub use crate::render::{hex_dump, render_report, ReportView};
pub use crate::report::{classify, parse_report, Magic, Report, ReportKind};
pub use crate::resolve::{
    Addr2LineResolver, Addr2LineTool, AddressResolver, DwarfResolver, DwarfSymbolizer, PlainResolver, Symbolizer,
    SymbolizingResolver,
};
pub use crate::types::{Address, ModuleBase, RegisterId, RegisterSnapshot};
