//! In-process symbolization from the DWARF sections of an ELF image.
//!
//! The image is read once; the `addr2line` context is built on first use and
//! reused for every later lookup. Addresses are interpreted as file-relative,
//! which matches homebrew ELFs linked at address zero.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use addr2line::Context;
use gimli::{Dwarf, EndianArcSlice, RunTimeEndian, SectionId};
use object::{Object, ObjectSection};
use once_cell::sync::OnceCell;
use rustc_demangle::try_demangle;
use tracing::debug;

use super::{ResolveError, Symbolizer};
use crate::error::{AfeError, AfeResult};

type OwnedReader = EndianArcSlice<RunTimeEndian>;

const DWARF_SECTIONS: &[SectionId] = &[
    SectionId::DebugAbbrev,
    SectionId::DebugAddr,
    SectionId::DebugAranges,
    SectionId::DebugInfo,
    SectionId::DebugLine,
    SectionId::DebugLineStr,
    SectionId::DebugRanges,
    SectionId::DebugRngLists,
    SectionId::DebugStr,
    SectionId::DebugStrOffsets,
    SectionId::DebugLoc,
    SectionId::DebugLocLists,
];

/// Symbolizer backed by the debug information of one ELF file
///
/// ## Example
///
/// ```no_run
/// use afe_core::resolve::{DwarfSymbolizer, SymbolizingResolver};
///
/// # fn example() -> afe_core::error::AfeResult<()> {
/// let symbols = DwarfSymbolizer::load("application.elf")?;
/// let resolver = SymbolizingResolver::new(symbols);
/// # Ok(())
/// # }
/// ```
pub struct DwarfSymbolizer
{
    path: PathBuf,
    endian: RunTimeEndian,
    sections: HashMap<&'static str, Arc<[u8]>>,
    context: OnceCell<Context<OwnedReader>>,
}

impl DwarfSymbolizer
{
    /// Read `path` and keep its DWARF sections in memory.
    ///
    /// ## Errors
    ///
    /// - [`AfeError::Io`] if the file cannot be read
    /// - [`AfeError::InvalidSymbols`] if it is not an object file or a
    ///   section cannot be decompressed
    pub fn load(path: impl AsRef<Path>) -> AfeResult<Self>
    {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let file = object::File::parse(&*data)
            .map_err(|err| AfeError::InvalidSymbols(format!("failed to parse {}: {err}", path.display())))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let mut sections = HashMap::new();
        for id in DWARF_SECTIONS {
            let name = id.name();
            if let Some(section) = file.section_by_name(name) {
                let bytes = section
                    .uncompressed_data()
                    .map_err(|err| AfeError::InvalidSymbols(format!("failed to read {name}: {err}")))?;
                let bytes: Arc<[u8]> = match bytes {
                    Cow::Borrowed(slice) => Arc::from(slice),
                    Cow::Owned(vec) => vec.into(),
                };
                sections.insert(name, bytes);
            }
        }

        debug!(path = %path.display(), sections = sections.len(), "loaded debug sections");
        if !sections.contains_key(SectionId::DebugInfo.name()) {
            debug!(path = %path.display(), "image carries no .debug_info");
        }

        Ok(Self {
            path: path.to_path_buf(),
            endian,
            sections,
            context: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    fn section_reader(&self, id: SectionId) -> OwnedReader
    {
        let data = self
            .sections
            .get(id.name())
            .cloned()
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        EndianArcSlice::new(data, self.endian)
    }

    fn context(&self) -> Result<&Context<OwnedReader>, ResolveError>
    {
        self.context.get_or_try_init(|| {
            let dwarf = Dwarf::load(|section| Ok::<_, gimli::Error>(self.section_reader(section))).map_err(|err| {
                debug!(path = %self.path.display(), %err, "failed to load DWARF");
                ResolveError::NoFrames
            })?;
            Context::from_dwarf(dwarf).map_err(|err| {
                debug!(path = %self.path.display(), %err, "failed to build symbol context");
                ResolveError::NoFrames
            })
        })
    }
}

impl Symbolizer for DwarfSymbolizer
{
    fn symbolize(&self, relative: u64) -> Result<String, ResolveError>
    {
        let ctx = self.context()?;
        let mut frames = ctx.find_frames(relative).skip_all_loads().map_err(|_| ResolveError::NoFrames)?;

        // The innermost frame names the code that was actually executing.
        let Ok(Some(frame)) = frames.next() else {
            return Err(ResolveError::NoFrames);
        };

        let function = frame
            .function
            .as_ref()
            .and_then(|func| func.raw_name().ok())
            .map(|raw| demangle(&raw))
            .unwrap_or_else(|| "??".to_string());
        let (file, line) = match frame.location {
            Some(loc) => (
                loc.file.unwrap_or("??").to_string(),
                loc.line.map_or_else(|| "?".to_string(), |l| l.to_string()),
            ),
            None => ("??".to_string(), "?".to_string()),
        };

        Ok(format!("{function} at {file}:{line}"))
    }
}

impl std::fmt::Debug for DwarfSymbolizer
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("DwarfSymbolizer")
            .field("path", &self.path)
            .field("sections", &self.sections.len())
            .finish_non_exhaustive()
    }
}

fn demangle(raw: &str) -> String
{
    match try_demangle(raw) {
        Ok(name) => format!("{name:#}"),
        Err(_) => raw.to_string(),
    }
}
