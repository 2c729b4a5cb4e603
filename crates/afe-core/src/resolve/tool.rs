//! Symbolization through an external `addr2line` executable.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::trace;

use super::{ResolveError, Symbolizer};

/// Default location of the devkitPro AArch64 `addr2line`.
#[cfg(windows)]
pub const DEVKITPRO_ADDR2LINE: &str = "C:/devkitPro/devkitA64/bin/aarch64-none-elf-addr2line.exe";

/// Default location of the devkitPro AArch64 `addr2line`.
#[cfg(not(windows))]
pub const DEVKITPRO_ADDR2LINE: &str = "/opt/devkitpro/devkitA64/bin/aarch64-none-elf-addr2line";

/// Runs `<tool> -e <elf> -f -p -C -i 0x<addr>` once per address
///
/// Only the first line of the tool's standard output is kept; with `-i` the
/// following lines describe the callers an inlined frame was inlined into.
#[derive(Debug, Clone)]
pub struct Addr2LineTool
{
    tool: PathBuf,
    elf: PathBuf,
}

impl Addr2LineTool
{
    pub fn new(tool: impl Into<PathBuf>, elf: impl Into<PathBuf>) -> Self
    {
        Self {
            tool: tool.into(),
            elf: elf.into(),
        }
    }

    pub fn tool(&self) -> &Path
    {
        &self.tool
    }

    pub fn elf(&self) -> &Path
    {
        &self.elf
    }

    /// Command that symbolizes `relative`, ready to be spawned.
    pub fn command(&self, relative: u64) -> Command
    {
        let mut cmd = Command::new(&self.tool);
        cmd.arg("-e")
            .arg(&self.elf)
            .args(["-f", "-p", "-C", "-i"])
            .arg(format!("0x{relative:x}"))
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Symbolizer for Addr2LineTool
{
    fn symbolize(&self, relative: u64) -> Result<String, ResolveError>
    {
        let output = self.command(relative).output()?;
        trace!(tool = %self.tool.display(), status = %output.status, "addr2line finished");

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .next()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .ok_or(ResolveError::NoOutput)
    }
}
