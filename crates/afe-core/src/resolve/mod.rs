//! # Address Resolution
//!
//! Turning raw addresses from a report into descriptive text.
//!
//! The renderer only knows the [`AddressResolver`] trait. Two families of
//! implementations exist:
//!
//! - [`PlainResolver`]: formats the address and its module-relative offset
//! - [`SymbolizingResolver`]: the plain text followed by a function/file/line
//!   description produced by a [`Symbolizer`]
//!
//! Symbolizers are pluggable as well. [`Addr2LineTool`] runs an external
//! `addr2line` executable once per address, [`DwarfSymbolizer`] reads the
//! DWARF line tables of the image in-process.
//!
//! ## Return addresses
//!
//! On AArch64 a saved return address points at the instruction *after* the
//! `bl` that made the call. Symbolizing it as-is names the line following the
//! call, so the symbolizing resolver looks up `address - 4` instead; see
//! [`call_site`].

pub mod dwarf;
pub mod tool;

pub use dwarf::DwarfSymbolizer;
pub use tool::Addr2LineTool;

use thiserror::Error;
use tracing::{trace, warn};

use crate::types::{Address, ModuleBase};

/// Largest distance from the module base still treated as inside the module.
pub const MODULE_WINDOW: u64 = 16 * 1024 * 1024;

/// Size of one AArch64 instruction; distance from a return address back to
/// its call instruction.
pub const RETURN_ADDRESS_ADJUST: u64 = 4;

/// Text appended when a symbolizer produced nothing usable.
pub const RESOLVE_FALLBACK: &str = "Failed to resolve";

/// Capability converting a raw address into a descriptive string
///
/// Implementations must always produce text: failures are expressed inside
/// the returned string, never by aborting the render.
pub trait AddressResolver
{
    /// Describe `address`, which was captured in a module loaded at `module_base`.
    fn resolve(&self, module_base: ModuleBase, address: Address) -> String;
}

impl<R: AddressResolver + ?Sized> AddressResolver for &R
{
    fn resolve(&self, module_base: ModuleBase, address: Address) -> String
    {
        (**self).resolve(module_base, address)
    }
}

impl<R: AddressResolver + ?Sized> AddressResolver for Box<R>
{
    fn resolve(&self, module_base: ModuleBase, address: Address) -> String
    {
        (**self).resolve(module_base, address)
    }
}

/// Pass-through resolver: address plus module-relative offset
///
/// ## Example
///
/// ```rust
/// use afe_core::resolve::{AddressResolver, PlainResolver};
/// use afe_core::types::{Address, ModuleBase};
///
/// let text = PlainResolver.resolve(ModuleBase::new(0x1_0000_0000), Address::new(0x1_0000_1238));
/// assert_eq!(text, "0x100001238 (MOD_BASE + 0x1238)");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainResolver;

impl AddressResolver for PlainResolver
{
    fn resolve(&self, module_base: ModuleBase, address: Address) -> String
    {
        format!("{address} (MOD_BASE + 0x{:x})", module_base.offset_of(address))
    }
}

/// Module-relative address of the call instruction that produced `address`
///
/// Addresses within [`MODULE_WINDOW`] of the base are made module-relative;
/// anything else (including every address when the base is absent) is used
/// as-is. Either way [`RETURN_ADDRESS_ADJUST`] is subtracted, wrapping on
/// underflow.
///
/// ## Example
///
/// ```rust
/// use afe_core::resolve::call_site;
/// use afe_core::types::{Address, ModuleBase};
///
/// let base = ModuleBase::new(0x1_0000_0000);
/// assert_eq!(call_site(base, Address::new(0x1_0000_1238)), 0x1234);
/// assert_eq!(call_site(base, Address::new(0x2_0000_0000)), 0x1_FFFF_FFFC);
/// ```
pub fn call_site(module_base: ModuleBase, address: Address) -> u64
{
    let raw = address.value();
    let relative = if module_base.is_absent() {
        raw
    } else {
        match raw.checked_sub(module_base.value()) {
            Some(offset) if offset < MODULE_WINDOW => offset,
            _ => raw,
        }
    };
    relative.wrapping_sub(RETURN_ADDRESS_ADJUST)
}

/// Failure of a single symbolization attempt
///
/// Always recovered inside [`SymbolizingResolver`]; it is public so that
/// [`Symbolizer`] implementations outside this crate can report failures.
#[derive(Error, Debug)]
pub enum ResolveError
{
    /// The external tool could not be started
    #[error("failed to run symbolizer: {0}")]
    Launch(#[from] std::io::Error),

    /// The tool ran but printed nothing
    #[error("symbolizer produced no output")]
    NoOutput,

    /// No debug information covers the address
    #[error("no frames found for address")]
    NoFrames,
}

/// Source of symbol/file/line descriptions for module-relative addresses
pub trait Symbolizer
{
    /// Describe the module-relative address `relative`.
    ///
    /// ## Errors
    ///
    /// Any [`ResolveError`]; the caller substitutes [`RESOLVE_FALLBACK`].
    fn symbolize(&self, relative: u64) -> Result<String, ResolveError>;
}

impl<S: Symbolizer + ?Sized> Symbolizer for &S
{
    fn symbolize(&self, relative: u64) -> Result<String, ResolveError>
    {
        (**self).symbolize(relative)
    }
}

/// Resolver appending symbol information to the plain description
///
/// Output has the form `<plain> - <symbol text>`. One symbolizer call is made
/// per resolved address, synchronously and without caching.
#[derive(Debug, Clone)]
pub struct SymbolizingResolver<S>
{
    symbolizer: S,
}

impl<S> SymbolizingResolver<S>
{
    pub fn new(symbolizer: S) -> Self
    {
        Self { symbolizer }
    }

    pub fn symbolizer(&self) -> &S
    {
        &self.symbolizer
    }
}

impl<S: Symbolizer> AddressResolver for SymbolizingResolver<S>
{
    fn resolve(&self, module_base: ModuleBase, address: Address) -> String
    {
        let relative = call_site(module_base, address);
        let symbol = match self.symbolizer.symbolize(relative) {
            Ok(text) => text,
            Err(err) => {
                warn!(address = %address, relative = format_args!("0x{relative:x}"), "{err}");
                RESOLVE_FALLBACK.to_string()
            }
        };
        trace!(address = %address, %symbol, "resolved address");
        format!("{} - {symbol}", PlainResolver.resolve(module_base, address))
    }
}

/// Resolver spawning `addr2line` for every address
pub type Addr2LineResolver = SymbolizingResolver<Addr2LineTool>;

/// Resolver reading DWARF in-process
pub type DwarfResolver = SymbolizingResolver<DwarfSymbolizer>;

#[cfg(test)]
mod tests
{
    use std::cell::RefCell;

    use super::*;

    /// Records every address it is asked about.
    #[derive(Default)]
    struct Recorder
    {
        seen: RefCell<Vec<u64>>,
        fail: bool,
    }

    impl Symbolizer for Recorder
    {
        fn symbolize(&self, relative: u64) -> Result<String, ResolveError>
        {
            self.seen.borrow_mut().push(relative);
            if self.fail {
                Err(ResolveError::NoOutput)
            } else {
                Ok(format!("fn_{relative:x} at main.cpp:1"))
            }
        }
    }

    const BASE: ModuleBase = ModuleBase::new(0x1_0000_0000);

    #[test]
    fn test_plain_resolver_format()
    {
        assert_eq!(
            PlainResolver.resolve(BASE, Address::new(0x1_0000_1238)),
            "0x100001238 (MOD_BASE + 0x1238)"
        );
    }

    #[test]
    fn test_plain_resolver_absent_base_uses_raw_address()
    {
        assert_eq!(
            PlainResolver.resolve(ModuleBase::ABSENT, Address::new(0x7100_0040)),
            "0x71000040 (MOD_BASE + 0x71000040)"
        );
    }

    #[test]
    fn test_plain_resolver_wraps_below_base()
    {
        assert_eq!(
            PlainResolver.resolve(BASE, Address::new(0x10)),
            "0x10 (MOD_BASE + 0xffffffff00000010)"
        );
    }

    #[test]
    fn test_call_site_window_edges()
    {
        assert_eq!(call_site(BASE, Address::new(0x1_0000_0000 + MODULE_WINDOW - 1)), MODULE_WINDOW - 5);
        assert_eq!(
            call_site(BASE, Address::new(0x1_0000_0000 + MODULE_WINDOW)),
            0x1_0000_0000 + MODULE_WINDOW - 4
        );
        assert_eq!(call_site(BASE, Address::new(0x0FFF_FFFF)), 0x0FFF_FFFB);
    }

    #[test]
    fn test_call_site_absent_base()
    {
        assert_eq!(call_site(ModuleBase::ABSENT, Address::new(0x1238)), 0x1234);
        assert_eq!(call_site(ModuleBase::ABSENT, Address::new(2)), u64::MAX - 1);
    }

    #[test]
    fn test_symbolizing_resolver_passes_adjusted_address()
    {
        let resolver = SymbolizingResolver::new(Recorder::default());
        let text = resolver.resolve(BASE, Address::new(0x1_0000_1238));
        assert_eq!(text, "0x100001238 (MOD_BASE + 0x1238) - fn_1234 at main.cpp:1");
        assert_eq!(*resolver.symbolizer().seen.borrow(), vec![0x1234]);
    }

    #[test]
    fn test_symbolizing_resolver_falls_back()
    {
        let resolver = SymbolizingResolver::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let text = resolver.resolve(BASE, Address::new(0x2_0000_0000));
        assert_eq!(text, "0x200000000 (MOD_BASE + 0x100000000) - Failed to resolve");
        assert_eq!(*resolver.symbolizer().seen.borrow(), vec![0x1_FFFF_FFFC]);
    }
}
