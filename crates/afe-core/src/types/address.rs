//! Address and module base types.

use std::fmt;

/// Code or data address taken from a report
///
/// Register values and stack trace entries are wrapped in `Address` once they
/// are handed to a resolver, which keeps them apart from the sizes and counts
/// stored next to them.
///
/// Displays as unpadded lowercase hex with a `0x` prefix, the form used
/// throughout the rendered report.
///
/// ## Example
///
/// ```rust
/// use afe_core::types::Address;
///
/// let pc = Address::new(0x1_0000_1234);
/// assert_eq!(pc.to_string(), "0x100001234");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    pub const fn value(self) -> u64
    {
        self.0
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:x}", self.0)
    }
}

/// Load address of the module that faulted
///
/// `AFE0` reports predate the module base field. Their base is represented by
/// the all-ones sentinel [`ModuleBase::ABSENT`], which is never used for
/// offset arithmetic: an absent base behaves like zero when computing
/// module-relative offsets, so the offset equals the raw address.
///
/// ## Example
///
/// ```rust
/// use afe_core::types::{Address, ModuleBase};
///
/// let base = ModuleBase::new(0x1_0000_0000);
/// assert_eq!(base.offset_of(Address::new(0x1_0000_1238)), 0x1238);
///
/// let absent = ModuleBase::ABSENT;
/// assert!(absent.is_absent());
/// assert_eq!(absent.offset_of(Address::new(0x1238)), 0x1238);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleBase(u64);

impl ModuleBase
{
    /// Sentinel for reports that do not record a module base
    pub const ABSENT: Self = ModuleBase(u64::MAX);

    /// Wrap a module base read from a report
    pub const fn new(value: u64) -> Self
    {
        ModuleBase(value)
    }

    /// `true` when this is the [`ModuleBase::ABSENT`] sentinel
    pub const fn is_absent(self) -> bool
    {
        self.0 == u64::MAX
    }

    /// Raw value, including the sentinel
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Base to use for arithmetic: zero when absent
    pub const fn effective(self) -> u64
    {
        if self.is_absent() {
            0
        } else {
            self.0
        }
    }

    /// Module-relative offset of `address` with unsigned wrapping semantics
    pub const fn offset_of(self, address: Address) -> u64
    {
        address.value().wrapping_sub(self.effective())
    }
}

impl Default for ModuleBase
{
    fn default() -> Self
    {
        Self::ABSENT
    }
}

impl From<u64> for ModuleBase
{
    fn from(value: u64) -> Self
    {
        ModuleBase(value)
    }
}

impl fmt::UpperHex for ModuleBase
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_absent_base_never_used_as_address()
    {
        let absent = ModuleBase::default();
        assert!(absent.is_absent());
        assert_eq!(absent.effective(), 0);
        assert_eq!(absent.offset_of(Address::new(0x7100_0000)), 0x7100_0000);
    }

    #[test]
    fn test_offset_wraps_below_base()
    {
        let base = ModuleBase::new(0x1_0000_0000);
        assert_eq!(base.offset_of(Address::new(0x1000)), 0xFFFF_FFFF_0000_1000);
    }

    #[test]
    fn test_module_base_upper_hex()
    {
        assert_eq!(format!("{:X}", ModuleBase::new(0x7100_00AB)), "710000AB");
    }
}
