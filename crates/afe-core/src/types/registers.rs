//! AArch64 register snapshot captured by the fatal-error handler.

use std::fmt;

/// Number of plain general-purpose registers (X0-X28) in a snapshot.
pub const GENERAL_PURPOSE_COUNT: usize = 29;

/// Identifier for one register line in a snapshot
///
/// ## AArch64 Register Layout
///
/// - **X0-X28**: General-purpose registers (29 registers)
/// - **X29 (FP)**: Frame pointer
/// - **X30 (LR)**: Link register (return address)
/// - **SP**: Stack pointer
/// - **PC**: Program counter at the time of the fault
///
/// ## References
///
/// - [ARM64 Register Layout](https://developer.arm.com/documentation/102374/0101/Registers-in-AArch64---general-purpose-registers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId
{
    /// General-purpose register X0-X28
    X(u8),
    /// Frame pointer (X29)
    Fp,
    /// Link register (X30)
    Lr,
    /// Stack pointer
    Sp,
    /// Program counter
    Pc,
}

impl fmt::Display for RegisterId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            RegisterId::X(n) => write!(f, "X[{n:02}]"),
            RegisterId::Fp => write!(f, "FP"),
            RegisterId::Lr => write!(f, "LR"),
            RegisterId::Sp => write!(f, "SP"),
            RegisterId::Pc => write!(f, "PC"),
        }
    }
}

/// General-purpose register state at the time of the fault
///
/// The device stores `x[0..29]`, `fp`, `lr` and `sp` as one contiguous array
/// of 32 registers followed by `pc`; the decoder splits them into named fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterSnapshot
{
    /// X0 through X28
    pub x: [u64; GENERAL_PURPOSE_COUNT],
    /// Frame pointer (X29)
    pub fp: u64,
    /// Link register (X30)
    pub lr: u64,
    /// Stack pointer
    pub sp: u64,
    /// Program counter
    pub pc: u64,
}

impl RegisterSnapshot
{
    /// Read a register by identifier
    ///
    /// Returns `None` for `X(n)` with `n > 28`; X29 and X30 are only
    /// reachable as [`RegisterId::Fp`] and [`RegisterId::Lr`].
    pub fn get(&self, id: RegisterId) -> Option<u64>
    {
        match id {
            RegisterId::X(n) => self.x.get(usize::from(n)).copied(),
            RegisterId::Fp => Some(self.fp),
            RegisterId::Lr => Some(self.lr),
            RegisterId::Sp => Some(self.sp),
            RegisterId::Pc => Some(self.pc),
        }
    }

    /// All 33 registers in report order: X0..X28, FP, LR, SP, PC
    pub fn iter(&self) -> impl Iterator<Item = (RegisterId, u64)> + '_
    {
        let general = (0u8..).zip(self.x.iter()).map(|(n, value)| (RegisterId::X(n), *value));
        let special = [
            (RegisterId::Fp, self.fp),
            (RegisterId::Lr, self.lr),
            (RegisterId::Sp, self.sp),
            (RegisterId::Pc, self.pc),
        ];
        general.chain(special)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_register_labels()
    {
        assert_eq!(RegisterId::X(0).to_string(), "X[00]");
        assert_eq!(RegisterId::X(28).to_string(), "X[28]");
        assert_eq!(RegisterId::Fp.to_string(), "FP");
        assert_eq!(RegisterId::Pc.to_string(), "PC");
    }

    #[test]
    fn test_iter_order_and_count()
    {
        let mut regs = RegisterSnapshot::default();
        regs.x[5] = 0x55;
        regs.fp = 0xF0;
        regs.pc = 0x1234;

        let all: Vec<_> = regs.iter().collect();
        assert_eq!(all.len(), 33);
        assert_eq!(all[5], (RegisterId::X(5), 0x55));
        assert_eq!(all[29], (RegisterId::Fp, 0xF0));
        assert_eq!(all[30].0, RegisterId::Lr);
        assert_eq!(all[31].0, RegisterId::Sp);
        assert_eq!(all[32], (RegisterId::Pc, 0x1234));
    }

    #[test]
    fn test_get_out_of_range()
    {
        let regs = RegisterSnapshot::default();
        assert_eq!(regs.get(RegisterId::X(28)), Some(0));
        assert_eq!(regs.get(RegisterId::X(29)), None);
    }
}
