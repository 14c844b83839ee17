use sw_asm::{InterruptKind, InterruptRecord};

use crate::control::ExecOutcome;
use crate::registers::Registers;

/// Build the `RaiseInterrupt` outcome for a misaligned or out-of-range
/// memory access: `r0` carries the interrupt code, `r1` the
/// faulting `pc`, `r2` the address that could not be accessed.
pub(crate) fn memory_fault(regs: &Registers, address: u32) -> ExecOutcome {
    let code = InterruptKind::MemoryFault.code();
    ExecOutcome::RaiseInterrupt(InterruptRecord {
        code,
        r0: code as u32,
        r1: regs.pc(),
        r2: address,
    })
}

/// Build the `RaiseInterrupt` outcome for a zero divisor: `r2`
/// carries the dividend, matching the original's diagnostic convention.
pub(crate) fn divide_by_zero(regs: &Registers, dividend: u32) -> ExecOutcome {
    let code = InterruptKind::DivideByZero.code();
    ExecOutcome::RaiseInterrupt(InterruptRecord {
        code,
        r0: code as u32,
        r1: regs.pc(),
        r2: dividend,
    })
}
