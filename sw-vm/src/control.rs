use sw_asm::InterruptRecord;

/// What an executor asks the CPU core to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Advance `pc` by one instruction and continue.
    AdvancePc,
    /// The executor already set `pc` to its new value (a taken branch, a
    /// `call`, `ret`, `int` or `reti`); the CPU core must not advance it
    /// again.
    Jumped,
    /// Halt the CPU (`stop`).
    Halt,
    /// Raise an interrupt; `pc` is not advanced until the dispatcher runs.
    RaiseInterrupt(InterruptRecord),
    /// The `world` opcode was executed; the caller (the scheduler, through
    /// [`crate::Cpu::step`]) owns the multi-tick subprotocol
    /// and will call [`crate::Cpu::complete_world_action`] or
    /// [`crate::Cpu::cancel_world_action`] once it knows the outcome.
    WorldAction(u16),
}
