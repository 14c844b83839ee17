use std::sync::Arc;

use sw_asm::{InterruptKind, InterruptRecord};
use tracing::{instrument, trace, warn};

use crate::control::ExecOutcome;
use crate::isa::Isa;
use crate::memory::{Endian, Memory};
use crate::ops;
use crate::registers::Registers;

/// Outcome of a single [`Cpu::step`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuStep {
    /// The CPU executed one instruction, or dispatched or silently dropped
    /// a pending interrupt; `pc` has already moved on.
    Continued,
    /// `stop` was executed; the CPU no longer steps.
    Halted,
    /// A `world` instruction was executed; `pc` is frozen until the caller
    /// resolves it with [`Cpu::complete_world_action`] or
    /// [`Cpu::fail_world_action`].
    WorldActionRequested(u16),
    /// An interrupt of `kind` went unhandled (no `itp`, or no handler
    /// installed for it) and `kind` is fatal-if-unmasked: the issuing bug
    /// must be killed. The CPU state is left exactly as it was at the fault.
    Faulted(InterruptKind),
}

/// The Simple World virtual CPU: 16 registers, a flat memory, and the fetch
/// decode/execute loop
///
/// One `Cpu` exists per living bug; the instruction set is immutable once
/// built and is shared behind an [`Arc`] across every bug in a simulation.
pub struct Cpu {
    registers: Registers,
    memory: Memory,
    isa: Arc<Isa>,
    halted: bool,
    pending_interrupt: Option<InterruptRecord>,
}

impl Cpu {
    /// Build a CPU over `memory`, fresh (all-zero) registers, sharing `isa`.
    pub fn new(isa: Arc<Isa>, memory: Memory) -> Self {
        Self {
            registers: Registers::new(),
            memory,
            isa,
            halted: false,
            pending_interrupt: None,
        }
    }

    /// The canonical instruction set (opcodes, registers, interrupts).
    pub fn isa() -> Arc<Isa> {
        Arc::new(ops::register_all())
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Queue an interrupt to be dispatched on the next [`Cpu::step`] call,
    /// ahead of fetching the next instruction -- how the scheduler raises
    /// the timer interrupt every 64th tick.
    pub fn queue_interrupt(&mut self, record: InterruptRecord) {
        self.pending_interrupt = Some(record);
    }

    /// Execute one step: dispatch a pending interrupt if one is queued,
    /// otherwise fetch, decode and execute the instruction at `pc`.
    #[instrument(skip(self), fields(pc = self.registers.pc()))]
    pub fn step(&mut self) -> CpuStep {
        if self.halted {
            return CpuStep::Halted;
        }

        if let Some(record) = self.pending_interrupt.take() {
            return self.dispatch_interrupt(record);
        }

        let word = self
            .memory
            .get_word(self.registers.pc() as u16, Endian::Host)
            .unwrap_or(0);
        let inst = sw_asm::decode(word);

        let Some(executor) = self.isa.executor(inst.opcode) else {
            warn!(opcode = inst.opcode, "no instruction registered for opcode");
            let code = InterruptKind::InstructionFault.code();
            let record = InterruptRecord {
                code,
                r0: code as u32,
                r1: self.registers.pc(),
                r2: inst.opcode as u32,
            };
            self.registers.advance_pc();
            return self.dispatch_interrupt(record);
        };

        match executor(&mut self.registers, &mut self.memory, inst) {
            ExecOutcome::AdvancePc => {
                self.registers.advance_pc();
                CpuStep::Continued
            }
            ExecOutcome::Jumped => CpuStep::Continued,
            ExecOutcome::Halt => {
                self.halted = true;
                CpuStep::Halted
            }
            ExecOutcome::RaiseInterrupt(record) => {
                // Mirrors the original's fall-through: an interrupt raised
                // by the currently executing instruction still advances
                // `pc` immediately, so the saved return address (and a
                // later `reti`) resumes just past the faulting instruction.
                self.registers.advance_pc();
                self.dispatch_interrupt(record)
            }
            ExecOutcome::WorldAction(imm) => CpuStep::WorldActionRequested(imm),
        }
    }

    /// The scheduler calls this once a requested world action has completed
    /// successfully; resumes execution at the next instruction.
    pub fn complete_world_action(&mut self) {
        self.registers.advance_pc();
    }

    /// The scheduler calls this when a requested world action's subcommand
    /// or destination was invalid; raises the `WorldAction` interrupt.
    pub fn fail_world_action(&mut self) -> CpuStep {
        let code = InterruptKind::WorldAction.code();
        let record = InterruptRecord {
            code,
            r0: code as u32,
            r1: self.registers.pc(),
            r2: 0,
        };
        self.registers.advance_pc();
        self.dispatch_interrupt(record)
    }

    fn dispatch_interrupt(&mut self, record: InterruptRecord) -> CpuStep {
        let itp = self.registers.itp();
        if itp == 0 {
            return self.drop_or_fault(record);
        }

        let entry = itp.wrapping_add(4u32.wrapping_mul(record.code as u32));
        let handler = match self.memory.get_word(entry as u16, Endian::Host) {
            Ok(value) => value,
            Err(_) => return self.drop_or_fault(record),
        };
        if handler == 0 {
            return self.drop_or_fault(record);
        }

        let base = self.registers.stp();
        for i in 0..16u8 {
            let address = base.wrapping_sub((i as u32) * 4);
            // An out-of-range stack during interrupt entry is itself a
            // memory fault; let it recurse into drop_or_fault rather than
            // panicking.
            if self
                .memory
                .set_word(address as u16, self.registers.get(i), Endian::Host)
                .is_err()
            {
                let code = InterruptKind::MemoryFault.code();
                return self.drop_or_fault(InterruptRecord {
                    code,
                    r0: code as u32,
                    r1: self.registers.pc(),
                    r2: address,
                });
            }
        }
        self.registers.set_stp(base.wrapping_sub(64));

        self.registers.set(0, record.r0);
        self.registers.set(1, record.r1);
        self.registers.set(2, record.r2);
        self.registers.set_pc(handler);

        trace!(code = record.code, handler, "dispatched interrupt");
        CpuStep::Continued
    }

    fn drop_or_fault(&mut self, record: InterruptRecord) -> CpuStep {
        let fatal = self
            .isa
            .interrupt_by_code(record.code)
            .map(|meta| meta.is_fatal_if_unmasked)
            .unwrap_or(false);

        if fatal {
            let kind = InterruptKind::from_code(record.code).unwrap_or(InterruptKind::InstructionFault);
            CpuStep::Faulted(kind)
        } else {
            self.registers.advance_pc();
            CpuStep::Continued
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_asm::{encode, Instruction};

    fn cpu_with_program(words: &[u32]) -> Cpu {
        let mut memory = Memory::new(256);
        for (i, word) in words.iter().enumerate() {
            memory
                .set_word((i * 4) as u16, *word, Endian::Host)
                .unwrap();
        }
        Cpu::new(Cpu::isa(), memory)
    }

    #[test]
    fn tiniest_program_halts_immediately() {
        let mut cpu = cpu_with_program(&[encode(Instruction::new(0x00, 0, 0, 0))]);
        assert_eq!(cpu.step(), CpuStep::Halted);
        assert!(cpu.is_halted());
    }

    #[test]
    fn load_immediate_and_add() {
        let program = [
            encode(Instruction::new(0x11, 0, 0, 10)), // loadi r0, 10
            encode(Instruction::new(0x11, 1, 0, 32)), // loadi r1, 32
            encode(Instruction::with_reg3(0x40, 2, 0, 1)), // add r2, r0, r1
            encode(Instruction::new(0x00, 0, 0, 0)),  // stop
        ];
        let mut cpu = cpu_with_program(&program);
        for _ in 0..3 {
            assert_eq!(cpu.step(), CpuStep::Continued);
        }
        assert_eq!(cpu.registers().get(2), 42);
        assert_eq!(cpu.step(), CpuStep::Halted);
    }

    #[test]
    fn divide_by_zero_without_handler_is_fatal() {
        let program = [
            encode(Instruction::new(0x11, 0, 0, 1)), // loadi r0, 1
            encode(Instruction::new(0x11, 1, 0, 0)), // loadi r1, 0
            encode(Instruction::with_reg3(0x4c, 2, 0, 1)), // div r2, r0, r1
        ];
        let mut cpu = cpu_with_program(&program);
        cpu.step();
        cpu.step();
        assert_eq!(cpu.step(), CpuStep::Faulted(InterruptKind::DivideByZero));
    }

    #[test]
    fn interrupt_save_restore_round_trips_through_reti() {
        // Handler table at address 0x40: divide-by-zero (code 4) handler at 0x80.
        let mut memory = Memory::new(512);
        memory.set_word(0x40 + 4 * 4, 0x80, Endian::Host).unwrap();
        // Handler: reti immediately.
        memory
            .set_word(0x80, encode(Instruction::new(0x35, 0, 0, 0)), Endian::Host)
            .unwrap();

        let program = [
            encode(Instruction::new(0x11, 14, 0, 0x100)), // loadi stp, 0x100
            encode(Instruction::new(0x11, 15, 0, 0x40)),  // loadi itp, 0x40
            encode(Instruction::new(0x11, 3, 0, 0xAB)),   // loadi r3, 0xAB (canary)
            encode(Instruction::new(0x11, 0, 0, 1)),      // loadi r0, 1
            encode(Instruction::new(0x11, 1, 0, 0)),      // loadi r1, 0
            encode(Instruction::with_reg3(0x4c, 2, 0, 1)), // div r2, r0, r1 -> fault
            encode(Instruction::new(0x00, 0, 0, 0)),      // stop
        ];
        for (i, word) in program.iter().enumerate() {
            memory
                .set_word((i * 4) as u16, *word, Endian::Host)
                .unwrap();
        }

        let mut cpu = Cpu::new(Cpu::isa(), memory);
        for _ in 0..5 {
            assert_eq!(cpu.step(), CpuStep::Continued);
        }
        let pc_at_fault = cpu.registers().pc();
        assert_eq!(cpu.step(), CpuStep::Continued); // div faults, dispatches to handler
        assert_eq!(cpu.registers().pc(), 0x80);
        assert_eq!(cpu.registers().get(0), InterruptKind::DivideByZero.code() as u32);

        assert_eq!(cpu.step(), CpuStep::Continued); // reti
        assert_eq!(cpu.registers().pc(), pc_at_fault + 4);
        assert_eq!(cpu.registers().get(3), 0xAB); // canary survived save/restore
        assert_eq!(cpu.registers().stp(), 0x100);
    }
}
