use bitflags::bitflags;

use crate::ini::ConfigSource;

/// Guest memory as seen through the CPU's current address translation.
///
/// Reads take `&self` so the stack heuristic can run against a read-only view; the host is
/// responsible for any byte order conversion.
pub trait GuestMemory {
    fn read_u8(&self, addr: u32) -> u8;
    fn read_u16(&self, addr: u32) -> u16;
    fn read_u32(&self, addr: u32) -> u32;

    fn write_u8(&mut self, addr: u32, value: u8);
    fn write_u16(&mut self, addr: u32, value: u16);
    fn write_u32(&mut self, addr: u32, value: u32);

    /// Whether `addr` translates to RAM through the data address space.
    fn is_ram_address(&self, addr: u32) -> bool;

    /// Whether `addr` translates to RAM through the instruction address space.
    fn is_instruction_ram_address(&self, addr: u32) -> bool;

    /// Fetches the instruction word at `addr` through the instruction address space.
    fn read_instruction(&self, addr: u32) -> u32 {
        self.read_u32(addr)
    }
}

bitflags! {
    /// Machine state register bits the engine cares about. Other bits are retained as-is.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct MachineState: u32 {
        /// Data address translation.
        const DR = 1 << 4;
        /// Instruction address translation.
        const IR = 1 << 5;
    }
}

/// Register state consulted before patching.
pub trait CpuState {
    fn stack_pointer(&self) -> u32;
    fn program_counter(&self) -> u32;
    fn machine_state(&self) -> MachineState;
}

/// Plain register snapshot, for hosts that capture state before calling into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub sp: u32,
    pub pc: u32,
    pub msr: MachineState,
}

impl CpuSnapshot {
    /// Snapshot with both translation bits set.
    pub fn translated(sp: u32, pc: u32) -> Self {
        Self {
            sp,
            pc,
            msr: MachineState::DR | MachineState::IR,
        }
    }
}

impl CpuState for CpuSnapshot {
    fn stack_pointer(&self) -> u32 {
        self.sp
    }

    fn program_counter(&self) -> u32 {
        self.pc
    }

    fn machine_state(&self) -> MachineState {
        self.msr
    }
}

/// Code injection engines that run alongside frame patches (built-in fixups, a code handler and
/// an active code list).
///
/// Every hook defaults to a no-op.
pub trait CodeEngines {
    /// Load codes from the same sources as the frame patches.
    fn load_codes(&mut self, _global: &dyn ConfigSource, _local: &dyn ConfigSource) {}

    /// Use the code set synchronized from a remote session instead of loading one.
    fn activate_synced_codes(&mut self) {}

    /// Built-in fixed-function behaviour. Runs first so user codes can override its writes.
    fn run_fixed_functions(&mut self, _memory: &mut dyn GuestMemory) {}

    fn run_code_handler(&mut self, _memory: &mut dyn GuestMemory) {}

    /// Secondary active-code engine, run after frame patches.
    fn run_active_codes(&mut self, _memory: &mut dyn GuestMemory) {}

    /// Drop all active codes.
    fn shutdown(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCodeEngines;

impl CodeEngines for NoCodeEngines {}
