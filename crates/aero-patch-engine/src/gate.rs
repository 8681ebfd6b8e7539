//! Checks that decide whether guest memory can be patched right now.
//!
//! Frame patches are driven by the VI interrupt, so the CPU can be anywhere, including inside an
//! exception vector with a half-built stack. There is no exact test for that; these checks only
//! accept states that look like ordinary code with at least two frames on the stack.

use crate::host::{CpuState, GuestMemory, MachineState};

/// Whether memory may be patched this cycle: translation is on and the stack looks sane.
pub fn is_memory_access_safe<C, M>(cpu: &C, memory: &M) -> bool
where
    C: CpuState + ?Sized,
    M: GuestMemory + ?Sized,
{
    cpu.machine_state()
        .contains(MachineState::DR | MachineState::IR)
        && is_stack_sane(cpu.stack_pointer(), memory)
}

/// Walks one frame up from `sp` and checks that the saved link register points at code.
///
/// Only meaningful with data and instruction translation enabled.
pub fn is_stack_sane<M>(sp: u32, memory: &M) -> bool
where
    M: GuestMemory + ?Sized,
{
    if !memory.is_ram_address(sp) {
        return false;
    }

    // Back chain to the caller's frame; stacks grow down.
    let next_sp = memory.read_u32(sp);
    let lr_slot = next_sp.wrapping_add(4);
    if next_sp <= sp || !memory.is_ram_address(next_sp) || !memory.is_ram_address(lr_slot) {
        return false;
    }

    let return_address = memory.read_u32(lr_slot);
    memory.is_instruction_ram_address(return_address)
        && memory.read_instruction(return_address) != 0
}
