#![allow(dead_code)]

use aero_patch_engine::{CodeEngines, ConfigSource, GuestMemory};

pub const RAM_BASE: u32 = 0x8000_0000;
pub const RAM_SIZE: u32 = 0x0004_0000;

pub const STACK_POINTER: u32 = 0x8003_0000;
pub const CALLER_FRAME: u32 = 0x8003_0100;
pub const RETURN_ADDRESS: u32 = 0x8000_1000;

/// Big-endian guest RAM mapped at [`RAM_BASE`], identical in data and instruction space.
pub struct FakeRam {
    bytes: Vec<u8>,
    pub writes: usize,
}

impl FakeRam {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; RAM_SIZE as usize],
            writes: 0,
        }
    }

    /// RAM with two plausible stack frames at [`STACK_POINTER`].
    pub fn with_sane_stack() -> Self {
        let mut ram = Self::new();
        ram.poke_u32(STACK_POINTER, CALLER_FRAME);
        ram.poke_u32(CALLER_FRAME + 4, RETURN_ADDRESS);
        // blr
        ram.poke_u32(RETURN_ADDRESS, 0x4E80_0020);
        ram
    }

    fn offset(&self, addr: u32) -> usize {
        assert!(self.contains(addr), "access outside fake RAM: {addr:#010x}");
        (addr - RAM_BASE) as usize
    }

    fn contains(&self, addr: u32) -> bool {
        addr.checked_sub(RAM_BASE).is_some_and(|off| off < RAM_SIZE)
    }

    /// Writes without counting as a guest write.
    pub fn poke_u32(&mut self, addr: u32, value: u32) {
        let off = self.offset(addr);
        self.bytes[off..off + 4].copy_from_slice(&value.to_be_bytes());
    }

    pub fn peek(&self, addr: u32, len: usize) -> &[u8] {
        let off = self.offset(addr);
        &self.bytes[off..off + len]
    }
}

impl GuestMemory for FakeRam {
    fn read_u8(&self, addr: u32) -> u8 {
        self.bytes[self.offset(addr)]
    }

    fn read_u16(&self, addr: u32) -> u16 {
        let off = self.offset(addr);
        u16::from_be_bytes([self.bytes[off], self.bytes[off + 1]])
    }

    fn read_u32(&self, addr: u32) -> u32 {
        let off = self.offset(addr);
        u32::from_be_bytes(self.bytes[off..off + 4].try_into().unwrap())
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        let off = self.offset(addr);
        self.bytes[off] = value;
        self.writes += 1;
    }

    fn write_u16(&mut self, addr: u32, value: u16) {
        let off = self.offset(addr);
        self.bytes[off..off + 2].copy_from_slice(&value.to_be_bytes());
        self.writes += 1;
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        self.poke_u32(addr, value);
        self.writes += 1;
    }

    fn is_ram_address(&self, addr: u32) -> bool {
        self.contains(addr)
    }

    fn is_instruction_ram_address(&self, addr: u32) -> bool {
        self.contains(addr)
    }
}

/// Code engines that record which hooks ran, in order.
#[derive(Debug, Default)]
pub struct RecordingEngines {
    pub calls: Vec<&'static str>,
    pub loaded_code_lines: Vec<String>,
}

impl CodeEngines for RecordingEngines {
    fn load_codes(&mut self, global: &dyn ConfigSource, local: &dyn ConfigSource) {
        self.calls.push("load_codes");
        self.loaded_code_lines = global.lines("Gecko");
        self.loaded_code_lines.extend(local.lines("Gecko"));
    }

    fn activate_synced_codes(&mut self) {
        self.calls.push("activate_synced_codes");
    }

    fn run_fixed_functions(&mut self, _memory: &mut dyn GuestMemory) {
        self.calls.push("fixed_functions");
    }

    fn run_code_handler(&mut self, _memory: &mut dyn GuestMemory) {
        self.calls.push("code_handler");
    }

    fn run_active_codes(&mut self, memory: &mut dyn GuestMemory) {
        // Observe frame patches that already ran this cycle.
        let _ = memory.read_u32(RAM_BASE);
        self.calls.push("active_codes");
    }

    fn shutdown(&mut self) {
        self.calls.push("shutdown");
        self.loaded_code_lines.clear();
    }
}
