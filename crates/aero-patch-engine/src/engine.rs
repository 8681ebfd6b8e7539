use tracing::{debug, info};

use crate::config::PatchEngineConfig;
use crate::entry::{PatchEntry, PatchType};
use crate::error::Result;
use crate::gate::is_memory_access_safe;
use crate::host::{CodeEngines, CpuState, GuestMemory, NoCodeEngines};
use crate::ini::ConfigSource;
use crate::patch::{
    load_patch_section, save_patch_section, Patch, PatchSectionLines, ON_FRAME_SECTION,
};
use crate::speedhacks::{SpeedHackTable, SPEEDHACKS_SECTION};

/// Session state owned by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// A synchronized session is running; user frame patches and active codes are suppressed.
    pub override_active: bool,
    /// Code engines should use the session's synchronized codes instead of loading their own.
    pub code_sync_override: bool,
}

/// Frame patch state for one running game.
///
/// Lifecycle: [`load`](Self::load) (or [`reload`](Self::reload)) builds the patch list and speed
/// hack table from scratch, [`apply_frame_patches`](Self::apply_frame_patches) runs once per video
/// interrupt, [`shutdown`](Self::shutdown) drops everything. The engine does no locking; the host
/// calls it from the emulation thread.
#[derive(Debug, Default)]
pub struct PatchEngine<E = NoCodeEngines> {
    on_frame: Vec<Patch>,
    speed_hacks: SpeedHackTable,
    code_engines: E,
}

impl PatchEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: CodeEngines> PatchEngine<E> {
    pub fn with_code_engines(code_engines: E) -> Self {
        Self {
            on_frame: Vec::new(),
            speed_hacks: SpeedHackTable::new(),
            code_engines,
        }
    }

    /// Replaces all patch state with what `global` and `local` define.
    pub fn load(
        &mut self,
        global: &dyn ConfigSource,
        local: &dyn ConfigSource,
        session: SessionFlags,
    ) {
        self.on_frame = load_patch_section(ON_FRAME_SECTION, global, local);

        if session.code_sync_override && !session.override_active {
            self.code_engines.activate_synced_codes();
        } else {
            self.code_engines.load_codes(global, local);
        }

        self.speed_hacks = SpeedHackTable::from_sources(SPEEDHACKS_SECTION, &[global, local]);

        info!(
            patches = self.on_frame.len(),
            enabled = self.on_frame.iter().filter(|p| p.enabled).count(),
            speed_hacks = self.speed_hacks.len(),
            "loaded frame patches"
        );
    }

    /// Loads from the ini files named in `config`. Missing files count as empty.
    pub fn load_from_config(&mut self, config: &PatchEngineConfig) -> Result<()> {
        let global = config.load_global()?;
        let local = config.load_local()?;
        self.load(&global, &local, config.session);
        Ok(())
    }

    pub fn reload(
        &mut self,
        global: &dyn ConfigSource,
        local: &dyn ConfigSource,
        session: SessionFlags,
    ) {
        self.shutdown();
        self.load(global, local, session);
    }

    pub fn shutdown(&mut self) {
        self.on_frame.clear();
        self.speed_hacks.clear();
        self.code_engines.shutdown();
    }

    pub fn patches(&self) -> &[Patch] {
        &self.on_frame
    }

    /// Enables or disables every patch called `name`. Returns `false` if there is none.
    ///
    /// `default_enabled` is left alone, so the change shows up in [`Self::save_patch_section`].
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        for patch in self.on_frame.iter_mut().filter(|p| p.name == name) {
            patch.enabled = enabled;
            found = true;
        }
        found
    }

    pub fn save_patch_section(&self) -> PatchSectionLines {
        save_patch_section(&self.on_frame)
    }

    pub fn speed_hacks(&self) -> &SpeedHackTable {
        &self.speed_hacks
    }

    /// Extra cycles to charge for the instruction at `address`; 0 when there is no speed hack.
    pub fn speedhack_cycles(&self, address: u32) -> u32 {
        self.speed_hacks.cycles(address)
    }

    pub fn code_engines(&self) -> &E {
        &self.code_engines
    }

    pub fn code_engines_mut(&mut self) -> &mut E {
        &mut self.code_engines
    }

    /// Runs one frame's worth of patching.
    ///
    /// Returns `false` without touching anything when the CPU is not in a state where guest memory
    /// can be patched safely (e.g. inside an exception vector). The caller should try again a few
    /// cycles later.
    pub fn apply_frame_patches<C, M>(
        &mut self,
        cpu: &C,
        memory: &mut M,
        session: SessionFlags,
    ) -> bool
    where
        C: CpuState + ?Sized,
        M: GuestMemory,
    {
        if !is_memory_access_safe(cpu, &*memory) {
            debug!(
                pc = %format!("{:#010x}", cpu.program_counter()),
                msr = %format!("{:#010x}", cpu.machine_state().bits()),
                "need to retry frame patches later, CPU state is not patchable"
            );
            return false;
        }

        // Built-in functions first so user codes can overwrite them.
        self.code_engines.run_fixed_functions(memory);
        self.code_engines.run_code_handler(memory);
        if !session.override_active {
            apply_patches(&self.on_frame, memory);
            self.code_engines.run_active_codes(memory);
        }

        true
    }
}

/// Applies every enabled patch in order.
pub fn apply_patches<M>(patches: &[Patch], memory: &mut M)
where
    M: GuestMemory + ?Sized,
{
    for patch in patches.iter().filter(|p| p.enabled) {
        for entry in &patch.entries {
            apply_entry(entry, memory);
        }
    }
}

fn apply_entry<M>(entry: &PatchEntry, memory: &mut M)
where
    M: GuestMemory + ?Sized,
{
    let addr = entry.address;
    match entry.patch_type {
        PatchType::Byte => {
            if !entry.conditional || memory.read_u8(addr) == entry.comparand as u8 {
                memory.write_u8(addr, entry.value as u8);
            }
        }
        PatchType::Word => {
            if !entry.conditional || memory.read_u16(addr) == entry.comparand as u16 {
                memory.write_u16(addr, entry.value as u16);
            }
        }
        PatchType::DWord => {
            if !entry.conditional || memory.read_u32(addr) == entry.comparand {
                memory.write_u32(addr, entry.value);
            }
        }
    }
}
