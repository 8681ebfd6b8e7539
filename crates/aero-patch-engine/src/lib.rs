//! Per-frame guest memory patches.
//!
//! Patches are small lists of byte/halfword/word writes (optionally guarded by a compare) that are
//! applied to guest memory once per emulated video interrupt. They are defined in two ini sources:
//! a shipped global/default file and a user-local file. The local file may add its own patches and
//! override which patches are enabled; [`save_patch_section`] writes back only what differs from
//! the shipped defaults.
//!
//! Because frame patches are driven by the VI interrupt rather than a hook in the guest, the CPU
//! may be sitting in an exception vector when [`PatchEngine::apply_frame_patches`] runs. The engine
//! checks that translation is enabled and the stack looks like normal code before touching guest
//! memory; otherwise it declines and the caller retries on a later cycle.

#![forbid(unsafe_code)]

mod config;
mod engine;
mod entry;
mod error;
mod gate;
mod host;
mod ini;
mod patch;
mod speedhacks;

pub use config::PatchEngineConfig;
pub use engine::{apply_patches, PatchEngine, SessionFlags};
pub use entry::{parse_u32_literal, PatchEntry, PatchType};
pub use error::{PatchEngineError, Result};
pub use gate::{is_memory_access_safe, is_stack_sane};
pub use host::{CodeEngines, CpuSnapshot, CpuState, GuestMemory, MachineState, NoCodeEngines};
pub use ini::{ConfigSource, IniFile};
pub use patch::{
    load_patch_section, save_patch_section, Patch, PatchSectionLines, ON_FRAME_SECTION,
};
pub use speedhacks::{SpeedHackTable, SPEEDHACKS_SECTION};
