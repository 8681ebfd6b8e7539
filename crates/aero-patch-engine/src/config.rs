use std::path::PathBuf;

use crate::engine::SessionFlags;
use crate::error::Result;
use crate::ini::IniFile;

/// Where the engine finds its configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchEngineConfig {
    /// Shipped defaults (read-only).
    pub global_ini: Option<PathBuf>,
    /// User overrides and user-defined patches; the only file written back.
    pub local_ini: Option<PathBuf>,
    pub session: SessionFlags,
}

impl PatchEngineConfig {
    pub fn load_global(&self) -> Result<IniFile> {
        load_optional(self.global_ini.as_ref())
    }

    pub fn load_local(&self) -> Result<IniFile> {
        load_optional(self.local_ini.as_ref())
    }
}

fn load_optional(path: Option<&PathBuf>) -> Result<IniFile> {
    match path {
        Some(path) => IniFile::load(path),
        None => Ok(IniFile::new()),
    }
}
