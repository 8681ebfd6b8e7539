use tracing::trace;

use crate::entry::PatchEntry;
use crate::ini::{ConfigSource, IniFile};

/// Section holding per-frame patch definitions.
pub const ON_FRAME_SECTION: &str = "OnFrame";

/// A named list of entries that is applied as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub name: String,
    pub entries: Vec<PatchEntry>,
    pub enabled: bool,
    /// `enabled` as shipped by the global configuration, before local overrides.
    pub default_enabled: bool,
    /// Defined by the local configuration; only these are written back in full.
    pub user_defined: bool,
}

impl Patch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the current state differs from the shipped default and must be persisted.
    pub fn is_overridden(&self) -> bool {
        self.enabled != self.default_enabled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Global,
    Local,
}

pub(crate) fn enabled_section(section: &str) -> String {
    format!("{section}_Enabled")
}

pub(crate) fn disabled_section(section: &str) -> String {
    format!("{section}_Disabled")
}

/// Builds the patch list for `section` from the global source, then the local one.
///
/// After the global pass every patch's `enabled` state is recorded as its `default_enabled`, so the
/// local `_Enabled`/`_Disabled` overrides show up as differences from the shipped defaults.
pub fn load_patch_section(
    section: &str,
    global: &dyn ConfigSource,
    local: &dyn ConfigSource,
) -> Vec<Patch> {
    let mut patches = Vec::new();

    for (source, origin) in [(global, Origin::Global), (local, Origin::Local)] {
        let mut current = Patch::default();

        for line in source.lines(section) {
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix('$') {
                // A header closes the previous patch even if it ended up with no entries.
                let previous = std::mem::take(&mut current);
                if !previous.name.is_empty() {
                    patches.push(previous);
                }
                current.name = name.to_string();
                current.user_defined = origin == Origin::Local;
            } else if let Some(entry) = PatchEntry::deserialize(&line) {
                current.entries.push(entry);
            } else {
                trace!(section, line = %line, "dropping malformed patch line");
            }
        }

        // The trailing patch additionally needs at least one entry.
        if !current.name.is_empty() && !current.entries.is_empty() {
            patches.push(current);
        }

        read_enabled_and_disabled(source, section, &mut patches);

        if origin == Origin::Global {
            for patch in &mut patches {
                patch.default_enabled = patch.enabled;
            }
        }
    }

    patches
}

fn read_enabled_and_disabled(source: &dyn ConfigSource, section: &str, patches: &mut [Patch]) {
    for (override_section, enabled) in [
        (enabled_section(section), true),
        (disabled_section(section), false),
    ] {
        for line in source.lines(&override_section) {
            let Some(name) = line.strip_prefix('$') else {
                continue;
            };
            for patch in patches.iter_mut().filter(|p| p.name == name) {
                patch.enabled = enabled;
            }
        }
    }
}

/// Line sets produced by [`save_patch_section`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSectionLines {
    /// `$name` headers and serialized entries of user-defined patches.
    pub definitions: Vec<String>,
    /// `$name` of patches enabled against their default.
    pub enabled: Vec<String>,
    /// `$name` of patches disabled against their default.
    pub disabled: Vec<String>,
}

impl PatchSectionLines {
    /// Replaces `section` and its `_Enabled`/`_Disabled` companions in `ini`.
    pub fn store(&self, ini: &mut IniFile, section: &str) {
        ini.set_lines(&enabled_section(section), self.enabled.iter().cloned());
        ini.set_lines(&disabled_section(section), self.disabled.iter().cloned());
        ini.set_lines(section, self.definitions.iter().cloned());
    }
}

pub fn save_patch_section(patches: &[Patch]) -> PatchSectionLines {
    let mut lines = PatchSectionLines::default();

    for patch in patches {
        if patch.is_overridden() {
            let target = if patch.enabled {
                &mut lines.enabled
            } else {
                &mut lines.disabled
            };
            target.push(format!("${}", patch.name));
        }

        if !patch.user_defined {
            continue;
        }

        lines.definitions.push(format!("${}", patch.name));
        lines
            .definitions
            .extend(patch.entries.iter().map(PatchEntry::serialize));
    }

    lines
}
