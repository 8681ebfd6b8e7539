use std::collections::BTreeMap;

use tracing::trace;

use crate::entry::parse_u32_literal;
use crate::ini::ConfigSource;

/// Section holding `address = cycles` speed-hack rows.
pub const SPEEDHACKS_SECTION: &str = "Speedhacks";

/// Per-address cycle counts used to scale synthetic idle/wait cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeedHackTable {
    cycles: BTreeMap<u32, u32>,
}

impl SpeedHackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from `sources` in order; later sources replace rows of earlier ones.
    pub fn from_sources(section: &str, sources: &[&dyn ConfigSource]) -> Self {
        let mut table = Self::new();
        for source in sources {
            table.load_section(*source, section);
        }
        table
    }

    /// Adds the rows of `section`. Rows whose address or cycle count does not parse are dropped.
    pub fn load_section(&mut self, source: &dyn ConfigSource, section: &str) {
        for (key, value) in source.key_values(section) {
            match (parse_u32_literal(&key), parse_u32_literal(&value)) {
                (Some(address), Some(cycles)) => {
                    self.cycles.insert(address, cycles);
                }
                _ => trace!(section, key = %key, value = %value, "dropping malformed speed hack"),
            }
        }
    }

    /// Cycle count for `address`, or 0 when there is no row.
    ///
    /// 0 is also a valid stored count, so this cannot be used to test for presence.
    pub fn cycles(&self, address: u32) -> u32 {
        self.cycles.get(&address).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn clear(&mut self) {
        self.cycles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.cycles.iter().map(|(&address, &cycles)| (address, cycles))
    }
}
