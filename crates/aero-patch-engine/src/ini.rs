//! Minimal ini store used for game configuration.
//!
//! Sections hold raw lines. Some sections are read as free-form line lists (`[OnFrame]`), others
//! as `key = value` rows (`[Speedhacks]`); both views are derived from the same stored lines, so a
//! section round-trips unchanged through [`IniFile::parse`] and [`IniFile::to_ini_string`].

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{PatchEngineError, Result};

/// Read-only view of a configuration source.
pub trait ConfigSource {
    /// Lines of `section` with comments removed. Empty when the section does not exist.
    fn lines(&self, section: &str) -> Vec<String>;

    /// `key = value` rows of `section`, in file order.
    fn key_values(&self, section: &str) -> Vec<(String, String)>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniFile {
    sections: Vec<Section>,
}

impl IniFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        let mut ini = IniFile::new();
        let mut current: Option<usize> = None;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            // Anything after the closing bracket is ignored.
            if let Some(name) = line
                .strip_prefix('[')
                .and_then(|rest| rest.find(']').map(|end| &rest[..end]))
            {
                current = Some(ini.section_index_or_insert(name.trim()));
                continue;
            }

            // Lines before the first header have nowhere to go.
            if let Some(idx) = current {
                ini.sections[idx].lines.push(line.to_string());
            }
        }

        ini
    }

    /// Loads `path`. A missing file is treated as an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(source) => Err(PatchEngineError::ReadIni {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let write_err = |source| PatchEngineError::WriteIni {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_ini_string()).map_err(write_err)
    }

    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Replaces the contents of `section`, creating it if needed.
    pub fn set_lines<I, S>(&mut self, section: &str, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let idx = self.section_index_or_insert(section);
        self.sections[idx].lines = lines.into_iter().map(Into::into).collect();
    }

    /// Sets `key` in `section`, replacing the last existing row for that key.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let idx = self.section_index_or_insert(section);
        let row = format!("{key} = {value}");
        let lines = &mut self.sections[idx].lines;
        let existing = lines.iter().rposition(|line| {
            matches!(parse_key_value(line), Some((k, _)) if k.eq_ignore_ascii_case(key))
        });
        match existing {
            Some(pos) => lines[pos] = row,
            None => lines.push(row),
        }
    }

    /// Value of `key` in `section`. Keys compare case-insensitively and the last row wins.
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.key_values(section)
            .into_iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        match self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            Some(idx) => idx,
            None => {
                self.sections.push(Section {
                    name: name.to_string(),
                    lines: Vec::new(),
                });
                self.sections.len() - 1
            }
        }
    }
}

impl ConfigSource for IniFile {
    fn lines(&self, section: &str) -> Vec<String> {
        let Some(section) = self.section(section) else {
            return Vec::new();
        };

        section
            .lines
            .iter()
            .filter(|line| !line.starts_with('#'))
            .map(|line| match line.find('#') {
                Some(pos) => line[..pos].trim_end().to_string(),
                None => line.clone(),
            })
            .collect()
    }

    fn key_values(&self, section: &str) -> Vec<(String, String)> {
        let Some(section) = self.section(section) else {
            return Vec::new();
        };

        section
            .lines
            .iter()
            .filter_map(|line| parse_key_value(line))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Splits a `key = value` row. Raw lines (`$`, `+`, `*` prefixed) and comments are not rows.
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    if line.starts_with(&['#', '$', '+', '*'][..]) {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
orphan line
[OnFrame]
$Infinite lives
0x80001234:byte:0x09   # keep at 9

# full-line comment
[onframe_enabled]
$Infinite lives
[Speedhacks]
0x80003000 = 20
0x80004000=\"0x10\"
";

    #[test]
    fn lines_strip_comments_and_ignore_orphans() {
        let ini = IniFile::parse(SAMPLE);
        assert_eq!(
            ini.lines("OnFrame"),
            vec!["$Infinite lives", "0x80001234:byte:0x09"]
        );
        assert!(ini.lines("Missing").is_empty());
    }

    #[test]
    fn section_lookup_is_case_insensitive() {
        let ini = IniFile::parse(SAMPLE);
        assert_eq!(ini.lines("OnFrame_Enabled"), vec!["$Infinite lives"]);
        assert!(ini.has_section("SPEEDHACKS"));
    }

    #[test]
    fn key_values_skip_raw_lines_and_unquote() {
        let ini = IniFile::parse(SAMPLE);
        assert_eq!(
            ini.key_values("Speedhacks"),
            vec![
                ("0x80003000".to_string(), "20".to_string()),
                ("0x80004000".to_string(), "0x10".to_string()),
            ]
        );
        assert!(ini.key_values("OnFrame_Enabled").is_empty());
        assert_eq!(ini.get("speedhacks", "0X80003000"), Some("20".to_string()));
    }

    #[test]
    fn header_ends_at_first_bracket() {
        let ini = IniFile::parse(
            "[Speedhacks]\n0x80003000 = 20\n[OnFrame] # shipped\n$Infinite lives\n",
        );
        assert_eq!(ini.lines("OnFrame"), vec!["$Infinite lives"]);
        assert_eq!(ini.key_values("Speedhacks").len(), 1);
        assert!(ini.lines("Speedhacks").iter().all(|l| !l.contains("OnFrame")));
    }

    #[test]
    fn set_replaces_existing_row() {
        let mut ini = IniFile::parse(SAMPLE);
        ini.set("Speedhacks", "0x80003000", "40");
        ini.set("Speedhacks", "0x80005000", "1");
        assert_eq!(ini.get("Speedhacks", "0x80003000"), Some("40".to_string()));
        assert_eq!(ini.key_values("Speedhacks").len(), 3);
    }

    #[test]
    fn serializes_sections_in_first_seen_order() {
        let mut ini = IniFile::new();
        ini.set_lines("OnFrame", ["$A", "0x00000000:byte:0x00000001"]);
        ini.set_lines("OnFrame_Enabled", Vec::<String>::new());
        ini.set_lines("OnFrame", ["$B"]);

        let text = ini.to_ini_string();
        assert_eq!(text, "[OnFrame]\n$B\n\n[OnFrame_Enabled]\n");
        assert_eq!(IniFile::parse(&text), ini);
    }
}
