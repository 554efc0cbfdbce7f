use super::IniEntry;

/// One logical line of an INI file
///
/// Settings continued with a trailing backslash span several raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Header { name: String, raw: String },
    Setting { key: String, value: String, raw: Vec<String> },
    Other(String),
}

/// Line-preserving model of an INI file
///
/// Only lines holding settings that are set or removed get rewritten;
/// comments, blank lines and every untouched setting render back verbatim.
/// A stanza may appear more than once, and a setting may repeat within
/// one; like Splunk, the last occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
    line_ending: &'static str,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            line_ending: "\n",
        }
    }

    pub fn parse(content: &str) -> Self {
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let mut lines = Vec::new();
        let mut raw_lines = content.lines();

        while let Some(raw) = raw_lines.next() {
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                lines.push(Line::Other(raw.to_string()));
                continue;
            }

            if let Some(name) = parse_header(trimmed) {
                lines.push(Line::Header {
                    name,
                    raw: raw.to_string(),
                });
                continue;
            }

            if let Some((key, _)) = trimmed.split_once('=') {
                let mut raw_setting = vec![raw.to_string()];
                while raw_setting.last().is_some_and(|l| is_continued(l)) {
                    match raw_lines.next() {
                        Some(next) => raw_setting.push(next.to_string()),
                        None => break,
                    }
                }

                lines.push(Line::Setting {
                    key: key.trim().to_string(),
                    value: setting_value(&raw_setting),
                    raw: raw_setting,
                });
                continue;
            }

            lines.push(Line::Other(raw.to_string()));
        }

        Self { lines, line_ending }
    }

    pub fn render(&self) -> String {
        let mut raw: Vec<&str> = Vec::new();
        for line in &self.lines {
            match line {
                Line::Header { raw: text, .. } | Line::Other(text) => raw.push(text),
                Line::Setting { raw: texts, .. } => raw.extend(texts.iter().map(String::as_str)),
            }
        }

        if raw.is_empty() {
            return String::new();
        }

        let mut out = raw.join(self.line_ending);
        out.push_str(self.line_ending);
        out
    }

    /// Effective value of a setting across every copy of its stanza
    pub fn get(&self, section: &str, setting: &str) -> Option<String> {
        self.setting_indices(section, setting)
            .last()
            .and_then(|&i| match &self.lines[i] {
                Line::Setting { value, .. } => Some(value.clone()),
                _ => None,
            })
    }

    /// Set a setting, rewriting every occurrence in place or inserting it
    pub fn set(&mut self, section: &str, setting: &str, value: &str) {
        let line = Line::Setting {
            key: setting.to_string(),
            value: value.to_string(),
            raw: vec![format!("{} = {}", setting, value)],
        };

        let existing = self.setting_indices(section, setting);
        if !existing.is_empty() {
            for i in existing {
                self.lines[i] = line.clone();
            }
            return;
        }

        match self.insertion_point(section) {
            Some(at) => self.lines.insert(at, line),
            None => {
                let needs_separator = self
                    .lines
                    .last()
                    .is_some_and(|l| !matches!(l, Line::Other(text) if text.trim().is_empty()));
                if needs_separator {
                    self.lines.push(Line::Other(String::new()));
                }

                self.lines.push(Line::Header {
                    name: section.to_string(),
                    raw: format!("[{}]", section),
                });
                self.lines.push(line);
            }
        }
    }

    /// Remove every occurrence of a setting, returning whether any existed
    ///
    /// Copies of the stanza left with nothing but blank lines are dropped;
    /// other copies are untouched.
    pub fn remove(&mut self, section: &str, setting: &str) -> bool {
        let existing = self.setting_indices(section, setting);
        if existing.is_empty() {
            return false;
        }

        for i in existing.into_iter().rev() {
            self.lines.remove(i);
        }

        if !section.is_empty() {
            self.drop_empty_copies(section);
        }

        true
    }

    /// One entry per distinct setting, in order of first appearance
    pub fn entries(&self) -> Vec<IniEntry> {
        let mut entries: Vec<IniEntry> = Vec::new();

        for (line, section) in self.lines.iter().zip(self.line_sections()) {
            if let Line::Setting { key, value, .. } = line {
                let seen = entries
                    .iter()
                    .position(|e| e.section == section && e.setting == *key);

                match seen {
                    Some(i) => entries[i].value = value.clone(),
                    None => entries.push(IniEntry {
                        section: section.to_string(),
                        setting: key.clone(),
                        value: value.clone(),
                    }),
                }
            }
        }

        entries
    }

    /// Stanza each line belongs to; "" before the first header
    fn line_sections(&self) -> Vec<&str> {
        let mut current = "";
        self.lines
            .iter()
            .map(|line| {
                if let Line::Header { name, .. } = line {
                    current = name.as_str();
                }
                current
            })
            .collect()
    }

    fn setting_indices(&self, section: &str, setting: &str) -> Vec<usize> {
        self.lines
            .iter()
            .zip(self.line_sections())
            .enumerate()
            .filter_map(|(i, (line, line_section))| match line {
                Line::Setting { key, .. } if key == setting && line_section == section => Some(i),
                _ => None,
            })
            .collect()
    }

    fn header_indices(&self, section: &str) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| match line {
                Line::Header { name, .. } if name == section => Some(i),
                _ => None,
            })
            .collect()
    }

    /// End (exclusive) of the stanza copy whose header is at `header`
    fn copy_end(&self, header: usize) -> usize {
        self.lines[header + 1..]
            .iter()
            .position(|l| matches!(l, Line::Header { .. }))
            .map(|offset| header + 1 + offset)
            .unwrap_or(self.lines.len())
    }

    /// Where a new setting goes: after the last setting of the last copy of
    /// the stanza, or right after its header. `None` if the stanza is missing.
    /// The global area is never missing.
    fn insertion_point(&self, section: &str) -> Option<usize> {
        let (start, end) = if section.is_empty() {
            let end = self
                .lines
                .iter()
                .position(|l| matches!(l, Line::Header { .. }))
                .unwrap_or(self.lines.len());
            (0, end)
        } else {
            let header = *self.header_indices(section).last()?;
            (header + 1, self.copy_end(header))
        };

        let after_last_setting = self.lines[start..end]
            .iter()
            .rposition(|l| matches!(l, Line::Setting { .. }))
            .map(|offset| start + offset + 1);

        // First global setting goes just before the first stanza
        let fallback = if section.is_empty() { end } else { start };
        Some(after_last_setting.unwrap_or(fallback))
    }

    fn drop_empty_copies(&mut self, section: &str) {
        let mut dropped = false;

        for header in self.header_indices(section).into_iter().rev() {
            let end = self.copy_end(header);
            let only_blank = self.lines[header + 1..end]
                .iter()
                .all(|l| matches!(l, Line::Other(text) if text.trim().is_empty()));

            if only_blank {
                self.lines.drain(header..end);
                dropped = true;
            }
        }

        if dropped {
            while matches!(self.lines.last(), Some(Line::Other(text)) if text.trim().is_empty()) {
                self.lines.pop();
            }
        }
    }
}

fn parse_header(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix('[')?;
    let close = rest.rfind(']')?;
    Some(rest[..close].trim().to_string())
}

fn is_continued(raw: &str) -> bool {
    raw.trim_end().ends_with('\\')
}

/// Value of a possibly continued setting, continuation backslashes removed
fn setting_value(raw: &[String]) -> String {
    let last = raw.len().saturating_sub(1);
    let segments: Vec<&str> = raw
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let text = if i == 0 {
                line.split_once('=').map(|(_, v)| v).unwrap_or("")
            } else {
                line.as_str()
            };

            if i < last {
                let text = text.trim_end();
                text.strip_suffix('\\').unwrap_or(text)
            } else {
                text
            }
        })
        .collect();

    segments.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_content_renders_verbatim() {
        let content = "\
# managed by hand
[syslog]
TZ=UTC
  SHOULD_LINEMERGE =   false   ; spacing kept

[weird] trailing
EXTRACT-x = (?<x>\\d+)
";
        assert_eq!(Document::parse(content).render(), content);
    }

    #[test]
    fn crlf_line_endings_are_kept() {
        let content = "[syslog]\r\nTZ = UTC\r\n";
        let mut doc = Document::parse(content);
        doc.set("syslog", "KV_MODE", "none");
        assert_eq!(doc.render(), "[syslog]\r\nTZ = UTC\r\nKV_MODE = none\r\n");
    }

    #[test]
    fn continued_values_are_joined_and_preserved() {
        let content = "[syslog]\nREGEX = ^(\\d+) \\\n  more\nTZ = UTC\n";
        let mut doc = Document::parse(content);

        assert_eq!(doc.get("syslog", "REGEX").as_deref(), Some("^(\\d+) \n  more"));
        assert_eq!(doc.get("syslog", "TZ").as_deref(), Some("UTC"));

        doc.set("syslog", "TZ", "GMT");
        assert_eq!(doc.render(), "[syslog]\nREGEX = ^(\\d+) \\\n  more\nTZ = GMT\n");
    }

    #[test]
    fn replacing_a_continued_value_rewrites_all_its_lines() {
        let mut doc = Document::parse("[syslog]\nREGEX = a\\\nb\nTZ = UTC\n");
        doc.set("syslog", "REGEX", "ab");
        assert_eq!(doc.render(), "[syslog]\nREGEX = ab\nTZ = UTC\n");
    }

    #[test]
    fn repeated_stanzas_are_merged_for_lookup() {
        let doc = Document::parse("[syslog]\nTZ = UTC\n\n[other]\nX = 1\n\n[syslog]\nKEEP = me\n");
        assert_eq!(doc.get("syslog", "TZ").as_deref(), Some("UTC"));
        assert_eq!(doc.get("syslog", "KEEP").as_deref(), Some("me"));
    }

    #[test]
    fn later_occurrence_wins() {
        let doc = Document::parse("[syslog]\nTZ = UTC\nTZ = GMT\n");
        assert_eq!(doc.get("syslog", "TZ").as_deref(), Some("GMT"));
        assert_eq!(doc.entries().len(), 1);
        assert_eq!(doc.entries()[0].value, "GMT");
    }

    #[test]
    fn removing_from_one_copy_keeps_the_other() {
        let mut doc =
            Document::parse("[syslog]\nTZ = UTC\n\n[other]\nX = 1\n\n[syslog]\nKEEP = me\n");

        assert!(doc.remove("syslog", "TZ"));
        assert_eq!(doc.get("syslog", "KEEP").as_deref(), Some("me"));
        assert_eq!(doc.render(), "[other]\nX = 1\n\n[syslog]\nKEEP = me\n");
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let mut doc = Document::parse("[syslog]\nTZ = UTC\nKV_MODE = none\nTZ = GMT\n");
        assert!(doc.remove("syslog", "TZ"));
        assert!(!doc.remove("syslog", "TZ"));
        assert_eq!(doc.render(), "[syslog]\nKV_MODE = none\n");
    }

    #[test]
    fn set_rewrites_every_duplicate() {
        let mut doc = Document::parse("[syslog]\nTZ = UTC\nTZ = GMT\n");
        doc.set("syslog", "TZ", "CET");
        assert_eq!(doc.render(), "[syslog]\nTZ = CET\nTZ = CET\n");
    }

    #[test]
    fn stanza_with_comments_is_kept_when_emptied() {
        let mut doc = Document::parse("[syslog]\n# why TZ is set\nTZ = UTC\n");
        assert!(doc.remove("syslog", "TZ"));
        assert_eq!(doc.render(), "[syslog]\n# why TZ is set\n");
    }

    #[test]
    fn emptied_stanza_in_the_middle_is_dropped() {
        let mut doc = Document::parse("[a]\nX = 1\n\n[syslog]\nTZ = UTC\n\n[b]\nY = 2\n");
        assert!(doc.remove("syslog", "TZ"));
        assert_eq!(doc.render(), "[a]\nX = 1\n\n[b]\nY = 2\n");
    }

    #[test]
    fn new_setting_goes_after_last_setting_of_stanza() {
        let mut doc = Document::parse("[syslog]\nTZ = UTC\n\n# next\n[b]\nY = 2\n");
        doc.set("syslog", "KV_MODE", "none");
        assert_eq!(doc.render(), "[syslog]\nTZ = UTC\nKV_MODE = none\n\n# next\n[b]\nY = 2\n");
    }

    #[test]
    fn new_stanza_is_appended() {
        let mut doc = Document::parse("[syslog]\nTZ = UTC\n");
        doc.set("json", "KV_MODE", "json");
        assert_eq!(doc.render(), "[syslog]\nTZ = UTC\n\n[json]\nKV_MODE = json\n");
    }

    #[test]
    fn global_settings_go_before_first_stanza() {
        let mut doc = Document::parse("# header\n[syslog]\nTZ = UTC\n");
        doc.set("", "LEARN_MODEL", "false");

        assert_eq!(doc.get("", "LEARN_MODEL").as_deref(), Some("false"));
        assert_eq!(doc.render(), "# header\nLEARN_MODEL = false\n[syslog]\nTZ = UTC\n");
    }

    #[test]
    fn empty_document_renders_empty() {
        assert_eq!(Document::new().render(), "");
        assert!(Document::parse("").entries().is_empty());
    }
}
