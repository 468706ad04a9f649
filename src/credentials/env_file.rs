//! `.env`-style `KEY=VALUE` files.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Flat key/value mapping, ordered by key so renders are reproducible.
pub type EnvMap = BTreeMap<String, String>;

/// A parsed file that also remembers the lines carrying no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocument {
    /// Comments, blank lines and malformed lines, in file order.
    pub other_lines: Vec<String>,
    pub entries: EnvMap,
}

impl EnvDocument {
    pub fn parse(content: &str) -> Self {
        let mut document = Self::default();
        for line in content.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            match entry(line) {
                Some((key, value)) => {
                    document.entries.insert(key.to_string(), value.to_string());
                }
                None => document.other_lines.push(line.to_string()),
            }
        }
        while document
            .other_lines
            .last()
            .is_some_and(|line| line.trim().is_empty())
        {
            document.other_lines.pop();
        }
        document
    }

    /// Retained lines first, then the entries sorted by key.
    pub fn render(&self) -> String {
        let mut out: String = self
            .other_lines
            .iter()
            .map(|line| format!("{line}\n"))
            .collect();
        out.push_str(&render(&self.entries));
        out
    }
}

fn entry(line: &str) -> Option<(&str, &str)> {
    if line.trim_start().starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some((key, value))
}

/// Parse `KEY=VALUE` lines, splitting on the first `=`.
///
/// Blank lines, `#` comments and lines without `=` are skipped. No quoting
/// or escaping is interpreted.
pub fn parse(content: &str) -> EnvMap {
    EnvDocument::parse(content).entries
}

/// Render one `KEY=VALUE` line per entry, sorted by key.
pub fn render(entries: &EnvMap) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}

/// Read and parse a file. A missing file is an empty mapping.
pub fn read(path: &Path) -> io::Result<EnvMap> {
    read_document(path).map(|document| document.entries)
}

/// Like [`read`], keeping the non-entry lines.
pub fn read_document(path: &Path) -> io::Result<EnvDocument> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(EnvDocument::parse(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EnvDocument::default()),
        Err(e) => Err(e),
    }
}
