//! In-memory line model backing all reads and edits.

use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Write};
use std::path::Path;
use std::str::FromStr;

use conf_core::error::Result;
use conf_core::file_system::write_atomic;
use indexmap::IndexMap;
use tracing::debug;

use crate::line::{ConfLine, Entry};

/// An editable configuration file that keeps every line it does not change
/// byte-for-byte.
///
/// The stored text is the only state. Lines are re-parsed on every call, so an
/// edit to one key can never disturb the representation of any other line.
/// When a key appears more than once, lookups and edits act on the first
/// matching line in file order.
///
/// # Examples
/// ```
/// use conf_parser::LineStore;
///
/// let mut store = LineStore::parse_str("# debug = false\nport = 8080\n");
/// assert_eq!(store.get("debug"), None);
/// assert_eq!(store.get_including_commented("debug"), Some("false"));
///
/// store.uncomment("debug");
/// store.set("port", "9090");
/// assert_eq!(store.to_string(), "debug = false\nport = 9090");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<String>,
}

impl LineStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load lines from a buffered character source until end of input.
    pub fn from_buf_read<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(Self::parse_str(&content))
    }

    /// Load lines from a byte stream. Input must be UTF-8.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_buf_read(BufReader::new(reader))
    }

    pub fn from_file(file: File) -> Result<Self> {
        Self::from_reader(file)
    }

    /// Load the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::from_file(File::open(path)?)?;
        debug!("Loaded {} lines from {}", store.len(), path.display());
        Ok(store)
    }

    /// Split in-memory text into lines. Never fails.
    ///
    /// `\r\n`, `\n` and a lone `\r` all end a line; a terminator at the very
    /// end does not start an extra empty line.
    pub fn parse_str(content: &str) -> Self {
        let mut lines = Vec::new();
        let mut rest = content;
        while !rest.is_empty() {
            match rest.find(|c| c == '\r' || c == '\n') {
                Some(end) => {
                    lines.push(rest[..end].to_owned());
                    let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                    rest = &rest[end + terminator..];
                }
                None => {
                    lines.push(rest.to_owned());
                    break;
                }
            }
        }
        Self { lines }
    }

    /// The stored lines in file order, including any edits made so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every `key = value` line in file order, active or commented.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.lines
            .iter()
            .filter_map(|line| ConfLine::parse(line).entry())
    }

    /// Value of the first active line for `key`.
    ///
    /// A key that only exists commented out is reported as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .find(|e| e.is_active() && e.matches_key(key))
            .map(|e| e.value())
    }

    /// Value of the first line for `key`, whether commented or not.
    pub fn get_including_commented(&self, key: &str) -> Option<&str> {
        self.entries()
            .find(|e| e.matches_key(key))
            .map(|e| e.value())
    }

    /// Whether the first line for `key` is commented out.
    ///
    /// Returns `false` both for active keys and for keys that are not present.
    pub fn is_commented(&self, key: &str) -> bool {
        self.entries()
            .find(|e| e.matches_key(key))
            .is_some_and(|e| e.is_commented())
    }

    /// All active entries, keyed in order of first appearance.
    ///
    /// Unlike [`get`](Self::get), a key repeated on several active lines maps to
    /// the value of its *last* occurrence.
    pub fn get_all(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        for entry in self.entries().filter(|e| e.is_active()) {
            map.insert(entry.key.to_string(), entry.value().to_string());
        }
        map
    }

    /// Set `key` to `value` on its first line, or append a new line.
    ///
    /// Indentation and any trailing comment are kept. If the first line for
    /// `key` is commented out, it becomes active.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.position(key, |_| true) {
            Some((index, entry)) => {
                let updated = entry.with_value(value);
                debug!(key, index, "Updating entry");
                self.lines[index] = updated;
            }
            None => {
                debug!(key, index = self.lines.len(), "Appending new entry");
                self.lines.push(format!("{} = {}", key, value));
            }
        }
    }

    /// Comment out the first active line for `key`. No-op if there is none.
    pub fn comment(&mut self, key: &str) {
        if let Some((index, entry)) = self.position(key, |e| e.is_active()) {
            let commented = entry.to_commented();
            debug!(key, index, "Commenting out entry");
            self.lines[index] = commented;
        }
    }

    /// Re-activate the first commented line for `key`. No-op if there is none.
    pub fn uncomment(&mut self, key: &str) {
        if let Some((index, entry)) = self.position(key, |e| e.is_commented()) {
            let active = entry.to_active();
            debug!(key, index, "Uncommenting entry");
            self.lines[index] = active;
        }
    }

    /// Write every line followed by `\n`, then flush.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for line in &self.lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Overwrite the file at `path` with the current lines.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_atomic(path, &self.to_bytes())?;
        debug!("Saved {} lines to {}", self.len(), path.display());
        Ok(())
    }

    /// The serialized file as a fresh readable stream.
    pub fn to_reader(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.to_bytes())
    }

    fn to_bytes(&self) -> Vec<u8> {
        let capacity = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut bytes = Vec::with_capacity(capacity);
        for line in &self.lines {
            bytes.extend_from_slice(line.as_bytes());
            bytes.push(b'\n');
        }
        bytes
    }

    fn position<P>(&self, key: &str, predicate: P) -> Option<(usize, Entry<'_>)>
    where
        P: Fn(&Entry<'_>) -> bool,
    {
        self.lines.iter().enumerate().find_map(|(index, line)| {
            ConfLine::parse(line)
                .entry()
                .filter(|e| e.matches_key(key) && predicate(e))
                .map(|e| (index, e))
        })
    }
}

/// Lines joined with `\n`, without a terminator after the last one.
impl fmt::Display for LineStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

impl FromStr for LineStore {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse_str(s))
    }
}

impl From<&str> for LineStore {
    fn from(content: &str) -> Self {
        Self::parse_str(content)
    }
}

impl From<String> for LineStore {
    fn from(content: String) -> Self {
        Self::parse_str(&content)
    }
}

impl From<Vec<String>> for LineStore {
    fn from(lines: Vec<String>) -> Self {
        Self { lines }
    }
}
