//! Line grammar for `key = value` configuration files.
//!
//! Every stored line is classified on demand by [`ConfLine::parse`]:
//!
//! ```text
//! [ws]['#'][ws]key[ws]=[ws]value[[ws]['#' comment]]
//! ```
//!
//! `key` is made of ASCII letters, digits, `_`, `.` and `-`. The value runs up
//! to the first `#` (or the end of the line). Whitespace between the value and
//! a trailing comment belongs to the trailing remainder, so rewriting the value
//! keeps the comment exactly where the author put it. Anything that does not
//! fit this shape, including a line with a stray `\r` in it, is an opaque line
//! and is never touched.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)(#?)[ \t]*([A-Za-z0-9_.\-]+)[ \t]*=[ \t]*([^#\r\n]*?)([ \t]*(?:#[^\r\n]*)?)$")
        .unwrap()
});

/// A single line of a configuration file, classified by the line grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfLine<'a> {
    /// A `key = value` line, active or commented out.
    Entry(Entry<'a>),
    /// Blank lines, free-form comments, section headers and anything else.
    Opaque,
}

impl<'a> ConfLine<'a> {
    /// Classify `line`. Pure: the same input always yields the same result.
    pub fn parse(line: &'a str) -> Self {
        let Some(caps) = LINE_PATTERN.captures(line) else {
            return ConfLine::Opaque;
        };

        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        ConfLine::Entry(Entry {
            leading: group(1),
            commented: !group(2).is_empty(),
            key: group(3),
            raw_value: group(4),
            trailing: group(5),
        })
    }

    /// The entry, if this line is one.
    pub fn entry(self) -> Option<Entry<'a>> {
        match self {
            ConfLine::Entry(entry) => Some(entry),
            ConfLine::Opaque => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, ConfLine::Opaque)
    }
}

/// Decomposition of a `key = value` line. All parts borrow from the line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Indentation before the comment marker or key.
    pub leading: &'a str,
    /// Whether the key is preceded by `#`.
    pub commented: bool,
    pub key: &'a str,
    /// Value text as written, before trimming.
    pub raw_value: &'a str,
    /// Whitespace and `# comment` after the value, kept verbatim on rewrite.
    pub trailing: &'a str,
}

impl<'a> Entry<'a> {
    /// The value with surrounding whitespace removed.
    pub fn value(&self) -> &'a str {
        self.raw_value.trim()
    }

    pub fn is_active(&self) -> bool {
        !self.commented
    }

    pub fn is_commented(&self) -> bool {
        self.commented
    }

    pub fn matches_key(&self, key: &str) -> bool {
        self.key == key
    }

    /// Render the line with `value` in place of the current one.
    ///
    /// The comment marker is not written back, so a commented line becomes
    /// active once a value is set on it.
    pub fn with_value(&self, value: &str) -> String {
        format!("{}{} = {}{}", self.leading, self.key, value, self.trailing)
    }

    /// Render the line with a `#` in front of the key.
    pub fn to_commented(&self) -> String {
        format!(
            "{}#{} = {}{}",
            self.leading,
            self.key,
            self.value(),
            self.trailing
        )
    }

    /// Render the line without a comment marker.
    pub fn to_active(&self) -> String {
        format!("{}{} = {}{}", self.leading, self.key, self.value(), self.trailing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(line: &str) -> Entry<'_> {
        ConfLine::parse(line)
            .entry()
            .unwrap_or_else(|| panic!("expected an entry: {line:?}"))
    }

    #[test]
    fn parses_active_entry() {
        let e = entry("port = 8080");
        assert_eq!(e.leading, "");
        assert!(e.is_active());
        assert_eq!(e.key, "port");
        assert_eq!(e.value(), "8080");
        assert_eq!(e.trailing, "");
    }

    #[test]
    fn parses_commented_entry() {
        let e = entry("# debug = false");
        assert!(e.is_commented());
        assert_eq!(e.key, "debug");
        assert_eq!(e.value(), "false");
    }

    #[test]
    fn parses_without_spaces_around_equals() {
        let e = entry("#log.level=info");
        assert!(e.is_commented());
        assert_eq!(e.key, "log.level");
        assert_eq!(e.value(), "info");
    }

    #[test]
    fn keeps_indentation_and_trailing_comment() {
        let e = entry("\t  name = old value  # keep this");
        assert_eq!(e.leading, "\t  ");
        assert_eq!(e.key, "name");
        assert_eq!(e.raw_value, "old value");
        assert_eq!(e.trailing, "  # keep this");
    }

    #[test]
    fn trailing_whitespace_without_comment_is_kept() {
        let e = entry("a = b   ");
        assert_eq!(e.value(), "b");
        assert_eq!(e.trailing, "   ");
    }

    #[test]
    fn empty_value_is_an_entry() {
        let e = entry("empty =");
        assert_eq!(e.key, "empty");
        assert_eq!(e.value(), "");

        let e = entry("empty = # nothing here");
        assert_eq!(e.value(), "");
        assert_eq!(e.trailing, "# nothing here");
    }

    #[test]
    fn key_charset() {
        let e = entry("my_key.sub-part2 = x");
        assert_eq!(e.key, "my_key.sub-part2");
    }

    #[test]
    fn opaque_lines() {
        for line in [
            "",
            "   ",
            "# just a comment",
            "[section]",
            "no equals sign here",
            "## double = marker",
            "key with space = value",
            "= value",
            "ключ = значение",
            "a = 1\rb = 2",
            "a = 1 # note\r",
        ] {
            assert!(ConfLine::parse(line).is_opaque(), "{line:?} should be opaque");
        }
    }

    #[test]
    fn parse_is_deterministic() {
        let line = "  #retries = 3 # default";
        assert_eq!(ConfLine::parse(line), ConfLine::parse(line));
    }

    #[test]
    fn with_value_rewrites_around_comment() {
        let e = entry("name = old # keep this");
        assert_eq!(e.with_value("new"), "name = new # keep this");
    }

    #[test]
    fn with_value_drops_comment_marker() {
        let e = entry("  # debug = false");
        assert_eq!(e.with_value("true"), "  debug = true");
    }

    #[test]
    fn comment_and_uncomment_rendering() {
        let e = entry("  port=8080 # http");
        assert_eq!(e.to_commented(), "  #port = 8080 # http");

        let c = entry("  #port = 8080 # http");
        assert_eq!(c.to_active(), "  port = 8080 # http");
    }
}
