//! Scripts and the line parser.
//!
//! A script is held as the raw text read from storage.  [`Script::lines`]
//! walks it lazily, yielding only the lines that carry a command.

use alloc::string::String;
use alloc::vec::Vec;

/// Longest line, in bytes, that is ever passed on to the classifier.  The
/// rest of a longer line is dropped.
pub const MAX_LINE: usize = 256;

/// The text of a script, as loaded at the start of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    text: String,
}

impl Script {
    pub fn new(text: impl Into<String>) -> Script {
        Script { text: text.into() }
    }

    /// Build a script from raw lines, as they come from storage.  Bytes that
    /// aren't valid UTF-8 are replaced, and will type nothing.
    pub fn from_lines<I, L>(lines: I) -> Script
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut raw = Vec::new();
        for line in lines {
            raw.extend_from_slice(line.as_ref());
            if raw.last() != Some(&b'\n') {
                raw.push(b'\n');
            }
        }
        Script { text: String::from_utf8_lossy(&raw).into_owned() }
    }

    /// The command lines of this script.  The iterator can be cloned to
    /// restart from any point.
    pub fn lines(&self) -> Lines<'_> {
        Lines::new(&self.text)
    }
}

/// Iterator over the command lines of some script text.
#[derive(Clone, Debug)]
pub struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Lines<'a> {
        Lines { rest: text }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while !self.rest.is_empty() {
            // Either of CR or LF ends a line, so CRLF leaves an empty line
            // behind, which is dropped.
            let (line, rest) = match self.rest.find(['\r', '\n']) {
                Some(pos) => (&self.rest[..pos], &self.rest[pos + 1..]),
                None => (self.rest, ""),
            };
            self.rest = rest;

            let line = truncate(line);
            if is_command(line) {
                return Some(line);
            }
        }
        None
    }
}

/// Is this (already stripped) line something the classifier should see?
pub fn is_command(line: &str) -> bool {
    !line.is_empty() && !line.starts_with(['#', '/'])
}

/// Cut a line to at most [`MAX_LINE`] bytes, backing up to a character
/// boundary.
fn truncate(line: &str) -> &str {
    if line.len() <= MAX_LINE {
        return line;
    }
    let mut end = MAX_LINE;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
