//! Line interning.
//!
//! Diffing runs over integer tokens, one per distinct line, so a line is
//! compared as a single unit and never character by character.

use std::collections::HashMap;

/// Assigns a stable `u32` token to every distinct line it sees.
#[derive(Debug, Default)]
pub struct LineInterner<'a> {
    ids: HashMap<&'a str, u32>,
    lines: Vec<&'a str>,
}

impl<'a> LineInterner<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `line`, allocating a new one on first sight.
    pub fn intern(&mut self, line: &'a str) -> u32 {
        if let Some(&id) = self.ids.get(line) {
            return id;
        }
        let id = self.lines.len() as u32;
        self.lines.push(line);
        self.ids.insert(line, id);
        id
    }

    /// Tokenize a sequence of lines.
    pub fn tokenize<S: AsRef<str>>(&mut self, lines: &'a [S]) -> Vec<u32> {
        lines.iter().map(|l| self.intern(l.as_ref())).collect()
    }

    /// The line a token stands for.
    pub fn resolve(&self, token: u32) -> Option<&'a str> {
        self.lines.get(token as usize).copied()
    }

    /// Number of distinct lines seen.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_lines_share_a_token() {
        let old = ["a = 1", "b = 2", "a = 1"];
        let new = ["b = 2", "c = 3"];
        let mut interner = LineInterner::new();
        let old_t = interner.tokenize(&old);
        let new_t = interner.tokenize(&new);
        assert_eq!(old_t, vec![0, 1, 0]);
        assert_eq!(new_t, vec![1, 2]);
        assert_eq!(interner.len(), 3);
    }

    #[test]
    fn tokens_resolve_back_to_lines() {
        let lines = ["x", "y"];
        let mut interner = LineInterner::new();
        let tokens = interner.tokenize(&lines);
        let back: Vec<&str> = tokens.iter().filter_map(|t| interner.resolve(*t)).collect();
        assert_eq!(back, vec!["x", "y"]);
        assert_eq!(interner.resolve(99), None);
    }
}
