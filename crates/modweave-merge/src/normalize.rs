//! Input normalization before diffing.
//!
//! Comments are not mergeable content: everything after the comment marker
//! is dropped, lines are trimmed, and blank lines removed. The content is
//! then framed by a sentinel line at each end so every edit has context to
//! anchor on, even at the very start or end of a file.

/// Comment marker of Paradox script files.
pub const DEFAULT_COMMENT_MARKER: &str = "#";

/// Framing line. Trimmed content lines are never a single space.
pub const SENTINEL: &str = " ";

/// Content lines of `text`: comments stripped, trimmed, blanks dropped.
pub fn normalize_lines(text: &str, comment_marker: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = if comment_marker.is_empty() {
                line
            } else {
                line.split_once(comment_marker).map_or(line, |(code, _)| code)
            };
            line.trim()
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Frame content lines with a sentinel at each end.
pub fn with_sentinels(lines: Vec<String>) -> Vec<String> {
    let mut framed = Vec::with_capacity(lines.len() + 2);
    framed.push(SENTINEL.to_string());
    framed.extend(lines);
    framed.push(SENTINEL.to_string());
    framed
}

/// Drop sentinel lines again.
pub fn strip_sentinels(lines: &[String]) -> Vec<String> {
    lines.iter().filter(|l| *l != SENTINEL).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_whitespace_and_blanks() {
        let text = "# header\r\n\tdefine = {  # trailing\r\n\r\n    value = 1\r\n}\r\n   \r\n";
        assert_eq!(
            normalize_lines(text, "#"),
            vec!["define = {", "value = 1", "}"]
        );
    }

    #[test]
    fn empty_marker_keeps_everything() {
        assert_eq!(normalize_lines("a # b\n", ""), vec!["a # b"]);
    }

    #[test]
    fn sentinels_round_trip() {
        let framed = with_sentinels(vec!["a".into(), "b".into()]);
        assert_eq!(framed, vec![" ", "a", "b", " "]);
        assert_eq!(strip_sentinels(&framed), vec!["a", "b"]);
        assert_eq!(with_sentinels(Vec::new()), vec![" ", " "]);
    }
}
