//! Wraps caller-supplied codepoint ranges in a highlight tag.
//!
//! Hits are expected sorted and non-overlapping. A hit that starts before the
//! end of the previous one, or is empty, is skipped; a hit that runs past the
//! end of the text is closed at the end.

use crate::api::Hit;

pub const DEFAULT_HIGHLIGHT_TAG: &str = "em";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitHighlighter {
    pub highlight_tag: String,
}

impl Default for HitHighlighter {
    fn default() -> Self {
        HitHighlighter::new()
    }
}

impl HitHighlighter {
    pub fn new() -> Self {
        HitHighlighter::with_tag(DEFAULT_HIGHLIGHT_TAG)
    }

    pub fn with_tag(tag: impl Into<String>) -> Self {
        HitHighlighter { highlight_tag: tag.into() }
    }

    /// ```
    /// use tweet_text::{Hit, HitHighlighter};
    ///
    /// let highlighter = HitHighlighter::new();
    /// assert_eq!(highlighter.highlight("abcdef", &[Hit::new(0, 2)]), "<em>ab</em>cdef");
    /// ```
    pub fn highlight(&self, text: &str, hits: &[Hit]) -> String {
        if hits.is_empty() {
            return text.to_string();
        }
        let mut builder = HighlightBuilder::new(text, &self.highlight_tag, hits);
        for c in text.chars() {
            builder.push_char(c);
        }
        builder.finish()
    }

    /// Like [`highlight`](Self::highlight), but `<...>` tags already in
    /// `text` are copied through and do not count toward hit offsets. Use
    /// this on autolinked HTML with hits computed against the plain text.
    pub fn highlight_markup(&self, text: &str, hits: &[Hit]) -> String {
        if hits.is_empty() {
            return text.to_string();
        }
        let mut builder = HighlightBuilder::new(text, &self.highlight_tag, hits);
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            if c == '<' {
                if let Some(close) = rest.find('>') {
                    builder.push_tag(&rest[..=close]);
                    rest = &rest[close + 1..];
                    continue;
                }
            }
            builder.push_char(c);
            rest = &rest[c.len_utf8()..];
        }
        builder.finish()
    }
}

struct HighlightBuilder<'h> {
    buffer: String,
    open: String,
    close: String,
    hits: &'h [Hit],
    next: usize,
    count: usize,
    open_until: Option<usize>,
}

impl<'h> HighlightBuilder<'h> {
    fn new(text: &str, tag: &str, hits: &'h [Hit]) -> Self {
        let capacity = text.len() + hits.len() * (2 * tag.len() + 5);
        HighlightBuilder {
            buffer: String::with_capacity(capacity),
            open: format!("<{tag}>"),
            close: format!("</{tag}>"),
            hits,
            next: 0,
            count: 0,
            open_until: None,
        }
    }

    fn push_tag(&mut self, tag: &str) {
        self.buffer.push_str(tag);
    }

    fn push_char(&mut self, c: char) {
        if self.open_until.is_none() {
            self.maybe_open();
        }
        self.buffer.push(c);
        self.count += 1;
        if self.open_until == Some(self.count) {
            self.buffer.push_str(&self.close);
            self.open_until = None;
        }
    }

    fn maybe_open(&mut self) {
        while let Some(&hit) = self.hits.get(self.next) {
            if hit.start > self.count {
                return;
            }
            self.next += 1;
            if hit.start == self.count && hit.end > hit.start {
                self.buffer.push_str(&self.open);
                self.open_until = Some(hit.end);
                return;
            }
        }
    }

    fn finish(mut self) -> String {
        if self.open_until.is_some() {
            self.buffer.push_str(&self.close);
        }
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(ranges: &[(usize, usize)]) -> Vec<Hit> {
        ranges.iter().map(|&(start, end)| Hit::new(start, end)).collect()
    }

    #[test]
    fn highlight_examples() {
        let highlighter = HitHighlighter::new();
        let cases: Vec<(&str, &str, Vec<Hit>)> = vec![
            ("<em>ab</em>cdef", "abcdef", hits(&[(0, 2)])),
            ("abcdef", "abcdef", vec![]),
            ("a<em>b</em>c<em>de</em>f", "abcdef", hits(&[(1, 2), (3, 5)])),
            ("abc<em>def</em>", "abcdef", hits(&[(3, 6)])),
            ("abc<em>def</em>", "abcdef", hits(&[(3, 99)])),
            ("abcdef", "abcdef", hits(&[(2, 2)])),
            ("abcdef", "abcdef", hits(&[(6, 8)])),
            ("<em>ab</em>cdef", "abcdef", hits(&[(0, 2), (1, 3)])),
            ("\u{65E5}<em>\u{672C}</em>\u{8A9E}", "\u{65E5}\u{672C}\u{8A9E}", hits(&[(1, 2)])),
            ("<em>\u{1F600}</em>x", "\u{1F600}x", hits(&[(0, 1)])),
        ];

        for (expected, text, hits) in cases {
            assert_eq!(highlighter.highlight(text, &hits), expected, "{text:?} {hits:?}");
        }
    }

    #[test]
    fn custom_tag() {
        let highlighter = HitHighlighter::with_tag("b");
        assert_eq!(highlighter.highlight("hello world", &hits(&[(6, 11)])), "hello <b>world</b>");
    }

    #[test]
    fn markup_is_skipped_when_counting() {
        let highlighter = HitHighlighter::new();
        let text = "hi <a href=\"x\">#tag</a> there";
        assert_eq!(
            highlighter.highlight_markup(text, &hits(&[(3, 7)])),
            "hi <a href=\"x\"><em>#tag</em></a> there"
        );
        assert_eq!(
            highlighter.highlight_markup(text, &hits(&[(0, 2), (8, 13)])),
            "<em>hi</em> <a href=\"x\">#tag</a> <em>there</em>"
        );
        assert_eq!(highlighter.highlight_markup("a < b", &hits(&[(4, 5)])), "a < <em>b</em>");
    }
}
