//! Weighted-length tracking.
//!
//! [`TextMetrics`] walks the scanned text once, between and over the nodes
//! the engine kept, and accumulates the scaled weight of everything it
//! passes:
//!
//! - plain codepoints weigh `Configuration::weight(codepoint)`;
//! - URL nodes weigh `transformedUrlLength * scale`, whatever their length;
//! - emoji nodes weigh `defaultWeight` once when emoji parsing is enabled,
//!   and are weighed codepoint by codepoint otherwise;
//! - any other node is plain text.
//!
//! ## Design notes
//!
//! - The valid cursor only moves past an item when the running total,
//!   including that item, is within budget. URLs and emoji are single items,
//!   so the valid range never ends inside one.
//! - Weights are accumulated in `i64` and clamped into the `i32` result.

use crate::api::{ParseResult, TextRange};
use crate::config::Configuration;
use crate::rules::chars::is_disallowed;
use crate::{Node, NodeKind};

pub struct TextMetrics<'c> {
    config: &'c Configuration,
    scaled_max: i64,
    weighted: i64,
    /// Codepoints consumed so far.
    offset: usize,
    /// Codepoints that fit the budget.
    valid_offset: usize,
    is_valid: bool,
}

impl<'c> TextMetrics<'c> {
    fn new(config: &'c Configuration) -> Self {
        TextMetrics { config, scaled_max: config.scaled_max(), weighted: 0, offset: 0, valid_offset: 0, is_valid: true }
    }

    /// Measure `text`, which must be the text `nodes` were scanned from.
    ///
    /// `original_len` is the codepoint length of the text before NFC
    /// normalization; the reported ranges refer to that text.
    pub fn measure(text: &str, nodes: &[Node], config: &'c Configuration, original_len: usize) -> ParseResult {
        let mut metrics = TextMetrics::new(config);
        let url_weight = i64::from(config.transformed_url_length()) * i64::from(config.scale());
        let emoji_weight = i64::from(config.default_weight());

        let mut pos = 0;
        for node in nodes {
            if node.range.start < pos {
                continue;
            }
            metrics.track_text(&text[pos..node.range.start]);
            let span = &text[node.range.start..node.range.end];
            match node.kind {
                kind if kind.is_url() => metrics.track_span(span, url_weight),
                NodeKind::Emoji if config.emoji_parsing_enabled() => metrics.track_span(span, emoji_weight),
                _ => metrics.track_text(span),
            }
            pos = node.range.end;
        }
        metrics.track_text(&text[pos..]);

        metrics.finish(text.chars().count(), original_len)
    }

    fn track_text(&mut self, text: &str) {
        for c in text.chars() {
            if is_disallowed(c) {
                self.is_valid = false;
            }
            self.advance(1, i64::from(self.config.char_weight(c)));
        }
    }

    fn track_span(&mut self, span: &str, weight: i64) {
        if span.chars().any(is_disallowed) {
            self.is_valid = false;
        }
        self.advance(span.chars().count(), weight);
    }

    fn advance(&mut self, chars: usize, weight: i64) {
        self.weighted += weight;
        self.offset += chars;
        if self.is_valid && self.weighted <= self.scaled_max {
            self.valid_offset += chars;
        }
    }

    fn finish(self, normalized_len: usize, original_len: usize) -> ParseResult {
        // Deserialized configurations skip validation; never divide by zero.
        let max = i64::from(self.config.max_weighted_tweet_length());
        let weighted_length = self.weighted / i64::from(self.config.scale()).max(1);
        let permillage = weighted_length * 1000 / max.max(1);
        let is_valid = self.is_valid && weighted_length <= max && self.offset > 0;

        let valid_end = (self.valid_offset + original_len).saturating_sub(normalized_len).min(original_len);

        ParseResult {
            weighted_length: clamp_i32(weighted_length),
            permillage: clamp_i32(permillage),
            is_valid,
            display_text_range: TextRange::new(0, original_len),
            valid_text_range: TextRange::new(0, valid_end),
        }
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_v2, config_v3};

    fn measure(text: &str, nodes: &[Node], config: &Configuration) -> ParseResult {
        TextMetrics::measure(text, nodes, config, text.chars().count())
    }

    #[test]
    fn plain_text_uses_ranges() {
        let cases: Vec<(i32, &str)> = vec![(5, "hello"), (4, "\u{4E2D}\u{6587}"), (4, "caf\u{E9}"), (0, "")];

        for (expected, input) in cases {
            assert_eq!(measure(input, &[], config_v3()).weighted_length, expected, "{input:?}");
        }
    }

    #[test]
    fn entity_nodes_change_the_price() {
        let text = "go https://example.com";
        let url = Node::url(NodeKind::Url, 3, text.len(), crate::Range::new(11, text.len()));
        assert_eq!(measure(text, &[url], config_v3()).weighted_length, 3 + 23);

        let tag = Node::new(NodeKind::Hashtag, 0, 2);
        assert_eq!(measure("go", &[tag], config_v3()).weighted_length, 2);
    }

    #[test]
    fn emoji_nodes_follow_configuration() {
        let text = "\u{1F44D}\u{1F3FD}";
        let emoji = Node::new(NodeKind::Emoji, 0, text.len());

        assert_eq!(measure(text, &[emoji.clone()], config_v3()).weighted_length, 2);
        assert_eq!(measure(text, &[emoji], config_v2()).weighted_length, 4);
    }

    #[test]
    fn valid_range_accounts_for_normalization() {
        let res = TextMetrics::measure("abc", &[], config_v3(), 5);
        assert_eq!(res.display_text_range, TextRange::new(0, 5));
        assert_eq!(res.valid_text_range, TextRange::new(0, 5));
    }

    #[test]
    fn disallowed_characters_stop_the_valid_cursor() {
        let res = measure("ok\u{202E}more", &[], config_v3());
        assert!(!res.is_valid);
        assert_eq!(res.valid_text_range, TextRange::new(0, 2));
        assert_eq!(res.weighted_length, 8);
    }

    #[test]
    fn unvalidated_zero_limits_do_not_panic() {
        let config: Configuration = serde_json::from_str(
            r#"{"version": 9, "maxWeightedTweetLength": 0, "scale": 0, "defaultWeight": 1, "transformedUrlLength": 23}"#,
        )
        .unwrap();

        let res = measure("a", &[], &config);
        assert_eq!(res.weighted_length, 1);
        assert!(!res.is_valid);
    }
}
