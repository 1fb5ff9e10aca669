//! Token and post validation.

use crate::api::parse;
use crate::config::{Configuration, config_v3};
use crate::engine::check_url;
use crate::extractor::Extractor;
use crate::rules::chars::{is_at_sign, is_hash_sign};
use crate::rules::url::{UrlMatch, match_url, match_url_without_protocol};
use crate::Node;

/// Longest URL, in bytes after IDNA conversion, that counts as valid.
pub const MAX_URL_LENGTH: usize = 4096;

const DEFAULT_SHORT_URL_LENGTH: i32 = 23;

/// Validates whole posts and isolated tokens.
///
/// ```
/// use tweet_text::Validator;
///
/// let validator = Validator::new();
/// assert!(validator.is_valid_username("@jack"));
/// assert!(!validator.is_valid_tweet(""));
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    short_url_length: i32,
    short_url_length_https: i32,
    config: Configuration,
    extractor: Extractor,
}

impl Default for Validator {
    fn default() -> Self {
        Validator::new()
    }
}

impl Validator {
    /// A validator for the current (v3) configuration.
    pub fn new() -> Self {
        Validator::with_config(config_v3().clone())
    }

    pub fn with_config(config: Configuration) -> Self {
        Validator {
            short_url_length: DEFAULT_SHORT_URL_LENGTH,
            short_url_length_https: DEFAULT_SHORT_URL_LENGTH,
            config,
            extractor: Extractor::new(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Non-empty, within the weighted limit and free of disallowed
    /// characters.
    pub fn is_valid_tweet(&self, text: &str) -> bool {
        parse(text, &self.config, true).is_valid
    }

    /// `@name` and nothing else.
    pub fn is_valid_username(&self, text: &str) -> bool {
        if !text.starts_with(is_at_sign) {
            return false;
        }
        let mentions = self.extractor.extract_mentioned_screennames_with_indices(text);
        mentions.len() == 1 && mentions[0].start == 0 && mentions[0].end == text.chars().count()
    }

    /// `@name/slug` and nothing else.
    pub fn is_valid_list(&self, text: &str) -> bool {
        if !text.starts_with(is_at_sign) {
            return false;
        }
        let lists = self.extractor.extract_mentions_or_lists_with_indices(text);
        lists.len() == 1 && lists[0].is_list() && lists[0].end == text.chars().count()
    }

    /// `#tag` and nothing else.
    pub fn is_valid_hashtag(&self, text: &str) -> bool {
        if !text.starts_with(is_hash_sign) {
            return false;
        }
        let hashtags = self.extractor.extract_hashtags_with_indices(text);
        hashtags.len() == 1 && hashtags[0].start == 0 && hashtags[0].end == text.chars().count()
    }

    /// A complete `http(s)://` URL whose host passes TLD and IDNA checks as is.
    pub fn is_valid_url(&self, text: &str) -> bool {
        whole_url(text, match_url(text, 0))
    }

    /// A complete bare-domain URL whose host passes TLD and IDNA checks as is.
    pub fn is_valid_url_without_protocol(&self, text: &str) -> bool {
        whole_url(text, match_url_without_protocol(text, 0))
    }

    /// Codepoint length with every URL counted as a shortened link, the
    /// measure posts were limited by before weighted lengths.
    pub fn legacy_tweet_length(&self, text: &str) -> i32 {
        let mut length = text.chars().count() as i64;
        for url in self.extractor.extract_urls_with_indices(text) {
            let short = if url.value.get(..8).is_some_and(|p| p.eq_ignore_ascii_case("https://")) {
                self.short_url_length_https
            } else {
                self.short_url_length
            };
            length += i64::from(short) - (url.end - url.start) as i64;
        }
        i32::try_from(length).unwrap_or(i32::MAX)
    }

    pub fn max_tweet_length(&self) -> i32 {
        self.config.max_weighted_tweet_length()
    }

    pub fn short_url_length(&self) -> i32 {
        self.short_url_length
    }

    pub fn set_short_url_length(&mut self, short_url_length: i32) {
        self.short_url_length = short_url_length;
    }

    pub fn short_url_length_https(&self) -> i32 {
        self.short_url_length_https
    }

    pub fn set_short_url_length_https(&mut self, short_url_length_https: i32) {
        self.short_url_length_https = short_url_length_https;
    }
}

fn whole_url(text: &str, found: Option<UrlMatch>) -> bool {
    let Some(found) = found else {
        return false;
    };
    if found.end != text.len() {
        return false;
    }
    let node = Node::url(found.kind, 0, found.end, found.host);
    check_url(text, &node) == Some(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_v1;

    #[test]
    fn tweet_limits() {
        let validator = Validator::new();
        assert!(!validator.is_valid_tweet(""));
        assert!(validator.is_valid_tweet(&"a".repeat(280)));
        assert!(!validator.is_valid_tweet(&"a".repeat(281)));
        assert!(!validator.is_valid_tweet("bad \u{202A} char"));
        assert!(validator.is_valid_tweet(&format!("{} https://example.com", "a".repeat(256))));

        let v1 = Validator::with_config(config_v1().clone());
        assert!(!v1.is_valid_tweet(&"a".repeat(141)));
        assert_eq!(v1.max_tweet_length(), 140);
    }

    #[test]
    fn usernames() {
        let validator = Validator::new();
        let cases: Vec<(bool, &str)> = vec![
            (true, "@jack"),
            (true, "\u{FF20}jack"),
            (true, "@aaaaaaaaaaaaaaaaaaaa"),
            (false, "@aaaaaaaaaaaaaaaaaaaaa"),
            (false, "jack"),
            (false, "@jack!"),
            (false, "@jack/list"),
            (false, "@"),
        ];

        for (expected, input) in cases {
            assert_eq!(validator.is_valid_username(input), expected, "{input:?}");
        }
    }

    #[test]
    fn lists() {
        let validator = Validator::new();
        let cases: Vec<(bool, &str)> = vec![
            (true, "@jack/list"),
            (true, "@jack/my-list_1"),
            (false, "@jack"),
            (false, "@jack/list "),
            (false, "jack/list"),
            (false, "@jack/1list"),
        ];

        for (expected, input) in cases {
            assert_eq!(validator.is_valid_list(input), expected, "{input:?}");
        }
    }

    #[test]
    fn hashtags() {
        let validator = Validator::new();
        let cases: Vec<(bool, &str)> = vec![
            (true, "#rust"),
            (true, "\u{FF03}rust"),
            (true, "#\u{65E5}\u{672C}\u{8A9E}"),
            (false, "#123"),
            (false, "rust"),
            (false, "#rust lang"),
        ];

        for (expected, input) in cases {
            assert_eq!(validator.is_valid_hashtag(input), expected, "{input:?}");
        }
    }

    #[test]
    fn urls() {
        let validator = Validator::new();
        let cases: Vec<(bool, &str)> = vec![
            (true, "http://example.com"),
            (true, "https://example.com/path?q=1#frag"),
            (true, "https://t.co/abc"),
            (true, "http://xn--p1ai.xn--p1ai"),
            (true, "http://192.168.0.1"),
            (false, "http://example.nottld"),
            (false, "http://example.com/path."),
            (false, "example.com"),
            (false, "http://example.com.nottld"),
        ];

        for (expected, input) in cases {
            assert_eq!(validator.is_valid_url(input), expected, "{input:?}");
        }

        assert!(validator.is_valid_url_without_protocol("example.com"));
        assert!(validator.is_valid_url_without_protocol("www.example.co.uk/path"));
        assert!(!validator.is_valid_url_without_protocol("http://example.com"));
        assert!(!validator.is_valid_url_without_protocol("example"));
    }

    #[test]
    fn legacy_length() {
        let mut validator = Validator::new();
        assert_eq!(validator.legacy_tweet_length("hello"), 5);
        assert_eq!(validator.legacy_tweet_length("go http://example.com/long/path"), 3 + 23);

        validator.set_short_url_length(20);
        validator.set_short_url_length_https(21);
        assert_eq!(validator.short_url_length(), 20);
        assert_eq!(validator.legacy_tweet_length("http://a.com https://b.com"), 20 + 1 + 21);
    }
}
