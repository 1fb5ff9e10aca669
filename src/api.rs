use crate::config::Configuration;
use crate::engine::{self, EntityMask, TextMetrics};
use unicode_normalization::{UnicodeNormalization, is_nfc};

/// Kind of a recognized entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Url,
    Hashtag,
    /// A `@username` or `@username/list` reference.
    Mention,
    Cashtag,
    /// A `@user@domain.tld` reference.
    FederatedMention,
}

/// A recognized span of text.
///
/// `start`/`end` are codepoint offsets into the text the entity was
/// extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    pub entity_type: EntityType,
    /// Start codepoint index of the match.
    pub start: usize,
    /// End codepoint index of the match (exclusive).
    pub end: usize,
    /// Matched text. Mentions, hashtags and cashtags omit their leading
    /// symbol; URLs and federated mentions are verbatim.
    pub value: String,
    /// `/slug` for list references, slash included.
    pub list_slug: Option<String>,
    /// Shortened display form of a URL, when the caller knows one.
    pub display_url: Option<String>,
    /// Full form of a URL, when the caller knows one.
    pub expanded_url: Option<String>,
}

impl Entity {
    pub fn new(entity_type: EntityType, value: impl Into<String>, start: usize, end: usize) -> Self {
        Entity {
            entity_type,
            start,
            end,
            value: value.into(),
            list_slug: None,
            display_url: None,
            expanded_url: None,
        }
    }

    pub fn new_list(value: impl Into<String>, list_slug: impl Into<String>, start: usize, end: usize) -> Self {
        Entity { list_slug: Some(list_slug.into()), ..Entity::new(EntityType::Mention, value, start, end) }
    }

    /// Attach the display/expanded forms used by the autolinker.
    pub fn with_display_url(mut self, display_url: impl Into<String>, expanded_url: impl Into<String>) -> Self {
        self.display_url = Some(display_url.into());
        self.expanded_url = Some(expanded_url.into());
        self
    }

    pub fn is_list(&self) -> bool {
        self.list_slug.as_deref().is_some_and(|slug| !slug.is_empty())
    }
}

/// Half-open codepoint range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        TextRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParseResult {
    /// Sum of codepoint weights divided by the configuration scale.
    pub weighted_length: i32,
    /// `weighted_length` in thousandths of the configured maximum.
    pub permillage: i32,
    /// Non-empty, within the limit, and free of disallowed characters.
    pub is_valid: bool,
    pub display_text_range: TextRange,
    /// Longest prefix that fits the budget. Entities are never split.
    pub valid_text_range: TextRange,
}

impl ParseResult {
    /// The result for empty input.
    pub fn empty() -> Self {
        ParseResult::default()
    }
}

/// A caller-supplied codepoint range to highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hit {
    pub start: usize,
    pub end: usize,
}

impl Hit {
    pub fn new(start: usize, end: usize) -> Self {
        Hit { start, end }
    }
}

impl From<(usize, usize)> for Hit {
    fn from((start, end): (usize, usize)) -> Self {
        Hit { start, end }
    }
}

/// Measure `text` against `config`.
///
/// The text is NFC-normalized first. With `extract_urls`, every URL counts as
/// `transformedUrlLength` regardless of its own characters.
///
/// # Example
/// ```
/// use tweet_text::{config_v3, parse};
///
/// let out = parse("Hello, world!", config_v3(), true);
/// assert_eq!(out.weighted_length, 13);
/// assert_eq!(out.permillage, 46);
/// ```
pub fn parse(text: &str, config: &Configuration, extract_urls: bool) -> ParseResult {
    if text.is_empty() {
        return ParseResult::empty();
    }

    let normalized = normalize(text);
    let original_len = text.chars().count();
    let mut mask = EntityMask::EMOJI;
    if extract_urls {
        mask |= EntityMask::ALL_URLS;
    }

    let nodes = engine::run(&normalized, mask);
    TextMetrics::measure(&normalized, &nodes, config, original_len)
}

/// NFC-normalize, borrowing when the text is already normalized.
pub(crate) fn normalize(text: &str) -> std::borrow::Cow<'_, str> {
    if is_nfc(text) { std::borrow::Cow::Borrowed(text) } else { std::borrow::Cow::Owned(text.nfc().collect()) }
}
