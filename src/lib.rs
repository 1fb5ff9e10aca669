//! Entity engine for short-form posts.
//!
//! The crate finds mentions, lists, hashtags, cashtags, URLs and federated
//! (`@user@domain`) handles in arbitrary Unicode text, measures the weighted
//! length used to enforce a post limit, validates isolated tokens, renders
//! HTML links and highlights caller-supplied ranges.
//!
//! Every public offset is a Unicode scalar (codepoint) offset, half-open
//! `[start, end)`.
//!
//! ```
//! use tweet_text::{Extractor, config_v3, parse};
//!
//! let extractor = Extractor::new();
//! assert_eq!(extractor.extract_mentioned_screennames("Hello @user1 and @user2"), vec!["user1", "user2"]);
//!
//! let result = parse("Hello, world!", config_v3(), true);
//! assert_eq!(result.weighted_length, 13);
//! assert!(result.is_valid);
//! ```

mod api;
mod autolinker;
mod config;
mod engine;
mod extractor;
mod highlighter;
mod rules;
mod validator;

pub use api::{Entity, EntityType, Hit, ParseResult, TextRange, parse};
pub use autolinker::{
    Autolinker, DEFAULT_CASHTAG_CLASS, DEFAULT_CASHTAG_URL_BASE, DEFAULT_HASHTAG_CLASS, DEFAULT_HASHTAG_URL_BASE,
    DEFAULT_INVISIBLE_TAG_ATTRS, DEFAULT_LIST_CLASS, DEFAULT_LIST_URL_BASE, DEFAULT_USERNAME_CLASS,
    DEFAULT_USERNAME_URL_BASE, LinkModifier, LinkTextFn,
};
pub use config::{CodepointRange, ConfigError, Configuration, WeightRange, config_v1, config_v2, config_v3};
pub use extractor::{ExtractResult, Extractor, MentionResult, ValidatingExtractor};
pub use highlighter::{DEFAULT_HIGHLIGHT_TAG, HitHighlighter};
pub use validator::{MAX_URL_LENGTH, Validator};

// --- Internal types ---------------------------------------------------------

/// What a scanner node matched.
///
/// `Emoji` never surfaces as an entity; it only feeds the weighted-length
/// tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum NodeKind {
    Url,
    /// `t.co` short link; exempt from TLD validation.
    ShortUrl,
    UrlWithoutProtocol,
    Hashtag,
    Cashtag,
    Username,
    List,
    Federated,
    Emoji,
}

impl NodeKind {
    pub fn is_url(self) -> bool {
        matches!(self, NodeKind::Url | NodeKind::ShortUrl | NodeKind::UrlWithoutProtocol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Range {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Range { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// A candidate produced by the scanner. All positions are byte offsets into
/// the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub range: Range,
    /// Host portion, for URL kinds.
    pub host: Option<Range>,
    /// Byte index of the `/` that opens a list slug.
    pub slug_start: Option<usize>,
}

impl Node {
    pub fn new(kind: NodeKind, start: usize, end: usize) -> Self {
        Node { kind, range: Range::new(start, end), host: None, slug_start: None }
    }

    pub fn url(kind: NodeKind, start: usize, end: usize, host: Range) -> Self {
        Node { kind, range: Range::new(start, end), host: Some(host), slug_start: None }
    }

    pub fn list(start: usize, end: usize, slug_start: usize) -> Self {
        Node { kind: NodeKind::List, range: Range::new(start, end), host: None, slug_start: Some(slug_start) }
    }
}
