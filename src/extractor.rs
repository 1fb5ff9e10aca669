//! Entity extraction.
//!
//! [`Extractor`] returns bare entities. [`ValidatingExtractor`] runs the same
//! extraction and, in the same pass, measures the text against a
//! [`Configuration`], so callers get entities and a [`ParseResult`] together.
//!
//! Every `*_with_indices` operation returns [`Entity`] values with codepoint
//! offsets; the plain variants return only the values.

use crate::api::{Entity, EntityType, ParseResult, normalize};
use crate::config::Configuration;
use crate::engine::{self, EntityMask, TextMetrics, to_entities};
use crate::rules::mention::{self, MentionMatch};
use crate::{Node, NodeKind};

/// The mask for "every entity", honouring the bare-domain switch.
fn entities_mask(extract_url_without_protocol: bool) -> EntityMask {
    urls_mask(extract_url_without_protocol) | EntityMask::HASHTAG | EntityMask::CASHTAG | EntityMask::MENTIONS
}

fn urls_mask(extract_url_without_protocol: bool) -> EntityMask {
    if extract_url_without_protocol { EntityMask::ALL_URLS } else { EntityMask::URL }
}

/// The reply mention at the start of `text` as a node.
fn reply_node(text: &str) -> Option<Node> {
    let (pos, found) = mention::match_reply(text)?;
    Some(match found {
        MentionMatch::List { slug_start, end } => Node::list(pos, end, slug_start),
        MentionMatch::Username { end } | MentionMatch::Federated { end } => Node::new(NodeKind::Username, pos, end),
    })
}

fn values(entities: Vec<Entity>) -> Vec<String> {
    entities.into_iter().map(|e| e.value).collect()
}

/// Extracts entities from text.
///
/// ```
/// use tweet_text::Extractor;
///
/// let extractor = Extractor::new();
/// assert_eq!(extractor.extract_hashtags("Tweet about #swift and #coding"), vec!["swift", "coding"]);
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    extract_url_without_protocol: bool,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Extractor { extract_url_without_protocol: true }
    }

    pub fn get_extract_url_without_protocol(&self) -> bool {
        self.extract_url_without_protocol
    }

    /// Whether bare domains (`example.com`) count as URLs. On by default.
    pub fn set_extract_url_without_protocol(&mut self, extract_url_without_protocol: bool) {
        self.extract_url_without_protocol = extract_url_without_protocol;
    }

    fn extract(&self, text: &str, mask: EntityMask) -> Vec<Entity> {
        if text.is_empty() {
            return Vec::new();
        }
        to_entities(text, &engine::run(text, mask))
    }

    pub fn extract_urls(&self, text: &str) -> Vec<String> {
        values(self.extract_urls_with_indices(text))
    }

    pub fn extract_urls_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, urls_mask(self.extract_url_without_protocol))
    }

    pub fn extract_hashtags(&self, text: &str) -> Vec<String> {
        values(self.extract_hashtags_with_indices(text))
    }

    pub fn extract_hashtags_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, EntityMask::HASHTAG)
    }

    pub fn extract_cashtags(&self, text: &str) -> Vec<String> {
        values(self.extract_cashtags_with_indices(text))
    }

    pub fn extract_cashtags_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, EntityMask::CASHTAG)
    }

    /// Usernames only; list references are skipped.
    pub fn extract_mentioned_screennames(&self, text: &str) -> Vec<String> {
        values(self.extract_mentioned_screennames_with_indices(text))
    }

    pub fn extract_mentioned_screennames_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, EntityMask::USERNAME)
    }

    /// Usernames and list references; a list comes back as `user/slug`.
    pub fn extract_mentions_or_lists(&self, text: &str) -> Vec<String> {
        self.extract_mentions_or_lists_with_indices(text)
            .into_iter()
            .map(|e| match e.list_slug {
                Some(slug) => e.value + &slug,
                None => e.value,
            })
            .collect()
    }

    /// Usernames and `@user/list` references; lists carry their slug in
    /// [`Entity::list_slug`].
    pub fn extract_mentions_or_lists_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, EntityMask::MENTIONS)
    }

    /// Plain and federated mentions. Federated values keep their leading `@`.
    pub fn extract_federated_mentions(&self, text: &str) -> Vec<String> {
        values(self.extract_federated_mentions_with_indices(text))
    }

    pub fn extract_federated_mentions_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, EntityMask::USERNAME | EntityMask::FEDERATED)
    }

    /// The mention a post opens with, if any.
    pub fn extract_reply_username(&self, text: &str) -> Option<Entity> {
        let node = reply_node(text)?;
        to_entities(text, &[node]).into_iter().next()
    }

    pub fn extract_entities(&self, text: &str) -> Vec<String> {
        values(self.extract_entities_with_indices(text))
    }

    /// URLs, mentions, lists, hashtags and cashtags.
    pub fn extract_entities_with_indices(&self, text: &str) -> Vec<Entity> {
        self.extract(text, entities_mask(self.extract_url_without_protocol))
    }

    pub fn extract_entities_federated(&self, text: &str) -> Vec<String> {
        values(self.extract_entities_with_indices_federated(text))
    }

    /// [`Extractor::extract_entities_with_indices`] plus federated mentions.
    pub fn extract_entities_with_indices_federated(&self, text: &str) -> Vec<Entity> {
        self.extract(text, entities_mask(self.extract_url_without_protocol) | EntityMask::FEDERATED)
    }
}

/// Entities plus the weighted-length result of the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractResult {
    pub parse_results: ParseResult,
    pub entities: Vec<Entity>,
}

impl ExtractResult {
    pub fn new(parse_results: ParseResult, entities: Vec<Entity>) -> Self {
        ExtractResult { parse_results, entities }
    }
}

/// The reply mention, if any, plus the weighted-length result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionResult {
    pub parse_results: ParseResult,
    pub mention: Option<Entity>,
}

impl MentionResult {
    pub fn new(parse_results: ParseResult, mention: Option<Entity>) -> Self {
        MentionResult { parse_results, mention }
    }
}

/// Codepoint lengths recorded by [`ValidatingExtractor::prep_input`].
#[derive(Debug, Clone, Copy)]
struct LengthData {
    original: usize,
    normalized: usize,
}

/// An extractor that also validates the text it extracts from.
///
/// Texts should be NFC-normalized, either by [`ValidatingExtractor::prep_input`]
/// or because the caller knows they already are
/// ([`ValidatingExtractor::new_with_nfc_input`]). Ranges in the parse results
/// refer to the text before normalization.
///
/// URL entities the call extracts are priced at `transformedUrlLength`; URLs
/// a call does not ask for count as plain text.
#[derive(Debug, Clone)]
pub struct ValidatingExtractor<'c> {
    config: &'c Configuration,
    extract_url_without_protocol: bool,
    lengths: Option<LengthData>,
}

impl<'c> ValidatingExtractor<'c> {
    pub fn new(config: &'c Configuration) -> Self {
        ValidatingExtractor { config, extract_url_without_protocol: true, lengths: None }
    }

    /// For text the caller has already normalized.
    pub fn new_with_nfc_input(config: &'c Configuration, text: &str) -> Self {
        let len = text.chars().count();
        ValidatingExtractor {
            config,
            extract_url_without_protocol: true,
            lengths: Some(LengthData { original: len, normalized: len }),
        }
    }

    /// NFC-normalize `text` and remember its lengths for later calls.
    pub fn prep_input(&mut self, text: &str) -> String {
        let normalized = normalize(text).into_owned();
        self.lengths = Some(LengthData { original: text.chars().count(), normalized: normalized.chars().count() });
        normalized
    }

    pub fn get_extract_url_without_protocol(&self) -> bool {
        self.extract_url_without_protocol
    }

    pub fn set_extract_url_without_protocol(&mut self, extract_url_without_protocol: bool) {
        self.extract_url_without_protocol = extract_url_without_protocol;
    }

    /// Length of `text` before normalization, in codepoints.
    fn original_len(&self, text: &str) -> usize {
        let len = text.chars().count();
        match self.lengths {
            Some(lengths) if lengths.normalized == len => lengths.original,
            _ => len,
        }
    }

    fn extract(&self, text: &str, mask: EntityMask) -> ExtractResult {
        if text.is_empty() {
            return ExtractResult::new(ParseResult::empty(), Vec::new());
        }
        let nodes = engine::run(text, mask | EntityMask::EMOJI);
        let parse_results = TextMetrics::measure(text, &nodes, self.config, self.original_len(text));
        ExtractResult::new(parse_results, to_entities(text, &nodes))
    }

    pub fn extract_urls_with_indices(&self, text: &str) -> ExtractResult {
        self.extract(text, urls_mask(self.extract_url_without_protocol))
    }

    pub fn extract_hashtags_with_indices(&self, text: &str) -> ExtractResult {
        self.extract(text, EntityMask::HASHTAG)
    }

    pub fn extract_cashtags_with_indices(&self, text: &str) -> ExtractResult {
        self.extract(text, EntityMask::CASHTAG)
    }

    pub fn extract_mentioned_screennames_with_indices(&self, text: &str) -> ExtractResult {
        self.extract(text, EntityMask::USERNAME)
    }

    pub fn extract_mentions_or_lists_with_indices(&self, text: &str) -> ExtractResult {
        self.extract(text, EntityMask::MENTIONS)
    }

    pub fn extract_federated_mentions_with_indices(&self, text: &str) -> ExtractResult {
        self.extract(text, EntityMask::USERNAME | EntityMask::FEDERATED)
    }

    pub fn extract_entities_with_indices(&self, text: &str) -> ExtractResult {
        self.extract(text, entities_mask(self.extract_url_without_protocol))
    }

    pub fn extract_entities_with_indices_federated(&self, text: &str) -> ExtractResult {
        self.extract(text, entities_mask(self.extract_url_without_protocol) | EntityMask::FEDERATED)
    }

    /// The reply mention, measured together with every entity in the text.
    /// Without a reply the parse results are empty.
    pub fn extract_reply_username(&self, text: &str) -> MentionResult {
        let Some(node) = reply_node(text) else {
            return MentionResult::new(ParseResult::empty(), None);
        };
        let mention = to_entities(text, &[node]).into_iter().next();
        let parse_results = self.extract_entities_with_indices(text).parse_results;
        MentionResult::new(parse_results, mention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TextRange;
    use crate::config::{config_v1, config_v3};

    #[test]
    fn extracts_each_kind() {
        let extractor = Extractor::new();
        let text = "@jack and @jack/team like #rust and $RUST at https://example.com";

        assert_eq!(extractor.extract_mentioned_screennames(text), vec!["jack"]);
        assert_eq!(extractor.extract_hashtags(text), vec!["rust"]);
        assert_eq!(extractor.extract_cashtags(text), vec!["RUST"]);
        assert_eq!(extractor.extract_urls(text), vec!["https://example.com"]);

        let lists = extractor.extract_mentions_or_lists_with_indices(text);
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[1].value, "jack");
        assert_eq!(lists[1].list_slug.as_deref(), Some("/team"));
        assert_eq!((lists[1].start, lists[1].end), (10, 20));
    }

    #[test]
    fn plain_variants_return_values() {
        let extractor = Extractor::new();
        let text = "@jack/team and @jill say #hi to $ACME at http://example.com via @fed@example.social";

        assert_eq!(extractor.extract_mentions_or_lists(text), vec!["jack/team", "jill"]);
        assert_eq!(
            extractor.extract_entities(text),
            vec!["jack", "jill", "hi", "ACME", "http://example.com"]
        );
        assert_eq!(
            extractor.extract_entities_federated(text),
            vec!["jack", "jill", "hi", "ACME", "http://example.com", "@fed@example.social"]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        let extractor = Extractor::new();
        assert!(extractor.extract_entities_with_indices("").is_empty());
        assert!(extractor.extract_reply_username("").is_none());
        assert!(extractor.extract_urls("").is_empty());
    }

    #[test]
    fn entities_come_back_in_order() {
        let extractor = Extractor::new();
        let kinds: Vec<EntityType> = extractor
            .extract_entities_with_indices("#a @b $C http://d.com e.com")
            .into_iter()
            .map(|e| e.entity_type)
            .collect();
        assert_eq!(
            kinds,
            vec![EntityType::Hashtag, EntityType::Mention, EntityType::Cashtag, EntityType::Url, EntityType::Url]
        );
    }

    #[test]
    fn bare_domains_can_be_switched_off() {
        let mut extractor = Extractor::new();
        let text = "visit example.com or http://example.org";
        assert_eq!(extractor.extract_urls(text), vec!["example.com", "http://example.org"]);

        extractor.set_extract_url_without_protocol(false);
        assert!(!extractor.get_extract_url_without_protocol());
        assert_eq!(extractor.extract_urls(text), vec!["http://example.org"]);
    }

    #[test]
    fn federated_mentions() {
        let extractor = Extractor::new();
        let text = "Hello @user@mastodon.social!";

        let found = extractor.extract_federated_mentions_with_indices(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity_type, EntityType::FederatedMention);
        assert_eq!(found[0].value, "@user@mastodon.social");
        assert_eq!((found[0].start, found[0].end), (6, 27));

        assert_eq!(extractor.extract_federated_mentions("@plain and @fed@example.social"), vec!["plain", "@fed@example.social"]);
        assert!(extractor.extract_entities_with_indices(text).is_empty());
        assert_eq!(extractor.extract_entities_with_indices_federated(text).len(), 1);
    }

    #[test]
    fn reply_username() {
        let extractor = Extractor::new();
        assert_eq!(extractor.extract_reply_username(" @reply hi").map(|e| e.value).as_deref(), Some("reply"));
        assert!(extractor.extract_reply_username("hi @reply").is_none());
    }

    #[test]
    fn offsets_are_codepoints() {
        let extractor = Extractor::new();
        let found = extractor.extract_hashtags_with_indices("\u{1F600}\u{1F600} #tag");
        assert_eq!((found[0].start, found[0].end), (3, 7));
    }

    #[test]
    fn validating_extractor_measures_in_the_same_pass() {
        let extractor = ValidatingExtractor::new(config_v3());
        let result = extractor.extract_urls_with_indices("read https://example.com/a/long/path/here");

        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.parse_results.weighted_length, 5 + 23);
        assert!(result.parse_results.is_valid);

        let result = extractor.extract_hashtags_with_indices("#tag https://example.com");
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.parse_results.weighted_length, 24);
    }

    #[test]
    fn validating_extractor_reports_original_ranges() {
        let mut extractor = ValidatingExtractor::new(config_v3());
        let input = extractor.prep_input("cafe\u{0301} #tag");
        assert_eq!(input, "caf\u{E9} #tag");

        let result = extractor.extract_hashtags_with_indices(&input);
        assert_eq!((result.entities[0].start, result.entities[0].end), (5, 9));
        assert_eq!(result.parse_results.display_text_range, TextRange::new(0, 10));
        assert_eq!(result.parse_results.weighted_length, 9);
    }

    #[test]
    fn validating_extractor_respects_configuration() {
        let text = "a".repeat(150);
        let v1 = ValidatingExtractor::new_with_nfc_input(config_v1(), &text);
        let result = v1.extract_entities_with_indices(&text);
        assert!(!result.parse_results.is_valid);
        assert_eq!(result.parse_results.valid_text_range, TextRange::new(0, 140));

        let v3 = ValidatingExtractor::new(config_v3());
        assert!(v3.extract_entities_with_indices(&text).parse_results.is_valid);
    }

    #[test]
    fn validating_reply() {
        let extractor = ValidatingExtractor::new(config_v3());
        let result = extractor.extract_reply_username("@user hello");
        assert_eq!(result.mention.map(|e| e.value).as_deref(), Some("user"));
        assert_eq!(result.parse_results.weighted_length, 11);

        let none = extractor.extract_reply_username("hello");
        assert!(none.mention.is_none());
        assert_eq!(none.parse_results, ParseResult::empty());
    }
}
