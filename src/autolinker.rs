//! HTML rendering of entities.
//!
//! The autolinker walks entities in text order and splices an anchor in for
//! each one, copying the text between entities unchanged.
//!
//! ```text
//! text ── Extractor ──▶ entities ──▶ autolink_entities()
//!                                      ├─ text before the entity
//!                                      ├─ <a attrs>  (per-type attributes, rel, modifiers)
//!                                      ├─ body       (symbol handling, link-text modifiers)
//!                                      └─ </a>
//! ```
//!
//! ## Modifiers
//!
//! [`LinkModifier`] is a closed set. Whatever order they are added in, every
//! `AddAttribute` runs first, then every `ReplaceClass`, then every
//! `LinkText`.
//!
//! ## Failure mode
//!
//! Entities that are out of bounds, unsorted or overlapping are a caller
//! error; `autolink_entities` logs a warning and returns the text unchanged
//! rather than emit half-built markup.

use crate::api::{Entity, EntityType};
use crate::extractor::Extractor;
use crate::rules::chars::is_rtl;
use std::fmt;

const HREF: &str = "href";
const CLASS: &str = "class";
const TARGET: &str = "target";
const TITLE: &str = "title";
const REL: &str = "rel";

pub const DEFAULT_LIST_CLASS: &str = "tweet-url list-slug";
pub const DEFAULT_USERNAME_CLASS: &str = "tweet-url username";
pub const DEFAULT_HASHTAG_CLASS: &str = "tweet-url hashtag";
pub const DEFAULT_CASHTAG_CLASS: &str = "tweet-url cashtag";
pub const DEFAULT_USERNAME_URL_BASE: &str = "https://twitter.com/";
pub const DEFAULT_LIST_URL_BASE: &str = "https://twitter.com/";
pub const DEFAULT_HASHTAG_URL_BASE: &str = "https://twitter.com/search?q=%23";
pub const DEFAULT_CASHTAG_URL_BASE: &str = "https://twitter.com/search?q=%24";
/// Hides the parts of an expanded URL that are not displayed but should
/// still be copied.
pub const DEFAULT_INVISIBLE_TAG_ATTRS: &str = "style='position:absolute;left:-9999px;'";

/// Replacement link text for an entity, given the body the autolinker would
/// have rendered.
pub type LinkTextFn = Box<dyn Fn(&Entity, &str) -> String + Send + Sync>;

type Attributes = Vec<(String, String)>;

/// Adjustments applied to every rendered link.
pub enum LinkModifier {
    /// Append `key="value"` to links for the listed entity types.
    AddAttribute { entity_types: Vec<EntityType>, key: String, value: String },
    /// Replace the computed `class` attribute.
    ReplaceClass(String),
    /// Replace the link body.
    LinkText(LinkTextFn),
}

impl LinkModifier {
    pub fn add_attribute(entity_types: Vec<EntityType>, key: impl Into<String>, value: impl Into<String>) -> Self {
        LinkModifier::AddAttribute { entity_types, key: key.into(), value: value.into() }
    }

    pub fn replace_class(class: impl Into<String>) -> Self {
        LinkModifier::ReplaceClass(class.into())
    }

    pub fn link_text(f: impl Fn(&Entity, &str) -> String + Send + Sync + 'static) -> Self {
        LinkModifier::LinkText(Box::new(f))
    }

    /// Position in the fixed application order.
    fn stage(&self) -> u8 {
        match self {
            LinkModifier::AddAttribute { .. } => 0,
            LinkModifier::ReplaceClass(_) => 1,
            LinkModifier::LinkText(_) => 2,
        }
    }
}

impl fmt::Debug for LinkModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkModifier::AddAttribute { entity_types, key, value } => f
                .debug_struct("AddAttribute")
                .field("entity_types", entity_types)
                .field("key", key)
                .field("value", value)
                .finish(),
            LinkModifier::ReplaceClass(class) => f.debug_tuple("ReplaceClass").field(class).finish(),
            LinkModifier::LinkText(_) => f.write_str("LinkText(..)"),
        }
    }
}

/// Turns entities into HTML links.
///
/// ```
/// use tweet_text::Autolinker;
///
/// let linker = Autolinker::new(false);
/// assert_eq!(
///     linker.autolink_hashtags("#rust"),
///     "<a href=\"https://twitter.com/search?q=%23rust\" title=\"#rust\" class=\"tweet-url hashtag\">#rust</a>"
/// );
/// ```
#[derive(Debug)]
pub struct Autolinker {
    /// Add `rel="nofollow"` to every link.
    pub no_follow: bool,
    pub url_class: String,
    pub url_target: String,
    /// Wraps the `@`/`#`/`$` symbol when non-empty.
    pub symbol_tag: String,
    /// Wraps the entity text after the symbol when non-empty.
    pub text_with_symbol_tag: String,
    pub list_class: String,
    pub username_class: String,
    pub hashtag_class: String,
    pub cashtag_class: String,
    pub username_url_base: String,
    pub list_url_base: String,
    pub hashtag_url_base: String,
    pub cashtag_url_base: String,
    pub invisible_tag_attrs: String,
    /// Put the `@` inside the anchor.
    pub username_include_symbol: bool,
    extractor: Extractor,
    modifiers: Vec<LinkModifier>,
}

impl Default for Autolinker {
    fn default() -> Self {
        Autolinker::new(true)
    }
}

impl Autolinker {
    pub fn new(no_follow: bool) -> Self {
        let mut extractor = Extractor::new();
        extractor.set_extract_url_without_protocol(false);
        Autolinker {
            no_follow,
            url_class: String::new(),
            url_target: String::new(),
            symbol_tag: String::new(),
            text_with_symbol_tag: String::new(),
            list_class: DEFAULT_LIST_CLASS.to_string(),
            username_class: DEFAULT_USERNAME_CLASS.to_string(),
            hashtag_class: DEFAULT_HASHTAG_CLASS.to_string(),
            cashtag_class: DEFAULT_CASHTAG_CLASS.to_string(),
            username_url_base: DEFAULT_USERNAME_URL_BASE.to_string(),
            list_url_base: DEFAULT_LIST_URL_BASE.to_string(),
            hashtag_url_base: DEFAULT_HASHTAG_URL_BASE.to_string(),
            cashtag_url_base: DEFAULT_CASHTAG_URL_BASE.to_string(),
            invisible_tag_attrs: DEFAULT_INVISIBLE_TAG_ATTRS.to_string(),
            username_include_symbol: false,
            extractor,
            modifiers: Vec::new(),
        }
    }

    /// Register a modifier. Modifiers of the same kind run in insertion
    /// order.
    pub fn add_modifier(&mut self, modifier: LinkModifier) {
        let stage = modifier.stage();
        let at = self.modifiers.iter().position(|m| m.stage() > stage).unwrap_or(self.modifiers.len());
        self.modifiers.insert(at, modifier);
    }

    pub fn with_modifier(mut self, modifier: LinkModifier) -> Self {
        self.add_modifier(modifier);
        self
    }

    pub fn modifiers(&self) -> &[LinkModifier] {
        &self.modifiers
    }

    /// Link every URL, mention, list, hashtag and cashtag. `<` and `>` in the
    /// input are escaped first.
    pub fn autolink(&self, text: &str) -> String {
        let text = escape_brackets(text);
        let entities = self.extractor.extract_entities_with_indices(&text);
        self.autolink_entities(&text, &entities)
    }

    pub fn autolink_usernames_and_lists(&self, text: &str) -> String {
        let entities = self.extractor.extract_mentions_or_lists_with_indices(text);
        self.autolink_entities(text, &entities)
    }

    pub fn autolink_hashtags(&self, text: &str) -> String {
        let entities = self.extractor.extract_hashtags_with_indices(text);
        self.autolink_entities(text, &entities)
    }

    /// URLs with protocol only.
    pub fn autolink_urls(&self, text: &str) -> String {
        let entities = self.extractor.extract_urls_with_indices(text);
        self.autolink_entities(text, &entities)
    }

    pub fn autolink_cashtags(&self, text: &str) -> String {
        let entities = self.extractor.extract_cashtags_with_indices(text);
        self.autolink_entities(text, &entities)
    }

    /// Render `entities`, which must be sorted, non-overlapping and within
    /// `text`. Federated mentions are left as text.
    pub fn autolink_entities(&self, text: &str, entities: &[Entity]) -> String {
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_len = bounds.len() - 1;

        let mut last_end = 0;
        for entity in entities {
            if entity.start < last_end || entity.end < entity.start || entity.end > char_len {
                tracing::warn!(
                    start = entity.start,
                    end = entity.end,
                    len = char_len,
                    "entities out of order or out of bounds; returning text unlinked"
                );
                return text.to_string();
            }
            last_end = entity.end;
        }

        let rtl = text.chars().any(is_rtl);
        let mut buf = String::with_capacity(text.len() * 2);
        let mut offset = 0;
        for entity in entities {
            let (start, end) = (bounds[entity.start], bounds[entity.end]);
            buf.push_str(&text[offset..start]);
            let matched = &text[start..end];
            match entity.entity_type {
                EntityType::Url => self.link_to_url(entity, &mut buf),
                EntityType::Hashtag => self.link_to_hashtag(entity, matched, rtl, &mut buf),
                EntityType::Mention => self.link_to_mention_and_list(entity, matched, &mut buf),
                EntityType::Cashtag => self.link_to_cashtag(entity, &mut buf),
                EntityType::FederatedMention => buf.push_str(matched),
            }
            offset = end;
        }
        buf.push_str(&text[offset..]);
        buf
    }

    fn link_to_text(&self, entity: &Entity, body: &str, mut attributes: Attributes, buf: &mut String) {
        if self.no_follow {
            attributes.push((REL.to_string(), "nofollow".to_string()));
        }

        let mut body = body.to_string();
        for modifier in &self.modifiers {
            match modifier {
                LinkModifier::AddAttribute { entity_types, key, value } => {
                    if entity_types.contains(&entity.entity_type) {
                        attributes.push((key.clone(), value.clone()));
                    }
                }
                LinkModifier::ReplaceClass(class) => {
                    for (_, value) in attributes.iter_mut().filter(|(key, _)| key == CLASS) {
                        *value = class.clone();
                    }
                }
                LinkModifier::LinkText(f) => body = f(entity, &body),
            }
        }

        buf.push_str("<a");
        for (key, value) in &attributes {
            buf.push(' ');
            buf.push_str(&escape_html(key));
            buf.push_str("=\"");
            buf.push_str(&escape_html(value));
            buf.push('"');
        }
        buf.push('>');
        buf.push_str(&body);
        buf.push_str("</a>");
    }

    fn link_to_text_with_symbol(&self, entity: &Entity, symbol: &str, text: &str, attributes: Attributes, buf: &mut String) {
        let tagged_symbol = wrap(&self.symbol_tag, symbol);
        let tagged_text = wrap(&self.text_with_symbol_tag, &escape_html(text));
        let is_mention = symbol == "@" || symbol == "\u{FF20}";

        if self.username_include_symbol || !is_mention {
            self.link_to_text(entity, &(tagged_symbol + &tagged_text), attributes, buf);
        } else {
            buf.push_str(&tagged_symbol);
            self.link_to_text(entity, &tagged_text, attributes, buf);
        }
    }

    fn link_to_hashtag(&self, entity: &Entity, matched: &str, rtl: bool, buf: &mut String) {
        let symbol = first_char(matched);
        let hashtag = &entity.value;
        let class = if rtl {
            format!("{} rtl", self.hashtag_class)
        } else {
            self.hashtag_class.clone()
        };
        let attributes = vec![
            (HREF.to_string(), format!("{}{hashtag}", self.hashtag_url_base)),
            (TITLE.to_string(), format!("#{hashtag}")),
            (CLASS.to_string(), class),
        ];
        self.link_to_text_with_symbol(entity, symbol, hashtag, attributes, buf);
    }

    fn link_to_cashtag(&self, entity: &Entity, buf: &mut String) {
        let cashtag = &entity.value;
        let attributes = vec![
            (HREF.to_string(), format!("{}{cashtag}", self.cashtag_url_base)),
            (TITLE.to_string(), format!("${cashtag}")),
            (CLASS.to_string(), self.cashtag_class.clone()),
        ];
        self.link_to_text_with_symbol(entity, "$", cashtag, attributes, buf);
    }

    fn link_to_mention_and_list(&self, entity: &Entity, matched: &str, buf: &mut String) {
        let symbol = first_char(matched);
        let mut mention = entity.value.clone();
        let attributes = match entity.list_slug.as_deref().filter(|slug| !slug.is_empty()) {
            Some(slug) => {
                mention.push_str(slug);
                vec![
                    (CLASS.to_string(), self.list_class.clone()),
                    (HREF.to_string(), format!("{}{mention}", self.list_url_base)),
                ]
            }
            None => vec![
                (CLASS.to_string(), self.username_class.clone()),
                (HREF.to_string(), format!("{}{mention}", self.username_url_base)),
            ],
        };
        self.link_to_text_with_symbol(entity, symbol, &mention, attributes, buf);
    }

    fn link_to_url(&self, entity: &Entity, buf: &mut String) {
        let url = &entity.value;
        let body = match (entity.display_url.as_deref(), entity.expanded_url.as_deref()) {
            (Some(display), Some(expanded)) if !display.is_empty() && !expanded.is_empty() => {
                self.display_url_body(display, expanded)
            }
            _ => escape_html(url),
        };

        let mut attributes = vec![(HREF.to_string(), url.clone())];
        if !self.url_class.is_empty() {
            attributes.push((CLASS.to_string(), self.url_class.clone()));
        }
        if !self.url_target.is_empty() {
            attributes.push((TARGET.to_string(), self.url_target.clone()));
        }
        self.link_to_text(entity, &body, attributes, buf);
    }

    /// Body for a shortened URL: the display URL is visible, the rest of the
    /// expanded URL is present but hidden so copying the link yields the full
    /// URL. Ellipses are shown but not copied.
    fn display_url_body(&self, display: &str, expanded: &str) -> String {
        let visible = display.replace('\u{2026}', "");
        let Some(at) = expanded.find(&visible) else {
            return display.to_string();
        };
        let before = &expanded[..at];
        let after = &expanded[at + visible.len()..];
        let leading = if display.starts_with('\u{2026}') { "\u{2026}" } else { "" };
        let trailing = if display.ends_with('\u{2026}') { "\u{2026}" } else { "" };
        let invisible = format!("<span {}>", self.invisible_tag_attrs);

        let mut body = String::with_capacity(expanded.len() * 2 + 256);
        body.push_str("<span class='tco-ellipsis'>");
        body.push_str(leading);
        body.push_str(&invisible);
        body.push_str("&nbsp;</span></span>");
        body.push_str(&invisible);
        body.push_str(&escape_html(before));
        body.push_str("</span><span class='js-display-url'>");
        body.push_str(&escape_html(&visible));
        body.push_str("</span>");
        body.push_str(&invisible);
        body.push_str(&escape_html(after));
        body.push_str("</span><span class='tco-ellipsis'>");
        body.push_str(&invisible);
        body.push_str("&nbsp;</span>");
        body.push_str(trailing);
        body.push_str("</span>");
        body
    }
}

fn first_char(s: &str) -> &str {
    s.chars().next().map_or("", |c| &s[..c.len_utf8()])
}

fn wrap(tag: &str, inner: &str) -> String {
    if tag.is_empty() { inner.to_string() } else { format!("<{tag}>{inner}</{tag}>") }
}

fn escape_html(s: &str) -> String {
    let mut buf = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '&' => buf.push_str("&amp;"),
            '\'' => buf.push_str("&#39;"),
            '"' => buf.push_str("&quot;"),
            c => buf.push(c),
        }
    }
    buf
}

fn escape_brackets(s: &str) -> String {
    let mut buf = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            c => buf.push(c),
        }
    }
    buf
}
