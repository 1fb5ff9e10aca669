//! Single-pass candidate scanner.
//!
//! The scanner walks the text once, left to right, and at every position
//! that could open an entity asks the grammars in `crate::rules` for the
//! longest match. A match claims its span: scanning resumes after it, so a
//! `#fragment` inside a URL or an `@` inside a federated handle is never
//! reported twice.
//!
//! ## Design notes
//!
//! - ASCII bytes that cannot open anything (spaces, digits, most
//!   punctuation) are skipped without decoding.
//! - Every kind is scanned regardless of what the caller asked for; the
//!   engine filters afterwards. Which spans are *consumed* must not depend
//!   on the requested kinds, otherwise asking for hashtags alone would find
//!   hashtags inside URLs.
//! - URL candidates are emitted before TLD validation. A candidate that
//!   later fails validation still consumed its span.
//! - Two look-ahead/look-behind checks guard bare domains. Both are
//!   answered from incrementally maintained state so the scan stays linear:
//!   [`UrlContext`] remembers whether a `://` occurred in the current word,
//!   and [`DotLookahead`] whether a dot occurs before the next whitespace.

use crate::rules::chars::{char_before, is_at_sign, is_cjk_delimiter, is_hash_sign, is_space};
use crate::rules::mention::MentionMatch;
use crate::rules::{cashtag, emoji, hashtag, mention, url};
use crate::{Node, NodeKind};

/// Tracks the start of the current word and the last `://` seen, up to the
/// scanner position.
#[derive(Debug, Default)]
struct UrlContext {
    scanned: usize,
    word_start: usize,
    last_protocol: Option<usize>,
}

impl UrlContext {
    fn advance(&mut self, text: &str, upto: usize) {
        if upto <= self.scanned {
            return;
        }
        let bytes = text.as_bytes();
        for (offset, c) in text[self.scanned..upto].char_indices() {
            let i = self.scanned + offset;
            if is_space(c) || is_cjk_delimiter(c) {
                self.word_start = i + c.len_utf8();
            } else if c == '/' && i >= 2 && &bytes[i - 2..=i] == b"://" {
                self.last_protocol = Some(i - 2);
            }
        }
        self.scanned = upto;
    }

    /// A `://` between the word start and `pos`: whatever follows belongs
    /// to a URL that failed to parse and must not be re-read as a bare
    /// domain.
    fn inside_failed_url(&mut self, text: &str, pos: usize) -> bool {
        self.advance(text, pos);
        self.last_protocol.is_some_and(|p| p >= self.word_start)
    }
}

/// Caches the next whitespace and the next dot at or after the scanner
/// position.
#[derive(Debug, Default)]
struct DotLookahead {
    next_space: Option<usize>,
    next_dot: Option<usize>,
}

impl DotLookahead {
    fn dot_before_space(&mut self, text: &str, pos: usize) -> bool {
        let find = |pred: fn(char) -> bool| {
            text[pos..].char_indices().find(|&(_, c)| pred(c)).map_or(text.len(), |(i, _)| pos + i)
        };
        let space = match self.next_space {
            Some(space) if space >= pos => space,
            _ => *self.next_space.insert(find(is_space)),
        };
        let dot = match self.next_dot {
            Some(dot) if dot >= pos => dot,
            _ => *self.next_dot.insert(find(|c| c == '.')),
        };
        dot < space
    }
}

pub struct Scanner<'t> {
    text: &'t str,
    federated: bool,
    bare_urls: bool,
    context: UrlContext,
    dots: DotLookahead,
    nodes: Vec<Node>,
}

impl<'t> Scanner<'t> {
    /// `federated` enables `@user@domain` handles; `bare_urls` is false when
    /// the text has no dot at all, which rules out bare domains up front.
    pub fn new(text: &'t str, federated: bool, bare_urls: bool) -> Self {
        Scanner {
            text,
            federated,
            bare_urls,
            context: UrlContext::default(),
            dots: DotLookahead::default(),
            nodes: Vec::with_capacity(16),
        }
    }

    /// Scan the whole text. Nodes come back ordered by start and never
    /// overlap.
    pub fn scan(mut self) -> Vec<Node> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut pos = 0;

        while pos < bytes.len() {
            let b = bytes[pos];
            if b.is_ascii() {
                if matches!(b, b'0'..=b'9' | b'#' | b'*') {
                    if let Some(end) = emoji::match_keycap(text, pos) {
                        self.nodes.push(Node::new(NodeKind::Emoji, pos, end));
                        pos = end;
                        continue;
                    }
                }
                if is_inert(b) {
                    pos += 1;
                    continue;
                }
                if let Some(node) = self.try_entity(pos) {
                    pos = node.range.end;
                    self.nodes.push(node);
                    continue;
                }
                pos += 1 + match b {
                    b'$' => skip_url(text, pos + 1),
                    b'@' => skip_bare_domain(text, pos + 1),
                    _ => 0,
                };
            } else {
                let Some(c) = text[pos..].chars().next() else { break };
                let len = c.len_utf8();
                if let Some(node) = self.try_entity(pos) {
                    pos = node.range.end;
                    self.nodes.push(node);
                } else if let Some(end) = emoji::is_emoji_start(c).then(|| emoji::match_emoji(text, pos)).flatten() {
                    self.nodes.push(Node::new(NodeKind::Emoji, pos, end));
                    pos = end;
                } else if is_at_sign(c) {
                    pos += len + skip_bare_domain(text, pos + len);
                } else {
                    pos += len;
                }
            }
        }

        self.nodes
    }

    fn try_entity(&mut self, pos: usize) -> Option<Node> {
        let text = self.text;
        let c = text[pos..].chars().next()?;

        if is_at_sign(c) {
            return self.try_mention(pos);
        }
        if is_hash_sign(c) {
            if !hashtag::valid_hashtag_predecessor(text, pos) || hashtag::precedes_protocol(text, pos + c.len_utf8()) {
                return None;
            }
            return hashtag::match_hashtag(text, pos).map(|end| Node::new(NodeKind::Hashtag, pos, end));
        }
        if c == '$' {
            if !cashtag::valid_cashtag_predecessor(text, pos) {
                return None;
            }
            return cashtag::match_cashtag(text, pos).map(|end| Node::new(NodeKind::Cashtag, pos, end));
        }

        let prev = char_before(text, pos);
        if !url::valid_url_predecessor(prev) {
            return None;
        }
        if c == 'h' || c == 'H' {
            if let Some(found) = url::match_url(text, pos) {
                return Some(Node::url(found.kind, pos, found.end, found.host));
            }
        }
        if url::is_bare_domain_char(c) && !prev.is_some_and(url::is_bare_domain_char) {
            return self.try_bare_url(pos);
        }
        None
    }

    fn try_mention(&mut self, pos: usize) -> Option<Node> {
        let text = self.text;
        if !mention::valid_predecessor(text, pos) {
            return None;
        }
        let found = mention::match_mention(text, pos, self.federated)?;
        if mention::invalid_successor(text, found.end()) {
            return None;
        }
        Some(match found {
            MentionMatch::Username { end } => Node::new(NodeKind::Username, pos, end),
            MentionMatch::List { slug_start, end } => Node::list(pos, end, slug_start),
            MentionMatch::Federated { end } => Node::new(NodeKind::Federated, pos, end),
        })
    }

    fn try_bare_url(&mut self, pos: usize) -> Option<Node> {
        let text = self.text;
        if !self.bare_urls || self.context.inside_failed_url(text, pos) || !self.dots.dot_before_space(text, pos) {
            return None;
        }
        let found = url::match_url_without_protocol(text, pos)?;
        if text[found.end..].starts_with(is_at_sign) {
            return None;
        }
        Some(Node::url(found.kind, pos, found.end, found.host))
    }
}

/// ASCII bytes that never open an entity.
fn is_inert(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t'
            | b'\n'
            | b'\r'
            | b'.'
            | b','
            | b'!'
            | b'?'
            | b'\''
            | b'"'
            | b'-'
            | b'_'
            | b'0'..=b'9'
            | b'('
            | b')'
            | b'['
            | b']'
            | b'{'
            | b'}'
            | b':'
            | b';'
            | b'<'
            | b'>'
            | b'/'
            | b'\\'
            | b'|'
            | b'`'
            | b'~'
            | b'='
            | b'+'
            | b'*'
            | b'&'
            | b'^'
            | b'%'
    )
}

/// After a `$` that is not a cashtag: the length of a URL glued to it
/// (`$http://t.co`, `$twitter.com`), so no partial URL is extracted.
fn skip_url(text: &str, pos: usize) -> usize {
    url::match_url(text, pos).or_else(|| url::match_url_without_protocol(text, pos)).map_or(0, |m| m.end - pos)
}

/// After an `@` that is not a mention: the length of the domain half of an
/// e-mail address.
fn skip_bare_domain(text: &str, pos: usize) -> usize {
    url::match_url_without_protocol(text, pos).map_or(0, |m| m.end - pos)
}
