//! Node resolution.
//!
//! The scanner reports URL *candidates*: syntactically complete, but not yet
//! checked against the TLD table. Resolution validates each candidate, trims
//! it back to the last legal domain boundary where needed, drops the ones
//! that cannot be salvaged and finally turns surviving nodes into public
//! [`Entity`] values with codepoint offsets.
//!
//! ## Where this fits
//!
//! ```text
//! Scanner ──▶ Vec<Node> (bytes) ──▶ resolve_nodes() ──▶ Vec<Node> (validated)
//!                                                  └─▶ to_entities() ──▶ Vec<Entity> (codepoints)
//! ```
//!
//! ## Domain validation
//!
//! - `t.co` short links only get the IDNA length check.
//! - IPv4 and bracketed IPv6 hosts after a protocol skip the TLD check.
//! - A label that starts in Latin script and continues in another
//!   (`example.comだよね`) is cut at the script change; the remaining prefix
//!   must end in a valid TLD.
//! - Otherwise labels are tried right to left and the domain ends after the
//!   rightmost label that is a TLD. Bare domains also accept a non-ASCII
//!   label whose prefix is a TLD (`twitter.みんなです`).
//! - When the domain ends early, everything after it (port, path, query) is
//!   dropped with it.

use crate::api::{Entity, EntityType};
use crate::rules::tlds::is_valid_tld;
use crate::rules::url::is_ip_host;
use crate::validator::MAX_URL_LENGTH;
use crate::{Node, NodeKind, Range};
use idna::uts46::{AsciiDenyList, DnsLength, Hyphens, Uts46};
use tracing::debug;

/// Length of the `https://` prefix a bare domain is assumed to carry.
const IMPLIED_SCHEME_LEN: usize = "https://".len();

/// Converts increasing byte offsets to codepoint offsets in one pass.
///
/// Offsets must be requested in non-decreasing order; asking for an earlier
/// offset restarts the count from the beginning of the text.
pub struct CharCursor<'t> {
    text: &'t str,
    byte: usize,
    chars: usize,
}

impl<'t> CharCursor<'t> {
    pub fn new(text: &'t str) -> Self {
        CharCursor { text, byte: 0, chars: 0 }
    }

    pub fn to_char(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Keep the nodes `keep` selects, validating URL candidates on the way.
pub fn resolve_nodes(text: &str, nodes: Vec<Node>, keep: impl Fn(NodeKind) -> bool) -> Vec<Node> {
    nodes
        .into_iter()
        .filter(|node| keep(node.kind))
        .filter_map(|mut node| {
            if node.kind.is_url() {
                let end = check_url(text, &node)?;
                if end < node.range.end {
                    debug!(
                        url = &text[node.range.start..node.range.end],
                        kept = &text[node.range.start..end],
                        "url trimmed to tld"
                    );
                    node.range.end = end;
                    if let Some(host) = node.host.as_mut() {
                        host.end = host.end.min(end);
                    }
                }
            }
            Some(node)
        })
        .collect()
}

/// Validated byte end of a URL node, or `None` when the host has no usable
/// TLD.
pub fn check_url(text: &str, node: &Node) -> Option<usize> {
    let host = node.host?;
    let domain = &text[host.start..host.end];
    let url = &text[node.range.start..node.range.end];
    let has_scheme = node.kind != NodeKind::UrlWithoutProtocol;

    if has_scheme && is_ip_host(domain) {
        return (url.len() < MAX_URL_LENGTH).then_some(node.range.end);
    }
    if node.kind == NodeKind::ShortUrl {
        return idna_fits(url, domain, has_scheme).then_some(node.range.end);
    }

    let bare = !has_scheme;
    if bare {
        let valid_end = valid_domain_end(domain);
        if valid_end < domain.len() {
            let trimmed = &domain[..valid_end];
            let tld = trimmed.rfind('.').map(|dot| &trimmed[dot + 1..]);
            if tld.is_some_and(is_valid_tld) {
                return Some(host.start + valid_end);
            }
            debug!(url, "url rejected: mixed-script label without tld");
            return None;
        }
    }

    let Some(boundary) = tld_boundary(domain, bare) else {
        debug!(url, "url rejected: no valid tld");
        return None;
    };
    if boundary < domain.len() {
        return Some(host.start + boundary);
    }
    if idna_fits(url, domain, has_scheme) {
        Some(node.range.end)
    } else {
        debug!(url, "url rejected: idna conversion or length");
        None
    }
}

/// Byte length of the domain prefix that ends in a valid TLD.
fn tld_boundary(domain: &str, bare: bool) -> Option<usize> {
    let dots: Vec<usize> = domain.match_indices('.').map(|(i, _)| i).collect();
    let label_after = |dot: usize| {
        let rest = &domain[dot + 1..];
        &rest[..rest.find('.').unwrap_or(rest.len())]
    };

    if domain.split('.').any(has_script_mixing) {
        for &dot in &dots {
            let label = label_after(dot);
            if has_script_mixing(label) {
                let prefix = &label[..script_boundary(label)];
                if !prefix.is_empty() && is_valid_tld(prefix) {
                    return Some(dot + 1 + prefix.len());
                }
            }
        }
    }

    for &dot in dots.iter().rev() {
        let label = label_after(dot);
        if is_valid_tld(label) {
            return Some(dot + 1 + label.len());
        }
        if bare && !label.is_ascii() {
            if let Some(prefix_end) =
                label.char_indices().skip(2).map(|(i, _)| i).find(|&i| is_valid_tld(&label[..i]))
            {
                return Some(dot + 1 + prefix_end);
            }
        }
    }
    None
}

/// End of the domain once the rightmost mixed-script label is cut at its
/// script change.
fn valid_domain_end(domain: &str) -> usize {
    let mut label_end = domain.len();
    for label in domain.rsplit('.') {
        let label_start = label_end - label.len();
        if has_script_mixing(label) {
            return label_start + script_boundary(label);
        }
        label_end = label_start.saturating_sub(1);
    }
    domain.len()
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c)
}

/// A Latin letter followed later by a non-Latin letter. Digits and hyphens
/// are script-neutral; punycode labels are exempt.
fn has_script_mixing(label: &str) -> bool {
    if label.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("xn--")) {
        return false;
    }
    let mut seen_latin = false;
    for c in label.chars() {
        if is_latin(c) {
            seen_latin = true;
        } else if c.is_ascii_digit() || c == '-' {
            continue;
        } else if seen_latin {
            return true;
        }
    }
    false
}

/// Byte length of the label prefix before the first non-Latin character that
/// follows a Latin one.
fn script_boundary(label: &str) -> usize {
    let mut seen_latin = false;
    for (i, c) in label.char_indices() {
        if is_latin(c) {
            seen_latin = true;
        } else if seen_latin && !(c.is_ascii_digit() || c == '-') {
            return i;
        }
    }
    label.len()
}

/// The domain converts to ASCII under UTS #46 and the resulting URL stays
/// under [`MAX_URL_LENGTH`].
fn idna_fits(url: &str, domain: &str, has_scheme: bool) -> bool {
    let ascii = Uts46::new().to_ascii(domain.as_bytes(), AsciiDenyList::EMPTY, Hyphens::Allow, DnsLength::Verify);
    match ascii {
        Ok(ascii) => {
            let scheme = if has_scheme { 0 } else { IMPLIED_SCHEME_LEN };
            scheme + url.len() - domain.len() + ascii.len() < MAX_URL_LENGTH
        }
        Err(_) => false,
    }
}

/// Public entities for resolved nodes. Emoji nodes are skipped.
pub fn to_entities(text: &str, nodes: &[Node]) -> Vec<Entity> {
    let mut cursor = CharCursor::new(text);
    nodes.iter().filter_map(|node| to_entity(text, node, &mut cursor)).collect()
}

fn to_entity(text: &str, node: &Node, cursor: &mut CharCursor<'_>) -> Option<Entity> {
    let Range { start, end } = node.range;
    let matched = &text[start..end];
    let symbol_len = matched.chars().next().map_or(0, char::len_utf8);
    let body = &matched[symbol_len..];

    let entity_type = match node.kind {
        NodeKind::Url | NodeKind::ShortUrl | NodeKind::UrlWithoutProtocol => EntityType::Url,
        NodeKind::Hashtag => EntityType::Hashtag,
        NodeKind::Cashtag => EntityType::Cashtag,
        NodeKind::Username | NodeKind::List => EntityType::Mention,
        NodeKind::Federated => EntityType::FederatedMention,
        NodeKind::Emoji => return None,
    };
    let char_start = cursor.to_char(start);
    let char_end = cursor.to_char(end);

    Some(match (node.kind, node.slug_start) {
        (NodeKind::List, Some(slash)) => {
            Entity::new_list(&text[start + symbol_len..slash], &text[slash..end], char_start, char_end)
        }
        (NodeKind::Url | NodeKind::ShortUrl | NodeKind::UrlWithoutProtocol | NodeKind::Federated, _) => {
            Entity::new(entity_type, matched, char_start, char_end)
        }
        _ => Entity::new(entity_type, body, char_start, char_end),
    })
}
