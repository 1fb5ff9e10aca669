//! URL grammar: `http(s)://` URLs, `t.co` short links and bare domains.
//!
//! The grammar is permissive about host names; deciding whether a host ends
//! in a real TLD happens later, in the engine's resolve step. Matchers take a
//! byte position in the full text and return byte ends.
//!
//! ```text
//! url       = protocol ( tco | [userinfo] host [port] ) [path] [query] [fragment]
//! bare      = label ("." label)* [port] [path] [query] [fragment]
//! tco       = "t.co" ["/" alnum{0,40}] [query [fragment]]
//! ```

use super::chars::{
    is_cyrillic, is_directional_marker, is_invalid_char, is_latin_accent, is_punctuation, is_space,
};
use crate::{NodeKind, Range};

pub const MAX_TCO_SLUG_LEN: usize = 40;

/// A syntactically complete URL candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlMatch {
    pub kind: NodeKind,
    pub end: usize,
    pub host: Range,
}

// --- Character classes -------------------------------------------------------

/// Anything that is not whitespace, ASCII punctuation, a non-character or a
/// bidi control. Permissive on purpose: CJK, Cyrillic and Arabic labels are
/// all accepted here.
fn is_domain_char(c: char) -> bool {
    !is_space(c) && !is_punctuation(c) && !is_invalid_char(c) && !is_directional_marker(c)
}

/// Labels of bare domains are restricted to Latin script.
pub fn is_bare_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_latin_accent(c)
}

/// A Unicode TLD may close a bare domain (`twitter.みんな`).
fn is_unicode_tld_char(c: char) -> bool {
    !c.is_ascii() && is_domain_char(c)
}

fn is_userinfo_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:!$&'()*+,;=".contains(c) || is_cyrillic(c)
}

fn is_path_end_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "=_-+".contains(c) || is_cyrillic(c) || is_latin_accent(c)
}

fn is_path_punctuation(c: char) -> bool {
    "!*';:,.$%[]~|&@\u{2013}".contains(c)
}

fn is_path_char(c: char) -> bool {
    is_path_end_char(c) || is_path_punctuation(c) || c == '/'
}

fn is_query_end_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_&=/+".contains(c)
}

fn is_query_punctuation(c: char) -> bool {
    "!?*'();:$%[].~|@,".contains(c)
}

/// Characters that may not directly follow the last label of a bare domain.
fn is_invalid_tld_suffix(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '@' || c == '\u{FF20}'
}

fn peek(text: &str, pos: usize) -> Option<char> {
    text.get(pos..)?.chars().next()
}

// --- Scheme ------------------------------------------------------------------

/// `http://` or `https://`, any case.
pub fn protocol_end(text: &str, pos: usize) -> Option<usize> {
    let bytes = &text.as_bytes()[pos..];
    if bytes.len() < 7 || !bytes[..4].eq_ignore_ascii_case(b"http") {
        return None;
    }
    let after = if bytes[4].eq_ignore_ascii_case(&b's') { 5 } else { 4 };
    bytes[after..].starts_with(b"://").then_some(pos + after + 3)
}

// --- Host --------------------------------------------------------------------

/// A run of `is_char` characters where `-` and `_` may only sit between two
/// such characters.
fn label_end(text: &str, pos: usize, is_char: fn(char) -> bool) -> Option<usize> {
    let mut chars = text[pos..].char_indices();
    let (_, first) = chars.next()?;
    if !is_char(first) {
        return None;
    }
    let mut end = pos + first.len_utf8();
    while let Some((offset, c)) = chars.next() {
        if c == '-' || c == '_' {
            match chars.next() {
                Some((next_offset, next)) if is_char(next) => end = pos + next_offset + next.len_utf8(),
                _ => break,
            }
        } else if is_char(c) {
            end = pos + offset + c.len_utf8();
        } else {
            break;
        }
    }
    Some(end)
}

/// `xn--` followed by alphanumerics and hyphens.
fn punycode_label_end(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if !bytes.get(pos..pos + 4)?.eq_ignore_ascii_case(b"xn--") {
        return None;
    }
    let len = bytes[pos + 4..].iter().take_while(|b| b.is_ascii_alphanumeric() || **b == b'-').count();
    (len > 0).then_some(pos + 4 + len)
}

fn domain_label_end(text: &str, pos: usize) -> Option<usize> {
    punycode_label_end(text, pos).or_else(|| label_end(text, pos, is_domain_char))
}

/// Dot-separated labels. A dot only belongs to the domain when another
/// label follows it.
fn domain_end(text: &str, pos: usize) -> Option<usize> {
    let mut end = domain_label_end(text, pos)?;
    while text[end..].starts_with('.') {
        match domain_label_end(text, end + 1) {
            Some(next) => end = next,
            None => break,
        }
    }
    Some(end)
}

fn dec_octet_end(bytes: &[u8], pos: usize) -> Option<usize> {
    let digits = bytes.get(pos..)?.iter().take(3).take_while(|b| b.is_ascii_digit()).count();
    // Longest valid octet without a leading zero.
    for len in (1..=digits).rev() {
        let octet = &bytes[pos..pos + len];
        if len > 1 && octet[0] == b'0' {
            continue;
        }
        let value = octet.iter().fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
        if value <= 255 {
            return Some(pos + len);
        }
    }
    None
}

fn ipv4_end(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut end = dec_octet_end(bytes, pos)?;
    for _ in 0..3 {
        if bytes.get(end) != Some(&b'.') {
            return None;
        }
        end = dec_octet_end(bytes, end + 1)?;
    }
    Some(end)
}

/// `[` hex digits, colons and dots `]`.
fn ip_literal_end(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }
    let len = bytes[pos + 1..].iter().take_while(|b| b.is_ascii_hexdigit() || **b == b':' || **b == b'.').count();
    (len > 0 && bytes.get(pos + 1 + len) == Some(&b']')).then_some(pos + len + 2)
}

/// Whether `host` is an IPv4 address or a bracketed IPv6 literal.
pub fn is_ip_host(host: &str) -> bool {
    ip_literal_end(host, 0) == Some(host.len()) || ipv4_end(host, 0) == Some(host.len())
}

/// `t.co` as a complete host name.
fn is_short_link_host(text: &str, pos: usize) -> bool {
    text[pos..].starts_with("t.co") && !peek(text, pos + 4).is_some_and(|c| is_domain_char(c) || c == '-' || c == '_')
}

fn host_end(text: &str, pos: usize) -> Option<usize> {
    if is_short_link_host(text, pos) {
        return None;
    }
    ip_literal_end(text, pos).or_else(|| ipv4_end(text, pos)).or_else(|| domain_end(text, pos))
}

/// `user:pass@`. Percent escapes must be complete.
fn userinfo_end(text: &str, pos: usize) -> Option<usize> {
    let mut chars = text[pos..].char_indices();
    while let Some((offset, c)) = chars.next() {
        match c {
            '@' => return Some(pos + offset + 1),
            '%' => {
                let hex = |p: Option<(usize, char)>| p.is_some_and(|(_, h)| h.is_ascii_hexdigit());
                if !(hex(chars.next()) && hex(chars.next())) {
                    return None;
                }
            }
            c if is_userinfo_char(c) => {}
            _ => return None,
        }
    }
    None
}

fn port_end(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(pos) != Some(&b':') || !bytes.get(pos + 1).is_some_and(|b| (b'1'..=b'9').contains(b)) {
        return None;
    }
    Some(pos + 2 + bytes[pos + 2..].iter().take_while(|b| b.is_ascii_digit()).count())
}

// --- Path, query, fragment -----------------------------------------------------

/// `/` + path characters. Parentheses must balance; an unclosed `(` cuts the
/// path back to the last position at depth zero. Trailing punctuation other
/// than `/` is dropped.
fn path_end(text: &str, pos: usize) -> Option<usize> {
    if !text[pos..].starts_with('/') {
        return None;
    }
    let start = pos + 1;
    let mut end = start;
    let mut depth = 0usize;
    let mut balanced_end = start;

    for (offset, c) in text[start..].char_indices() {
        let next = start + offset + c.len_utf8();
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            ')' => break,
            c if is_path_char(c) => {}
            _ => break,
        }
        end = next;
        if depth == 0 {
            balanced_end = next;
        }
    }
    if depth > 0 {
        end = balanced_end;
    }

    let path = &text[pos..end];
    let trimmed = path.trim_end_matches(|c: char| c != '/' && is_path_punctuation(c));
    Some(pos + trimmed.len())
}

/// `?` + query characters; punctuation only counts when an end character
/// follows it. A bare `?` is allowed right before a fragment.
fn query_end(text: &str, pos: usize) -> Option<usize> {
    if !text[pos..].starts_with('?') {
        return None;
    }
    let start = pos + 1;
    if text[start..].starts_with('#') {
        return Some(start);
    }
    let mut last_end = None;
    for (offset, c) in text[start..].char_indices() {
        if is_query_end_char(c) {
            last_end = Some(start + offset + c.len_utf8());
        } else if !is_query_punctuation(c) {
            break;
        }
    }
    last_end
}

fn fragment_end(text: &str, pos: usize) -> Option<usize> {
    if !text[pos..].starts_with('#') {
        return None;
    }
    let len: usize = text[pos + 1..]
        .chars()
        .take_while(|&c| c.is_ascii_alphanumeric() || "-_&=/+#".contains(c) || is_query_punctuation(c))
        .map(char::len_utf8)
        .sum();
    Some(pos + 1 + len)
}

/// Optional port, path, query and fragment after a host.
fn tail_end(text: &str, pos: usize) -> usize {
    let mut end = pos;
    for part in [port_end, path_end, query_end, fragment_end] {
        if let Some(next) = part(text, end) {
            end = next;
        }
    }
    end
}

// --- Entry points -------------------------------------------------------------

/// `t.co/slug` after the protocol. Slugs longer than 40 characters are not
/// short links.
fn short_link_end(text: &str, host_start: usize) -> Option<usize> {
    if !is_short_link_host(text, host_start) {
        return None;
    }
    let mut end = host_start + 4;
    if text[end..].starts_with('/') {
        let slug = text.as_bytes()[end + 1..].iter().take_while(|b| b.is_ascii_alphanumeric()).count();
        if slug > MAX_TCO_SLUG_LEN {
            return None;
        }
        end += 1 + slug;
    }
    if let Some(query) = query_end(text, end) {
        end = fragment_end(text, query).unwrap_or(query);
    }
    Some(end)
}

/// A URL with protocol starting at `pos`.
pub fn match_url(text: &str, pos: usize) -> Option<UrlMatch> {
    let after_protocol = protocol_end(text, pos)?;

    if let Some(end) = short_link_end(text, after_protocol) {
        let host = Range::new(after_protocol, after_protocol + 4);
        return Some(UrlMatch { kind: NodeKind::ShortUrl, end, host });
    }

    let host_start = userinfo_end(text, after_protocol).unwrap_or(after_protocol);
    let host = Range::new(host_start, host_end(text, host_start)?);
    Some(UrlMatch { kind: NodeKind::Url, end: tail_end(text, host.end), host })
}

fn bare_label_end(text: &str, pos: usize) -> Option<usize> {
    label_end(text, pos, is_bare_domain_char)
}

fn unicode_tld_end(text: &str, pos: usize) -> Option<usize> {
    let len: usize = text[pos..].chars().take_while(|&c| is_unicode_tld_char(c)).map(char::len_utf8).sum();
    (len > 0).then_some(pos + len)
}

/// Host of a bare domain: Latin labels, optionally closed by a Unicode TLD,
/// with at least one dot.
fn bare_domain_end(text: &str, pos: usize) -> Option<usize> {
    let mut end = bare_label_end(text, pos)?;
    loop {
        if !text[end..].starts_with('.') {
            break;
        }
        if let Some(next) = bare_label_end(text, end + 1) {
            end = next;
        } else if let Some(next) = unicode_tld_end(text, end + 1) {
            end = next;
            break;
        } else {
            break;
        }
    }

    if peek(text, end).is_some_and(is_invalid_tld_suffix) || !text[pos..end].contains('.') {
        return None;
    }
    Some(end)
}

/// A bare domain URL (`example.com/path`) starting at `pos`.
pub fn match_url_without_protocol(text: &str, pos: usize) -> Option<UrlMatch> {
    let host = Range::new(pos, bare_domain_end(text, pos)?);
    Some(UrlMatch { kind: NodeKind::UrlWithoutProtocol, end: tail_end(text, host.end), host })
}

/// URLs are never glued to the symbol of another entity.
pub fn valid_url_predecessor(prev: Option<char>) -> bool {
    !matches!(prev, Some('@' | '#' | '$' | '\u{FF20}' | '\u{FF03}'))
}
