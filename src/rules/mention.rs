//! `@username`, `@username/list-slug` and `@user@domain`.
//!
//! All matchers take the byte index of the `@` (or `＠`) and return byte
//! ends. Names are ASCII, so the bodies are scanned byte-wise.

use super::chars::{char_before, is_at_sign, is_latin_accent, is_space};

pub const MAX_USERNAME_LEN: usize = 20;
pub const MAX_LIST_SLUG_LEN: usize = 25;

/// What an `@` turned out to introduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionMatch {
    Username { end: usize },
    /// `slug_start` is the byte index of the `/`.
    List { slug_start: usize, end: usize },
    Federated { end: usize },
}

impl MentionMatch {
    pub fn end(self) -> usize {
        match self {
            MentionMatch::Username { end } | MentionMatch::List { end, .. } | MentionMatch::Federated { end } => end,
        }
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_slug_byte(b: u8) -> bool {
    is_name_byte(b) || b == b'-'
}

/// Byte index just past the `@`/`＠` at `pos`.
fn after_at(text: &str, pos: usize) -> Option<usize> {
    let c = text[pos..].chars().next().filter(|&c| is_at_sign(c))?;
    Some(pos + c.len_utf8())
}

fn username_end(bytes: &[u8], start: usize) -> Option<usize> {
    let len = bytes[start..].iter().take(MAX_USERNAME_LEN).take_while(|&&b| is_name_byte(b)).count();
    (len > 0).then_some(start + len)
}

/// `@` + 1-20 name characters.
pub fn match_username(text: &str, pos: usize) -> Option<usize> {
    username_end(text.as_bytes(), after_at(text, pos)?)
}

/// `@name/slug`; returns `(slash index, end)`.
pub fn match_list(text: &str, pos: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let slash = match_username(text, pos)?;
    if bytes.get(slash) != Some(&b'/') {
        return None;
    }
    let first = slash + 1;
    if !bytes.get(first).is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let rest = bytes[first + 1..].iter().take(MAX_LIST_SLUG_LEN - 1).take_while(|&&b| is_slug_byte(b)).count();
    Some((slash, first + 1 + rest))
}

/// One `user` or `domain` half of a federated handle: name characters,
/// optionally joined by runs of `.`/`-` that are followed by more name
/// characters.
fn federated_segment_end(bytes: &[u8], start: usize) -> Option<usize> {
    if !bytes.get(start).is_some_and(|&b| is_name_byte(b)) {
        return None;
    }
    let mut end = start + 1;
    let mut i = end;
    while i < bytes.len() {
        let b = bytes[i];
        if is_name_byte(b) {
            i += 1;
            end = i;
        } else if b == b'.' || b == b'-' {
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j] == b'.' || bytes[j] == b'-') {
                j += 1;
            }
            if j < bytes.len() && is_name_byte(bytes[j]) {
                i = j + 1;
                end = i;
            } else {
                break;
            }
        } else {
            break;
        }
    }
    Some(end)
}

/// `@user@domain`.
pub fn match_federated(text: &str, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let user_end = federated_segment_end(bytes, after_at(text, pos)?)?;
    if bytes.get(user_end) != Some(&b'@') {
        return None;
    }
    federated_segment_end(bytes, user_end + 1)
}

/// Longest mention form at `pos`. Federated handles are only considered when
/// `federated` is set.
pub fn match_mention(text: &str, pos: usize, federated: bool) -> Option<MentionMatch> {
    if federated {
        if let Some(end) = match_federated(text, pos) {
            return Some(MentionMatch::Federated { end });
        }
    }
    if let Some((slug_start, end)) = match_list(text, pos) {
        return Some(MentionMatch::List { slug_start, end });
    }
    match_username(text, pos).map(|end| MentionMatch::Username { end })
}

/// Whether the character before an `@` allows a mention to start.
///
/// Word characters and a few symbols block it, except for the legacy
/// retweet prefix `RT@` / `RT:@`.
pub fn valid_predecessor(text: &str, pos: usize) -> bool {
    let Some(prev) = char_before(text, pos) else {
        return true;
    };
    let blocked = prev.is_ascii_alphanumeric() || matches!(prev, '_' | '!' | '#' | '$' | '%' | '&' | '*') || is_at_sign(prev);
    !blocked || follows_retweet_marker(text, pos)
}

fn follows_retweet_marker(text: &str, pos: usize) -> bool {
    let before = &text[..pos];
    let before = before.strip_suffix(':').unwrap_or(before);
    if before.len() < 2 || !before.is_char_boundary(before.len() - 2) {
        return false;
    }
    let (head, marker) = before.split_at(before.len() - 2);
    marker.eq_ignore_ascii_case("rt") && head.chars().next_back().is_none_or(char::is_whitespace)
}

/// A mention may not run straight into another `@`, a hyphen, an accented
/// letter or a `://`.
pub fn invalid_successor(text: &str, end: usize) -> bool {
    let rest = &text[end..];
    match rest.chars().next() {
        Some(c) => is_at_sign(c) || c == '-' || is_latin_accent(c) || rest.starts_with("://"),
        None => false,
    }
}

/// A mention or list right at the start of `text`, after optional
/// whitespace. Returns the `@` position and the match.
pub fn match_reply(text: &str) -> Option<(usize, MentionMatch)> {
    let pos = text.char_indices().find(|&(_, c)| !is_space(c)).map(|(i, _)| i)?;
    let found = match_mention(text, pos, false)?;
    (!invalid_successor(text, found.end())).then_some((pos, found))
}
