//! Emoji sequences.
//!
//! Matching is structural rather than table-driven: a sequence starts with a
//! pictographic codepoint and absorbs skin-tone modifiers, variation
//! selectors, regional indicators, tag characters and ZWJ-joined
//! pictographs. Keycaps (`#`, `*` or a digit followed by U+20E3, optionally
//! with U+FE0F in between) are the only ASCII-led sequences.

const VS16: char = '\u{FE0F}';
const KEYCAP: char = '\u{20E3}';
const ZWJ: char = '\u{200D}';

/// A codepoint that can open a non-keycap emoji sequence.
pub fn is_emoji_start(c: char) -> bool {
    matches!(c, '\u{00A9}' | '\u{00AE}' | '\u{203C}'..='\u{3299}' | '\u{1F000}'..='\u{1FAFF}')
}

fn is_continuation(c: char) -> bool {
    matches!(c,
        '\u{1F3FB}'..='\u{1F3FF}'
        | '\u{FE0E}'
        | '\u{FE0F}'
        | '\u{20E3}'
        | '\u{1F1E0}'..='\u{1F1FF}'
        | '\u{E0000}'..='\u{E007F}'
    )
}

fn is_keycap_base(c: char) -> bool {
    c == '#' || c == '*' || c.is_ascii_digit()
}

/// Byte end of a keycap sequence starting at `pos`.
pub fn match_keycap(text: &str, pos: usize) -> Option<usize> {
    let mut chars = text[pos..].chars();
    let base = chars.next().filter(|&c| is_keycap_base(c))?;
    let mut end = pos + base.len_utf8();

    let mut next = chars.next()?;
    if next == VS16 {
        end += VS16.len_utf8();
        next = chars.next()?;
    }
    (next == KEYCAP).then_some(end + KEYCAP.len_utf8())
}

/// Byte end of the emoji sequence starting at `pos`.
pub fn match_emoji(text: &str, pos: usize) -> Option<usize> {
    if let Some(end) = match_keycap(text, pos) {
        return Some(end);
    }

    let mut chars = text[pos..].chars().peekable();
    let first = chars.next().filter(|&c| is_emoji_start(c))?;
    let mut end = pos + first.len_utf8();

    while let Some(&c) = chars.peek() {
        if is_continuation(c) {
            end += c.len_utf8();
            chars.next();
        } else if c == ZWJ {
            chars.next();
            match chars.next() {
                Some(joined) if is_emoji_start(joined) => end += ZWJ.len_utf8() + joined.len_utf8(),
                _ => break,
            }
        } else {
            break;
        }
    }

    Some(end)
}
