//! Character classes shared by every grammar.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;

/// Whitespace as the entity grammars see it (Unicode `White_Space` minus a
/// few format characters).
pub fn is_space(c: char) -> bool {
    matches!(c,
        '\u{0009}'..='\u{000D}'
        | '\u{0020}'
        | '\u{0085}'
        | '\u{00A0}'
        | '\u{1680}'
        | '\u{180E}'
        | '\u{2000}'..='\u{200A}'
        | '\u{2028}'
        | '\u{2029}'
        | '\u{202F}'
        | '\u{205F}'
        | '\u{3000}'
    )
}

/// ASCII punctuation.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Non-characters that never belong to an entity and make a post invalid.
pub fn is_invalid_char(c: char) -> bool {
    matches!(c, '\u{FFFE}' | '\u{FEFF}' | '\u{FFFF}')
}

/// Bidirectional formatting characters. They may sit next to an entity but
/// never inside a host name.
pub fn is_directional_marker(c: char) -> bool {
    matches!(c, '\u{061C}' | '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}')
}

/// Characters a post may not contain at all.
pub fn is_disallowed(c: char) -> bool {
    is_invalid_char(c) || matches!(c, '\u{202A}'..='\u{202E}')
}

pub fn is_latin_accent(c: char) -> bool {
    matches!(c,
        '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{00FF}'
        | '\u{0100}'..='\u{024F}'
        | '\u{0253}'..='\u{0254}'
        | '\u{0256}'..='\u{0257}'
        | '\u{0259}'
        | '\u{025B}'
        | '\u{0263}'
        | '\u{0268}'
        | '\u{026F}'
        | '\u{0272}'
        | '\u{0289}'
        | '\u{028B}'
        | '\u{02BB}'
        | '\u{0300}'..='\u{036F}'
        | '\u{1E00}'..='\u{1EFF}'
    )
}

pub fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}

/// Unicode general category L* or M*.
///
/// `Alphabetic` also covers letter numbers and the enclosed Latin letters;
/// those are symbols here.
pub fn is_letter_or_mark(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_alphabetic();
    }
    if is_combining_mark(c) {
        return true;
    }
    c.is_alphabetic() && !c.is_numeric() && !is_enclosed_letter(c)
}

fn is_enclosed_letter(c: char) -> bool {
    matches!(c,
        '\u{24B6}'..='\u{24E9}'
        | '\u{1F130}'..='\u{1F149}'
        | '\u{1F150}'..='\u{1F169}'
        | '\u{1F170}'..='\u{1F189}'
    )
}

/// Non-ASCII runs of general category Nd, sorted.
const DECIMAL_DIGITS: &[(char, char)] = &[
    ('\u{0660}', '\u{0669}'), ('\u{06F0}', '\u{06F9}'), ('\u{07C0}', '\u{07C9}'), ('\u{0966}', '\u{096F}'),
    ('\u{09E6}', '\u{09EF}'), ('\u{0A66}', '\u{0A6F}'), ('\u{0AE6}', '\u{0AEF}'), ('\u{0B66}', '\u{0B6F}'),
    ('\u{0BE6}', '\u{0BEF}'), ('\u{0C66}', '\u{0C6F}'), ('\u{0CE6}', '\u{0CEF}'), ('\u{0D66}', '\u{0D6F}'),
    ('\u{0DE6}', '\u{0DEF}'), ('\u{0E50}', '\u{0E59}'), ('\u{0ED0}', '\u{0ED9}'), ('\u{0F20}', '\u{0F29}'),
    ('\u{1040}', '\u{1049}'), ('\u{1090}', '\u{1099}'), ('\u{17E0}', '\u{17E9}'), ('\u{1810}', '\u{1819}'),
    ('\u{1946}', '\u{194F}'), ('\u{19D0}', '\u{19D9}'), ('\u{1A80}', '\u{1A89}'), ('\u{1A90}', '\u{1A99}'),
    ('\u{1B50}', '\u{1B59}'), ('\u{1BB0}', '\u{1BB9}'), ('\u{1C40}', '\u{1C49}'), ('\u{1C50}', '\u{1C59}'),
    ('\u{A620}', '\u{A629}'), ('\u{A8D0}', '\u{A8D9}'), ('\u{A900}', '\u{A909}'), ('\u{A9D0}', '\u{A9D9}'),
    ('\u{A9F0}', '\u{A9F9}'), ('\u{AA50}', '\u{AA59}'), ('\u{ABF0}', '\u{ABF9}'), ('\u{FF10}', '\u{FF19}'),
    ('\u{104A0}', '\u{104A9}'), ('\u{10D30}', '\u{10D39}'), ('\u{11066}', '\u{1106F}'),
    ('\u{110F0}', '\u{110F9}'), ('\u{11136}', '\u{1113F}'), ('\u{111D0}', '\u{111D9}'),
    ('\u{112F0}', '\u{112F9}'), ('\u{11450}', '\u{11459}'), ('\u{114D0}', '\u{114D9}'),
    ('\u{11650}', '\u{11659}'), ('\u{116C0}', '\u{116C9}'), ('\u{11730}', '\u{11739}'),
    ('\u{118E0}', '\u{118E9}'), ('\u{11950}', '\u{11959}'), ('\u{11C50}', '\u{11C59}'),
    ('\u{11D50}', '\u{11D59}'), ('\u{11DA0}', '\u{11DA9}'), ('\u{11F50}', '\u{11F59}'),
    ('\u{16A60}', '\u{16A69}'), ('\u{16AC0}', '\u{16AC9}'), ('\u{16B50}', '\u{16B59}'),
    ('\u{1D7CE}', '\u{1D7FF}'), ('\u{1E140}', '\u{1E149}'), ('\u{1E2F0}', '\u{1E2F9}'),
    ('\u{1E4F0}', '\u{1E4F9}'), ('\u{1E950}', '\u{1E959}'), ('\u{1FBF0}', '\u{1FBF9}'),
];

/// Unicode general category Nd.
pub fn is_decimal_digit(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_digit();
    }
    DECIMAL_DIGITS
        .binary_search_by(|&(lo, hi)| {
            if hi < c {
                Ordering::Less
            } else if lo > c {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

/// Scripts that end a "since the last word" look-back: CJK punctuation,
/// kana, ideographs, Hangul and fullwidth forms.
pub fn is_cjk_delimiter(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'
        | '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{FF00}'..='\u{FFEF}'
    )
}

/// Arabic or Hebrew script, used to mark right-to-left hashtag links.
pub fn is_rtl(c: char) -> bool {
    matches!(c,
        '\u{0590}'..='\u{05FF}'
        | '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{FE70}'..='\u{FEFF}'
    )
}

/// `@` or fullwidth `＠`.
pub fn is_at_sign(c: char) -> bool {
    c == '@' || c == '\u{FF20}'
}

/// `#` or fullwidth `＃`.
pub fn is_hash_sign(c: char) -> bool {
    c == '#' || c == '\u{FF03}'
}

/// Last `char` of `text[..pos]`.
pub fn char_before(text: &str, pos: usize) -> Option<char> {
    text[..pos].chars().next_back()
}
