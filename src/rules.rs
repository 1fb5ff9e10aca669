//! Entity grammars.
//!
//! Each submodule recognizes one entity family at a given byte position and
//! reports where the match ends. Matchers are pure functions of the text;
//! context (what precedes a marker, what was already consumed) is the
//! scanner's job, and TLD legality is decided by the engine's resolve step.
//!
//! - `chars.rs`: shared character classes (whitespace, punctuation, Latin
//!   accents, letters/marks).
//! - `mention.rs`: usernames, lists, federated handles, reply detection.
//! - `hashtag.rs` / `cashtag.rs`: `#tag` and `$TAG`.
//! - `url.rs`: URLs with protocol, `t.co` short links and bare domains.
//! - `emoji.rs`: emoji sequences counted as a single weighted unit.
//! - `tlds.rs`: the top-level domain table.

#[path = "rules/cashtag.rs"]
pub mod cashtag;
#[path = "rules/chars.rs"]
pub mod chars;
#[path = "rules/emoji.rs"]
pub mod emoji;
#[path = "rules/hashtag.rs"]
pub mod hashtag;
#[path = "rules/mention.rs"]
pub mod mention;
#[path = "rules/tlds.rs"]
pub mod tlds;
#[path = "rules/url.rs"]
pub mod url;

#[cfg(test)]
#[path = "rules/tests.rs"]
mod tests;
