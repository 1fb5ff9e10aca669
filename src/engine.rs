//! Entity engine.
//!
//! This module is the single entry point every public component goes through:
//! the extractor, the validating extractor, the weighted-length parser and the
//! autolinker all call [`run`] with a mask of the node kinds they care about.
//!
//! ## How the parts work together
//!
//! ```text
//! input ── TriggerInfo::scan ──┬─ no marker for any requested kind ──▶ []
//!          (trigger.rs)        │
//!                              v
//!                     Scanner::scan (scanner.rs)
//!                       - one left-to-right pass
//!                       - grammars from crate::rules
//!                       - every kind, non-overlapping
//!                              │
//!                              v
//!                     resolve_nodes (resolve.rs)
//!                       - keep requested kinds
//!                       - TLD / IDNA validation, trimming
//!                              │
//!                 ┌────────────┴────────────┐
//!                 v                         v
//!        to_entities (resolve.rs)   TextMetrics::measure (metrics.rs)
//!         Vec<Entity>, codepoints    ParseResult
//! ```
//!
//! ## Responsibilities by module
//!
//! - `masks.rs`: `EntityMask` (what a caller wants) and `BucketMask` (what
//!   the input contains).
//! - `trigger.rs`: the byte pre-scan that fills `BucketMask`.
//! - `scanner.rs`: candidate discovery. Knows about context (predecessors,
//!   e-mail addresses, failed URLs); delegates grammar to `crate::rules`.
//! - `resolve.rs`: URL validation against the TLD table and conversion to
//!   public entities.
//! - `metrics.rs`: weighted length, validity and the display/valid ranges.
//!
//! ## Design notes
//!
//! - Nodes carry byte offsets. Codepoint offsets are computed once, when
//!   entities are built, with a monotone cursor.
//! - The scanner always scans every kind and `run` filters afterwards, so the
//!   spans an entity claims do not depend on the requested mask.

#[path = "engine/masks.rs"]
mod masks;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/scanner.rs"]
mod scanner;
#[path = "engine/trigger.rs"]
mod trigger;

pub use masks::{BucketMask, EntityMask};
pub use metrics::TextMetrics;
pub use resolve::{CharCursor, check_url, to_entities};
pub use trigger::TriggerInfo;

use crate::Node;
use scanner::Scanner;

/// Scan `text` and return the validated nodes whose kind `mask` selects, in
/// text order.
pub fn run(text: &str, mask: EntityMask) -> Vec<Node> {
    let info = TriggerInfo::scan(text);
    if !info.may_match(mask) {
        tracing::trace!(?mask, "no trigger for requested kinds");
        return Vec::new();
    }

    let federated = mask.contains(EntityMask::FEDERATED);
    let nodes = Scanner::new(text, federated, info.may_have_bare_urls()).scan();
    resolve::resolve_nodes(text, nodes, |kind| mask.selects(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;

    fn kinds(text: &str, mask: EntityMask) -> Vec<NodeKind> {
        run(text, mask).into_iter().map(|n| n.kind).collect()
    }

    #[test]
    fn mask_filters_without_changing_claims() {
        let text = "#tag http://example.com/#frag @user";

        assert_eq!(kinds(text, EntityMask::HASHTAG), vec![NodeKind::Hashtag]);
        assert_eq!(kinds(text, EntityMask::URL), vec![NodeKind::Url]);
        assert_eq!(
            kinds(text, EntityMask::all()),
            vec![NodeKind::Hashtag, NodeKind::Url, NodeKind::Username]
        );
    }

    #[test]
    fn invalid_tlds_are_dropped() {
        assert!(run("see http://example.nottld", EntityMask::ALL_URLS).is_empty());
        assert!(run("see example.nottld", EntityMask::ALL_URLS).is_empty());
    }

    #[test]
    fn ip_literal_hosts_pass_the_trigger_gate() {
        let cases: Vec<(usize, &str)> = vec![
            (1, "go http://[::1]/x now"),
            (1, "go http://[2001:db8::1]:8080/ now"),
            (1, "go http://127.0.0.1/x now"),
            (0, "go [::1] now"),
        ];

        for (expected, input) in cases {
            assert_eq!(run(input, EntityMask::ALL_URLS).len(), expected, "{input:?}");
        }
    }

    #[test]
    fn bare_domains_need_their_own_bit() {
        let text = "www.twitter.com, www.yahoo.co.jp, t.co/blahblah";
        assert!(run(text, EntityMask::URL).is_empty());
        assert_eq!(run(text, EntityMask::ALL_URLS).len(), 3);
    }

    #[test]
    fn emoji_only_when_asked() {
        let text = "hi \u{1F600}";
        assert!(run(text, EntityMask::all() - EntityMask::EMOJI).is_empty());
        assert_eq!(kinds(text, EntityMask::EMOJI), vec![NodeKind::Emoji]);
    }
}
