//! Trigger scanning (input pre-classification).
//!
//! A single byte pass records which entity markers occur anywhere in the
//! input. A call whose requested kinds have none of their markers present
//! returns without running the scanner.
//!
//! ## Design notes
//!
//! - The scan is a heuristic: a bucket being set only means the scanner
//!   *might* find something. False positives are fine, false negatives are
//!   not, so every bucket is a superset test.
//! - Fullwidth `＠`/`＃` are non-ASCII, so they are caught by checking their
//!   UTF-8 lead bytes rather than decoding the text.
//! - Domain hosts always contain a dot once TLD validation has run, so
//!   `HAS_DOT` gates both URL forms. IPv6 literals have no dot and are gated
//!   on `HAS_BRACKET` instead.

use super::masks::{BucketMask, EntityMask};

/// Input characteristics detected from the raw text.
#[derive(Debug, Clone, Copy)]
pub struct TriggerInfo {
    pub buckets: BucketMask,
}

impl TriggerInfo {
    /// Scan `input` for coarse buckets.
    pub fn scan(input: &str) -> Self {
        let mut buckets = BucketMask::empty();
        for (i, &b) in input.as_bytes().iter().enumerate() {
            match b {
                b'@' => buckets |= BucketMask::HAS_AT,
                b'#' => buckets |= BucketMask::HAS_HASH,
                b'$' => buckets |= BucketMask::HAS_DOLLAR,
                b'.' => buckets |= BucketMask::HAS_DOT,
                b'[' => buckets |= BucketMask::HAS_BRACKET,
                b if b >= 0x80 => {
                    buckets |= BucketMask::HAS_NON_ASCII;
                    // ＠ is EF BC A0 and ＃ is EF BC 83.
                    if input.as_bytes()[i..].starts_with(&[0xEF, 0xBC, 0xA0]) {
                        buckets |= BucketMask::HAS_AT;
                    } else if input.as_bytes()[i..].starts_with(&[0xEF, 0xBC, 0x83]) {
                        buckets |= BucketMask::HAS_HASH;
                    }
                }
                _ => {}
            }
        }
        tracing::trace!(?buckets, len = input.len(), "trigger scan");
        TriggerInfo { buckets }
    }

    /// Whether any kind in `mask` could possibly match.
    pub fn may_match(&self, mask: EntityMask) -> bool {
        self.buckets.intersects(mask.required_buckets())
    }

    /// Bare domains need a dot somewhere in the text.
    pub fn may_have_bare_urls(&self) -> bool {
        self.buckets.contains(BucketMask::HAS_DOT)
    }
}
