//! Bit masks used to gate scanning and filter scanner output.

use crate::NodeKind;
use bitflags::bitflags;

bitflags! {
    /// Coarse input characteristics computed by [`super::TriggerInfo::scan`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BucketMask: u32 {
        const HAS_AT        = 1 << 0;
        const HAS_HASH      = 1 << 1;
        const HAS_DOLLAR    = 1 << 2;
        const HAS_DOT       = 1 << 3;
        const HAS_NON_ASCII = 1 << 4;
        /// `[`, which opens an IPv6 host literal.
        const HAS_BRACKET   = 1 << 5;
    }
}

bitflags! {
    /// Node kinds a caller wants back from [`super::run`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntityMask: u32 {
        /// URLs with protocol, including `t.co` short links.
        const URL                  = 1 << 0;
        const URL_WITHOUT_PROTOCOL = 1 << 1;
        const HASHTAG              = 1 << 2;
        const CASHTAG              = 1 << 3;
        const USERNAME             = 1 << 4;
        const LIST                 = 1 << 5;
        /// Also switches the scanner into federated mode.
        const FEDERATED            = 1 << 6;
        /// Emoji sequences; only the weighted-length tracker asks for these.
        const EMOJI                = 1 << 7;

        const ALL_URLS = Self::URL.bits() | Self::URL_WITHOUT_PROTOCOL.bits();
        const MENTIONS = Self::USERNAME.bits() | Self::LIST.bits();
    }
}

impl EntityMask {
    /// The mask bit that selects nodes of `kind`.
    pub fn for_kind(kind: NodeKind) -> EntityMask {
        match kind {
            NodeKind::Url | NodeKind::ShortUrl => EntityMask::URL,
            NodeKind::UrlWithoutProtocol => EntityMask::URL_WITHOUT_PROTOCOL,
            NodeKind::Hashtag => EntityMask::HASHTAG,
            NodeKind::Cashtag => EntityMask::CASHTAG,
            NodeKind::Username => EntityMask::USERNAME,
            NodeKind::List => EntityMask::LIST,
            NodeKind::Federated => EntityMask::FEDERATED,
            NodeKind::Emoji => EntityMask::EMOJI,
        }
    }

    pub fn selects(self, kind: NodeKind) -> bool {
        self.intersects(EntityMask::for_kind(kind))
    }

    /// Input buckets at least one of which must be present for any selected
    /// kind to match.
    pub fn required_buckets(self) -> BucketMask {
        let mut buckets = BucketMask::empty();
        if self.intersects(EntityMask::MENTIONS | EntityMask::FEDERATED) {
            buckets |= BucketMask::HAS_AT;
        }
        if self.contains(EntityMask::HASHTAG) {
            buckets |= BucketMask::HAS_HASH;
        }
        if self.contains(EntityMask::CASHTAG) {
            buckets |= BucketMask::HAS_DOLLAR;
        }
        if self.intersects(EntityMask::ALL_URLS) {
            buckets |= BucketMask::HAS_DOT;
        }
        if self.contains(EntityMask::URL) {
            buckets |= BucketMask::HAS_BRACKET;
        }
        if self.contains(EntityMask::EMOJI) {
            buckets |= BucketMask::HAS_NON_ASCII;
        }
        buckets
    }
}
