//! Weighted-length configuration.
//!
//! A [`Configuration`] describes how much each codepoint "costs" and how long
//! a post may be. Three canonical versions exist:
//!
//! | version | max | scale | default weight | ranges | emoji parsing |
//! |---------|-----|-------|----------------|--------|---------------|
//! | v1      | 140 | 1     | 1              | none   | no            |
//! | v2      | 280 | 100   | 200            | 4      | no            |
//! | v3      | 280 | 100   | 200            | 4      | yes           |
//!
//! Configurations can also be loaded from JSON text or a file using the
//! schema below. Loading either returns a fully validated value or a
//! [`ConfigError`]; nothing is defaulted on failure.
//!
//! ```text
//! {
//!   "version": 3,
//!   "maxWeightedTweetLength": 280,
//!   "scale": 100,
//!   "defaultWeight": 200,
//!   "transformedUrlLength": 23,
//!   "emojiParsingEnabled": true,
//!   "ranges": [ { "range": { "start": 0, "end": 4351 }, "weight": 100 } ]
//! }
//! ```
//!
//! ## Design notes
//!
//! - Range ends are inclusive codepoints; the first range containing a
//!   codepoint wins.
//! - `emojiParsingEnabled` and `ranges` may be omitted (v1 documents do).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to build a [`Configuration`] from external input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Inclusive codepoint bounds of a [`WeightRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodepointRange {
    pub start: u32,
    pub end: u32,
}

/// A codepoint range and the weight each codepoint in it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeightRange {
    pub range: CodepointRange,
    pub weight: i32,
}

impl WeightRange {
    pub fn new(start: u32, end: u32, weight: i32) -> Self {
        WeightRange { range: CodepointRange { start, end }, weight }
    }

    pub fn start(&self) -> u32 {
        self.range.start
    }

    pub fn end(&self) -> u32 {
        self.range.end
    }

    /// True when `codepoint` lies within the inclusive bounds.
    pub fn contains(&self, codepoint: u32) -> bool {
        self.range.start <= codepoint && codepoint <= self.range.end
    }
}

/// Limits and per-codepoint weights used by the weighted-length engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    version: i32,
    max_weighted_tweet_length: i32,
    scale: i32,
    default_weight: i32,
    transformed_url_length: i32,
    #[serde(default)]
    emoji_parsing_enabled: bool,
    #[serde(default)]
    ranges: Vec<WeightRange>,
}

static V1: Lazy<Configuration> = Lazy::new(|| Configuration {
    version: 1,
    max_weighted_tweet_length: 140,
    scale: 1,
    default_weight: 1,
    transformed_url_length: 23,
    emoji_parsing_enabled: false,
    ranges: Vec::new(),
});

static V2: Lazy<Configuration> = Lazy::new(|| Configuration {
    version: 2,
    max_weighted_tweet_length: 280,
    scale: 100,
    default_weight: 200,
    transformed_url_length: 23,
    emoji_parsing_enabled: false,
    ranges: standard_ranges(),
});

static V3: Lazy<Configuration> =
    Lazy::new(|| Configuration { version: 3, emoji_parsing_enabled: true, ..V2.clone() });

fn standard_ranges() -> Vec<WeightRange> {
    vec![
        WeightRange::new(0, 4351, 100),
        WeightRange::new(8192, 8205, 100),
        WeightRange::new(8208, 8223, 100),
        WeightRange::new(8242, 8247, 100),
    ]
}

/// The 140-unit configuration where every codepoint weighs one.
pub fn config_v1() -> &'static Configuration {
    &V1
}

/// The 280-unit configuration with discounted Latin/punctuation ranges.
pub fn config_v2() -> &'static Configuration {
    &V2
}

/// v2 plus emoji-sequence counting. This is the default.
pub fn config_v3() -> &'static Configuration {
    &V3
}

impl Default for Configuration {
    fn default() -> Self {
        V3.clone()
    }
}

impl Configuration {
    /// The canonical configuration for `version`, if one exists.
    pub fn for_version(version: i32) -> Option<&'static Configuration> {
        match version {
            1 => Some(config_v1()),
            2 => Some(config_v2()),
            3 => Some(config_v3()),
            _ => None,
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Configuration, ConfigError> {
        let config: Configuration = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Configuration, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading configuration");
        let json = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Configuration::from_json(&json)
    }

    /// Serialize back to the JSON schema accepted by [`Configuration::from_json`].
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_positive("scale", self.scale)?;
        check_positive("maxWeightedTweetLength", self.max_weighted_tweet_length)?;
        check_non_negative("defaultWeight", self.default_weight)?;
        check_non_negative("transformedUrlLength", self.transformed_url_length)?;
        check_ranges(&self.ranges)
    }

    /// Weight of a single codepoint: the first range containing it, else the
    /// default weight.
    pub fn weight(&self, codepoint: u32) -> i32 {
        self.ranges.iter().find(|r| r.contains(codepoint)).map(|r| r.weight).unwrap_or(self.default_weight)
    }

    pub(crate) fn char_weight(&self, c: char) -> i32 {
        self.weight(c as u32)
    }

    /// `maxWeightedTweetLength * scale`: the budget in unscaled units.
    pub(crate) fn scaled_max(&self) -> i64 {
        i64::from(self.max_weighted_tweet_length) * i64::from(self.scale)
    }

    // --- Accessors ----------------------------------------------------------

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    // Setters for numeric fields and ranges apply the same checks as
    // `from_json` and leave the value unchanged on error.

    pub fn max_weighted_tweet_length(&self) -> i32 {
        self.max_weighted_tweet_length
    }

    pub fn set_max_weighted_tweet_length(&mut self, max: i32) -> Result<(), ConfigError> {
        check_positive("maxWeightedTweetLength", max)?;
        self.max_weighted_tweet_length = max;
        Ok(())
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: i32) -> Result<(), ConfigError> {
        check_positive("scale", scale)?;
        self.scale = scale;
        Ok(())
    }

    pub fn default_weight(&self) -> i32 {
        self.default_weight
    }

    pub fn set_default_weight(&mut self, weight: i32) -> Result<(), ConfigError> {
        check_non_negative("defaultWeight", weight)?;
        self.default_weight = weight;
        Ok(())
    }

    pub fn transformed_url_length(&self) -> i32 {
        self.transformed_url_length
    }

    pub fn set_transformed_url_length(&mut self, length: i32) -> Result<(), ConfigError> {
        check_non_negative("transformedUrlLength", length)?;
        self.transformed_url_length = length;
        Ok(())
    }

    pub fn emoji_parsing_enabled(&self) -> bool {
        self.emoji_parsing_enabled
    }

    pub fn set_emoji_parsing_enabled(&mut self, enabled: bool) {
        self.emoji_parsing_enabled = enabled;
    }

    /// Weight ranges in lookup order.
    pub fn ranges(&self) -> &[WeightRange] {
        &self.ranges
    }

    pub fn set_ranges(&mut self, ranges: Vec<WeightRange>) -> Result<(), ConfigError> {
        check_ranges(&ranges)?;
        self.ranges = ranges;
        Ok(())
    }
}

fn check_positive(field: &'static str, value: i32) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::Invalid { field, reason: format!("must be positive, got {value}") });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: i32) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(ConfigError::Invalid { field, reason: format!("must not be negative, got {value}") });
    }
    Ok(())
}

fn check_ranges(ranges: &[WeightRange]) -> Result<(), ConfigError> {
    for (idx, range) in ranges.iter().enumerate() {
        if range.start() > range.end() {
            let reason = format!("range #{idx} starts after it ends ({} > {})", range.start(), range.end());
            return Err(ConfigError::Invalid { field: "ranges", reason });
        }
        if range.weight < 0 {
            let reason = format!("range #{idx} has negative weight {}", range.weight);
            return Err(ConfigError::Invalid { field: "ranges", reason });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CUSTOM: &str = r#"{
        "version": 42,
        "maxWeightedTweetLength": 400,
        "scale": 43,
        "defaultWeight": 213,
        "transformedUrlLength": 32,
        "ranges": [ { "range": { "start": 0, "end": 4351 }, "weight": 200 } ]
    }"#;

    #[test]
    fn canonical_versions() {
        let cases: Vec<(i32, i32, i32, i32, bool, usize)> = vec![
            // (version, max, scale, default_weight, emoji, ranges)
            (1, 140, 1, 1, false, 0),
            (2, 280, 100, 200, false, 4),
            (3, 280, 100, 200, true, 4),
        ];

        for (version, max, scale, weight, emoji, ranges) in cases {
            let config = Configuration::for_version(version).unwrap();
            assert_eq!(config.version(), version);
            assert_eq!(config.max_weighted_tweet_length(), max, "v{version}");
            assert_eq!(config.scale(), scale, "v{version}");
            assert_eq!(config.default_weight(), weight, "v{version}");
            assert_eq!(config.transformed_url_length(), 23, "v{version}");
            assert_eq!(config.emoji_parsing_enabled(), emoji, "v{version}");
            assert_eq!(config.ranges().len(), ranges, "v{version}");
        }

        assert!(Configuration::for_version(4).is_none());
        assert_eq!(Configuration::default(), *config_v3());
    }

    #[test]
    fn weight_uses_first_matching_range() {
        let config = config_v3();
        assert_eq!(config.weight('a' as u32), 100);
        assert_eq!(config.weight(0x2000), 100);
        assert_eq!(config.weight(0x200E), 200);
        assert_eq!(config.weight(0x1F431), 200);

        let mut overlapping = config_v1().clone();
        overlapping.set_ranges(vec![WeightRange::new(0, 10, 5), WeightRange::new(5, 20, 9)]).unwrap();
        assert_eq!(overlapping.weight(7), 5);
        assert_eq!(overlapping.weight(15), 9);
        assert_eq!(overlapping.weight(21), 1);
    }

    #[test]
    fn from_json_reads_all_fields() {
        let config = Configuration::from_json(CUSTOM).unwrap();
        assert_eq!(config.version(), 42);
        assert_eq!(config.max_weighted_tweet_length(), 400);
        assert_eq!(config.scale(), 43);
        assert_eq!(config.default_weight(), 213);
        assert_eq!(config.transformed_url_length(), 32);
        assert!(!config.emoji_parsing_enabled());
        assert_eq!(config.ranges(), &[WeightRange::new(0, 4351, 200)]);
    }

    #[test]
    fn json_round_trip_preserves_canonical_config() {
        let json = config_v2().to_json().unwrap();
        assert!(json.contains("\"maxWeightedTweetLength\": 280"));
        assert_eq!(Configuration::from_json(&json).unwrap(), *config_v2());
    }

    #[test]
    fn from_json_rejects_bad_input() {
        let cases: Vec<(&str, &str)> = vec![
            ("json", "{ not json"),
            ("json", r#"{"version": 1, "scale": 1, "defaultWeight": 1, "transformedUrlLength": 23}"#),
            (
                "scale",
                r#"{"version": 1, "maxWeightedTweetLength": 140, "scale": -1, "defaultWeight": 1, "transformedUrlLength": 23}"#,
            ),
            (
                "maxWeightedTweetLength",
                r#"{"version": 1, "maxWeightedTweetLength": 0, "scale": 1, "defaultWeight": 1, "transformedUrlLength": 23}"#,
            ),
            (
                "ranges",
                r#"{"version": 1, "maxWeightedTweetLength": 140, "scale": 1, "defaultWeight": 1, "transformedUrlLength": 23,
                    "ranges": [{"range": {"start": 10, "end": 2}, "weight": 1}]}"#,
            ),
        ];

        for (expected, json) in cases {
            match (expected, Configuration::from_json(json)) {
                ("json", Err(ConfigError::Json(_))) => {}
                (field, Err(ConfigError::Invalid { field: got, .. })) => assert_eq!(field, got),
                (_, other) => panic!("expected {expected} error for {json}, got {other:?}"),
            }
        }
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CUSTOM.as_bytes()).unwrap();

        let config = Configuration::from_path(file.path()).unwrap();
        assert_eq!(config.version(), 42);

        let missing = file.path().with_extension("missing");
        assert!(matches!(Configuration::from_path(&missing), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn setters_update_fields() {
        let mut config = Configuration::default();
        config.set_version(9);
        config.set_max_weighted_tweet_length(10).unwrap();
        config.set_scale(2).unwrap();
        config.set_default_weight(3).unwrap();
        config.set_transformed_url_length(4).unwrap();
        config.set_emoji_parsing_enabled(false);

        assert_eq!(
            (config.version(), config.max_weighted_tweet_length(), config.scale(), config.default_weight()),
            (9, 10, 2, 3)
        );
        assert_eq!(config.transformed_url_length(), 4);
        assert!(!config.emoji_parsing_enabled());
        assert_eq!(config.scaled_max(), 20);
    }

    #[test]
    fn setters_reject_invalid_values() {
        let mut config = config_v3().clone();
        let cases: Vec<(&str, Result<(), ConfigError>)> = vec![
            ("scale", config.set_scale(0)),
            ("maxWeightedTweetLength", config.set_max_weighted_tweet_length(0)),
            ("defaultWeight", config.set_default_weight(-1)),
            ("transformedUrlLength", config.set_transformed_url_length(-5)),
            ("ranges", config.set_ranges(vec![WeightRange::new(9, 1, 100)])),
        ];

        for (expected, result) in cases {
            match result {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} error, got {other:?}"),
            }
        }
        assert_eq!(config, *config_v3());
    }
}
