//! Engine configuration.
//!
//! Every tunable starts at its `echomap_core::defaults` constant and can be
//! overridden from the environment:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ECHOMAP_EMBED_TIMEOUT_SECS` | 5 |
//! | `ECHOMAP_EMBED_DIM` | 768 |
//! | `ECHOMAP_UTC_OFFSET_HOURS` | 8 |
//! | `ECHOMAP_RESONANCE_HALF_WIDTH_HOURS` | 2 |
//! | `ECHOMAP_ROAMING_THRESHOLD_M` | 100000 |
//! | `ECHOMAP_CULTURAL_KEYWORDS` | built-in list |
//! | `ECHOMAP_HOMESICK_KEYWORDS` | built-in list |
//! | `ECHOMAP_EXPLORER_KEYWORDS` | built-in list |
//!
//! Keyword lists are comma-separated. Malformed numbers keep the default and
//! log a warning, as do UTC offsets outside -12..=14 and half-widths above 12.

use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use echomap_core::defaults;
use echomap_core::temporal::FULL_DAY_HALF_WIDTH;
use echomap_core::{KeywordSet, KeywordSets};

pub const ENV_EMBED_TIMEOUT_SECS: &str = "ECHOMAP_EMBED_TIMEOUT_SECS";
pub const ENV_EMBED_DIM: &str = "ECHOMAP_EMBED_DIM";
pub const ENV_UTC_OFFSET_HOURS: &str = "ECHOMAP_UTC_OFFSET_HOURS";
pub const ENV_RESONANCE_HALF_WIDTH_HOURS: &str = "ECHOMAP_RESONANCE_HALF_WIDTH_HOURS";
pub const ENV_ROAMING_THRESHOLD_M: &str = "ECHOMAP_ROAMING_THRESHOLD_M";
pub const ENV_CULTURAL_KEYWORDS: &str = "ECHOMAP_CULTURAL_KEYWORDS";
pub const ENV_HOMESICK_KEYWORDS: &str = "ECHOMAP_HOMESICK_KEYWORDS";
pub const ENV_EXPLORER_KEYWORDS: &str = "ECHOMAP_EXPLORER_KEYWORDS";

/// Civil time zones in use span UTC-12 to UTC+14.
const UTC_OFFSET_RANGE: RangeInclusive<i32> = -12..=14;

/// Tunables for [`crate::RecommendationEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Cultural, homesick and explorer keyword sets.
    pub keywords: KeywordSets,
    /// Distance above which a Roaming user is homesick.
    pub roaming_threshold_m: f64,
    /// Resonance window is `center ± half_width` hours.
    pub resonance_half_width_hours: u32,
    /// Fixed UTC offset of the caller's local hour.
    pub utc_offset_hours: i32,
    /// Expected length of query embeddings.
    pub embed_dimension: usize,
    /// Upper bound on the query embedding call.
    pub embed_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordSets::default(),
            roaming_threshold_m: defaults::ROAMING_THRESHOLD_METERS,
            resonance_half_width_hours: defaults::RESONANCE_HALF_WIDTH_HOURS,
            utc_offset_hours: defaults::LOCAL_UTC_OFFSET_HOURS,
            embed_dimension: defaults::EMBED_DIMENSION,
            embed_timeout: Duration::from_secs(defaults::EMBED_TIMEOUT_SECS),
        }
    }
}

impl EngineConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let keyword_list = |key: &str, fallback: KeywordSet| match lookup(key) {
            Some(raw) if !raw.trim().is_empty() => KeywordSet::parse_list(&raw),
            _ => fallback,
        };

        Self {
            keywords: KeywordSets {
                cultural: keyword_list(ENV_CULTURAL_KEYWORDS, base.keywords.cultural.clone()),
                homesick: keyword_list(ENV_HOMESICK_KEYWORDS, base.keywords.homesick.clone()),
                explorer: keyword_list(ENV_EXPLORER_KEYWORDS, base.keywords.explorer.clone()),
            },
            roaming_threshold_m: parse_or(&lookup, ENV_ROAMING_THRESHOLD_M, base.roaming_threshold_m)
                .max(0.0),
            resonance_half_width_hours: parse_in_range(
                &lookup,
                ENV_RESONANCE_HALF_WIDTH_HOURS,
                base.resonance_half_width_hours,
                0..=FULL_DAY_HALF_WIDTH,
            ),
            utc_offset_hours: parse_in_range(
                &lookup,
                ENV_UTC_OFFSET_HOURS,
                base.utc_offset_hours,
                UTC_OFFSET_RANGE,
            ),
            embed_dimension: parse_or(&lookup, ENV_EMBED_DIM, base.embed_dimension),
            embed_timeout: Duration::from_secs(parse_or(
                &lookup,
                ENV_EMBED_TIMEOUT_SECS,
                base.embed_timeout.as_secs(),
            )),
        }
    }

    pub fn with_keywords(mut self, keywords: KeywordSets) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_embed_dimension(mut self, dimension: usize) -> Self {
        self.embed_dimension = dimension;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn with_roaming_threshold_m(mut self, meters: f64) -> Self {
        self.roaming_threshold_m = meters;
        self
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(
                    subsystem = "recommend",
                    component = "config",
                    key,
                    value = %raw,
                    default = %default,
                    "Ignoring malformed setting"
                );
                default
            }
        },
    }
}

fn parse_in_range<F, T>(lookup: &F, key: &str, default: T, range: RangeInclusive<T>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + PartialOrd + std::fmt::Display,
{
    let value = parse_or(lookup, key, default);
    if range.contains(&value) {
        return value;
    }
    warn!(
        subsystem = "recommend",
        component = "config",
        key,
        value = %value,
        min = %range.start(),
        max = %range.end(),
        default = %default,
        "Ignoring out-of-range setting"
    );
    default
}
