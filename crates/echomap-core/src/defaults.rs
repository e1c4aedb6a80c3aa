//! Centralized default constants for the echomap recommendation engine.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own literals;
//! `EngineConfig` in `echomap-recommend` starts from them and may override
//! them from the environment.

// =============================================================================
// RESULT SIZING
// =============================================================================

/// Number of records a strategy returns when the caller gives no limit.
pub const RESULT_LIMIT: i64 = 20;

/// Default page size for the latest-records feed.
pub const LATEST_LIMIT: i64 = 10;

/// Default page size for map listing.
pub const MAP_PAGE_LIMIT: i64 = 100;

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Embedding vector dimension D stored in `audio_records.embedding`.
pub const EMBED_DIMENSION: usize = 768;

/// Timeout for the per-request query embedding call in seconds.
///
/// The query embedding is the only suspending call on the read path, so it
/// is kept short; on expiry ranking proceeds without vector similarity.
pub const EMBED_TIMEOUT_SECS: u64 = 5;

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

// =============================================================================
// RESONANCE
// =============================================================================

/// Fixed offset of the local civil time used for `referenceHourLocal` (UTC+8).
pub const LOCAL_UTC_OFFSET_HOURS: i32 = 8;

/// Half-width of the resonance hour window: center ± 2 hours, 5 hours total.
pub const RESONANCE_HALF_WIDTH_HOURS: u32 = 2;

// =============================================================================
// ROAMING
// =============================================================================

/// Distance from the eligible centroid above which a user is "homesick".
///
/// Exactly this distance still counts as "explorer".
pub const ROAMING_THRESHOLD_METERS: f64 = 100_000.0;

/// Mean Earth radius (IUGG) used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

// =============================================================================
// KEYWORD SETS
// =============================================================================

/// Culturally evocative scene terms ranked by the Cultural strategy.
pub const CULTURAL_KEYWORDS: &[&str] = &[
    "方言",
    "叫卖",
    "钟声",
    "戏曲",
    "市场",
    "夜市",
    "报站",
    "寺庙",
    "老街",
    "茶馆",
];

/// Domestic, everyday-life terms ranked for users far from the place.
pub const HOMESICK_KEYWORDS: &[&str] = &[
    "日常",
    "方言",
    "雨声",
    "做饭",
    "宠物",
    "弄堂",
    "童年",
    "家乡",
];

/// Landmark terms ranked for users at or near the place.
pub const EXPLORER_KEYWORDS: &[&str] = &[
    "景点",
    "地标",
    "广场",
    "活动",
    "打卡",
    "市中心",
    "夜景",
    "游乐园",
    "博物馆",
];
