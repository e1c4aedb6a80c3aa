//! Structured logging field name constants for echomap.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Record store failure surfaced to the caller |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, completed strategy runs |
//! | DEBUG | Decision points (roaming mode, hour window, SQL shape) |
//! | TRACE | Per-record detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "recommend", "db", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "engine", "records", "pool", "ollama"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "resonance", "find", "centroid", "embed_texts"
pub const OPERATION: &str = "op";

/// Strategy name ("resonance", "cultural", "roaming").
pub const STRATEGY: &str = "strategy";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Audio record UUID.
pub const RECORD_ID: &str = "record_id";

/// Context text supplied by the caller.
pub const CONTEXT: &str = "context";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned.
pub const RESULT_COUNT: &str = "result_count";

/// Number of context tokens in the hard filter.
pub const TOKEN_COUNT: &str = "token_count";

/// Number of input texts sent to an embedding model.
pub const INPUT_COUNT: &str = "input_count";

// ─── Ranking fields ────────────────────────────────────────────────────────

/// Roaming mode chosen ("homesick", "explorer").
pub const MODE: &str = "mode";

/// Distance from user position to centroid in meters.
pub const DISTANCE_M: &str = "distance_m";

/// Whether the query embedding was available for ranking.
pub const HAS_VECTOR: &str = "has_vector";

/// Whether the resonance hour window was dropped.
pub const FALLBACK: &str = "fallback";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: &[&str] = &[
        SUBSYSTEM,
        COMPONENT,
        OPERATION,
        STRATEGY,
        RECORD_ID,
        CONTEXT,
        DURATION_MS,
        RESULT_COUNT,
        TOKEN_COUNT,
        INPUT_COUNT,
        MODE,
        DISTANCE_M,
        HAS_VECTOR,
        FALLBACK,
        POOL_SIZE,
        POOL_IDLE,
        MODEL,
        ERROR_MSG,
        SLOW,
    ];

    #[test]
    fn test_field_names_are_unique() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn test_field_names_are_snake_case() {
        for name in ALL {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "{} is not snake_case",
                name
            );
        }
    }
}
