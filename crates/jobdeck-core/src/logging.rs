//! Structured logging field name constants for jobdeck.
//!
//! Call sites write these names as literal `tracing` fields; this module is
//! the catalogue they are checked against.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Failed fetch attempt reported to the error handler |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (board built, pipeline started/stopped) |
//! | DEBUG | Decision points (cache hit, stale, attach to in-flight) |
//! | TRACE | Per-item iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "cache", "client", "state", "store"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "record_cache", "listing", "bookmarks", "file_store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "fetch", "invalidate", "toggle", "refresh"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Cache key being operated on.
pub const CACHE_KEY: &str = "cache_key";

/// Job id being operated on.
pub const JOB_ID: &str = "job_id";

/// Search query text.
pub const QUERY: &str = "query";

/// Persistence key.
pub const STORE_KEY: &str = "store_key";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a fetch or derivation.
pub const RESULT_COUNT: &str = "result_count";

/// HTTP status code of a remote response.
pub const HTTP_STATUS: &str = "http_status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Error kind ("network", "remote", "decode").
pub const ERROR_KIND: &str = "error_kind";
