//! Well-known names and defaults.

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTE NAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Attribute conventionally holding the login name of a person.
///
/// Directories index on it unless told otherwise.
pub const USERNAME_ATTRIBUTE: &str = "username";

// ═══════════════════════════════════════════════════════════════════════════════
// STORE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default capacity of a bounded cache store.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default lifetime of a cached record, in seconds.
pub const DEFAULT_TTL_SECONDS: u64 = 3600; // 1 hour
