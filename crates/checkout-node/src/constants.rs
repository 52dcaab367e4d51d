pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
/// Bytes of the SHA-256 digest kept for a catalog identifier (32 hex chars).
pub const CATALOG_ID_BYTES: usize = 16;
