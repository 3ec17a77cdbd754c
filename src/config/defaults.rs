/// Configuration default values
///
/// All defaults live here so they can be changed in one place.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/kegiatan-tahap.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Progress engine defaults
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SUBTASKS_PER_STAGE: u8 = 6;
pub const MAX_SUBTASKS_PER_STAGE: u8 = 32;

// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "KEGIATAN_TAHAP__";
