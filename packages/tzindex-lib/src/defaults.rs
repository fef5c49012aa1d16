pub const LOG_LEVEL: &str = "info";
pub const VERBOSE_LOGGING: bool = false;

pub const PACKAGE: &str = "tzcolors";

pub const DATABASE: &str = "postgres";
pub const POSTGRES_DATABASE: &str = "postgres";
pub const POSTGRES_USER: &str = "postgres";
pub const POSTGRES_HOST: &str = "127.0.0.1";
pub const POSTGRES_PORT: &str = "5432";
pub const POSTGRES_PASSWORD: &str = "";
pub const POSTGRES_SCHEMA: &str = "public";

pub const HASURA_URL: &str = "http://127.0.0.1:8080";

/// Number of `/healthz` checks before giving up on a Hasura instance.
pub const HASURA_HEALTH_CHECK_ATTEMPTS: usize = 60;

/// Delay between two `/healthz` checks.
pub const HASURA_HEALTH_CHECK_INTERVAL_MS: u64 = 1000;

/// Milliseconds a single `/healthz` request may take before it counts as failed.
pub const HASURA_HEALTH_CHECK_TIMEOUT_MS: u64 = 5000;

/// Role granted read access to every generated table.
pub const HASURA_SELECT_ROLE: &str = "user";

pub const MAX_DATABASE_CONNECTION_ATTEMPTS: usize = 5;
pub const INITIAL_RETRY_DELAY_SECS: u64 = 2;
