pub mod fixtures;

pub mod defaults {
    pub const ADMIN_SECRET: &str = "my-secret";
    pub const SCHEMA: &str = "public";
    /// Health check interval used against the fake gateway.
    pub const HEALTH_CHECK_INTERVAL_MS: u64 = 1;
    pub const HEALTH_CHECK_TIMEOUT_MS: u64 = 1000;
}
