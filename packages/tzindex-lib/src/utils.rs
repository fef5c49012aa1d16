use crate::{config::IndexerConfig, defaults};
use std::{env, future::Future, str::FromStr};
use tokio::time::{sleep, Duration};
use tracing::warn;
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

/// Convert a `PascalCase` model name into the `snake_case` name of its table.
///
/// Dots (as found in qualified names) are turned into underscores as well.
pub fn pascal_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.replace('.', "_").chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('_').to_string()
}

/// Trim the leading '$' or '${' and trailing '}' from an environment variable.
pub fn trim_opt_env_key(key: &str) -> &str {
    // Abmiguous key: $FOO, non-ambiguous key: ${FOO}
    let not_ambiguous = key.starts_with("${");
    match not_ambiguous {
        false => &key[1..],
        true => &key[2..key.len() - 1],
    }
}

/// Determine whether a given key is an environment variable.
pub fn is_opt_env_var(k: &str) -> bool {
    k.starts_with('$') || (k.starts_with("${") && k.ends_with('}'))
}

/// Attempt to connect to a database, with retries.
///
/// This function takes a closure with a database connection
/// function as an argument; said function should return a future that
/// resolves to a final value of type `Result<T, U>`. The last error is
/// returned once the retry budget is spent.
pub async fn attempt_database_connection<F, Fut, T, U>(mut fut: F) -> Result<T, U>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, U>>,
    U: std::error::Error,
{
    let mut remaining_retries = defaults::MAX_DATABASE_CONNECTION_ATTEMPTS;
    let mut delay = defaults::INITIAL_RETRY_DELAY_SECS;
    loop {
        match fut().await {
            Ok(t) => break Ok(t),
            Err(e) => {
                if remaining_retries > 0 {
                    warn!(
                        "Could not connect to database: {e}. Retrying in {delay} seconds...",
                    );
                    remaining_retries -= 1;
                    sleep(Duration::from_secs(delay)).await;
                    delay *= 2;
                } else {
                    break Err(e);
                }
            }
        }
    }
}

/// Initialize the logging context for the indexer.
pub fn init_logging(config: &IndexerConfig) -> anyhow::Result<()> {
    let level = env::var(RUST_LOG).unwrap_or_else(|_| config.log_level.clone());

    // We manually suppress some of the more verbose crate logging.
    let directives = if config.verbose {
        level
    } else {
        format!("{level},sqlx=warn,hyper=warn,reqwest=warn")
    };

    let filter = EnvFilter::try_new(directives)?;

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(s) => bool::from_str(&s).map_err(|_| {
            anyhow::anyhow!("Expected `true` or `false` to be provided for `HUMAN_LOGGING`")
        })?,
        Err(_) => true,
    };

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    let result = if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .try_init()
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
