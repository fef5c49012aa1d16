pub mod database;
pub mod hasura;

pub use crate::{
    config::{database::DatabaseConfig, hasura::HasuraConfig},
    defaults,
};
pub use clap::{Args, Parser};
use serde_yaml::Value;
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum IndexerConfigError {
    #[error("Error parsing env variables from config")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("URL parser error: {0:?}")]
    ParseError(#[from] url::ParseError),
    #[error("Unsupported database: {0:?}")]
    UnsupportedDatabase(String),
    #[error("Invalid value for `{0}`: expected {1}")]
    InvalidValue(String, &'static str),
}

/// Result type returned by configuration operations.
pub type IndexerConfigResult<T> = core::result::Result<T, IndexerConfigError>;

/// Set of configuration constants that may be read from the environment.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "POSTGRES_HOST")]
    PostgresHost,
    #[strum(serialize = "POSTGRES_PASSWORD")]
    PostgresPassword,
    #[strum(serialize = "POSTGRES_DATABASE")]
    PostgresDatabase,
    #[strum(serialize = "POSTGRES_PORT")]
    PostgresPort,
    #[strum(serialize = "POSTGRES_USER")]
    PostgresUser,
    #[strum(serialize = "HASURA_SECRET")]
    HasuraSecret,
}

/// Return the value of an environment variable or a default value.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

/// Options shared by every `tzindex` subcommand.
#[derive(Debug, Parser, Clone)]
pub struct IndexerArgs {
    /// Log level passed to the indexer.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn", "trace"]), help = "Log level passed to the indexer.")]
    pub log_level: String,

    /// Indexer config file.
    #[clap(
        short,
        long,
        value_name = "FILE",
        help = "Indexer config file."
    )]
    pub config: Option<PathBuf>,

    /// Package whose models and handlers should be used.
    #[clap(long, help = "Package whose models and handlers should be used.", default_value = defaults::PACKAGE, value_parser(["tzcolors", "hicdex"]))]
    pub package: String,

    /// Postgres username.
    #[clap(long, help = "Postgres username.")]
    pub postgres_user: Option<String>,

    /// Postgres database.
    #[clap(long, help = "Postgres database.")]
    pub postgres_database: Option<String>,

    /// Postgres password.
    #[clap(long, help = "Postgres password.")]
    pub postgres_password: Option<String>,

    /// Postgres host.
    #[clap(long, help = "Postgres host.")]
    pub postgres_host: Option<String>,

    /// Postgres port.
    #[clap(long, help = "Postgres port.")]
    pub postgres_port: Option<String>,

    /// Postgres schema holding the indexer tables.
    #[clap(long, help = "Postgres schema holding the indexer tables.", default_value = defaults::POSTGRES_SCHEMA)]
    pub postgres_schema: String,

    /// URL of the Hasura instance to configure.
    #[clap(long, help = "URL of the Hasura instance to configure.")]
    pub hasura_url: Option<String>,

    /// Hasura admin secret.
    #[clap(long, help = "Hasura admin secret.")]
    pub hasura_admin_secret: Option<String>,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

impl Default for IndexerArgs {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            config: None,
            package: defaults::PACKAGE.to_string(),
            postgres_user: Some(defaults::POSTGRES_USER.to_string()),
            postgres_database: Some(defaults::POSTGRES_DATABASE.to_string()),
            postgres_password: None,
            postgres_host: Some(defaults::POSTGRES_HOST.to_string()),
            postgres_port: Some(defaults::POSTGRES_PORT.to_string()),
            postgres_schema: defaults::POSTGRES_SCHEMA.to_string(),
            hasura_url: None,
            hasura_admin_secret: None,
            verbose: defaults::VERBOSE_LOGGING,
        }
    }
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> IndexerConfigResult<()>;
}

/// Indexer configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexerConfig {
    pub log_level: String,
    pub verbose: bool,
    pub package: String,
    pub database: DatabaseConfig,
    /// `None` when the config has no `hasura` section.
    pub hasura: Option<HasuraConfig>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            package: defaults::PACKAGE.to_string(),
            database: DatabaseConfig::default(),
            hasura: None,
        }
    }
}

impl TryFrom<IndexerArgs> for IndexerConfig {
    type Error = IndexerConfigError;

    fn try_from(args: IndexerArgs) -> IndexerConfigResult<Self> {
        let database = DatabaseConfig::Postgres {
            user: args.postgres_user.unwrap_or_else(|| {
                env_or_default(EnvVar::PostgresUser, defaults::POSTGRES_USER.to_string())
            }),
            password: args.postgres_password.unwrap_or_else(|| {
                env_or_default(
                    EnvVar::PostgresPassword,
                    defaults::POSTGRES_PASSWORD.to_string(),
                )
            }),
            host: args.postgres_host.unwrap_or_else(|| {
                env_or_default(EnvVar::PostgresHost, defaults::POSTGRES_HOST.to_string())
            }),
            port: args.postgres_port.unwrap_or_else(|| {
                env_or_default(EnvVar::PostgresPort, defaults::POSTGRES_PORT.to_string())
            }),
            database: args.postgres_database.unwrap_or_else(|| {
                env_or_default(
                    EnvVar::PostgresDatabase,
                    defaults::POSTGRES_DATABASE.to_string(),
                )
            }),
            schema_name: args.postgres_schema,
        };

        let hasura = args.hasura_url.map(|url| {
            let secret = args
                .hasura_admin_secret
                .or_else(|| std::env::var(EnvVar::HasuraSecret.as_ref()).ok());
            HasuraConfig::new(url, secret)
        });

        let mut config = IndexerConfig {
            log_level: args.log_level,
            verbose: args.verbose,
            package: args.package,
            database,
            hasura,
        };

        config.inject_opt_env_vars()?;

        Ok(config)
    }
}

fn yaml_string(section: &Value, key: &str) -> IndexerConfigResult<Option<String>> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(IndexerConfigError::InvalidValue(key.to_string(), "a string")),
    }
}

fn yaml_bool(section: &Value, key: &str) -> IndexerConfigResult<Option<bool>> {
    match section.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| IndexerConfigError::InvalidValue(key.to_string(), "a boolean")),
    }
}

impl IndexerConfig {
    // When building the config via a file, if any section (e.g., database)
    // or if any individual setting in a section (e.g., database.postgres.host) is empty,
    // replace it with its respective default value.
    pub fn from_file(path: impl AsRef<Path>) -> IndexerConfigResult<Self> {
        let file = File::open(path)?;
        let content: Value = serde_yaml::from_reader(file)?;
        Self::from_yaml(&content)
    }

    /// Build a config from already-parsed YAML content.
    pub fn from_yaml(content: &Value) -> IndexerConfigResult<Self> {
        let mut config = IndexerConfig::default();

        if let Some(log_level) = yaml_string(content, "log_level")? {
            config.log_level = log_level;
        }

        if let Some(verbose) = yaml_bool(content, "verbose")? {
            config.verbose = verbose;
        }

        if let Some(package) = yaml_string(content, "package")? {
            config.package = package;
        }

        if let Some(pg_section) = content
            .get("database")
            .and_then(|section| section.get("postgres"))
        {
            let field = |key: &str, default: &str| -> IndexerConfigResult<String> {
                Ok(yaml_string(pg_section, key)?.unwrap_or_else(|| default.to_string()))
            };

            config.database = DatabaseConfig::Postgres {
                user: field("user", defaults::POSTGRES_USER)?,
                password: field("password", defaults::POSTGRES_PASSWORD)?,
                host: field("host", defaults::POSTGRES_HOST)?,
                port: field("port", defaults::POSTGRES_PORT)?,
                database: field("database", defaults::POSTGRES_DATABASE)?,
                schema_name: field("schema_name", defaults::POSTGRES_SCHEMA)?,
            };
        }

        if let Some(section) = content.get("hasura") {
            let hasura: HasuraConfig = serde_yaml::from_value(section.clone())?;
            config.hasura = Some(hasura);
        }

        config.inject_opt_env_vars()?;

        Ok(config)
    }

    // Inject env vars into each section of the config
    pub fn inject_opt_env_vars(&mut self) -> IndexerConfigResult<()> {
        self.database.inject_opt_env_vars()?;
        if let Some(hasura) = self.hasura.as_mut() {
            hasura.inject_opt_env_vars()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(config_str: &str) -> IndexerConfigResult<IndexerConfig> {
        let content: Value = serde_yaml::from_str(config_str)?;
        IndexerConfig::from_yaml(&content)
    }

    #[test]
    fn test_indexer_config_will_supplement_top_level_config_vars() {
        let config = parse(
            r#"
    package: hicdex
    verbose: true
    "#,
        )
        .unwrap();

        assert_eq!(config.package, "hicdex");
        assert!(config.verbose);
        assert_eq!(config.log_level, defaults::LOG_LEVEL);
        assert_eq!(config.database, DatabaseConfig::default());
        assert!(config.hasura.is_none());
    }

    #[test]
    fn test_indexer_config_will_supplement_individual_config_vars_in_sections() {
        let config = parse(
            r#"
        ## Database configuration options.
        #
        database:
          postgres:
            user: jimmy
            database: my_fancy_db
            password: super_secret_password
            port: 6543

        hasura:
          url: http://hasura:8080/
        "#,
        )
        .unwrap();

        match config.database {
            DatabaseConfig::Postgres {
                user,
                password,
                database,
                host,
                port,
                schema_name,
            } => {
                assert_eq!(user, "jimmy");
                assert_eq!(database, "my_fancy_db");
                assert_eq!(password, "super_secret_password");
                assert_eq!(host, defaults::POSTGRES_HOST);
                assert_eq!(port, "6543");
                assert_eq!(schema_name, "public");
            }
        }

        let hasura = config.hasura.unwrap();
        assert_eq!(hasura.base_url(), "http://hasura:8080");
        assert_eq!(hasura.admin_secret, None);
        assert_eq!(
            hasura.health_check_attempts,
            defaults::HASURA_HEALTH_CHECK_ATTEMPTS
        );
        assert_eq!(
            hasura.health_check_timeout_ms,
            defaults::HASURA_HEALTH_CHECK_TIMEOUT_MS
        );
    }

    #[test]
    fn test_indexer_config_injects_env_vars() {
        std::env::set_var("TZINDEX_TEST_HASURA_SECRET", "s3cr3t");
        std::env::set_var("TZINDEX_TEST_PG_HOST", "db.internal");

        let config = parse(
            r#"
        database:
          postgres:
            host: ${TZINDEX_TEST_PG_HOST}

        hasura:
          url: http://localhost:8080
          admin_secret: $TZINDEX_TEST_HASURA_SECRET
        "#,
        )
        .unwrap();

        let DatabaseConfig::Postgres { host, .. } = config.database;
        assert_eq!(host, "db.internal");
        assert_eq!(
            config.hasura.unwrap().admin_secret.as_deref(),
            Some("s3cr3t")
        );
    }

    #[test]
    fn test_indexer_config_rejects_mistyped_values() {
        let err = parse("verbose: sometimes").unwrap_err();
        assert!(matches!(err, IndexerConfigError::InvalidValue(key, _) if key == "verbose"));
    }

    #[test]
    fn test_indexer_config_from_args() {
        let args = IndexerArgs {
            hasura_url: Some("http://localhost:8080".to_string()),
            hasura_admin_secret: Some("secret".to_string()),
            ..Default::default()
        };

        let config = IndexerConfig::try_from(args).unwrap();
        let hasura = config.hasura.unwrap();
        assert_eq!(hasura.url, "http://localhost:8080");
        assert_eq!(hasura.admin_secret.as_deref(), Some("secret"));
    }
}
