use crate::{load_config, package};
use tzindex_database::PostgresStore;
use tzindex_lib::{config::IndexerArgs, utils::init_logging};

pub async fn init(args: IndexerArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    init_logging(&config)?;

    let registry = package(&config)?.registry();
    let mut store = PostgresStore::new(
        &config.database.to_string(),
        config.database.schema_name(),
    )
    .await?;
    store.create_tables(&registry).await?;

    Ok(())
}
