use crate::{cli::GenerateCommand, load_config, package};
use tracing::info;
use tzindex_database::IndexerConnectionPool;
use tzindex_hasura::{configure_hasura, generate as generate_metadata};
use tzindex_lib::{config::IndexerArgs, utils::init_logging};

pub async fn generate(command: GenerateCommand) -> anyhow::Result<()> {
    let GenerateCommand { views, args } = command;
    let config = load_config(args)?;
    init_logging(&config)?;

    let registry = package(&config)?.registry();
    let metadata =
        generate_metadata(&registry, &views, config.database.schema_name())?;

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

pub async fn configure(args: IndexerArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    init_logging(&config)?;

    info!("Configuration: {:?}", config);

    let registry = package(&config)?.registry();
    let pool = IndexerConnectionPool::connect(&config.database.to_string()).await?;
    let metadata = configure_hasura(&config, &registry, &pool).await?;

    info!("Pushed metadata for {} tables.", metadata.tables.len());
    Ok(())
}
