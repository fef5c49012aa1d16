use crate::{cli::HandleCommand, load_config, package};
use serde_json::Value;
use std::path::Path;
use tracing::{error, info};
use tzindex_database::{MemoryStore, PostgresStore};
use tzindex_demos::{HandlerContext, Package};
use tzindex_lib::utils::init_logging;
use tzindex_types::OperationData;

/// Read one operation or an array of them.
async fn read_operations(path: &Path) -> anyhow::Result<Vec<OperationData>> {
    let content = tokio::fs::read_to_string(path).await?;
    let operations = match serde_json::from_str::<Value>(&content)? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(operations)
}

async fn apply(
    package: Package,
    ctx: &mut HandlerContext<'_>,
    operations: &[OperationData],
) -> anyhow::Result<()> {
    for op in operations {
        info!("Handling {} operation {} at level {}", op.type_, op.id, op.level);
        package.dispatch(ctx, op).await?;
    }
    Ok(())
}

pub async fn exec(command: HandleCommand) -> anyhow::Result<()> {
    let HandleCommand {
        operation,
        dry_run,
        args,
    } = command;
    let config = load_config(args)?;
    init_logging(&config)?;

    let package = package(&config)?;
    let operations = read_operations(&operation).await?;

    if dry_run {
        let mut store = MemoryStore::new();
        apply(package, &mut HandlerContext::new(&mut store), &operations).await?;

        let tables = store
            .table_names()
            .map(|t| (t.to_string(), Value::from(store.rows(t).to_vec())))
            .collect::<serde_json::Map<_, _>>();
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    let mut store = PostgresStore::new(
        &config.database.to_string(),
        config.database.schema_name(),
    )
    .await?;

    store.start_transaction().await?;
    let result = apply(package, &mut HandlerContext::new(&mut store), &operations).await;

    match result {
        Ok(()) => {
            store.commit_transaction().await?;
            info!("Handled {} operations.", operations.len());
            Ok(())
        }
        Err(e) => {
            error!("Handler failed, reverting: {e}");
            store.revert_transaction().await?;
            Err(e)
        }
    }
}
