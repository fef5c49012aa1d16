pub mod handlers;
pub mod models;
pub mod types;

use crate::{HandlerContext, HandlerResult};
use tracing::debug;
use tzindex_database::ModelRegistry;
use tzindex_types::{OperationData, OperationType};

pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .register::<models::EnglishAuction>()
        .register::<models::EnglishBid>()
        .register::<models::SplitContract>()
        .register::<models::Shareholder>()
}

pub async fn dispatch(ctx: &mut HandlerContext<'_>, op: &OperationData) -> HandlerResult<()> {
    match op.type_ {
        OperationType::Origination => {
            handlers::on_split_origination(ctx, op.to_origination()?).await
        }
        OperationType::Transaction => match op.entrypoint.as_deref() {
            Some("create_auction") => {
                handlers::on_create_english(ctx, op.to_transaction()?).await
            }
            Some("bid") => handlers::on_bid_english(ctx, op.to_transaction()?).await,
            Some("cancel_auction") => {
                handlers::on_cancel_english(ctx, op.to_transaction()?).await
            }
            Some("conclude_auction") => {
                handlers::on_conclude_english(ctx, op.to_transaction()?).await
            }
            other => {
                debug!("No handler for entrypoint {other:?} of operation {}", op.id);
                Ok(())
            }
        },
    }
}
