pub mod handlers;
pub mod models;
pub mod types;

use crate::{HandlerContext, HandlerResult};
use tracing::debug;
use tzindex_database::ModelRegistry;
use tzindex_types::{OperationData, OperationType};

pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .register::<models::Address>()
        .register::<models::Token>()
        .register::<models::Auction>()
}

pub async fn dispatch(ctx: &mut HandlerContext<'_>, op: &OperationData) -> HandlerResult<()> {
    if op.type_ != OperationType::Transaction {
        debug!("Ignoring {} operation {}", op.type_, op.id);
        return Ok(());
    }

    match op.entrypoint.as_deref() {
        Some("create_auction") => {
            handlers::on_create_auction(ctx, op.to_transaction()?).await
        }
        Some("bid") => handlers::on_bid(ctx, op.to_transaction()?).await,
        Some("withdraw") => handlers::on_withdraw(ctx, op.to_transaction()?).await,
        other => {
            debug!("No handler for entrypoint {other:?} of operation {}", op.id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{models::*, *};
    use serde_json::json;
    use tzindex_database::{MemoryStore, Model};

    fn transaction(id: u64, sender: &str, entrypoint: &str, parameter: serde_json::Value) -> OperationData {
        serde_json::from_value(json!({
            "type": "transaction",
            "id": id,
            "level": 1_400_000 + id,
            "timestamp": "2021-03-01T10:00:00Z",
            "hash": format!("oo{id}"),
            "counter": id,
            "sender_address": sender,
            "target_address": "KT1CpeSQKdkhWi4pinYcseCFKmDhs5M74BkU",
            "amount": 2_500_000,
            "status": "applied",
            "entrypoint": entrypoint,
            "parameter_json": parameter,
            "storage": {}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_auction_lifecycle() {
        let mut store = MemoryStore::new();
        let mut ctx = HandlerContext::new(&mut store);

        let create = transaction(
            1,
            "tz1seller",
            "create_auction",
            json!({
                "auction_id": "7",
                "bid_amount": "1000000",
                "end_timestamp": "2021-03-02T10:00:00Z",
                "token_address": "KT1RJ6PbjHpwc3M5rw5s2Nbmefwbuwbdxton",
                "token_amount": "1",
                "token_id": "14"
            }),
        );
        dispatch(&mut ctx, &create).await.unwrap();

        dispatch(&mut ctx, &transaction(2, "tz1bidder", "bid", json!("7")))
            .await
            .unwrap();
        dispatch(&mut ctx, &transaction(3, "tz1anyone", "withdraw", json!("7")))
            .await
            .unwrap();
        dispatch(&mut ctx, &transaction(4, "tz1anyone", "update_admin", json!("tz1x")))
            .await
            .unwrap();

        let auction = Auction::get(ctx.store, 7u64).await.unwrap();
        assert_eq!(auction.status, AuctionStatus::Finished);
        assert_eq!(auction.bidder_id, "tz1bidder");
        assert_eq!(auction.seller_id, "tz1seller");
        assert_eq!(auction.bid_amount, 2_500_000);

        let token = Token::get(ctx.store, 14u64).await.unwrap();
        assert_eq!(token.holder_id, "tz1bidder");

        assert_eq!(store.rows("address").len(), 2);
    }

    #[tokio::test]
    async fn test_bid_on_unknown_auction_fails() {
        let mut store = MemoryStore::new();
        let mut ctx = HandlerContext::new(&mut store);

        let err = dispatch(&mut ctx, &transaction(1, "tz1bidder", "bid", json!("99")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::HandlerError::Store(tzindex_database::StoreError::DoesNotExist { .. })
        ));
    }
}
