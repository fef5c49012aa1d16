use super::{
    models::{EnglishAuction, EnglishAuctionStatus, EnglishBid, Shareholder, SplitContract},
    types::{
        BidParameter, CancelAuctionParameter, ConcludeAuctionParameter, CreateAuctionParameter,
        ObjktbidEnglishStorage, SplitContractAStorage,
    },
};
use crate::{HandlerContext, HandlerError, HandlerResult};
use chrono::Duration;
use tracing::info;
use tzindex_database::{Model, Store};
use tzindex_types::{
    scalar::{parse_nat, parse_timestamp},
    Origination, Transaction,
};

pub async fn on_create_english(
    ctx: &mut HandlerContext<'_>,
    create_auction: Transaction<CreateAuctionParameter, ObjktbidEnglishStorage>,
) -> HandlerResult<()> {
    let params = &create_auction.parameter;
    let sender = &create_auction.data.sender_address;

    // Storage already holds the id of the next auction.
    let next_id = parse_nat("auction_id", &create_auction.storage.auction_id)?;
    let id = next_id.checked_sub(1).ok_or_else(|| {
        HandlerError::InvalidValue(format!("auction_id {next_id} leaves no created auction"))
    })?;

    let auction = EnglishAuction {
        id,
        fa2: params.fa2.clone(),
        status: EnglishAuctionStatus::Active,
        objkt_id: parse_nat("objkt_id", &params.objkt_id)?,
        creator: sender.clone(),
        highest_bidder: sender.clone(),
        highest_bid: 0,
        start_time: parse_timestamp("start_time", &params.start_time)?,
        end_time: parse_timestamp("end_time", &params.end_time)?,
        price_increment: parse_nat("price_increment", &params.price_increment)?,
        extension_time: parse_nat("extension_time", &params.extension_time)?,
        reserve: parse_nat("reserve", &params.reserve)?,
    };
    auction.save(ctx.store).await?;

    info!("English auction {} created by {}", auction.id, auction.creator);
    Ok(())
}

pub async fn on_bid_english(
    ctx: &mut HandlerContext<'_>,
    bid: Transaction<BidParameter, ObjktbidEnglishStorage>,
) -> HandlerResult<()> {
    let id = parse_nat("auction_id", &bid.parameter.0)?;
    let mut auction = EnglishAuction::get(ctx.store, id).await?;

    let amount = bid.data.amount.unwrap_or_default();
    let timestamp = bid.data.timestamp;

    let extension_time = auction.extension_time;
    let out_of_range =
        || HandlerError::InvalidValue(format!("extension_time {extension_time} out of range"));
    let extension = i64::try_from(extension_time)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(out_of_range)?;
    if auction.end_time - timestamp < extension {
        auction.end_time = timestamp
            .checked_add_signed(extension)
            .ok_or_else(out_of_range)?;
    }

    EnglishBid {
        id: bid.data.id,
        auction_id: auction.id,
        bidder: bid.data.sender_address.clone(),
        amount,
        timestamp,
        level: bid.data.level,
    }
    .create(ctx.store)
    .await?;

    auction.highest_bid = amount;
    auction.highest_bidder = bid.data.sender_address.clone();
    auction.save(ctx.store).await?;

    Ok(())
}

async fn set_status(
    store: &mut dyn Store,
    id: &str,
    status: EnglishAuctionStatus,
) -> HandlerResult<()> {
    let id = parse_nat("auction_id", id)?;
    let mut auction = EnglishAuction::get(&mut *store, id).await?;
    auction.status = status;
    auction.save(store).await?;
    Ok(())
}

pub async fn on_cancel_english(
    ctx: &mut HandlerContext<'_>,
    cancel: Transaction<CancelAuctionParameter, ObjktbidEnglishStorage>,
) -> HandlerResult<()> {
    set_status(ctx.store, &cancel.parameter.0, EnglishAuctionStatus::Cancelled).await
}

pub async fn on_conclude_english(
    ctx: &mut HandlerContext<'_>,
    conclude: Transaction<ConcludeAuctionParameter, ObjktbidEnglishStorage>,
) -> HandlerResult<()> {
    set_status(ctx.store, &conclude.parameter.0, EnglishAuctionStatus::Concluded).await
}

pub async fn on_split_origination(
    ctx: &mut HandlerContext<'_>,
    origination: Origination<SplitContractAStorage>,
) -> HandlerResult<()> {
    let storage = &origination.storage;
    let contract = origination
        .data
        .originated_contract_address
        .clone()
        .ok_or_else(|| {
            HandlerError::InvalidValue(format!(
                "origination {} has no originated contract",
                origination.data.id
            ))
        })?;

    SplitContract {
        contract: contract.clone(),
        administrator: storage.administrator.clone(),
        total_shares: parse_nat("totalShares", &storage.total_shares)?,
    }
    .create(ctx.store)
    .await?;

    for (holder, shares) in &storage.shares {
        Shareholder {
            id: Shareholder::key(&contract, holder),
            contract_id: contract.clone(),
            holder: holder.clone(),
            shares: parse_nat("shares", shares)?,
            is_core: storage.core_participants.contains(holder),
        }
        .create(ctx.store)
        .await?;
    }

    info!(
        "Split contract {} with {} shareholders",
        contract,
        storage.shares.len()
    );
    Ok(())
}
