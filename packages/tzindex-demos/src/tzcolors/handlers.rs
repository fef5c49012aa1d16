use super::{
    models::{Address, Auction, AuctionStatus, Token},
    types::{BidParameter, CreateAuctionParameter, TzcolorsAuctionStorage, WithdrawParameter},
};
use crate::{HandlerContext, HandlerResult};
use tracing::info;
use tzindex_database::{Filter, Model, Store, StoreResult};
use tzindex_types::{
    scalar::{parse_nat, parse_timestamp},
    Transaction,
};

async fn get_or_create_address(store: &mut dyn Store, address: &str) -> StoreResult<Address> {
    let (address, _) = Address::get_or_create(
        store,
        Filter::new().eq("address", address),
        || Address {
            address: address.to_string(),
        },
    )
    .await?;
    Ok(address)
}

pub async fn on_create_auction(
    ctx: &mut HandlerContext<'_>,
    create_auction: Transaction<CreateAuctionParameter, TzcolorsAuctionStorage>,
) -> HandlerResult<()> {
    let params = &create_auction.parameter;
    let seller = get_or_create_address(ctx.store, &create_auction.data.sender_address).await?;

    let token_id = parse_nat("token_id", &params.token_id)?;
    let amount = parse_nat("token_amount", &params.token_amount)?;
    let (token, _) = Token::get_or_create(
        ctx.store,
        Filter::new().eq("id", token_id),
        || Token {
            id: token_id,
            address: params.token_address.clone(),
            amount,
            holder_id: seller.address.clone(),
        },
    )
    .await?;

    let auction = Auction {
        id: parse_nat("auction_id", &params.auction_id)?,
        token_id: token.id,
        bid_amount: parse_nat("bid_amount", &params.bid_amount)?,
        bidder_id: seller.address.clone(),
        seller_id: seller.address.clone(),
        end_timestamp: parse_timestamp("end_timestamp", &params.end_timestamp)?,
        status: AuctionStatus::Active,
    }
    .create(ctx.store)
    .await?;

    info!("Auction {} created for token {}", auction.id, token.id);
    Ok(())
}

pub async fn on_bid(
    ctx: &mut HandlerContext<'_>,
    bid: Transaction<BidParameter, TzcolorsAuctionStorage>,
) -> HandlerResult<()> {
    let id = parse_nat("auction_id", &bid.parameter.0)?;
    let mut auction = Auction::filter(Filter::new().eq("id", id))
        .get(ctx.store)
        .await?;

    let bidder = get_or_create_address(ctx.store, &bid.data.sender_address).await?;

    auction.bidder_id = bidder.address;
    auction.bid_amount = bid.data.amount.unwrap_or_default();
    auction.save(ctx.store).await?;

    Ok(())
}

pub async fn on_withdraw(
    ctx: &mut HandlerContext<'_>,
    withdraw: Transaction<WithdrawParameter, TzcolorsAuctionStorage>,
) -> HandlerResult<()> {
    let id = parse_nat("auction_id", &withdraw.parameter.0)?;
    let mut auction = Auction::filter(Filter::new().eq("id", id))
        .get(ctx.store)
        .await?;

    let mut token = Token::filter(Filter::new().eq("id", auction.token_id))
        .get(ctx.store)
        .await?;
    let bidder = Address::get(ctx.store, auction.bidder_id.clone()).await?;

    token.holder_id = bidder.address;
    token.save(ctx.store).await?;

    auction.status = AuctionStatus::Finished;
    auction.save(ctx.store).await?;

    info!("Auction {} finished, token {} -> {}", auction.id, token.id, token.holder_id);
    Ok(())
}
