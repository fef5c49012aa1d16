use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tzindex_database::{ColumnType, FieldDescriptor, Model, ModelDescriptor};

pub const APP: &str = "models";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(into = "u8", try_from = "u8")]
pub enum AuctionStatus {
    Active = 0,
    Finished = 1,
}

impl From<AuctionStatus> for u8 {
    fn from(status: AuctionStatus) -> u8 {
        status as u8
    }
}

impl TryFrom<u8> for AuctionStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AuctionStatus::Active),
            1 => Ok(AuctionStatus::Finished),
            other => Err(format!("unknown auction status {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub address: String,
}

impl Model for Address {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(APP, "Address")
            .field(FieldDescriptor::primary_key("address", ColumnType::Address))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub id: u64,
    /// FA2 contract the token lives in.
    pub address: String,
    pub amount: u64,
    pub holder_id: String,
}

impl Model for Token {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(APP, "Token")
            .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
            .field(FieldDescriptor::column("address", ColumnType::Address))
            .field(FieldDescriptor::column("amount", ColumnType::BigInt))
            .field(FieldDescriptor::foreign_key(
                "holder",
                "models.Address",
                Some("tokens"),
                ColumnType::Address,
            ))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Auction {
    pub id: u64,
    pub token_id: u64,
    pub bid_amount: u64,
    pub bidder_id: String,
    pub seller_id: String,
    pub end_timestamp: DateTime<Utc>,
    pub status: AuctionStatus,
}

impl Model for Auction {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(APP, "Auction")
            .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
            .field(FieldDescriptor::foreign_key(
                "token",
                "models.Token",
                Some("auctions"),
                ColumnType::BigInt,
            ))
            .field(FieldDescriptor::column("bid_amount", ColumnType::BigInt))
            .field(FieldDescriptor::foreign_key(
                "bidder",
                "models.Address",
                Some("winning_auctions"),
                ColumnType::Address,
            ))
            .field(FieldDescriptor::foreign_key(
                "seller",
                "models.Address",
                Some("created_auctions"),
                ColumnType::Address,
            ))
            .field(FieldDescriptor::column("end_timestamp", ColumnType::Timestamp))
            .field(FieldDescriptor::column("status", ColumnType::Integer))
    }
}
