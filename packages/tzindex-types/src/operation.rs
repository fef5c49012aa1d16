use crate::{DecodeError, DecodeResult};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of an operation matched by the indexer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Transaction,
    Origination,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Transaction => write!(f, "transaction"),
            OperationType::Origination => write!(f, "origination"),
        }
    }
}

/// Basic structure of an operation as decoded from the chain, before its
/// parameter and storage are given a contract-specific shape.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OperationData {
    #[serde(rename = "type")]
    pub type_: OperationType,
    pub id: u64,
    pub level: u64,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub counter: u64,
    pub sender_address: String,
    #[serde(default)]
    pub target_address: Option<String>,
    #[serde(default)]
    pub initiator_address: Option<String>,
    #[serde(default)]
    pub amount: Option<u64>,
    pub status: String,
    #[serde(default)]
    pub entrypoint: Option<String>,
    #[serde(default)]
    pub parameter_json: Option<Value>,
    #[serde(default)]
    pub storage: Option<Value>,
    #[serde(default)]
    pub originated_contract_address: Option<String>,
}

/// A contract call with typed parameter `P` and post-operation storage `S`.
#[derive(Clone, Debug)]
pub struct Transaction<P, S> {
    pub data: OperationData,
    pub parameter: P,
    pub storage: S,
}

/// A contract origination with typed initial storage `S`.
#[derive(Clone, Debug)]
pub struct Origination<S> {
    pub data: OperationData,
    pub storage: S,
}

impl OperationData {
    fn expect_type(&self, expected: OperationType) -> DecodeResult<()> {
        if self.type_ != expected {
            return Err(DecodeError::UnexpectedOperationType {
                expected,
                actual: self.type_,
            });
        }
        Ok(())
    }

    fn typed_storage<S: DeserializeOwned>(&self) -> DecodeResult<S> {
        let storage = self
            .storage
            .clone()
            .ok_or(DecodeError::MissingStorage(self.id))?;
        Ok(serde_json::from_value(storage)?)
    }

    /// Give this operation's parameter and storage their typed shapes.
    pub fn to_transaction<P, S>(&self) -> DecodeResult<Transaction<P, S>>
    where
        P: DeserializeOwned,
        S: DeserializeOwned,
    {
        self.expect_type(OperationType::Transaction)?;

        let parameter = self
            .parameter_json
            .clone()
            .ok_or(DecodeError::MissingParameter(self.id))?;

        Ok(Transaction {
            parameter: serde_json::from_value(parameter)?,
            storage: self.typed_storage()?,
            data: self.clone(),
        })
    }

    /// Give this origination's initial storage its typed shape.
    pub fn to_origination<S: DeserializeOwned>(&self) -> DecodeResult<Origination<S>> {
        self.expect_type(OperationType::Origination)?;

        Ok(Origination {
            storage: self.typed_storage()?,
            data: self.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Bid(String);

    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Storage {
        administrator: String,
    }

    fn transaction() -> OperationData {
        serde_json::from_value(json!({
            "type": "transaction",
            "id": 42,
            "level": 1_500_000,
            "timestamp": "2021-06-01T12:00:00Z",
            "hash": "ooTestHash",
            "counter": 7,
            "sender_address": "tz1sender",
            "target_address": "KT1target",
            "amount": 1_000_000,
            "status": "applied",
            "entrypoint": "bid",
            "parameter_json": "3",
            "storage": {"administrator": "tz1admin"}
        }))
        .unwrap()
    }

    #[test]
    fn test_operation_decodes_into_typed_transaction() {
        let tx: Transaction<Bid, Storage> = transaction().to_transaction().unwrap();

        assert_eq!(tx.parameter, Bid("3".to_string()));
        assert_eq!(tx.storage.administrator, "tz1admin");
        assert_eq!(tx.data.amount, Some(1_000_000));
        assert_eq!(tx.data.entrypoint.as_deref(), Some("bid"));
    }

    #[test]
    fn test_operation_rejects_wrong_kind_and_missing_payloads() {
        let op = transaction();
        let err = op.to_origination::<Storage>().unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedOperationType { .. }));

        let mut op = transaction();
        op.parameter_json = None;
        let err = op.to_transaction::<Bid, Storage>().unwrap_err();
        assert!(matches!(err, DecodeError::MissingParameter(42)));
    }

    #[test]
    fn test_operation_rejects_unknown_storage_fields() {
        let mut op = transaction();
        op.storage = Some(json!({"administrator": "tz1admin", "paused": false}));
        let err = op.to_transaction::<Bid, Storage>().unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
