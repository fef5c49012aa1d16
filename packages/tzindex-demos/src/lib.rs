//! # tzindex-demos
//!
//! Indexer packages for two families of Tezos contracts. Each package owns
//! its models, the typed shapes of its contracts' parameters and storage,
//! and the handlers projecting matched operations into the store.
//!
//! * `tzcolors`: the tzcolors auction contract.
//! * `hicdex`: hic et nunc english auctions and split contracts.

#![deny(unused_crate_dependencies)]

pub mod hicdex;
pub mod tzcolors;

use strum::{AsRefStr, EnumString};
use thiserror::Error;
use tzindex_database::{ModelRegistry, Store, StoreError};
use tzindex_types::{DecodeError, OperationData};

pub type HandlerResult<T> = core::result::Result<T, HandlerError>;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// What a handler gets to work with besides the operation itself.
pub struct HandlerContext<'a> {
    pub store: &'a mut dyn Store,
}

impl<'a> HandlerContext<'a> {
    pub fn new(store: &'a mut dyn Store) -> Self {
        Self { store }
    }
}

/// One of the bundled indexer packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Package {
    Tzcolors,
    Hicdex,
}

impl Package {
    /// The package's models followed by the internal ones.
    pub fn registry(&self) -> ModelRegistry {
        match self {
            Package::Tzcolors => tzcolors::registry(),
            Package::Hicdex => hicdex::registry(),
        }
        .with_internal_models()
    }

    /// Route `op` to the matching handler of this package.
    pub async fn dispatch(
        &self,
        ctx: &mut HandlerContext<'_>,
        op: &OperationData,
    ) -> HandlerResult<()> {
        match self {
            Package::Tzcolors => tzcolors::dispatch(ctx, op).await,
            Package::Hicdex => hicdex::dispatch(ctx, op).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_package_registries_include_internal_models() {
        let package = Package::from_str("hicdex").unwrap();
        assert_eq!(package.as_ref(), "hicdex");

        let registry = package.registry();
        assert!(registry.get("models.EnglishAuction").is_some());
        assert!(registry.get("int_models.IndexState").is_some());

        let registry = Package::Tzcolors.registry();
        let tables = registry
            .creation_order()
            .unwrap()
            .into_iter()
            .map(|m| m.table_name())
            .collect::<Vec<_>>();
        assert_eq!(tables, vec!["address", "token", "auction", "tzindex_state"]);

        assert!(Package::from_str("quipuswap").is_err());
    }
}
