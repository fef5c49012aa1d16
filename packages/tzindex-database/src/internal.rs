use crate::{ColumnType, FieldDescriptor, Model, ModelDescriptor};
use serde::{Deserialize, Serialize};

/// Qualified app name of models owned by the indexer itself.
pub const INTERNAL_APP: &str = "int_models";

/// Progress of one index: the last level it processed and the hash of the
/// configuration it was built from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct IndexState {
    pub index_name: String,
    pub index_type: String,
    pub hash: String,
    pub level: u64,
}

impl Model for IndexState {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new(INTERNAL_APP, "IndexState")
            .table("tzindex_state")
            .field(FieldDescriptor::primary_key("index_name", ColumnType::Text))
            .field(FieldDescriptor::column("index_type", ColumnType::Text))
            .field(FieldDescriptor::column("hash", ColumnType::Text))
            .field(FieldDescriptor::column("level", ColumnType::BigInt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Filter, MemoryStore};

    #[tokio::test]
    async fn test_index_state_round_trips_through_store() {
        let mut store = MemoryStore::new();

        let (state, created) = IndexState::get_or_create(
            &mut store,
            Filter::new().eq("index_name", "tzcolors_auction"),
            || IndexState {
                index_name: "tzcolors_auction".to_string(),
                index_type: "operation".to_string(),
                hash: "abc".to_string(),
                level: 0,
            },
        )
        .await
        .unwrap();
        assert!(created);

        let mut state = state;
        state.level = 1_500_000;
        state.save(&mut store).await.unwrap();

        let loaded = IndexState::get(&mut store, "tzcolors_auction").await.unwrap();
        assert_eq!(loaded.level, 1_500_000);
        assert_eq!(store.rows("tzindex_state").len(), 1);

        let (_, created) = IndexState::get_or_create(
            &mut store,
            Filter::new().eq("index_name", "tzcolors_auction"),
            || unreachable!(),
        )
        .await
        .unwrap();
        assert!(!created);
    }
}
