use crate::{internal::IndexState, Model, ModelDescriptor, StoreError, StoreResult};
use std::collections::{HashMap, HashSet};

/// Every model known to an indexer, in registration order.
///
/// Foreign keys refer to models by qualified name (`app.Name`), which this
/// registry resolves.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Model>(self) -> Self {
        self.register_descriptor(M::descriptor())
    }

    /// Add `descriptor`, replacing an earlier model with the same qualified name.
    pub fn register_descriptor(mut self, descriptor: ModelDescriptor) -> Self {
        let key = descriptor.qualified_name();
        match self.index.get(&key) {
            Some(&idx) => self.models[idx] = descriptor,
            None => {
                self.index.insert(key, self.models.len());
                self.models.push(descriptor);
            }
        }
        self
    }

    /// Add the models the indexer itself persists.
    pub fn with_internal_models(self) -> Self {
        self.register::<IndexState>()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    /// Models backed by a table.
    pub fn concrete(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter().filter(|m| !m.is_abstract())
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ModelDescriptor> {
        self.index.get(qualified_name).map(|&idx| &self.models[idx])
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Concrete models ordered so that every model comes after the models
    /// its foreign keys reference. References to unregistered models are
    /// left to the database to reject.
    pub fn creation_order(&self) -> StoreResult<Vec<&ModelDescriptor>> {
        let mut ordered = Vec::with_capacity(self.models.len());
        let mut done = HashSet::new();
        let mut visiting = HashSet::new();

        for model in self.concrete() {
            self.visit(model, &mut visiting, &mut done, &mut ordered)?;
        }

        Ok(ordered)
    }

    fn visit<'a>(
        &'a self,
        model: &'a ModelDescriptor,
        visiting: &mut HashSet<String>,
        done: &mut HashSet<String>,
        ordered: &mut Vec<&'a ModelDescriptor>,
    ) -> StoreResult<()> {
        let key = model.qualified_name();
        if done.contains(&key) {
            return Ok(());
        }
        if !visiting.insert(key.clone()) {
            return Err(StoreError::ForeignKeyCycle(key));
        }

        for target in model.foreign_keys().filter_map(|f| f.related_model()) {
            // Self references need no ordering.
            if target == key {
                continue;
            }
            if let Some(referenced) = self.get(target) {
                self.visit(referenced, visiting, done, ordered)?;
            }
        }

        visiting.remove(&key);
        done.insert(key);
        ordered.push(model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnType, FieldDescriptor};

    fn address() -> ModelDescriptor {
        ModelDescriptor::new("models", "Address")
            .field(FieldDescriptor::primary_key("address", ColumnType::Address))
    }

    fn token() -> ModelDescriptor {
        ModelDescriptor::new("models", "Token")
            .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
            .field(FieldDescriptor::foreign_key(
                "holder",
                "models.Address",
                Some("tokens"),
                ColumnType::Address,
            ))
    }

    #[test]
    fn test_creation_order_puts_referenced_models_first() {
        let registry = ModelRegistry::new()
            .register_descriptor(token())
            .register_descriptor(address())
            .register_descriptor(ModelDescriptor::new("models", "Base").abstract_model());

        let order = registry
            .creation_order()
            .unwrap()
            .into_iter()
            .map(|m| m.name())
            .collect::<Vec<_>>();

        assert_eq!(order, vec!["Address", "Token"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_creation_order_detects_cycles() {
        let a = ModelDescriptor::new("models", "A")
            .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
            .field(FieldDescriptor::foreign_key("b", "models.B", None, ColumnType::BigInt));
        let b = ModelDescriptor::new("models", "B")
            .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
            .field(FieldDescriptor::foreign_key("a", "models.A", None, ColumnType::BigInt));

        let registry = ModelRegistry::new()
            .register_descriptor(a)
            .register_descriptor(b);

        assert!(matches!(
            registry.creation_order(),
            Err(StoreError::ForeignKeyCycle(_))
        ));
    }

    #[test]
    fn test_register_replaces_same_qualified_name() {
        let registry = ModelRegistry::new()
            .register_descriptor(address())
            .register_descriptor(address().table("accounts"));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("models.Address").unwrap().table_name(),
            "accounts"
        );
    }
}
