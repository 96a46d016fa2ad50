//! Mock catalog for testing without a catalog service.

use super::{CatalogError, CatalogSource, ItemFilter};
use crate::domain::{Item, ItemId};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct MockCatalogSource {
    items: Vec<Item>,
    unavailable: bool,
}

impl MockCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items.extend(items);
        self
    }

    /// Make every call fail with `CatalogError::Unavailable`.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check_available(&self) -> Result<(), CatalogError> {
        if self.unavailable {
            Err(CatalogError::Unavailable("mock catalog offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogSource for MockCatalogSource {
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError> {
        self.check_available()?;
        Ok(self
            .items
            .iter()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>, CatalogError> {
        self.check_available()?;
        Ok(self.items.iter().find(|i| &i.id == id).cloned())
    }
}
