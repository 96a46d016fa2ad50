//! Catalog source abstraction. The cart only needs the item shape and price.

use crate::domain::{Category, Item, ItemId};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod seed;

pub use mock::MockCatalogSource;
pub use seed::StaticCatalog;

/// Optional narrowing for catalog listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub category: Option<Category>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                item.title.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

#[async_trait]
pub trait CatalogSource: Send + Sync + fmt::Debug {
    /// List items matching `filter`, in catalog order.
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError>;

    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>, CatalogError>;
}

#[derive(Debug, Clone)]
pub enum CatalogError {
    /// Backing service could not be reached.
    Unavailable(String),
    Other(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Unavailable(msg) => write!(f, "Catalog unavailable: {}", msg),
            CatalogError::Other(msg) => write!(f, "Catalog error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}
