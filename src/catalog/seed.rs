//! Built-in catalog used when no external catalog service is configured.

use super::{CatalogError, CatalogSource, ItemFilter};
use crate::domain::{Category, Item, ItemId, Money};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    items: Vec<Item>,
}

impl StaticCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The storefront's launch collection.
    pub fn seeded() -> Self {
        let items = vec![
            Item::new(
                "1",
                "Malibu Beachfront Villa",
                "Stunning beachfront property with panoramic ocean views",
                Money::from_units(25_000_000),
                Category::Homes,
            ),
            Item::new(
                "2",
                "Private Island Getaway",
                "One week at a private island resort",
                Money::from_units(150_000),
                Category::Travel,
            ),
            Item::new(
                "3",
                "Lamborghini Aventador",
                "Ultimate supercar experience",
                Money::from_units(500_000),
                Category::Cars,
            ),
            Item::new(
                "4",
                "Luxury Yacht",
                "120ft luxury yacht with full crew",
                Money::from_units(15_000_000),
                Category::Boats,
            ),
            Item::new(
                "5",
                "Latest Gaming Setup",
                "Ultimate gaming station with latest technology",
                Money::from_units(50_000),
                Category::Gadgets,
            ),
            Item::new(
                "6",
                "Cashmere Overcoat",
                "Double-faced cashmere, tailored in Milan",
                Money::from_units(4_800),
                Category::Fashion,
            ),
            Item::new(
                "7",
                "Sapphire Pendant",
                "Ceylon sapphire on an 18k white gold chain",
                Money::from_units(12_500),
                Category::Jewelry,
            ),
            Item::new(
                "8",
                "Perpetual Calendar Chronograph",
                "Hand-finished movement with moon phase",
                Money::from_units(68_000),
                Category::Watches,
            ),
            Item::new(
                "9",
                "Abstract Oil on Canvas",
                "Signed original, gallery provenance",
                Money::from_units(42_000),
                Category::Art,
            ),
            Item::new(
                "10",
                "Private Chef Tasting Evening",
                "Twelve-course dinner for eight at your residence",
                Money::from_units(9_500),
                Category::Experiences,
            ),
            Item::new(
                "11",
                "Noise-Cancelling Headphones",
                "Studio-grade wireless headphones",
                Money::from_units(600),
                Category::Gadgets,
            ),
            Item::new(
                "12",
                "Leather Card Holder",
                "Hand-stitched calfskin",
                Money::from_units(650),
                Category::Fashion,
            ),
        ];
        Self { items }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<Item>, CatalogError> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>, CatalogError> {
        Ok(self.items.iter().find(|item| &item.id == id).cloned())
    }
}
