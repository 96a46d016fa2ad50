//! Catalog item shape consumed by the cart.

use crate::domain::{ItemId, Money};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storefront category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Homes,
    Travel,
    Cars,
    Boats,
    Gadgets,
    Fashion,
    Jewelry,
    Watches,
    Art,
    Experiences,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Homes,
        Category::Travel,
        Category::Cars,
        Category::Boats,
        Category::Gadgets,
        Category::Fashion,
        Category::Jewelry,
        Category::Watches,
        Category::Art,
        Category::Experiences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Homes => "Homes",
            Category::Travel => "Travel",
            Category::Cars => "Cars",
            Category::Boats => "Boats",
            Category::Gadgets => "Gadgets",
            Category::Fashion => "Fashion",
            Category::Jewelry => "Jewelry",
            Category::Watches => "Watches",
            Category::Art => "Art",
            Category::Experiences => "Experiences",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive match on the category name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A purchasable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub category: Category,
}

impl Item {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        price: Money,
        category: Category,
    ) -> Self {
        Self {
            id: ItemId::new(id.to_string()),
            title: title.to_string(),
            description: description.to_string(),
            price,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(Category::from_str("watches").unwrap(), Category::Watches);
        assert_eq!(Category::from_str(" ART ").unwrap(), Category::Art);
    }

    #[test]
    fn test_category_parse_unknown() {
        let err = Category::from_str("Spaceships").unwrap_err();
        assert_eq!(err.to_string(), "unknown category: Spaceships");
    }

    #[test]
    fn test_category_display_matches_serde() {
        for c in Category::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c));
        }
    }
}
