//! Derived views over the normalized product collection.
//!
//! Pure and synchronous: safe to re-run on every keystroke or facet click.
//! The stages compose in a fixed order - text, category, price bounds, then
//! sort - because category facets are computed from the *filtered* set;
//! reordering the stages changes user-visible facet counts.

use serde::{Deserialize, Serialize};

use shophub_core::Product;

/// Sentinel category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "all";

/// Sort order for the visible product list.
///
/// Ties always preserve the relative order of the input: the sorts below are
/// stable by contract, not by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Identity order - the backend's featured ordering, untouched.
    #[default]
    Featured,
    /// Ascending by price.
    PriceLow,
    /// Descending by price.
    PriceHigh,
    /// Descending by rating.
    Rating,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Featured => write!(f, "featured"),
            Self::PriceLow => write!(f, "price-low"),
            Self::PriceHigh => write!(f, "price-high"),
            Self::Rating => write!(f, "rating"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

/// A catalog query: what the shopper typed and selected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogQuery {
    /// Free-text search; case-insensitive substring match against title or
    /// category. Blank disables.
    pub text: Option<String>,
    /// Exact category match; `None` or [`ALL_CATEGORIES`] disables.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub price_min: Option<f64>,
    /// Inclusive upper price bound.
    pub price_max: Option<f64>,
    /// Sort order applied after all filters.
    pub sort: SortKey,
}

/// Derive the visible product list for a query.
///
/// Stages in fixed order: text filter, category filter, price bounds,
/// stable sort.
#[must_use]
pub fn derive_view(products: &[Product], query: &CatalogQuery) -> Vec<Product> {
    let needle = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let category = query
        .category
        .as_deref()
        .filter(|c| *c != ALL_CATEGORIES);

    let mut view: Vec<Product> = products
        .iter()
        .filter(|product| {
            needle.as_deref().is_none_or(|needle| {
                product.title.to_lowercase().contains(needle)
                    || product.category.to_lowercase().contains(needle)
            })
        })
        .filter(|product| category.is_none_or(|category| product.category == category))
        .filter(|product| query.price_min.is_none_or(|min| product.price >= min))
        .filter(|product| query.price_max.is_none_or(|max| product.price <= max))
        .cloned()
        .collect();

    match query.sort {
        SortKey::Featured => {}
        SortKey::PriceLow => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceHigh => view.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::Rating => view.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }

    view
}

/// Distinct categories of a (typically already filtered) product set,
/// sorted, empty categories skipped.
#[must_use]
pub fn category_facets(products: &[Product]) -> Vec<String> {
    let mut facets: Vec<String> = products
        .iter()
        .map(|p| p.category.clone())
        .filter(|c| !c.is_empty())
        .collect();
    facets.sort();
    facets.dedup();
    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use shophub_core::ProductId;

    fn product(id: &str, title: &str, category: &str, price: f64, rating: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            price,
            image: String::new(),
            rating,
            review_count: 0,
            description: String::new(),
            category: category.to_owned(),
            in_stock: true,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("p1", "Desk Lamp", "home", 30.0, 4.0),
            product("p2", "Mechanical Keyboard", "electronics", 10.0, 4.0),
            product("p3", "Espresso Cup", "home", 20.0, 4.0),
        ]
    }

    fn ids(view: &[Product]) -> Vec<&str> {
        view.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn featured_keeps_identity_order() {
        let view = derive_view(&sample(), &CatalogQuery::default());
        assert_eq!(ids(&view), ["p1", "p2", "p3"]);
    }

    #[test]
    fn price_sorts_both_directions() {
        let low = derive_view(
            &sample(),
            &CatalogQuery {
                sort: SortKey::PriceLow,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(
            low.iter().map(|p| p.price).collect::<Vec<_>>(),
            [10.0, 20.0, 30.0]
        );

        let high = derive_view(
            &sample(),
            &CatalogQuery {
                sort: SortKey::PriceHigh,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(
            high.iter().map(|p| p.price).collect::<Vec<_>>(),
            [30.0, 20.0, 10.0]
        );
    }

    #[test]
    fn equal_ratings_keep_input_order() {
        // All ratings equal: the sort must not reorder anything.
        let view = derive_view(
            &sample(),
            &CatalogQuery {
                sort: SortKey::Rating,
                ..CatalogQuery::default()
            },
        );
        assert_eq!(ids(&view), ["p1", "p2", "p3"]);
    }

    #[test]
    fn text_matches_title_or_category_case_insensitively() {
        let query = CatalogQuery {
            text: Some("LAMP".to_owned()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&derive_view(&sample(), &query)), ["p1"]);

        let query = CatalogQuery {
            text: Some("electronics".to_owned()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&derive_view(&sample(), &query)), ["p2"]);
    }

    #[test]
    fn blank_text_disables_the_filter() {
        let query = CatalogQuery {
            text: Some("   ".to_owned()),
            ..CatalogQuery::default()
        };
        assert_eq!(derive_view(&sample(), &query).len(), 3);
    }

    #[test]
    fn all_sentinel_disables_category_filter() {
        let query = CatalogQuery {
            category: Some(ALL_CATEGORIES.to_owned()),
            ..CatalogQuery::default()
        };
        assert_eq!(derive_view(&sample(), &query).len(), 3);

        let query = CatalogQuery {
            category: Some("home".to_owned()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&derive_view(&sample(), &query)), ["p1", "p3"]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let query = CatalogQuery {
            price_min: Some(10.0),
            price_max: Some(20.0),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&derive_view(&sample(), &query)), ["p2", "p3"]);
    }

    #[test]
    fn filters_compose_before_sort() {
        let query = CatalogQuery {
            category: Some("home".to_owned()),
            sort: SortKey::PriceLow,
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&derive_view(&sample(), &query)), ["p3", "p1"]);
    }

    #[test]
    fn facets_come_from_the_filtered_set() {
        let filtered = derive_view(
            &sample(),
            &CatalogQuery {
                text: Some("keyboard".to_owned()),
                ..CatalogQuery::default()
            },
        );
        assert_eq!(category_facets(&filtered), ["electronics"]);
        assert_eq!(category_facets(&sample()), ["electronics", "home"]);
    }

    #[test]
    fn sort_key_round_trips_kebab_case() {
        for key in [
            SortKey::Featured,
            SortKey::PriceLow,
            SortKey::PriceHigh,
            SortKey::Rating,
        ] {
            assert_eq!(key.to_string().parse::<SortKey>().expect("round trip"), key);
        }
        assert!("price_low".parse::<SortKey>().is_err());
    }
}
