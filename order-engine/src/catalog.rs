//! Catalog cache - read-only input to the order composer
//!
//! Tables, dishes, variants and products are maintained by an external
//! collaborator (catalog CRUD is out of scope). The collaborator fetches
//! each collection by name and pushes it into this cache; the composer
//! resolves references against it and captures prices at add-time.
//!
//! Lookups only return *active* entities; anything unknown or inactive
//! is an `InvalidReference`.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared::error::OrderError;
use shared::models::{DiningTable, Dish, DishVariant, Product};

/// Catalog collection names used by the fetch contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCollection {
    Tables,
    Dishes,
    Variants,
    Products,
}

impl CatalogCollection {
    /// Parse a collection name from the external contract
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tables" => Some(Self::Tables),
            "dishes" => Some(Self::Dishes),
            "variants" => Some(Self::Variants),
            "products" => Some(Self::Products),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Tables => "tables",
            Self::Dishes => "dishes",
            Self::Variants => "variants",
            Self::Products => "products",
        }
    }
}

#[derive(Default)]
struct CatalogCache {
    tables: HashMap<i64, DiningTable>,
    dishes: HashMap<i64, Dish>,
    variants: HashMap<i64, DishVariant>,
    products: HashMap<i64, Product>,
}

/// In-memory catalog snapshot behind a read/write lock
#[derive(Default)]
pub struct CatalogService {
    cache: RwLock<CatalogCache>,
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Bulk loading ==========

    pub fn replace_tables(&self, tables: Vec<DiningTable>) {
        let mut cache = self.cache.write();
        cache.tables = tables.into_iter().map(|t| (t.id, t)).collect();
    }

    pub fn replace_dishes(&self, dishes: Vec<Dish>) {
        let mut cache = self.cache.write();
        cache.dishes = dishes.into_iter().map(|d| (d.id, d)).collect();
    }

    pub fn replace_variants(&self, variants: Vec<DishVariant>) {
        let mut cache = self.cache.write();
        cache.variants = variants.into_iter().map(|v| (v.id, v)).collect();
    }

    pub fn replace_products(&self, products: Vec<Product>) {
        let mut cache = self.cache.write();
        cache.products = products.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Load a collection fetched by name from the external collaborator
    ///
    /// Returns the number of entities loaded.
    pub fn apply_collection(
        &self,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<usize, OrderError> {
        let collection = CatalogCollection::from_name(name)
            .ok_or_else(|| OrderError::InvalidReference(format!("unknown collection: {name}")))?;
        let invalid =
            |e: serde_json::Error| OrderError::Validation(format!("bad {name} payload: {e}"));
        match collection {
            CatalogCollection::Tables => {
                let tables: Vec<DiningTable> = serde_json::from_value(payload).map_err(invalid)?;
                let count = tables.len();
                self.replace_tables(tables);
                Ok(count)
            }
            CatalogCollection::Dishes => {
                let dishes: Vec<Dish> = serde_json::from_value(payload).map_err(invalid)?;
                let count = dishes.len();
                self.replace_dishes(dishes);
                Ok(count)
            }
            CatalogCollection::Variants => {
                let variants: Vec<DishVariant> =
                    serde_json::from_value(payload).map_err(invalid)?;
                let count = variants.len();
                self.replace_variants(variants);
                Ok(count)
            }
            CatalogCollection::Products => {
                let products: Vec<Product> = serde_json::from_value(payload).map_err(invalid)?;
                let count = products.len();
                self.replace_products(products);
                Ok(count)
            }
        }
    }

    // ========== Active-only lookups ==========

    pub fn active_table(&self, table_id: i64) -> Result<DiningTable, OrderError> {
        let cache = self.cache.read();
        match cache.tables.get(&table_id) {
            Some(t) if t.is_active => Ok(t.clone()),
            Some(_) => Err(OrderError::InvalidReference(format!(
                "table {table_id} is inactive"
            ))),
            None => Err(OrderError::InvalidReference(format!(
                "table {table_id} is unknown"
            ))),
        }
    }

    pub fn active_dish(&self, dish_id: i64) -> Result<Dish, OrderError> {
        let cache = self.cache.read();
        match cache.dishes.get(&dish_id) {
            Some(d) if d.is_active => Ok(d.clone()),
            Some(_) => Err(OrderError::InvalidReference(format!(
                "dish {dish_id} is inactive"
            ))),
            None => Err(OrderError::InvalidReference(format!(
                "dish {dish_id} is unknown"
            ))),
        }
    }

    pub fn active_variant(&self, variant_id: i64) -> Result<DishVariant, OrderError> {
        let cache = self.cache.read();
        match cache.variants.get(&variant_id) {
            Some(v) if v.is_active => Ok(v.clone()),
            Some(_) => Err(OrderError::InvalidReference(format!(
                "variant {variant_id} is inactive"
            ))),
            None => Err(OrderError::InvalidReference(format!(
                "variant {variant_id} is unknown"
            ))),
        }
    }

    pub fn active_product(&self, product_id: i64) -> Result<Product, OrderError> {
        let cache = self.cache.read();
        match cache.products.get(&product_id) {
            Some(p) if p.is_active => Ok(p.clone()),
            Some(_) => Err(OrderError::InvalidReference(format!(
                "product {product_id} is inactive"
            ))),
            None => Err(OrderError::InvalidReference(format!(
                "product {product_id} is unknown"
            ))),
        }
    }
}
