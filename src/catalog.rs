//! Product catalog documents.
//!
//! A catalog is JSON, either `{"version": "...", "products": [...]}` or a
//! bare array of products. The engine never mutates it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::sizing::ProductUnit;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub version: Option<String>,
    pub products: Vec<ProductUnit>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Versioned(Catalog),
    Bare(Vec<ProductUnit>),
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Ok(match doc {
            CatalogDocument::Versioned(catalog) => catalog,
            CatalogDocument::Bare(products) => Catalog {
                version: None,
                products,
            },
        })
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Read a catalog from a JSON file on disk.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {:?}", path))?;
    let catalog = Catalog::from_json(&content)
        .with_context(|| format!("Failed to parse catalog {:?}", path))?;

    debug!(
        "Read catalog {} with {} products from {:?}",
        catalog.version.as_deref().unwrap_or("<unversioned>"),
        catalog.products.len(),
        path
    );

    Ok(catalog)
}

/// A suspicious catalog entry. Entries still load; the engine rejects or
/// escalates on them as data.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogWarning {
    pub sku: String,
    pub field: String,
    pub message: String,
}

/// Check catalog entries for values the engine will not be able to use.
pub fn lint_catalog(catalog: &Catalog) -> Vec<CatalogWarning> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for unit in &catalog.products {
        let mut push = |field: &str, message: String| {
            warnings.push(CatalogWarning {
                sku: unit.sku.clone(),
                field: field.to_string(),
                message,
            })
        };

        if !seen.insert(unit.sku.as_str()) {
            push("sku", format!("Duplicate SKU {}", unit.sku));
        }
        if !(unit.rated_capacity_lpd.is_finite() && unit.rated_capacity_lpd > 0.0) {
            push(
                "ratedCapacity_lpd",
                format!("Rated capacity {} must be > 0", unit.rated_capacity_lpd),
            );
        }
        if unit.max_room_m3.is_none() && unit.max_room_m2.is_none() {
            push(
                "maxRoom_m3",
                "No room coverage rating; every combination will be rejected".to_string(),
            );
        }
        if unit.pool_safe && unit.max_pool_m2.is_none() {
            push(
                "maxPool_m2",
                "Pool-safe unit without a pool coverage rating".to_string(),
            );
        }
        if let Some(price) = unit.price {
            if price < 0.0 {
                push("price", format!("Negative price {}", price));
            }
        }
    }

    warnings
}
