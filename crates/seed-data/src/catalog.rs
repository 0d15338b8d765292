//! Product catalog definitions.

use std::path::{Path, PathBuf};

use docstore::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Largest value the store keeps as a 64-bit signed integer.
pub const MAX_INTEGER: u64 = i64::MAX as u64;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog must contain at least one product")]
    Empty,
    #[error("Product {position} has a blank name")]
    BlankName { position: usize },
    #[error("Product {position} has {field} above the store's integer limit of {}", MAX_INTEGER)]
    OutOfRange {
        position: usize,
        field: &'static str,
    },
    #[error("Failed to read catalog file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A sample product, as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub name: String,
    pub description: String,
    /// Price in the smallest currency unit (rupiah).
    pub price: u64,
    /// Expected to be a URL; not validated.
    pub image_url: String,
    pub stock: u64,
    pub category: String,
}

impl ProductRecord {
    /// Builds the document body. Field names match the app's product model.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("name".into(), Value::from(self.name.as_str()));
        doc.insert("description".into(), Value::from(self.description.as_str()));
        doc.insert("price".into(), Value::from(self.price));
        doc.insert("imageUrl".into(), Value::from(self.image_url.as_str()));
        doc.insert("stock".into(), Value::from(self.stock));
        doc.insert("category".into(), Value::from(self.category.as_str()));
        doc
    }
}

/// An ordered, non-empty list of products to seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<ProductRecord>,
}

impl Catalog {
    /// Validates and wraps a product list.
    pub fn new(products: Vec<ProductRecord>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(i) = products.iter().position(|p| p.name.trim().is_empty()) {
            return Err(CatalogError::BlankName { position: i + 1 });
        }
        for (i, product) in products.iter().enumerate() {
            let field = if product.price > MAX_INTEGER {
                "price"
            } else if product.stock > MAX_INTEGER {
                "stock"
            } else {
                continue;
            };
            return Err(CatalogError::OutOfRange {
                position: i + 1,
                field,
            });
        }
        Ok(Self { products })
    }

    /// Parses a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<ProductRecord> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Loads a JSON catalog from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// The bakery's six sample products.
    pub fn bakery() -> Self {
        let products = vec![
            ProductRecord {
                name: "Roti Tawar Premium".into(),
                description: "Roti tawar lembut dengan kualitas premium, cocok untuk sandwich"
                    .into(),
                price: 15000,
                image_url: "https://images.unsplash.com/photo-1509440159596-0249088772ff?w=800"
                    .into(),
                stock: 50,
                category: "Bread".into(),
            },
            ProductRecord {
                name: "Croissant Mentega".into(),
                description: "Croissant renyah dengan lapisan mentega yang lezat".into(),
                price: 12000,
                image_url: "https://images.unsplash.com/photo-1555507036-ab1f4038808a?w=800"
                    .into(),
                stock: 30,
                category: "Pastry".into(),
            },
            ProductRecord {
                name: "Roti Sourdough".into(),
                description: "Roti sourdough authentik dengan cita rasa unik".into(),
                price: 25000,
                image_url: "https://images.unsplash.com/photo-1549931319-a545dcf3bc73?w=800"
                    .into(),
                stock: 20,
                category: "Bread".into(),
            },
            ProductRecord {
                name: "Bagel Original".into(),
                description: "Bagel klasik dengan tekstur kenyal, sempurna untuk breakfast".into(),
                price: 10000,
                image_url: "https://images.unsplash.com/photo-1551106652-a5bcf4b29917?w=800"
                    .into(),
                stock: 40,
                category: "Bread".into(),
            },
            ProductRecord {
                name: "Baguette Prancis".into(),
                description: "Baguette authentik ala Prancis dengan kulit renyah".into(),
                price: 18000,
                image_url: "https://images.unsplash.com/photo-1549931319-5974c8574b2f?w=800"
                    .into(),
                stock: 25,
                category: "Bread".into(),
            },
            ProductRecord {
                name: "Donat Coklat".into(),
                description: "Donat empuk dengan topping coklat manis".into(),
                price: 8000,
                image_url: "https://images.unsplash.com/photo-1551024506-0bccd828d307?w=800"
                    .into(),
                stock: 60,
                category: "Pastry".into(),
            },
        ];

        Self { products }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter()
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }
}
