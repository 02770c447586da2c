//! Ordered product catalog backed by a JSON file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::{
    product::Product,
    search::SearchView,
    validation::{validate, RawFields, ValidationFlags, PRODUCT_SCHEMA},
};

/// Products in insertion order, mirrored to a file after every change.
///
/// Names are not unique; duplicates are kept and removal only touches the
/// first match.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    products: Vec<Product>,
}

impl Store {
    /// Empty store bound to `path`. Nothing is read until [`Store::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            products: Vec::new(),
        }
    }

    /// Bind to `path` and load it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Catalog file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current products, in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Combined stock value of every product.
    pub fn total_value(&self) -> f64 {
        self.products.iter().map(Product::total_value).sum()
    }

    /// Replace the in-memory catalog with the file contents.
    pub fn load(&mut self) -> Result<()> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let products: Vec<Product> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        info!(count = products.len(), path = %self.path.display(), "Catalog loaded");
        self.products = products;
        Ok(())
    }

    /// Overwrite the file with the full in-memory catalog.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialised = serde_json::to_vec_pretty(&self.products)?;
        fs::write(&self.path, serialised)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(count = self.products.len(), path = %self.path.display(), "Catalog saved");
        Ok(())
    }

    /// Validate and append a submission, then persist.
    ///
    /// Rejected submissions leave the catalog untouched; the returned flags say
    /// which fields to correct. All-valid flags mean the product was stored.
    pub fn add(&mut self, raw: &RawFields) -> Result<ValidationFlags> {
        let flags = validate(raw, &PRODUCT_SCHEMA);
        if flags.any_invalid() {
            warn!(fields = ?flags.invalid_fields(), "Rejected product submission");
            return Ok(flags);
        }

        let product = Product::from_fields(raw).context("failed to construct product")?;
        debug!(name = product.name(), "Adding product");
        self.products.push(product);
        if let Err(err) = self.save() {
            self.products.pop();
            return Err(err);
        }
        Ok(flags)
    }

    /// Remove the first product named exactly `name`, then persist.
    ///
    /// An unknown name is a no-op.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let Some(index) = self.products.iter().position(|product| product.name() == name) else {
            debug!(name, "No product to remove");
            return Ok(());
        };

        let removed = self.products.remove(index);
        if let Err(err) = self.save() {
            self.products.insert(index, removed);
            return Err(err);
        }
        debug!(name, index, "Removed product");
        Ok(())
    }

    /// Products whose names contain `term`, ignoring case.
    pub fn query<'a>(&'a self, term: &str) -> SearchView<'a> {
        SearchView::new(&self.products, term)
    }
}

/// Seed an empty catalog at `path` unless one exists. Returns whether it wrote.
pub fn ensure_catalog(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    Store::new(path).save()?;
    info!(path = %path.display(), "Created empty catalog");
    Ok(true)
}
