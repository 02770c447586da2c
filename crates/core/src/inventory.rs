//! Entry point used by frontends: one object per running catalog.

use std::path::PathBuf;

use anyhow::Result;

use crate::{
    config::AppConfig,
    export::Exporter,
    search::{FilterOp, SearchView, DEFAULT_CURRENCY},
    store::Store,
    validation::{RawFields, ValidationFlags},
};

/// The catalog plus everything needed to act on it.
///
/// Each call runs to completion, including persistence, before returning.
#[derive(Debug, Clone)]
pub struct Inventory {
    store: Store,
    exporter: Exporter,
    currency: String,
}

impl Inventory {
    /// Inventory using the paths and currency from `config`.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Store::new(&config.catalog_path),
            exporter: Exporter::new(&config.export_path),
            currency: config.currency_symbol.clone(),
        }
    }

    /// Inventory over explicit catalog and export paths.
    pub fn with_paths(catalog: impl Into<PathBuf>, export: impl Into<PathBuf>) -> Self {
        Self {
            store: Store::new(catalog),
            exporter: Exporter::new(export),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Read-only access to the catalog.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Destination of [`Inventory::export`].
    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Populate the catalog from its file. Fails if it is absent or malformed.
    pub fn load(&mut self) -> Result<()> {
        self.store.load()
    }

    /// Submit a new product. See [`Store::add`].
    pub fn add(&mut self, raw: &RawFields) -> Result<ValidationFlags> {
        self.store.add(raw)
    }

    /// Delete the first product named `name`, if any.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.store.remove(name)
    }

    /// Rows whose names contain `term`, ignoring case.
    pub fn query(&self, term: &str) -> SearchView<'_> {
        self.query_with(term, FilterOp::Contains)
    }

    /// Rows selected by `op` applied to `term`.
    pub fn query_with(&self, term: &str, op: FilterOp) -> SearchView<'_> {
        self.store.query(term).op(op).currency(&self.currency)
    }

    /// Write the full catalog to the export file, returning the row count.
    pub fn export(&self) -> Result<usize> {
        self.exporter.export(self.store.products())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::ensure_catalog, validation::Field};
    use std::fs;
    use tempfile::tempdir;

    fn widget() -> RawFields {
        RawFields::new()
            .with("name", "Widget")
            .with("quantity", "5")
            .with("price", "2.50")
    }

    #[test]
    fn add_export_remove_scenario() -> Result<()> {
        let dir = tempdir()?;
        let catalog = dir.path().join("products.json");
        let export = dir.path().join("products.csv");
        ensure_catalog(&catalog)?;

        let mut inventory = Inventory::with_paths(&catalog, &export);
        inventory.load()?;
        assert!(inventory.store().is_empty());

        let flags = inventory.add(&widget())?;
        assert_eq!(inventory.store().len(), 1);
        assert!(Field::ALL.iter().all(|field| !flags.is_invalid(*field)));

        assert_eq!(inventory.export()?, 1);
        let csv = fs::read_to_string(&export)?;
        let lines: Vec<_> = csv.lines().collect();
        let created_at = inventory.store().products()[0].created_at().to_string();
        assert_eq!(lines, vec![
            "name,quantity,price,created_at".to_string(),
            format!("Widget,5,2.5,{created_at}"),
        ]);

        inventory.remove("Widget")?;
        assert_eq!(inventory.store().len(), 0);
        inventory.remove("Widget")?;
        assert_eq!(inventory.store().len(), 0);
        Ok(())
    }

    #[test]
    fn export_ignores_active_search() -> Result<()> {
        let dir = tempdir()?;
        let export = dir.path().join("products.csv");
        let mut inventory = Inventory::with_paths(dir.path().join("products.json"), &export);
        inventory.add(&widget())?;
        inventory.add(&RawFields::new().with("name", "Bolt").with("quantity", "9").with("price", "0.1"))?;

        assert_eq!(inventory.query("bolt").count(), 1);
        assert_eq!(inventory.export()?, 2);
        assert_eq!(fs::read_to_string(&export)?.lines().count(), 3);
        Ok(())
    }

    #[test]
    fn query_uses_configured_currency() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig {
            catalog_path: dir.path().join("products.json"),
            export_path: dir.path().join("products.csv"),
            currency_symbol: "$".to_string(),
            ..AppConfig::default()
        };
        let mut inventory = Inventory::new(&config);
        inventory.add(&widget())?;

        let rows = inventory.query("").rows();
        assert_eq!(rows[0].price, "2.5$");
        assert_eq!(
            inventory.query_with("widget", FilterOp::DoesNotContain).count(),
            0
        );
        Ok(())
    }

    #[test]
    fn load_without_catalog_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let mut inventory = Inventory::with_paths(
            dir.path().join("missing.json"),
            dir.path().join("products.csv"),
        );
        assert!(inventory.load().is_err());
        Ok(())
    }
}
