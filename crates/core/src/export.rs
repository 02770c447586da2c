//! Flat CSV snapshot of the whole catalog.

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::info;

use crate::product::{format_price, Product};

/// Header row of every export.
pub const CSV_HEADER: &str = "name,quantity,price,created_at";

/// Writes catalog snapshots to a fixed path.
#[derive(Debug, Clone)]
pub struct Exporter {
    path: PathBuf,
}

impl Exporter {
    /// Exporter writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the destination with every product, returning the row count.
    pub fn export(&self, products: &[Product]) -> Result<usize> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, render_csv(products))
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!(rows = products.len(), path = %self.path.display(), "Catalog exported");
        Ok(products.len())
    }
}

/// Render products as CSV, header first, one line per product.
pub fn render_csv(products: &[Product]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + products.len() * 48);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for product in products {
        let cells = [
            escape_cell(product.name()),
            Cow::Owned(product.quantity().to_string()),
            Cow::Owned(format_price(product.price())),
            escape_cell(product.created_at()),
        ];
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn escape_cell(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RawFields;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn product(name: &str, qty: &str, price: &str) -> Product {
        let created = NaiveDate::from_ymd_opt(2023, 11, 30)
            .and_then(|date| date.and_hms_opt(17, 5, 0))
            .expect("valid date");
        let raw = RawFields::new()
            .with("name", name)
            .with("quantity", qty)
            .with("price", price);
        Product::from_fields_at(&raw, created).expect("valid product")
    }

    #[test]
    fn renders_header_and_rows() {
        let csv = render_csv(&[product("Widget", "5", "2.50"), product("Bolt", "100", "1")]);
        assert_eq!(
            csv,
            "name,quantity,price,created_at\n\
             Widget,5,2.5,2023-11-30 17:05\n\
             Bolt,100,1.0,2023-11-30 17:05\n"
        );
    }

    #[test]
    fn empty_catalog_has_header_only() {
        assert_eq!(render_csv(&[]), "name,quantity,price,created_at\n");
    }

    #[test]
    fn quotes_awkward_names() {
        let csv = render_csv(&[product("Nuts, \"large\"", "1", "1")]);
        assert!(csv.contains("\"Nuts, \"\"large\"\"\",1,1.0,"));
    }

    #[test]
    fn export_overwrites_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("products.csv");
        let exporter = Exporter::new(&path);

        assert_eq!(exporter.export(&[product("A", "1", "1"), product("B", "2", "2")])?, 2);
        assert_eq!(exporter.export(&[product("C", "3", "3")])?, 1);

        let content = fs::read_to_string(&path)?;
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("C,3,3.0,"));
        Ok(())
    }
}
