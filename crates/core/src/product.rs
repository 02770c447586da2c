//! Product entity and the record shape it is persisted as.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{coerce_float, coerce_integer, coerce_text, Field, RawFields};

/// Format of [`Product::created_at`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Reasons a product cannot be built from raw input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProductError {
    /// Neither naming scheme carried the field.
    #[error("missing required field `{0}`")]
    MissingField(Field),
    /// Quantity is not a whole number.
    #[error("quantity {0:?} is not a whole number")]
    InvalidQuantity(String),
    /// Price is not a finite number.
    #[error("price {0:?} is not a number")]
    InvalidPrice(String),
    /// Timestamp does not follow [`TIMESTAMP_FORMAT`].
    #[error("timestamp {0:?} does not match YYYY-MM-DD HH:MM")]
    InvalidTimestamp(String),
}

/// Canonical flat record, the unit of the persisted catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product name.
    pub name: String,
    /// Units in stock.
    pub quantity: i64,
    /// Unit price.
    pub price: f64,
    /// Creation time, `YYYY-MM-DD HH:MM`.
    pub created_at: String,
}

impl ProductRecord {
    /// Normalize either submission shape into a record stamped with `created_at`.
    pub fn from_fields(raw: &RawFields, created_at: NaiveDateTime) -> Result<Self, ProductError> {
        let name = raw
            .resolve(Field::Name)
            .and_then(coerce_text)
            .ok_or(ProductError::MissingField(Field::Name))?;

        let quantity_raw = raw
            .resolve(Field::Quantity)
            .ok_or(ProductError::MissingField(Field::Quantity))?;
        let quantity = coerce_integer(quantity_raw)
            .ok_or_else(|| ProductError::InvalidQuantity(quantity_raw.to_string()))?;

        let price_raw = raw
            .resolve(Field::Price)
            .ok_or(ProductError::MissingField(Field::Price))?;
        let price = coerce_float(price_raw)
            .ok_or_else(|| ProductError::InvalidPrice(price_raw.to_string()))?;

        Ok(Self {
            name,
            quantity,
            price,
            created_at: created_at.format(TIMESTAMP_FORMAT).to_string(),
        })
    }
}

/// One catalog entry. Fields are fixed once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    name: String,
    quantity: i64,
    price: f64,
    created_at: String,
}

impl Product {
    /// Build a product from a submission, stamped with the current local minute.
    pub fn from_fields(raw: &RawFields) -> Result<Self, ProductError> {
        Self::from_fields_at(raw, Local::now().naive_local())
    }

    /// Build a product from a submission with an explicit creation time.
    pub fn from_fields_at(raw: &RawFields, created_at: NaiveDateTime) -> Result<Self, ProductError> {
        Self::try_from(ProductRecord::from_fields(raw, created_at)?)
    }

    /// Product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units in stock.
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Unit price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Creation time, `YYYY-MM-DD HH:MM`.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Stock value of this entry.
    pub fn total_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        if record.name.is_empty() {
            return Err(ProductError::MissingField(Field::Name));
        }
        if !record.price.is_finite() {
            return Err(ProductError::InvalidPrice(record.price.to_string()));
        }
        if NaiveDateTime::parse_from_str(&record.created_at, TIMESTAMP_FORMAT).is_err() {
            return Err(ProductError::InvalidTimestamp(record.created_at));
        }
        Ok(Self {
            name: record.name,
            quantity: record.quantity,
            price: record.price,
            created_at: record.created_at,
        })
    }
}

/// Render a price the way Python's `repr(float)` does: shortest round-trip
/// digits, a trailing `.0` on whole numbers, and exponent notation below
/// `1e-4` or from `1e16` upwards (`2.5`, `3.0`, `1e+16`, `1.5e-05`).
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if price.is_finite() && price != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{price:e}");
        return match rendered.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => rendered,
        };
    }
    let rendered = price.to_string();
    if price.is_finite() && !rendered.contains('.') {
        format!("{rendered}.0")
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(12, 30, 45))
            .expect("valid date")
    }

    #[test]
    fn builds_from_form_shape() {
        let raw = RawFields::new()
            .with("input_name", "Widget")
            .with("input_qty", "5")
            .with("input_price", "2.50");
        let product = Product::from_fields_at(&raw, noon()).expect("valid product");
        assert_eq!(product.name(), "Widget");
        assert_eq!(product.quantity(), 5);
        assert_eq!(product.price(), 2.5);
        assert_eq!(product.created_at(), "2024-03-09 12:30");
    }

    #[test]
    fn both_shapes_normalize_identically() {
        let form = RawFields::new()
            .with("input_name", "Widget")
            .with("input_qty", "5")
            .with("input_price", "2.5");
        let stored = RawFields::new()
            .with("name", "Widget")
            .with("quantity", "5")
            .with("price", "2.5");
        assert_eq!(
            Product::from_fields_at(&form, noon()),
            Product::from_fields_at(&stored, noon())
        );
    }

    #[test]
    fn reports_construction_failures() {
        let raw = RawFields::new().with("quantity", "1").with("price", "1");
        assert_eq!(
            Product::from_fields_at(&raw, noon()),
            Err(ProductError::MissingField(Field::Name))
        );

        let raw = RawFields::new()
            .with("name", "Widget")
            .with("quantity", "lots")
            .with("price", "1");
        assert_eq!(
            Product::from_fields_at(&raw, noon()),
            Err(ProductError::InvalidQuantity("lots".to_string()))
        );

        let raw = RawFields::new().with("name", "Widget").with("quantity", "1");
        assert_eq!(
            Product::from_fields_at(&raw, noon()),
            Err(ProductError::MissingField(Field::Price))
        );
    }

    #[test]
    fn negative_values_are_not_rejected() {
        let raw = RawFields::new()
            .with("name", "Refund")
            .with("quantity", "-2")
            .with("price", "-1.25");
        let product = Product::from_fields_at(&raw, noon()).expect("constructs");
        assert_eq!(product.quantity(), -2);
        assert_eq!(product.total_value(), 2.5);
    }

    #[test]
    fn deserializing_checks_record() {
        let product: Product = serde_json::from_str(
            r#"{"name":"Widget","quantity":5,"price":2.5,"created_at":"2024-03-09 12:30"}"#,
        )
        .expect("valid record");
        assert_eq!(product.name(), "Widget");

        let bad_time = serde_json::from_str::<Product>(
            r#"{"name":"Widget","quantity":5,"price":2.5,"created_at":"yesterday"}"#,
        );
        assert!(bad_time.is_err());

        let bad_quantity = serde_json::from_str::<Product>(
            r#"{"name":"Widget","quantity":"5","price":2.5,"created_at":"2024-03-09 12:30"}"#,
        );
        assert!(bad_quantity.is_err());
    }

    #[test]
    fn formats_prices_with_fraction() {
        assert_eq!(format_price(2.5), "2.5");
        assert_eq!(format_price(3.0), "3.0");
        assert_eq!(format_price(0.1), "0.1");
        assert_eq!(format_price(-4.0), "-4.0");
        assert_eq!(format_price(0.0), "0.0");
        assert_eq!(format_price(0.0001), "0.0001");
        assert_eq!(format_price(9999999999999998.0), "9999999999999998.0");
    }

    #[test]
    fn formats_extreme_prices_in_exponent_form() {
        assert_eq!(format_price(1e16), "1e+16");
        assert_eq!(format_price(2.5e20), "2.5e+20");
        assert_eq!(format_price(1.5e-5), "1.5e-05");
        assert_eq!(format_price(-3e-7), "-3e-07");
        assert_eq!(format_price(1e100), "1e+100");
    }

    #[test]
    fn keeps_name_as_submitted() {
        let raw = RawFields::new()
            .with("input_name", " Widget ")
            .with("input_qty", "5")
            .with("input_price", "2.5");
        let product = Product::from_fields_at(&raw, noon()).expect("constructs");
        assert_eq!(product.name(), " Widget ");

        let raw = RawFields::new()
            .with("input_name", "")
            .with("input_qty", "5")
            .with("input_price", "2.5");
        assert_eq!(
            Product::from_fields_at(&raw, noon()),
            Err(ProductError::MissingField(Field::Name))
        );
    }
}
