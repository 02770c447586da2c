//! Field validation for raw product submissions.
//!
//! A submission is a flat list of `field -> raw text` pairs, either in the
//! stored-record shape (`name`, `quantity`, `price`) or in the form shape
//! (`input_name`, `input_qty`, `input_price`). Validation never fails: every
//! problem ends up as an invalid flag on the matching [`Field`].

use std::{collections::BTreeMap, fmt};

/// Canonical product fields accepted from a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Product name, the lookup key.
    Name,
    /// Units in stock.
    Quantity,
    /// Unit price.
    Price,
}

impl Field {
    /// Every field in display order.
    pub const ALL: [Field; 3] = [Field::Name, Field::Quantity, Field::Price];

    /// Key used by stored records.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Quantity => "quantity",
            Field::Price => "price",
        }
    }

    /// Key used by form submissions.
    pub fn form_key(self) -> &'static str {
        match self {
            Field::Name => "input_name",
            Field::Quantity => "input_qty",
            Field::Price => "input_price",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Quantity => "Quantity",
            Field::Price => "Unit Price",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value kind a raw field must coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty text, kept as typed.
    Text,
    /// Signed integer.
    Integer,
    /// Finite floating point number.
    Float,
}

impl FieldKind {
    /// Whether `raw` coerces to this kind.
    pub fn accepts(self, raw: &str) -> bool {
        match self {
            FieldKind::Text => coerce_text(raw).is_some(),
            FieldKind::Integer => coerce_integer(raw).is_some(),
            FieldKind::Float => coerce_float(raw).is_some(),
        }
    }
}

/// Expected kind for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field being checked.
    pub field: Field,
    /// Kind its raw value must coerce to.
    pub kind: FieldKind,
}

/// Expected kinds for a product submission.
pub const PRODUCT_SCHEMA: [FieldRule; 3] = [
    FieldRule {
        field: Field::Name,
        kind: FieldKind::Text,
    },
    FieldRule {
        field: Field::Quantity,
        kind: FieldKind::Integer,
    },
    FieldRule {
        field: Field::Price,
        kind: FieldKind::Float,
    },
];

/// Text exactly as submitted, `None` when empty.
pub fn coerce_text(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Parse a whole number, tolerating surrounding whitespace.
pub fn coerce_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Parse a finite decimal number, tolerating surrounding whitespace.
pub fn coerce_float(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Raw `field -> value` pairs in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    entries: Vec<(String, String)>,
}

impl RawFields {
    /// Empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`RawFields::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value stored under exactly `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Value for `field` under either naming scheme.
    ///
    /// The stored-record key wins when it carries a non-empty value, otherwise
    /// the form key is used. Empty values count as absent.
    pub fn resolve(&self, field: Field) -> Option<&str> {
        [field.key(), field.form_key()]
            .into_iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }
}

/// Per-field invalid markers from one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFlags {
    invalid: BTreeMap<Field, bool>,
}

impl Default for ValidationFlags {
    fn default() -> Self {
        Self {
            invalid: Field::ALL.into_iter().map(|field| (field, false)).collect(),
        }
    }
}

impl ValidationFlags {
    /// Whether `field` failed validation.
    pub fn is_invalid(&self, field: Field) -> bool {
        self.invalid.get(&field).copied().unwrap_or(false)
    }

    /// True when at least one field failed.
    pub fn any_invalid(&self) -> bool {
        self.invalid.values().any(|invalid| *invalid)
    }

    /// True when every field passed.
    pub fn is_valid(&self) -> bool {
        !self.any_invalid()
    }

    /// Fields that failed, in display order.
    pub fn invalid_fields(&self) -> Vec<Field> {
        self.invalid
            .iter()
            .filter(|(_, invalid)| **invalid)
            .map(|(field, _)| *field)
            .collect()
    }

    fn mark(&mut self, field: Field, invalid: bool) {
        self.invalid.insert(field, invalid);
    }
}

/// Check `raw` against `schema`, flagging missing, blank, or uncoercible values.
///
/// Keys that belong to no rule are ignored.
pub fn validate(raw: &RawFields, schema: &[FieldRule]) -> ValidationFlags {
    let mut flags = ValidationFlags::default();
    for rule in schema {
        let valid = raw
            .resolve(rule.field)
            .map(|value| rule.kind.accepts(value))
            .unwrap_or(false);
        flags.mark(rule.field, !valid);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, qty: &str, price: &str) -> RawFields {
        RawFields::new()
            .with("input_name", name)
            .with("input_qty", qty)
            .with("input_price", price)
    }

    #[test]
    fn accepts_complete_form_submission() {
        let flags = validate(&form("Widget", "5", "2.50"), &PRODUCT_SCHEMA);
        assert!(flags.is_valid());
        assert!(Field::ALL.iter().all(|field| !flags.is_invalid(*field)));
    }

    #[test]
    fn accepts_stored_record_shape() {
        let raw = RawFields::new()
            .with("name", "Gadget")
            .with("quantity", "0")
            .with("price", "3");
        assert!(validate(&raw, &PRODUCT_SCHEMA).is_valid());
    }

    #[test]
    fn flags_each_blank_field() {
        for field in Field::ALL {
            let mut raw = form("Widget", "5", "2.50");
            raw.insert(field.form_key(), "");
            let flags = validate(&raw, &PRODUCT_SCHEMA);
            assert_eq!(flags.invalid_fields(), vec![field], "blank {field}");
        }
    }

    #[test]
    fn flags_missing_fields() {
        let raw = RawFields::new().with("input_name", "Widget");
        let flags = validate(&raw, &PRODUCT_SCHEMA);
        assert!(!flags.is_invalid(Field::Name));
        assert!(flags.is_invalid(Field::Quantity));
        assert!(flags.is_invalid(Field::Price));
    }

    #[test]
    fn flags_uncoercible_numbers() {
        let flags = validate(&form("Widget", "five", "cheap"), &PRODUCT_SCHEMA);
        assert_eq!(flags.invalid_fields(), vec![Field::Quantity, Field::Price]);

        let flags = validate(&form("Widget", "2.5", "NaN"), &PRODUCT_SCHEMA);
        assert_eq!(flags.invalid_fields(), vec![Field::Quantity, Field::Price]);
    }

    #[test]
    fn only_empty_text_is_blank() {
        let flags = validate(&form("   ", " 1 ", "1"), &PRODUCT_SCHEMA);
        assert!(flags.is_valid());
        assert_eq!(coerce_text(" Widget "), Some(" Widget ".to_string()));
        assert_eq!(coerce_text(""), None);
    }

    #[test]
    fn resolve_prefers_stored_key() {
        let raw = RawFields::new()
            .with("input_name", "form")
            .with("name", "stored");
        assert_eq!(raw.resolve(Field::Name), Some("stored"));

        let raw = RawFields::new().with("name", "").with("input_name", "form");
        assert_eq!(raw.resolve(Field::Name), Some("form"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut raw = RawFields::new().with("a", "1").with("b", "2");
        raw.insert("a", "3");
        assert_eq!(raw.get("a"), Some("3"));
        assert_eq!(raw.get("b"), Some("2"));
    }
}
