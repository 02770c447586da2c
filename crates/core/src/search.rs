//! Display-shaped, filtered views over the catalog.

use std::fmt;

use crate::product::{format_price, Product};

/// Currency suffix used when none is configured.
pub const DEFAULT_CURRENCY: &str = "€";

/// How the search term is matched against product names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOp {
    /// Name contains the term, ignoring case.
    #[default]
    Contains,
    /// Name does not contain the term, ignoring case.
    DoesNotContain,
}

impl FilterOp {
    /// Every operator in cycling order.
    pub const ALL: [FilterOp; 2] = [FilterOp::Contains, FilterOp::DoesNotContain];

    /// Short label shown next to the search box.
    pub fn label(self) -> &'static str {
        match self {
            FilterOp::Contains => "contains",
            FilterOp::DoesNotContain => "does not contain",
        }
    }

    /// Operator following this one.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|op| *op == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One projected table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    /// Product name.
    pub name: String,
    /// Units in stock.
    pub quantity: i64,
    /// Price with currency suffix, e.g. `2.5€`.
    pub price: String,
    /// Creation time.
    pub created_at: String,
}

impl ProductRow {
    /// Cells in column order, ready for rendering.
    pub fn cells(&self) -> [String; 4] {
        [
            self.name.clone(),
            self.quantity.to_string(),
            self.price.clone(),
            self.created_at.clone(),
        ]
    }
}

/// Lazy projection of the products matching a search term.
///
/// Nothing is computed until iterated, and every call to [`SearchView::iter`]
/// starts over from the borrowed catalog.
#[derive(Debug, Clone)]
pub struct SearchView<'a> {
    products: &'a [Product],
    needle: String,
    op: FilterOp,
    currency: &'a str,
}

impl<'a> SearchView<'a> {
    /// View of `products` whose names match `term`.
    pub fn new(products: &'a [Product], term: &str) -> Self {
        Self {
            products,
            needle: term.to_lowercase(),
            op: FilterOp::default(),
            currency: DEFAULT_CURRENCY,
        }
    }

    /// Use a different match operator.
    pub fn op(mut self, op: FilterOp) -> Self {
        self.op = op;
        self
    }

    /// Use a different currency suffix for prices.
    pub fn currency(mut self, currency: &'a str) -> Self {
        self.currency = currency;
        self
    }

    /// Whether `product` belongs in this view.
    pub fn matches(&self, product: &Product) -> bool {
        let contains = product.name().to_lowercase().contains(&self.needle);
        match self.op {
            FilterOp::Contains => contains,
            FilterOp::DoesNotContain => !contains,
        }
    }

    /// Matching products, in catalog order.
    pub fn products(&self) -> impl Iterator<Item = &'a Product> + '_ {
        self.products
            .iter()
            .filter(move |product| self.matches(product))
    }

    /// Projected rows, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = ProductRow> + '_ {
        self.products().map(move |product| ProductRow {
            name: product.name().to_string(),
            quantity: product.quantity(),
            price: format!("{}{}", format_price(product.price()), self.currency),
            created_at: product.created_at().to_string(),
        })
    }

    /// Number of matching products.
    pub fn count(&self) -> usize {
        self.products().count()
    }

    /// Collect the rows.
    pub fn rows(&self) -> Vec<ProductRow> {
        self.iter().collect()
    }
}
