#![warn(clippy::all, missing_docs)]

//! Core logic for the product inventory manager.
//!
//! This crate hosts the product model, submission validation, the
//! file-backed catalog, search projections, CSV export, and configuration
//! used by the terminal UI and any future frontends.

pub mod config;
pub mod export;
pub mod inventory;
pub mod product;
pub mod search;
pub mod store;
pub mod validation;

pub use crate::config::AppConfig;
pub use crate::export::Exporter;
pub use crate::inventory::Inventory;
pub use crate::product::{Product, ProductError, ProductRecord};
pub use crate::search::{FilterOp, ProductRow, SearchView};
pub use crate::store::Store;
pub use crate::validation::{Field, RawFields, ValidationFlags};
