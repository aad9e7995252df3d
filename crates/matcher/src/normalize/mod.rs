//! Normalizers: raw tables in, unified typed records out.

mod cells;
pub mod preferences;
pub mod suppliers;

pub use preferences::{normalize_preferences, NormalizedBuyers};
pub use suppliers::{normalize_suppliers, NormalizedSuppliers};
