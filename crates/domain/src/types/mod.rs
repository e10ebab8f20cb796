//! Shared vocabulary types.

mod sheet_value;

pub use sheet_value::SheetValue;
