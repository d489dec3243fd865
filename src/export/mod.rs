//! Persistence: raw JSON capture/replay files and spreadsheet output

pub mod raw;
pub mod xlsx;

pub use xlsx::{SHEET_NAME, WriteMode, write_table};
