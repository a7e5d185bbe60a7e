//! Workbook and delimited-text adapters.

pub mod delimited;
pub mod excel_read;
pub mod excel_write;
pub mod output;
